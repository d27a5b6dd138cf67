use toggler_core::preset::{self, PresetError, Severity};
use toggler_core::runtime::effect_names;
use toggler_core::{Evaluation, settings};
use toggler_types::clock::{MAX_HOUR, MAX_MINUTE, clamp_component, format_time};
use toggler_types::{Category, GameClock};

use crate::session::Session;

fn describe(outcome: &Evaluation) -> String {
    if outcome.skipped {
        return "skipped".to_string();
    }
    let mut text = format!("{} enabled, {} reverted", outcome.enabled, outcome.reverted);
    if let Some(transition) = outcome.transition {
        text.push_str(&format!(" ({transition:?}, {} kept)", outcome.suppressed));
    }
    text
}

/// Parse `HH:MM`, clamping out-of-range components
pub fn parse_clock(text: &str) -> Result<GameClock, String> {
    let (hour, minute) = text
        .split_once(':')
        .ok_or_else(|| format!("error: expected HH:MM, got '{text}'"))?;
    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| format!("error: bad hour '{hour}'"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| format!("error: bad minute '{minute}'"))?;
    Ok(GameClock::new(
        clamp_component(hour, MAX_HOUR),
        clamp_component(minute, MAX_MINUTE),
    ))
}

/// Parse a hex form id, with or without `0x`
pub fn parse_form_id(text: &str) -> Result<u32, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid form id '{text}': {e}"))
}

pub fn effects(session: &mut Session, add: &[String]) {
    for name in add {
        if !session.toggler.effect_exists(name) {
            session
                .toggler
                .runtime_mut()
                .add_technique(name, &format!("{name}Pass"));
        }
    }

    let runtime = session.toggler.runtime();
    let names = effect_names(runtime);
    if names.is_empty() {
        println!("no effects loaded");
    }
    for name in names {
        let state = match runtime.is_effect_enabled(&name) {
            Some(true) => "on",
            _ => "off",
        };
        println!("{name:<24} {state}");
    }
    if !runtime.effects_enabled() {
        println!("(all effects disabled)");
    }
}

pub fn presets(session: &Session) -> Result<(), String> {
    let names = session.store.list().map_err(|e| e.to_string())?;
    if names.is_empty() {
        println!("no presets in {}", session.store.dir().display());
    }
    for name in names {
        let marker = if name == session.settings.preset.last_preset {
            "*"
        } else {
            " "
        };
        println!("{marker} {name}");
    }
    Ok(())
}

pub fn load(session: &mut Session, name: &str) -> Result<(), String> {
    match session.toggler.load_preset(&session.store, name) {
        Ok(()) => remember(session, name),
        Err(PresetError::Incomplete(failures)) => {
            for failure in &failures {
                println!("{}: {}", failure.category, failure.error);
            }
            println!("loaded with {} failed categories", failures.len());
        }
        Err(e) => return Err(format!("error: {e}")),
    }

    println!("{} rules loaded", session.toggler.rules().rule_count());
    Ok(())
}

pub fn save(session: &mut Session, name: &str) -> Result<(), String> {
    match session.toggler.save_preset(&session.store, name) {
        Ok(path) => {
            println!("saved {}", path.display());
            remember(session, name);
        }
        Err(PresetError::Incomplete(failures)) => {
            for failure in &failures {
                println!("{} not written: {}", failure.category, failure.error);
            }
        }
        Err(e) => return Err(format!("error: {e}")),
    }
    Ok(())
}

fn remember(session: &mut Session, name: &str) {
    let file_name = session
        .store
        .path_for(name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| name.to_string());
    if let Err(e) =
        settings::record_last_preset(&session.settings_path, &mut session.settings, &file_name)
    {
        tracing::warn!(error = %e, "Could not record last preset");
    }
}

pub fn menu(session: &mut Session, name: &str, opening: bool) {
    if !session.settings.toggles.enable_menus {
        println!("menu rules are disabled");
        return;
    }
    let outcome = session.toggler.on_menu_event(name, opening);
    println!("{name}: {}", describe(&outcome));
}

pub fn world(session: &mut Session, name: &str, form_id: Option<u32>, plugin: Option<&str>) {
    let world = session.host.form(name, form_id, plugin);
    println!("entered {}", world.key);
    session.host.enter_worldspace(world);
    session.sync_indoors();
}

pub fn indoors(session: &mut Session, cell: &str, form_id: Option<u32>, plugin: Option<&str>) {
    let cell = session.host.form(cell, form_id, plugin);
    println!("entered {}", cell.key);
    session.host.enter_interior(cell);
    session.sync_indoors();
}

pub fn outdoors(session: &mut Session, world: Option<&str>) {
    let world = world.map(|name| session.host.form(name, None, None));
    session.host.leave_interior(world);
    session.sync_indoors();
    match &session.host.worldspace {
        Some(world) => println!("back in {}", world.key),
        None => println!("outside, no worldspace"),
    }
}

/// Set the weather; `none` clears it
pub fn weather(session: &mut Session, name: &str, form_id: Option<u32>, plugin: Option<&str>) {
    if name.eq_ignore_ascii_case("none") {
        session.host.weather = None;
        return;
    }
    let weather = session.host.form(name, form_id, plugin);
    println!("weather {}", weather.key);
    session.host.weather = Some(weather);
}

pub fn clock(session: &mut Session, time: &str) -> Result<(), String> {
    let clock = parse_clock(time)?;
    println!("clock {}", format_time(clock.encoded()));
    session.host.clock = Some(clock);
    Ok(())
}

pub fn pause(session: &mut Session, paused: bool) {
    session.host.paused = paused;
}

pub fn tick(session: &mut Session, category: Option<Category>) {
    let categories = match category {
        Some(category) => vec![category],
        None => vec![Category::Time, Category::Weather, Category::Interior],
    };
    for category in categories {
        let outcome = session.evaluate(category);
        println!("{category}: {}", describe(&outcome));
    }
}

pub fn toggle(session: &mut Session, effect: &str, enabled: bool) {
    if effect != toggler_types::ENTIRE_RESHADE && !session.toggler.effect_exists(effect) {
        println!("unknown effect '{effect}'");
        return;
    }
    session.toggler.toggle_effect(effect, enabled);
}

pub fn state(session: &Session) {
    let host = &session.host;
    let name = |form: &Option<toggler_core::FormRef>| {
        form.as_ref()
            .map(|f| f.key.clone())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("worldspace: {}", name(&host.worldspace));
    println!(
        "cell:       {}{}",
        name(&host.cell),
        if host.interior { " (interior)" } else { "" }
    );
    println!("weather:    {}", name(&host.weather));
    println!(
        "clock:      {}",
        host.clock
            .map(|c| format_time(c.encoded()))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("paused:     {}", host.paused);

    let engine = session.toggler.engine();
    let caches = [
        (
            Category::Weather,
            engine.weather_cache().context(),
            engine.weather_cache().rules().len(),
        ),
        (
            Category::Time,
            engine.time_cache().context(),
            engine.time_cache().rules().len(),
        ),
        (
            Category::Interior,
            engine.interior_cache().context(),
            engine.interior_cache().rules().len(),
        ),
    ];
    for (category, context, active) in caches {
        let context = context.map(|c| c.key.as_str()).unwrap_or("-");
        println!("{category:<9} {active} active in {context}");
    }
    println!("menus     {} effects held", engine.menu().held_effects());
}

/// Returns `true` when an error-level issue was found
pub fn lint(session: &Session) -> bool {
    let known = effect_names(session.toggler.runtime());
    let issues = preset::lint(session.toggler.rules(), Some(known.as_slice()));
    if issues.is_empty() {
        println!("no issues");
    }
    for issue in &issues {
        println!("{issue}");
    }
    issues.iter().any(|i| i.severity == Severity::Error)
}

pub fn exit() {
    println!("quitting...");
}
