use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use toggler_cli::commands::{self, parse_form_id};
use toggler_cli::readline;
use toggler_cli::session::{Session, evaluation_job};
use toggler_core::runtime::MemoryRuntime;
use toggler_core::{PresetStore, Ticker, WorkQueue, settings};
use toggler_types::Category;
use tracing_subscriber::EnvFilter;

/// Startup flags
#[derive(Parser)]
#[command(version, about = "Interactive effect toggler")]
struct Args {
    /// Preset directory
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Effects to register with the in-memory runtime
    #[arg(long, value_delimiter = ',')]
    effects: Vec<String>,

    /// Only evaluate on `tick`
    #[arg(long)]
    no_ticker: bool,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If TOGGLER_LOG_PATH is set, append to that file so the prompt stays clean
    if let Ok(path) = std::env::var("TOGGLER_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), String> {
    init_logging();
    let args = Args::parse();

    let settings_path = args
        .settings
        .or_else(settings::default_path)
        .unwrap_or_else(|| PathBuf::from("settings.toml"));
    let settings = settings::load_or_default(&settings_path);

    let presets_dir = args
        .presets
        .or_else(PresetStore::default_dir)
        .unwrap_or_else(|| PathBuf::from("presets"));
    let store = PresetStore::open(presets_dir).map_err(|e| e.to_string())?;

    let mut runtime = MemoryRuntime::new();
    for effect in &args.effects {
        runtime.add_technique(effect, &format!("{effect}Pass"));
    }

    let mut session = Session::new(runtime, store, settings, settings_path);
    let last = session.settings.preset.last_preset.clone();
    if !last.is_empty() && session.store.exists(&last) {
        commands::load(&mut session, &last)?;
    }

    let queue = Arc::new(WorkQueue::<Session>::new());
    let mut ticker = if args.no_ticker {
        None
    } else {
        let ticker = Ticker::spawn(
            Arc::clone(&queue),
            &session.settings.toggles,
            Arc::clone(&session.indoors),
            evaluation_job,
        )
        .map_err(|e| e.to_string())?;
        Some(ticker)
    };

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            queue.drain(&mut session);
            continue;
        }

        let result = respond(line, &mut session);
        queue.drain(&mut session);

        match result {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    if let Some(ticker) = ticker.as_mut() {
        ticker.stop();
    }
    session.toggler.release_all();
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "toggler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MenuAction {
    Open,
    Close,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum Commands {
    /// List effects, optionally registering new ones
    Effects {
        #[arg(short, long)]
        add: Vec<String>,
    },
    Presets,
    Load {
        name: String,
    },
    Save {
        name: String,
    },
    /// Open or close a menu
    Menu {
        name: String,
        action: MenuAction,
    },
    /// Enter a worldspace
    World {
        name: String,
        #[arg(long, value_parser = parse_form_id)]
        form_id: Option<u32>,
        #[arg(long)]
        plugin: Option<String>,
    },
    /// Enter an interior cell
    Indoors {
        cell: String,
        #[arg(long, value_parser = parse_form_id)]
        form_id: Option<u32>,
        #[arg(long)]
        plugin: Option<String>,
    },
    /// Leave the interior, back to the last or given worldspace
    Outdoors {
        world: Option<String>,
    },
    /// Set the current weather, `none` to clear
    Weather {
        name: String,
        #[arg(long, value_parser = parse_form_id)]
        form_id: Option<u32>,
        #[arg(long)]
        plugin: Option<String>,
    },
    /// Set the game clock (HH:MM)
    Clock {
        time: String,
    },
    Pause,
    Resume,
    /// Evaluate now, all polled categories or one
    Tick {
        #[arg(value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Drive an effect directly
    Toggle {
        effect: String,
        state: Switch,
    },
    State,
    Lint,
    Exit,
}

fn parse_category(text: &str) -> Result<Category, String> {
    Category::from_name(text).ok_or_else(|| format!("unknown category '{text}'"))
}

fn respond(line: &str, session: &mut Session) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "toggler".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Effects { add }) => commands::effects(session, &add),
        Some(Commands::Presets) => commands::presets(session)?,
        Some(Commands::Load { name }) => commands::load(session, &name)?,
        Some(Commands::Save { name }) => commands::save(session, &name)?,
        Some(Commands::Menu { name, action }) => {
            commands::menu(session, &name, matches!(action, MenuAction::Open))
        }
        Some(Commands::World {
            name,
            form_id,
            plugin,
        }) => commands::world(session, &name, form_id, plugin.as_deref()),
        Some(Commands::Indoors {
            cell,
            form_id,
            plugin,
        }) => commands::indoors(session, &cell, form_id, plugin.as_deref()),
        Some(Commands::Outdoors { world }) => commands::outdoors(session, world.as_deref()),
        Some(Commands::Weather {
            name,
            form_id,
            plugin,
        }) => commands::weather(session, &name, form_id, plugin.as_deref()),
        Some(Commands::Clock { time }) => commands::clock(session, &time)?,
        Some(Commands::Pause) => commands::pause(session, true),
        Some(Commands::Resume) => commands::pause(session, false),
        Some(Commands::Tick { category }) => commands::tick(session, category),
        Some(Commands::Toggle { effect, state }) => {
            commands::toggle(session, &effect, matches!(state, Switch::On))
        }
        Some(Commands::State) => commands::state(session),
        Some(Commands::Lint) => {
            commands::lint(session);
        }
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
