//! toggler-validate - Check a preset file without loading it into a game.
//!
//! Decodes the preset with the same codec the toggler uses, prints how many
//! rules each category holds and any lint findings. Exits non-zero when the
//! preset does not decode cleanly or lint reports an error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use toggler_core::preset::{self, PresetError, Severity};
use toggler_types::{Category, RuleBook};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Validate an effect toggler preset")]
struct Args {
    /// Preset JSON file
    preset: PathBuf,

    /// Comma separated effect names; rules for other effects are flagged
    #[arg(long, value_delimiter = ',')]
    effects: Option<Vec<String>>,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn category_size(book: &RuleBook, category: Category) -> (usize, usize) {
    fn size<R>(set: &toggler_types::RuleSet<R>) -> (usize, usize) {
        (set.len(), set.values().map(Vec::len).sum())
    }
    match category {
        Category::Menu => size(&book.menu),
        Category::Time => size(&book.time),
        Category::Weather => size(&book.weather),
        Category::Interior => size(&book.interior),
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let text = match std::fs::read_to_string(&args.preset) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("cannot read {}: {e}", args.preset.display());
            return ExitCode::FAILURE;
        }
    };

    let mut book = RuleBook::new();
    let mut failed = false;
    match preset::decode(&text, &mut book) {
        Ok(()) => {}
        Err(PresetError::Incomplete(failures)) => {
            failed = true;
            for failure in &failures {
                println!("{:<9} FAILED  {}", failure.category, failure.error);
            }
        }
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    }

    for category in Category::ALL {
        let (contexts, rules) = category_size(&book, category);
        println!("{category:<9} {rules:>4} rules in {contexts} contexts");
    }

    let issues = preset::lint(&book, args.effects.as_deref());
    for issue in &issues {
        println!("{issue}");
    }
    let errors = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count();
    println!(
        "{} issues ({} errors, {} warnings)",
        issues.len(),
        errors,
        issues.len() - errors
    );

    if failed || errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
