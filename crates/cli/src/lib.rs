pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "stickfit",
    about = "Stickfit operator CLI",
    long_about = "Inspect configuration, validate the catalog, seed demo data, and run \
                  an end-to-end recommendation smoke check.",
    after_help = "Examples:\n  stickfit doctor --json\n  stickfit seed --out data/catalog.json\n  stickfit smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Validate config and catalog readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the deterministic demo catalog")]
    Seed {
        #[arg(long, help = "Output path (defaults to data/catalog.json)")]
        out: Option<PathBuf>,
    },
    #[command(about = "Run one recommendation end-to-end against the configured catalog")]
    Smoke {
        #[arg(long, help = "Catalog file to use instead of the configured one")]
        catalog: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Seed { out } => commands::seed::run(out.as_deref()),
        Command::Smoke { catalog } => commands::smoke::run(catalog.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
