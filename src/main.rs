use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rift_taskbar::actor::taskbar;
use rift_taskbar::common::config::{self, Config};
use rift_taskbar::common::log;
use rift_taskbar::sys::scripted::Script;

#[derive(Parser)]
#[command(version, about = "Per-display taskbar panels for rift")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive the taskbar through a RON script against an in-memory system
    /// and print the resulting panels and window frames as JSON.
    Replay { script: PathBuf },
    /// Parse and validate a config file, then print the effective settings.
    CheckConfig { path: Option<PathBuf> },
    /// Print the default configuration.
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log::init_logging();

    match cli.command {
        Command::Replay { script } => replay(script),
        Command::CheckConfig { path } => {
            let path = path.unwrap_or_else(config::config_file);
            let config = Config::read(&path)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::DefaultConfig => {
            print!("{}", Config::default().to_toml()?);
            Ok(())
        }
    }
}

fn replay(path: PathBuf) -> anyhow::Result<()> {
    let buf = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let script = Script::parse(&buf)?;
    let report = taskbar::replay(script)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
