//! Mesa CLI
//!
//! # Commands
//! - `mesa serve` - Run the ordering API over the snapshot file
//! - `mesa seed [path]` - Write the demo restaurant to a snapshot
//! - `mesa schematic` - Print the checkout circuit schematic as JSON
//! - `mesa report` - Build the sales report and customer directory

mod config;
mod report;
mod seed;
mod serve;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::Config;
use mesa_observe::{LogFormat, init_cli_tracing, init_tracing};
use std::path::PathBuf;

/// Mesa restaurant ordering CLI
#[derive(Parser)]
#[command(name = "mesa")]
#[command(author, version, about = "Restaurant ordering: API server, seed data and reports")]
struct Cli {
    /// Config file (default: ./mesa.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Snapshot file to load and save on shutdown (overrides config)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Emit JSON logs
        #[arg(long)]
        log_json: bool,
    },

    /// Write the demo restaurant to a snapshot file
    Seed {
        /// Output file (default: the configured snapshot)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the checkout circuit schematic
    Schematic {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the sales report and customer directory
    Report {
        /// First day included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only orders in this status
        #[arg(long)]
        status: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "./dist/reports")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            bind,
            snapshot,
            log_json,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(snapshot) = snapshot {
                config.snapshot = snapshot;
            }
            config.log_json |= log_json;
            init_tracing(LogFormat::from_flag(config.log_json))?;
            serve::run_serve_command(&config)
        }
        Commands::Seed { path, force } => {
            init_cli_tracing();
            seed::run_seed_command(path.as_deref().unwrap_or(config.snapshot.as_path()), force)
        }
        Commands::Schematic { output } => {
            init_cli_tracing();
            run_schematic_command(output.as_deref())
        }
        Commands::Report {
            from,
            to,
            status,
            out,
        } => {
            init_cli_tracing();
            report::run_report_command(report::ReportArgs {
                snapshot: &config.snapshot,
                out: &out,
                from,
                to,
                status: status.as_deref(),
            })
        }
    }
}

fn run_schematic_command(output: Option<&std::path::Path>) -> Result<()> {
    let circuit = mesa_runtime::checkout_circuit();
    let json = serde_json::to_string_pretty(circuit.schematic())
        .context("Failed to serialize schematic")?;

    match output {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Schematic saved to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_report_dates() {
        let cli = Cli::try_parse_from(["mesa", "report", "--from", "2025-06-01", "--status", "completed"])
            .unwrap();
        let Commands::Report { from, status, .. } = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(status.as_deref(), Some("completed"));
    }

    #[test]
    fn test_schematic_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout.json");
        run_schematic_command(Some(&path)).unwrap();
        let written: mesa_core::schematic::Schematic =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.name, "Checkout");
    }
}
