//! # tcr CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tcr_cli::commit::{run_commit_hash, CommitHashArgs};
use tcr_cli::config::{run_config, ConfigArgs};
use tcr_cli::item::{run_item_id, ItemIdArgs};
use tcr_cli::simulate::{run_simulate, SimulateArgs};

/// Curated registry toolchain.
///
/// Validates deployment parameters, computes item ids and vote
/// commitments, and simulates disputes end to end.
#[derive(Parser, Debug)]
#[command(name = "tcr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate or print stack configuration.
    Config(ConfigArgs),

    /// Compute the registry id of an item.
    ItemId(ItemIdArgs),

    /// Build a vote commitment.
    CommitHash(CommitHashArgs),

    /// Run a scripted dispute over the in-memory ledger.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    let result = match &cli.command {
        Commands::Config(args) => run_config(args),
        Commands::ItemId(args) => run_item_id(args),
        Commands::CommitHash(args) => run_commit_hash(args),
        Commands::Simulate(args) => run_simulate(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_config_validate() {
        let cli = Cli::try_parse_from(["tcr", "config", "validate", "tcr.yaml"]).unwrap();
        match cli.command {
            Commands::Config(ConfigArgs {
                command: tcr_cli::config::ConfigCommand::Validate { path },
            }) => assert_eq!(path, PathBuf::from("tcr.yaml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_item_id_with_sequence() {
        let cli = Cli::try_parse_from(["tcr", "item-id", "abc", "--sequence", "4"]).unwrap();
        if let Commands::ItemId(args) = cli.command {
            assert_eq!(args.data, "abc");
            assert_eq!(args.sequence, Some(4));
            assert!(!args.hex);
        } else {
            panic!("expected item-id");
        }
    }

    #[test]
    fn parse_commit_hash() {
        let cli = Cli::try_parse_from(["tcr", "-vv", "commit-hash", "--choice", "2"]).unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::CommitHash(args) = cli.command {
            assert_eq!(args.choice, 2);
            assert_eq!(args.reason, "");
            assert!(args.salt.is_none());
        } else {
            panic!("expected commit-hash");
        }
    }

    #[test]
    fn parse_simulate_without_file() {
        let cli = Cli::try_parse_from(["tcr", "simulate", "--summary", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Simulate(SimulateArgs { path: None, summary: true })));
    }

    #[test]
    fn commit_hash_requires_choice() {
        assert!(Cli::try_parse_from(["tcr", "commit-hash"]).is_err());
    }
}
