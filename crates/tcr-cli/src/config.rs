//! # Stack configuration
//!
//! `tcr config validate <file>` loads a YAML file holding registry and
//! arbitrator parameters, applies `TCR_*` environment overrides and checks
//! every bound.
//!
//! ```yaml
//! registry:
//!   challenge_period_secs: 259200
//!   submission_base_deposit: 1000
//! arbitrator:
//!   voting_period_secs: 259200
//!   quorum_bps: 1000
//! ```
//!
//! Omitted fields take their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use tcr_arbitration::ArbitratorParams;
use tcr_registry::RegistryParams;

/// Environment variables that override period fields.
pub const ENV_OVERRIDES: [&str; 5] = [
    "TCR_CHALLENGE_PERIOD_SECS",
    "TCR_VOTING_DELAY_SECS",
    "TCR_VOTING_PERIOD_SECS",
    "TCR_REVEAL_PERIOD_SECS",
    "TCR_APPEAL_PERIOD_SECS",
];

/// Registry and arbitrator parameters of one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcrConfig {
    pub registry: RegistryParams,
    pub arbitrator: ArbitratorParams,
}

impl TcrConfig {
    /// Parse YAML without overrides or validation.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid configuration YAML")
    }

    /// Load, override from the process environment, and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config = Self::from_yaml(&text)?;
        config.apply_overrides(std::env::vars())?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply `TCR_*` overrides from `vars`. Unrelated variables are ignored.
    pub fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            if !ENV_OVERRIDES.contains(&key.as_str()) {
                continue;
            }
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a number of seconds, got {value:?}"))?;
            match key.as_str() {
                "TCR_CHALLENGE_PERIOD_SECS" => self.registry.challenge_period_secs = secs,
                "TCR_VOTING_DELAY_SECS" => self.arbitrator.voting_delay_secs = secs,
                "TCR_VOTING_PERIOD_SECS" => self.arbitrator.voting_period_secs = secs,
                "TCR_REVEAL_PERIOD_SECS" => self.arbitrator.reveal_period_secs = secs,
                "TCR_APPEAL_PERIOD_SECS" => self.arbitrator.appeal_period_secs = secs,
                _ => continue,
            }
            tracing::info!(variable = %key, secs, "configuration override applied");
        }
        Ok(())
    }

    /// Check both parameter sets.
    pub fn validate(&self) -> Result<()> {
        self.registry.validate().context("registry parameters")?;
        self.arbitrator.validate().context("arbitrator parameters")?;
        Ok(())
    }
}

/// Configuration subcommand arguments.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Available configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file and print the effective values.
    Validate {
        /// Path to the YAML configuration.
        path: PathBuf,
    },
    /// Print the default configuration as YAML.
    Defaults,
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs) -> Result<u8> {
    match &args.command {
        ConfigCommand::Validate { path } => {
            let config = TcrConfig::load(path)?;
            println!("OK: {}", path.display());
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(0)
        }
        ConfigCommand::Defaults => {
            print!("{}", serde_yaml::to_string(&TcrConfig::default())?);
            Ok(0)
        }
    }
}
