//! `tcr commit-hash`: build a vote commitment for the arbitrator.
//!
//! Voters keep the printed salt and reason; both are needed to reveal.

use anyhow::{Context, Result};
use clap::Args;
use rand::RngCore;
use serde::Serialize;

use tcr_arbitration::commit_hash;
use tcr_core::{Digest32, RULING_OPTIONS};

/// Salt length when none is given.
pub const SALT_LEN: usize = 32;

/// Commit-hash arguments.
#[derive(Args, Debug)]
pub struct CommitHashArgs {
    /// Choice to vote for (1 = requester, 2 = challenger).
    #[arg(long)]
    pub choice: u32,

    /// Free-text justification, revealed with the vote.
    #[arg(long, default_value = "")]
    pub reason: String,

    /// Hex salt. A random one is generated when omitted.
    #[arg(long)]
    pub salt: Option<String>,
}

/// A commitment and everything needed to reveal it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commitment {
    pub choice: u32,
    pub reason: String,
    pub salt: String,
    pub commit_hash: Digest32,
}

/// Build the commitment described by `args`.
pub fn commitment(args: &CommitHashArgs) -> Result<Commitment> {
    anyhow::ensure!(
        (1..=RULING_OPTIONS).contains(&args.choice),
        "choice must be between 1 and {RULING_OPTIONS}, got {}",
        args.choice
    );
    let salt = match &args.salt {
        Some(text) => hex::decode(text.trim_start_matches("0x")).context("salt is not valid hex")?,
        None => {
            let mut salt = vec![0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);
            salt
        }
    };
    let hash = commit_hash(args.choice, &args.reason, &salt)?;
    Ok(Commitment {
        choice: args.choice,
        reason: args.reason.clone(),
        salt: hex::encode(&salt),
        commit_hash: hash,
    })
}

/// Execute the commit-hash subcommand.
pub fn run_commit_hash(args: &CommitHashArgs) -> Result<u8> {
    let commitment = commitment(args)?;
    println!("{}", serde_json::to_string_pretty(&commitment)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(choice: u32, salt: Option<&str>) -> CommitHashArgs {
        CommitHashArgs {
            choice,
            reason: "evidence is convincing".to_string(),
            salt: salt.map(str::to_string),
        }
    }

    #[test]
    fn given_salt_is_deterministic() {
        let a = commitment(&args(1, Some("0a0b"))).unwrap();
        let b = commitment(&args(1, Some("0x0a0b"))).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.commit_hash,
            commit_hash(1, "evidence is convincing", &[0x0a, 0x0b]).unwrap()
        );
    }

    #[test]
    fn random_salt_is_printed() {
        let c = commitment(&args(2, None)).unwrap();
        assert_eq!(c.salt.len(), SALT_LEN * 2);
        let salt = hex::decode(&c.salt).unwrap();
        assert_eq!(c.commit_hash, commit_hash(2, &c.reason, &salt).unwrap());
    }

    #[test]
    fn choice_out_of_range_rejected() {
        assert!(commitment(&args(0, Some("00"))).is_err());
        assert!(commitment(&args(3, Some("00"))).is_err());
    }
}
