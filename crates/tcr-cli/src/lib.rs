//! # tcr-cli — Command Line for the Curated Registry Stack
//!
//! ## Subcommands
//!
//! - `tcr config validate <file>` / `tcr config defaults` — parameter files.
//! - `tcr item-id <data> [--sequence N] [--hex]` — registry item ids.
//! - `tcr commit-hash --choice N [--reason R] [--salt HEX]` — vote
//!   commitments for the commit-reveal arbitrator.
//! - `tcr simulate [scenario.yaml]` — one full dispute over the in-memory
//!   ledger, reported as JSON.
//!
//! ```bash
//! tcr config validate deploy/tcr.yaml
//! tcr commit-hash --choice 1 --reason "listing is accurate"
//! TCR_VOTING_PERIOD_SECS=60 tcr simulate scenario.yaml --summary
//! ```

pub mod commit;
pub mod config;
pub mod item;
pub mod simulate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_modules_are_accessible() {
        let _ = std::any::type_name::<commit::CommitHashArgs>();
        let _ = std::any::type_name::<config::ConfigArgs>();
        let _ = std::any::type_name::<item::ItemIdArgs>();
        let _ = std::any::type_name::<simulate::SimulateArgs>();
    }
}
