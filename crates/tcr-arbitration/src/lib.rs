//! # tcr-arbitration — Commit-Reveal Arbitrator
//!
//! Resolves registry disputes by token-weighted voting:
//!
//! - **Disputes** (`dispute.rs`): disputes, voting rounds, receipts and
//!   the time-derived round phase.
//!
//! - **Commitments** (`commit.rs`): the canonical commitment over
//!   `(choice, reason, salt)`.
//!
//! - **Arbitrator** (`arbitrator.rs`): dispute creation, commit, reveal,
//!   appeal escalation, ruling execution and voter rewards. Implements
//!   [`tcr_core::Arbitrator`].
//!
//! - **Governance** (`governance.rs`): owner-gated parameter setters.
//!
//! ## Crate Policy
//!
//! - Depends on `tcr-core` only.
//! - Voting power is always read at the round snapshot, never at the
//!   current balance.

pub mod arbitrator;
pub mod commit;
pub mod config;
pub mod dispute;
pub mod error;
pub mod events;
pub mod governance;

pub use arbitrator::{CommitRevealArbitrator, DisputeInfo, VotingRoundInfo};
pub use commit::commit_hash;
pub use config::ArbitratorParams;
pub use dispute::{Dispute, Receipt, RoundState, VotingRound};
pub use error::ArbitratorError;
pub use events::ArbitratorEvent;
