//! # tcr-token — In-Memory Asset Ledger
//!
//! A fungible asset ledger with historical balance snapshots, implementing
//! [`tcr_core::AssetLedger`]. The registry escrows deposits on it, the
//! arbitrator escrows arbitration costs on it, and voters' snapshot voting
//! power is read from its checkpoints.

pub mod checkpoints;
pub mod ledger;

pub use checkpoints::Checkpoints;
pub use ledger::InMemoryToken;
