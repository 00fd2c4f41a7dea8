//! # tcr-registry — Curated Registry
//!
//! Items enter and leave the registry through requests that anyone can
//! challenge. Challenges are settled by an external [`tcr_core::Arbitrator`];
//! both sides can crowdfund appeals.
//!
//! - **Items** (`item.rs`): items, requests, statuses and read models.
//!
//! - **Registry** (`registry.rs`): submission, removal, challenge, appeal
//!   funding, execution, rulings, withdrawals and evidence. Implements
//!   [`tcr_core::Arbitrable`].
//!
//! - **Governance** (`governance.rs`): governor-gated setters.
//!
//! - **Journal** (`journal.rs`): compensation of ledger effects when a
//!   call fails part-way.
//!
//! ## Crate Policy
//!
//! - Depends on `tcr-core` only; the arbitrator and the ledger are traits.
//! - Deposits never leave the registry except through the reward formula
//!   in [`tcr_core::stake`].

pub mod config;
pub mod error;
pub mod events;
pub mod governance;
pub mod item;
mod journal;
pub mod registry;

pub use config::{ItemIdScheme, RegistryParams};
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use item::{Item, ItemInfo, ItemStatus, Request, RequestInfo, RequestKind, RoundInfo};
pub use registry::GeneralizedTcr;
