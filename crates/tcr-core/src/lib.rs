//! # tcr-core — Foundational Types for the Curated Registry Stack
//!
//! This crate is the leaf of the workspace DAG. The registry
//! (`tcr-registry`) and the commit-reveal arbitrator (`tcr-arbitration`)
//! both depend on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Address`, `ItemId`,
//!    `DisputeId` and `EvidenceGroupId` are distinct types. An item id can
//!    never be passed where a dispute id is expected.
//!
//! 2. **Capped arithmetic for every fee computation.** Amounts are `u128`
//!    and all deposit, stake and reward math goes through [`CappedMath`],
//!    which saturates instead of wrapping or panicking.
//!
//! 3. **One reward formula.** [`stake::compute_reward`] and
//!    [`stake::proportional_share`] are the only place where pooled funds
//!    are split. The registry's fee withdrawal and the arbitrator's voter
//!    rewards both call into them.
//!
//! 4. **Canonical digests.** Item ids, evidence groups and vote commitments
//!    are SHA-256 digests over `CanonicalBytes` (JCS), so every party
//!    derives the same bytes for the same logical value.
//!
//! 5. **Collaborators are traits.** The arbitrator, the arbitrable registry,
//!    the fungible asset ledger and the registration hooks are object-safe
//!    traits in [`interfaces`]. Wiring happens with `Arc<dyn _>`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tcr-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![deny(missing_docs)]

pub mod canonical;
pub mod capped;
pub mod digest;
pub mod error;
pub mod guard;
pub mod identity;
pub mod interfaces;
pub mod party;
pub mod stake;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use capped::{Amount, CappedMath, MULTIPLIER_DIVISOR};
pub use digest::{sha256_digest, Digest32};
pub use error::{CallError, CanonicalizationError, CoreError, LedgerError};
pub use guard::{Entered, ReentrancyGuard};
pub use identity::{Address, DisputeId, EvidenceGroupId, ItemId};
pub use interfaces::{
    AppealPeriod, Arbitrable, Arbitrator, AssetLedger, DisputeStatus, ItemDataVerifier,
    NoopHooks, RegistryHooks,
};
pub use party::{Party, Sides, RULING_OPTIONS};
pub use stake::{compute_reward, proportional_share, ContributionRound};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
