//! # Registry Errors
//!
//! Every error aborts the whole call: the item is not touched and any
//! ledger effect already performed is compensated before the error is
//! returned.

use thiserror::Error;

use tcr_core::{Address, Amount, CallError, CoreError, DisputeId, ItemId, LedgerError, Party};

use crate::item::ItemStatus;

/// Errors raised by [`GeneralizedTcr`](crate::GeneralizedTcr).
#[derive(Error, Debug)]
pub enum RegistryError {
    // ── Authorization ──────────────────────────────────────────────────
    /// The caller is not the governor.
    #[error("caller {caller} is not the governor")]
    NotGovernor {
        /// The rejected caller.
        caller: Address,
    },

    /// The caller is not the arbitrator of the dispute.
    #[error("caller {caller} is not the arbitrator of {dispute_id}")]
    NotArbitrator {
        /// The rejected caller.
        caller: Address,
        /// The dispute it tried to rule on.
        dispute_id: DisputeId,
    },

    // ── Preconditions ──────────────────────────────────────────────────
    /// No item with this id.
    #[error("unknown {item_id}")]
    UnknownItem {
        /// The requested item.
        item_id: ItemId,
    },

    /// No request with this index.
    #[error("{item_id} has no request {request}")]
    UnknownRequest {
        /// The item.
        item_id: ItemId,
        /// The requested index.
        request: usize,
    },

    /// No round with this index.
    #[error("{item_id} request {request} has no round {round}")]
    UnknownRound {
        /// The item.
        item_id: ItemId,
        /// The request index.
        request: usize,
        /// The requested round index.
        round: usize,
    },

    /// No item is linked to this dispute.
    #[error("no item for {dispute_id} of arbitrator {arbitrator}")]
    UnknownDispute {
        /// The arbitrator.
        arbitrator: Address,
        /// The dispute.
        dispute_id: DisputeId,
    },

    /// The item is not in the status the operation requires.
    #[error("{item_id} is {actual}, expected {expected}")]
    WrongStatus {
        /// The item.
        item_id: ItemId,
        /// The status the operation needs.
        expected: &'static str,
        /// The current status.
        actual: ItemStatus,
    },

    /// Item data must not be empty.
    #[error("item data is empty")]
    EmptyItemData,

    /// The item data verifier refused the submission.
    #[error("item data rejected for submitter {submitter}")]
    InvalidItemData {
        /// The submitter.
        submitter: Address,
    },

    /// The challenge period is over.
    #[error("challenge period of {item_id} is over")]
    ChallengePeriodOver {
        /// The item.
        item_id: ItemId,
    },

    /// The challenge period has not elapsed yet.
    #[error("challenge period of {item_id} is still running")]
    ChallengePeriodOpen {
        /// The item.
        item_id: ItemId,
    },

    /// The request was already challenged.
    #[error("request on {item_id} is already disputed")]
    AlreadyDisputed {
        /// The item.
        item_id: ItemId,
    },

    /// The request was never challenged.
    #[error("request on {item_id} is not disputed")]
    NotDisputed {
        /// The item.
        item_id: ItemId,
    },

    /// The request is already final.
    #[error("request on {item_id} is already resolved")]
    RequestResolved {
        /// The item.
        item_id: ItemId,
    },

    /// Fees can only be withdrawn from resolved requests.
    #[error("request {request} on {item_id} is not resolved")]
    RequestNotResolved {
        /// The item.
        item_id: ItemId,
        /// The request index.
        request: usize,
    },

    /// Only Requester and Challenger can be funded.
    #[error("invalid side {side}")]
    InvalidSide {
        /// The rejected side.
        side: Party,
    },

    /// Rulings are `0..=2`.
    #[error("invalid ruling {ruling}")]
    InvalidRuling {
        /// The rejected ruling.
        ruling: u32,
    },

    /// The arbitrator does not accept appeals right now.
    #[error("{item_id} is not appealable now")]
    NotAppealable {
        /// The item.
        item_id: ItemId,
    },

    /// The losing side may only fund during the first half of the window.
    #[error("loser funding window for {item_id} is over")]
    LoserDeadlinePassed {
        /// The item.
        item_id: ItemId,
    },

    /// The side already raised its full stake for this round.
    #[error("{side} already paid its appeal stake on {item_id}")]
    SideAlreadyFunded {
        /// The item.
        item_id: ItemId,
        /// The funded side.
        side: Party,
    },

    /// Contributions must be non-zero.
    #[error("contribution is zero")]
    ZeroContribution,

    /// A required address is zero.
    #[error("zero address not allowed as {role}")]
    ZeroAddress {
        /// What the address was for.
        role: &'static str,
    },

    /// A parameter is outside its allowed bounds.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// What bound was violated.
        reason: String,
    },

    // ── Funding ────────────────────────────────────────────────────────
    /// The caller could not provide the full required amount.
    #[error("insufficient funding from {account}: required {required}: {reason}")]
    InsufficientFunding {
        /// The paying account.
        account: Address,
        /// The amount required.
        required: Amount,
        /// The ledger's rejection.
        reason: LedgerError,
    },

    // ── Internal ───────────────────────────────────────────────────────
    /// Stored data contradicts a structural invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    // ── Collaborators ──────────────────────────────────────────────────
    /// The asset ledger rejected a transfer.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// The arbitrator rejected a call.
    #[error("arbitrator: {0}")]
    Arbitrator(CallError),

    /// A registration hook failed.
    #[error("hook: {0}")]
    Hook(CallError),

    /// A core primitive failed (reentrancy, canonicalization).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RegistryError {
    /// Wrap as a [`CallError`] for callers that see the registry through
    /// the [`Arbitrable`](tcr_core::Arbitrable) trait.
    pub fn into_call_error(self, operation: &'static str) -> CallError {
        CallError::new("registry", operation, self)
    }
}
