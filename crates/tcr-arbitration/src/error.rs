//! # Arbitrator Errors
//!
//! Every rejection aborts the whole call: no round, receipt or balance is
//! changed when an `Err` is returned.

use thiserror::Error;

use tcr_core::{Address, CallError, CoreError, DisputeId, LedgerError};

use crate::dispute::RoundState;

/// Errors raised by [`CommitRevealArbitrator`](crate::CommitRevealArbitrator).
#[derive(Error, Debug)]
pub enum ArbitratorError {
    // ── Authorization ──────────────────────────────────────────────────
    /// The caller is not the arbitrable this arbitrator serves.
    #[error("caller {caller} is not the arbitrable")]
    NotArbitrable {
        /// The rejected caller.
        caller: Address,
    },

    /// The caller is not the owner.
    #[error("caller {caller} is not the owner")]
    NotOwner {
        /// The rejected caller.
        caller: Address,
    },

    // ── Wiring ─────────────────────────────────────────────────────────
    /// The arbitrable back-reference was already connected.
    #[error("arbitrable already connected")]
    ArbitrableAlreadyConnected,

    /// The connected arbitrable does not live at the configured address.
    #[error("arbitrable address mismatch: expected {expected}, got {actual}")]
    ArbitrableMismatch {
        /// The configured arbitrable address.
        expected: Address,
        /// The address of the object passed in.
        actual: Address,
    },

    /// The arbitrable was never connected or has been dropped.
    #[error("arbitrable is not connected")]
    ArbitrableUnavailable,

    // ── Preconditions ──────────────────────────────────────────────────
    /// Only two-choice disputes are supported.
    #[error("unsupported number of choices: {choices}")]
    UnsupportedChoices {
        /// The requested number of choices.
        choices: u32,
    },

    /// No dispute with this id.
    #[error("unknown {dispute_id}")]
    UnknownDispute {
        /// The requested dispute.
        dispute_id: DisputeId,
    },

    /// No voting round with this index.
    #[error("{dispute_id} has no round {round}")]
    UnknownRound {
        /// The dispute.
        dispute_id: DisputeId,
        /// The requested round index.
        round: usize,
    },

    /// The round is not in the phase the operation requires.
    #[error("{dispute_id} round {round} is {actual}, expected {expected}")]
    WrongPhase {
        /// The dispute.
        dispute_id: DisputeId,
        /// The round index.
        round: usize,
        /// The phase the operation needs.
        expected: &'static str,
        /// The phase the round is in.
        actual: RoundState,
    },

    /// The voter had no voting power at the round's snapshot.
    #[error("{voter} has no voting power at the round snapshot")]
    NoVotingPower {
        /// The voter.
        voter: Address,
    },

    /// Reveal without a prior commitment.
    #[error("{voter} has not committed a vote")]
    NotCommitted {
        /// The voter.
        voter: Address,
    },

    /// The revealed `(choice, reason, salt)` does not hash to the commitment.
    #[error("reveal by {voter} does not match the committed hash")]
    HashMismatch {
        /// The voter.
        voter: Address,
    },

    /// The revealed choice is outside `1..=choices`.
    #[error("invalid choice {choice}: dispute offers {choices} choices")]
    InvalidChoice {
        /// The revealed choice.
        choice: u32,
        /// The number of choices.
        choices: u32,
    },

    /// Reward claim by a voter who never revealed.
    #[error("{voter} did not reveal a vote")]
    NotRevealed {
        /// The voter.
        voter: Address,
    },

    /// Reward claim by a voter on the losing choice.
    #[error("{voter} voted {choice}, round ruled {ruling}")]
    LosingSide {
        /// The voter.
        voter: Address,
        /// The voter's choice.
        choice: u32,
        /// The round's winning choice.
        ruling: u32,
    },

    /// Nobody holds a share of the pool.
    #[error("{dispute_id} round {round} has no winning votes")]
    NoWinningVotes {
        /// The dispute.
        dispute_id: DisputeId,
        /// The round index.
        round: usize,
    },

    /// A parameter is outside its allowed bounds.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// What bound was violated.
        reason: String,
    },

    // ── Double actions ─────────────────────────────────────────────────
    /// The voter already committed in this round.
    #[error("{voter} already committed in this round")]
    AlreadyCommitted {
        /// The voter.
        voter: Address,
    },

    /// The voter already revealed in this round.
    #[error("{voter} already revealed in this round")]
    AlreadyRevealed {
        /// The voter.
        voter: Address,
    },

    /// The ruling was already delivered.
    #[error("{dispute_id} was already executed")]
    AlreadyExecuted {
        /// The dispute.
        dispute_id: DisputeId,
    },

    /// The voter already withdrew its reward for this round.
    #[error("{voter} already claimed the reward of round {round}")]
    AlreadyClaimed {
        /// The voter.
        voter: Address,
        /// The round index.
        round: usize,
    },

    // ── Escalation limit ───────────────────────────────────────────────
    /// No further appeals are possible for this dispute.
    #[error("{dispute_id} reached the maximum of {max} appeal rounds")]
    AppealLimitReached {
        /// The dispute.
        dispute_id: DisputeId,
        /// The configured maximum.
        max: u32,
    },

    // ── Internal ───────────────────────────────────────────────────────
    /// Stored data contradicts a structural invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    // ── Collaborators ──────────────────────────────────────────────────
    /// The asset ledger rejected a transfer.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// The arbitrable rejected the ruling callback.
    #[error("arbitrable: {0}")]
    Arbitrable(CallError),

    /// A core primitive failed (reentrancy, canonicalization).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ArbitratorError {
    /// Wrap as a [`CallError`] for callers that see the arbitrator through
    /// the [`Arbitrator`](tcr_core::Arbitrator) trait.
    pub fn into_call_error(self, operation: &'static str) -> CallError {
        CallError::new("arbitrator", operation, self)
    }
}
