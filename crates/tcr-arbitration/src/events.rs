//! Append-only arbitrator event log.

use serde::{Deserialize, Serialize};

use tcr_core::{Address, Amount, Digest32, DisputeId, Party, Timestamp};

/// Something observable that happened inside the arbitrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArbitratorEvent {
    /// A dispute was raised.
    DisputeCreated {
        dispute_id: DisputeId,
        arbitrable: Address,
        choices: u32,
        cost: Amount,
        at: Timestamp,
    },
    /// A voter committed.
    VoteCommitted {
        dispute_id: DisputeId,
        round: usize,
        voter: Address,
        commit_hash: Digest32,
    },
    /// A voter revealed.
    VoteRevealed {
        dispute_id: DisputeId,
        round: usize,
        voter: Address,
        choice: u32,
        votes: Amount,
        reason: String,
    },
    /// The current ruling was appealed and a new round opened.
    AppealDecision {
        dispute_id: DisputeId,
        new_round: usize,
        cost: Amount,
    },
    /// The ruling was delivered to the arbitrable.
    RulingExecuted { dispute_id: DisputeId, ruling: Party },
    /// A voter withdrew its share of a round's pool.
    RewardWithdrawn {
        dispute_id: DisputeId,
        round: usize,
        voter: Address,
        amount: Amount,
    },
    /// An owner setter changed a parameter.
    ParameterChanged { name: String, value: String },
    /// Ownership moved.
    OwnerChanged { previous: Address, owner: Address },
}
