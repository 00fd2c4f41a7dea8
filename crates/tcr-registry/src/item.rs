//! # Items, Requests and Read Models
//!
//! An [`Item`] is never deleted; it only moves between statuses. Each
//! status change attempt appends a [`Request`], and only the last request
//! of an item is ever mutated. Once `resolved` it is history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tcr_core::{
    Address, Amount, Arbitrator, ContributionRound, DisputeId, ItemId, Party, Sides, Timestamp,
};

/// Registration status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Not in the registry, no pending request.
    #[default]
    Absent,
    /// In the registry, no pending request.
    Registered,
    /// Not in the registry, a registration request is pending.
    RegistrationRequested,
    /// In the registry, a removal request is pending.
    ClearingRequested,
}

impl ItemStatus {
    /// Whether a request is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::RegistrationRequested | Self::ClearingRequested)
    }

    /// Uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "ABSENT",
            Self::Registered => "REGISTERED",
            Self::RegistrationRequested => "REGISTRATION_REQUESTED",
            Self::ClearingRequested => "CLEARING_REQUESTED",
        }
    }

    /// Status after a pending request resolves in favour of `winner`.
    /// `None` and `Challenger` both restore the prior stable status.
    pub fn resolved(&self, winner: Party) -> Self {
        match (self, winner) {
            (Self::RegistrationRequested, Party::Requester) => Self::Registered,
            (Self::RegistrationRequested, _) => Self::Absent,
            (Self::ClearingRequested, Party::Requester) => Self::Absent,
            (Self::ClearingRequested, _) => Self::Registered,
            (stable, _) => *stable,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Add the item.
    Registration,
    /// Remove the item.
    Clearing,
}

/// Arbitrator captured by a request when it was created.
#[derive(Clone)]
pub struct ArbitratorRef(pub Arc<dyn Arbitrator>);

impl ArbitratorRef {
    /// Address of the captured arbitrator.
    pub fn address(&self) -> Address {
        self.0.address()
    }
}

impl std::ops::Deref for ArbitratorRef {
    type Target = dyn Arbitrator;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for ArbitratorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArbitratorRef({})", self.address())
    }
}

/// One attempt to change an item's status.
#[derive(Debug, Clone)]
pub struct Request {
    /// Registration or clearing.
    pub kind: RequestKind,
    /// Whether the request was challenged.
    pub disputed: bool,
    /// Dispute raised by the challenge.
    pub dispute_id: Option<DisputeId>,
    /// When the request was made.
    pub submission_time: Timestamp,
    /// Whether the request is final.
    pub resolved: bool,
    /// Requester and challenger.
    pub parties: Sides<Option<Address>>,
    /// Funding rounds: the deposits, then one per appeal. While disputed,
    /// the last round is the one collecting the next appeal.
    pub rounds: Vec<ContributionRound>,
    /// Arbitrator in charge, fixed at creation.
    pub arbitrator: ArbitratorRef,
    /// Extra data for the arbitrator, fixed at creation.
    pub arbitrator_extra_data: Vec<u8>,
    /// Meta-evidence in force at creation.
    pub meta_evidence_id: u64,
    /// Final ruling, after any inversion.
    pub ruling: Party,
}

/// A registry entry.
#[derive(Debug, Clone)]
pub struct Item {
    /// Content- or sequence-derived id.
    pub id: ItemId,
    /// Listed data.
    pub data: Vec<u8>,
    /// Current status.
    pub status: ItemStatus,
    /// All requests, oldest first.
    pub requests: Vec<Request>,
}

impl Item {
    /// Index of the latest request.
    pub fn last_request_index(&self) -> Option<usize> {
        self.requests.len().checked_sub(1)
    }
}

/// Read model of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Identifier derived from `data` under the configured id scheme.
    pub id: ItemId,
    /// The submitted payload.
    pub data: Vec<u8>,
    /// Current registration status.
    pub status: ItemStatus,
    /// Requests made so far, including the pending one.
    pub number_of_requests: usize,
}

/// Read model of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Registration or removal.
    pub kind: RequestKind,
    /// Whether the request was challenged.
    pub disputed: bool,
    /// Dispute raised by the challenge, if any.
    pub dispute_id: Option<DisputeId>,
    /// When the request was made; the challenge period runs from here.
    pub submission_time: Timestamp,
    /// Whether the request has been executed or ruled on.
    pub resolved: bool,
    /// Requester and challenger accounts.
    pub parties: Sides<Option<Address>>,
    /// Funding rounds opened, including the trailing empty one.
    pub number_of_rounds: usize,
    /// Final ruling once resolved.
    pub ruling: Party,
    /// Arbitrator snapshotted at request time.
    pub arbitrator: Address,
    /// Extra data passed to the arbitrator.
    pub arbitrator_extra_data: Vec<u8>,
    /// Meta-evidence in force when the request was made.
    pub meta_evidence_id: u64,
}

impl From<&Request> for RequestInfo {
    fn from(r: &Request) -> Self {
        Self {
            kind: r.kind,
            disputed: r.disputed,
            dispute_id: r.dispute_id,
            submission_time: r.submission_time,
            resolved: r.resolved,
            parties: r.parties,
            number_of_rounds: r.rounds.len(),
            ruling: r.ruling,
            arbitrator: r.arbitrator.address(),
            arbitrator_extra_data: r.arbitrator_extra_data.clone(),
            meta_evidence_id: r.meta_evidence_id,
        }
    }
}

/// Read model of a funding round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// Whether an appeal (or the dispute) was raised with this round's funds.
    pub appealed: bool,
    /// Total contributed per side.
    pub amount_paid: Sides<Amount>,
    /// Whether each side is fully funded.
    pub has_paid: Sides<bool>,
    /// Pool left for contributors after fees were spent.
    pub fee_rewards: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_edges() {
        use ItemStatus::*;
        assert_eq!(RegistrationRequested.resolved(Party::Requester), Registered);
        assert_eq!(RegistrationRequested.resolved(Party::Challenger), Absent);
        assert_eq!(RegistrationRequested.resolved(Party::None), Absent);
        assert_eq!(ClearingRequested.resolved(Party::Requester), Absent);
        assert_eq!(ClearingRequested.resolved(Party::Challenger), Registered);
        assert_eq!(ClearingRequested.resolved(Party::None), Registered);
        assert_eq!(Registered.resolved(Party::Requester), Registered);
    }

    #[test]
    fn pending_statuses() {
        assert!(ItemStatus::RegistrationRequested.is_pending());
        assert!(ItemStatus::ClearingRequested.is_pending());
        assert!(!ItemStatus::Absent.is_pending());
        assert!(!ItemStatus::Registered.is_pending());
    }
}
