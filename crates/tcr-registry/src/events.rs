//! Append-only registry event log.

use serde::{Deserialize, Serialize};

use tcr_core::{Address, Amount, DisputeId, EvidenceGroupId, ItemId, Party};

use crate::item::{ItemStatus, RequestKind};

/// Something observable that happened inside the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// An item was seen for the first time.
    ItemSubmitted {
        item_id: ItemId,
        submitter: Address,
        evidence_group: EvidenceGroupId,
        data: Vec<u8>,
    },
    /// A registration or removal request was made.
    RequestSubmitted {
        item_id: ItemId,
        request: usize,
        kind: RequestKind,
        requester: Address,
        evidence_group: EvidenceGroupId,
    },
    /// An item's status or its latest request changed.
    ItemStatusChange {
        item_id: ItemId,
        request: usize,
        round: usize,
        status: ItemStatus,
        disputed: bool,
        resolved: bool,
    },
    /// Evidence was submitted.
    Evidence {
        arbitrator: Address,
        evidence_group: EvidenceGroupId,
        party: Address,
        evidence: String,
    },
    /// A request was challenged.
    Dispute {
        arbitrator: Address,
        dispute_id: DisputeId,
        meta_evidence_id: u64,
        evidence_group: EvidenceGroupId,
    },
    /// Someone funded a side of an appeal.
    AppealContribution {
        item_id: ItemId,
        contributor: Address,
        request: usize,
        round: usize,
        side: Party,
        amount: Amount,
    },
    /// A side reached its full appeal stake.
    HasPaidAppealFee {
        item_id: ItemId,
        request: usize,
        round: usize,
        side: Party,
    },
    /// The arbitrator delivered a ruling (after any inversion).
    Ruling {
        arbitrator: Address,
        dispute_id: DisputeId,
        ruling: Party,
    },
    /// Fees or rewards were paid out.
    RewardWithdrawn {
        item_id: ItemId,
        request: usize,
        round: usize,
        beneficiary: Address,
        amount: Amount,
    },
    /// New meta-evidence was published.
    MetaEvidence { meta_evidence_id: u64, uri: String },
    /// A governor setter changed a parameter.
    ParameterChanged { name: String, value: String },
    /// The default arbitrator for new requests changed.
    ArbitratorChanged { arbitrator: Address, extra_data: Vec<u8> },
    /// Governance moved.
    GovernorChanged { previous: Address, governor: Address },
}
