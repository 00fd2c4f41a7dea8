//! # Generalized Curated Registry
//!
//! Anyone can request that an item be registered or removed. A request is
//! accepted when nobody challenges it within the challenge period. A
//! challenge raises a dispute with the arbitrator; the request then waits
//! for the ruling, possibly across several crowdfunded appeals.
//!
//! ## Item lifecycle
//!
//! ```text
//! Absent ──submit──▶ RegistrationRequested ──accepted──▶ Registered
//!   ▲                        │ rejected                     │
//!   └────────────────────────┘                            remove
//!   ▲                                                       ▼
//!   └───────accepted─────── ClearingRequested ◀─────────────┘
//!                                │ rejected ──▶ Registered
//! ```
//!
//! ## Call structure
//!
//! Every mutator enters the reentrancy guard, reads what it needs under
//! the state lock, and releases the lock before touching any collaborator.
//! Ledger effects go through an [`EffectJournal`], arbitrator calls come
//! last among the effects, then registration hooks run. The staged item
//! is written back and the journal committed only once everything has
//! succeeded. Any error drops the journal, which undoes the ledger
//! effects, and leaves the stored item untouched.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use tcr_core::capped::apply_bps;
use tcr_core::{
    Address, Amount, Arbitrable, Arbitrator, AssetLedger, CallError, CappedMath, Clock,
    ContributionRound, CoreError, DisputeId, EvidenceGroupId, ItemDataVerifier, ItemId,
    NoopHooks, Party, RegistryHooks, ReentrancyGuard, Sides, Timestamp, RULING_OPTIONS,
};

use crate::config::RegistryParams;
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::item::{
    ArbitratorRef, Item, ItemInfo, ItemStatus, Request, RequestInfo, RequestKind, RoundInfo,
};
use crate::journal::EffectJournal;

/// Mutable registry state.
#[derive(Debug)]
pub(crate) struct RegistryState {
    pub(crate) governor: Address,
    pub(crate) arbitrator: ArbitratorRef,
    pub(crate) params: RegistryParams,
    pub(crate) meta_evidence_updates: u64,
    pub(crate) items: HashMap<ItemId, Item>,
    pub(crate) item_list: Vec<ItemId>,
    pub(crate) dispute_to_item: HashMap<(Address, DisputeId), ItemId>,
    pub(crate) events: Vec<RegistryEvent>,
}

impl RegistryState {
    fn item(&self, item_id: &ItemId) -> Result<&Item, RegistryError> {
        self.items
            .get(item_id)
            .ok_or(RegistryError::UnknownItem { item_id: *item_id })
    }

    pub(crate) fn require_governor(&self, caller: Address) -> Result<(), RegistryError> {
        if caller != self.governor {
            return Err(RegistryError::NotGovernor { caller });
        }
        Ok(())
    }

    /// Meta-evidence id in force for a new request of `kind`.
    fn meta_evidence_id(&self, kind: RequestKind) -> u64 {
        let base = self.meta_evidence_updates.saturating_mul(2);
        match kind {
            RequestKind::Registration => base,
            RequestKind::Clearing => base.saturating_add(1),
        }
    }
}

/// Changes a mutator writes back once all its effects succeeded.
struct Staged {
    item: Item,
    new_item: bool,
    dispute: Option<(Address, DisputeId)>,
    events: Vec<RegistryEvent>,
}

impl Staged {
    fn new(item: Item) -> Self {
        Self {
            item,
            new_item: false,
            dispute: None,
            events: Vec::new(),
        }
    }
}

/// An arbitrable registry of items.
pub struct GeneralizedTcr {
    address: Address,
    ledger: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
    hooks: Arc<dyn RegistryHooks>,
    verifier: Option<Arc<dyn ItemDataVerifier>>,
    guard: ReentrancyGuard,
    pub(crate) state: Mutex<RegistryState>,
}

impl std::fmt::Debug for GeneralizedTcr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralizedTcr")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl GeneralizedTcr {
    /// Create a registry holding deposits at `address`.
    pub fn new(
        address: Address,
        governor: Address,
        arbitrator: Arc<dyn Arbitrator>,
        ledger: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
        params: RegistryParams,
    ) -> Result<Self, RegistryError> {
        if address.is_zero() {
            return Err(RegistryError::ZeroAddress { role: "registry" });
        }
        if governor.is_zero() {
            return Err(RegistryError::ZeroAddress { role: "governor" });
        }
        params.validate()?;
        let events = vec![
            RegistryEvent::MetaEvidence {
                meta_evidence_id: 0,
                uri: params.registration_meta_evidence.clone(),
            },
            RegistryEvent::MetaEvidence {
                meta_evidence_id: 1,
                uri: params.clearing_meta_evidence.clone(),
            },
        ];
        tracing::info!(%address, %governor, arbitrator = %arbitrator.address(), "registry created");
        Ok(Self {
            address,
            ledger,
            clock,
            hooks: Arc::new(NoopHooks),
            verifier: None,
            guard: ReentrancyGuard::new("registry"),
            state: Mutex::new(RegistryState {
                governor,
                arbitrator: ArbitratorRef(arbitrator),
                params,
                meta_evidence_updates: 0,
                items: HashMap::new(),
                item_list: Vec::new(),
                dispute_to_item: HashMap::new(),
                events,
            }),
        })
    }

    /// Notify `hooks` whenever an item enters or leaves the registry.
    pub fn with_hooks(mut self, hooks: Arc<dyn RegistryHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Reject submissions that `verifier` refuses.
    pub fn with_verifier(mut self, verifier: Arc<dyn ItemDataVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub(crate) fn enter(&self) -> Result<tcr_core::Entered<'_>, RegistryError> {
        Ok(self.guard.enter()?)
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn journal(&self) -> EffectJournal<'_> {
        EffectJournal::new(self.ledger.as_ref(), self.address)
    }

    fn apply(&self, staged: Staged) {
        let mut state = self.state.lock();
        let id = staged.item.id;
        if staged.new_item {
            state.item_list.push(id);
        }
        if let Some(key) = staged.dispute {
            state.dispute_to_item.insert(key, id);
        }
        state.items.insert(id, staged.item);
        state.events.extend(staged.events);
    }

    // ── Requests ───────────────────────────────────────────────────────

    /// Request registration of `data`. The caller pays the arbitration
    /// cost plus the submission deposit.
    pub fn submit_item(&self, caller: Address, data: &[u8]) -> Result<ItemId, RegistryError> {
        let _entered = self.enter()?;
        if data.is_empty() {
            return Err(RegistryError::EmptyItemData);
        }
        if let Some(verifier) = &self.verifier {
            if !verifier.verify(&caller, data) {
                return Err(RegistryError::InvalidItemData { submitter: caller });
            }
        }
        let (item, new_item) = {
            let state = self.state.lock();
            let id = state
                .params
                .item_id_scheme
                .derive(data, state.item_list.len())
                .map_err(CoreError::from)?;
            match state.items.get(&id) {
                Some(existing) => (existing.clone(), false),
                None => (
                    Item {
                        id,
                        data: data.to_vec(),
                        status: ItemStatus::Absent,
                        requests: Vec::new(),
                    },
                    true,
                ),
            }
        };
        let item_id = item.id;
        self.open_request(caller, item, new_item, RequestKind::Registration, None)?;
        Ok(item_id)
    }

    /// Request removal of a registered item. Returns the request index.
    pub fn remove_item(
        &self,
        caller: Address,
        item_id: ItemId,
        evidence: Option<&str>,
    ) -> Result<usize, RegistryError> {
        let _entered = self.enter()?;
        let item = self.state.lock().item(&item_id)?.clone();
        self.open_request(caller, item, false, RequestKind::Clearing, evidence)
    }

    fn open_request(
        &self,
        caller: Address,
        mut item: Item,
        new_item: bool,
        kind: RequestKind,
        evidence: Option<&str>,
    ) -> Result<usize, RegistryError> {
        let expected = match kind {
            RequestKind::Registration => ItemStatus::Absent,
            RequestKind::Clearing => ItemStatus::Registered,
        };
        if item.status != expected {
            return Err(RegistryError::WrongStatus {
                item_id: item.id,
                expected: expected.as_str(),
                actual: item.status,
            });
        }
        let now = self.now();
        let (arbitrator, extra_data, base_deposit, meta_evidence_id) = {
            let state = self.state.lock();
            let base = match kind {
                RequestKind::Registration => state.params.submission_base_deposit,
                RequestKind::Clearing => state.params.removal_base_deposit,
            };
            (
                state.arbitrator.clone(),
                state.params.arbitrator_extra_data.clone(),
                base,
                state.meta_evidence_id(kind),
            )
        };
        let total = arbitrator
            .arbitration_cost(&extra_data)
            .add_cap(base_deposit);

        let mut journal = self.journal();
        journal
            .pull(caller, total)
            .map_err(|reason| RegistryError::InsufficientFunding {
                account: caller,
                required: total,
                reason,
            })?;

        let mut round = ContributionRound::new();
        round.record(caller, Party::Requester, total);
        round.settle_side(Party::Requester, total);
        let request_index = item.requests.len();
        let arbitrator_address = arbitrator.address();
        item.requests.push(Request {
            kind,
            disputed: false,
            dispute_id: None,
            submission_time: now,
            resolved: false,
            parties: Sides::new(None, Some(caller), None),
            rounds: vec![round],
            arbitrator,
            arbitrator_extra_data: extra_data,
            meta_evidence_id,
            ruling: Party::None,
        });
        item.status = match kind {
            RequestKind::Registration => ItemStatus::RegistrationRequested,
            RequestKind::Clearing => ItemStatus::ClearingRequested,
        };

        let evidence_group =
            EvidenceGroupId::for_request(&item.id, request_index).map_err(CoreError::from)?;
        let mut staged = Staged::new(item);
        staged.new_item = new_item;
        if new_item {
            staged.events.push(RegistryEvent::ItemSubmitted {
                item_id: staged.item.id,
                submitter: caller,
                evidence_group,
                data: staged.item.data.clone(),
            });
        }
        staged.events.push(RegistryEvent::RequestSubmitted {
            item_id: staged.item.id,
            request: request_index,
            kind,
            requester: caller,
            evidence_group,
        });
        staged.events.push(status_change(&staged.item));
        if let Some(evidence) = evidence {
            staged.events.push(RegistryEvent::Evidence {
                arbitrator: arbitrator_address,
                evidence_group,
                party: caller,
                evidence: evidence.to_string(),
            });
        }
        tracing::info!(
            item_id = %staged.item.id,
            request = request_index,
            ?kind,
            requester = %caller,
            deposit = total,
            "request submitted"
        );
        self.apply(staged);
        journal.commit();
        Ok(request_index)
    }

    /// Challenge the pending request on `item_id`, raising a dispute.
    pub fn challenge_request(
        &self,
        caller: Address,
        item_id: ItemId,
        evidence: Option<&str>,
    ) -> Result<DisputeId, RegistryError> {
        let _entered = self.enter()?;
        let now = self.now();
        let (mut item, base_deposit) = {
            let state = self.state.lock();
            let item = state.item(&item_id)?.clone();
            let base = match item.status {
                ItemStatus::RegistrationRequested => state.params.submission_challenge_base_deposit,
                ItemStatus::ClearingRequested => state.params.removal_challenge_base_deposit,
                actual => {
                    return Err(RegistryError::WrongStatus {
                        item_id,
                        expected: "a pending request",
                        actual,
                    })
                }
            };
            let request = last_request(&item)?;
            if request.disputed {
                return Err(RegistryError::AlreadyDisputed { item_id });
            }
            if now.secs_since(&request.submission_time) > state.params.challenge_period_secs {
                return Err(RegistryError::ChallengePeriodOver { item_id });
            }
            (item, base)
        };
        let request_index = item.requests.len() - 1;
        let request = last_request_mut(&mut item)?;
        let arbitrator = request.arbitrator.clone();
        let cost = arbitrator.arbitration_cost(&request.arbitrator_extra_data);
        let total = cost.add_cap(base_deposit);

        let mut journal = self.journal();
        journal
            .pull(caller, total)
            .map_err(|reason| RegistryError::InsufficientFunding {
                account: caller,
                required: total,
                reason,
            })?;
        journal.approve(arbitrator.address(), cost)?;
        let dispute_id = arbitrator
            .create_dispute(self.address, RULING_OPTIONS, &request.arbitrator_extra_data)
            .map_err(RegistryError::Arbitrator)?;

        request.parties[Party::Challenger] = Some(caller);
        let round = request
            .rounds
            .last_mut()
            .ok_or_else(|| RegistryError::InvariantViolation(format!("{item_id} request has no round")))?;
        round.record(caller, Party::Challenger, total);
        round.settle_side(Party::Challenger, total);
        round.consume_fee(cost);
        request.disputed = true;
        request.dispute_id = Some(dispute_id);
        request.rounds.push(ContributionRound::new());
        let meta_evidence_id = request.meta_evidence_id;

        let evidence_group =
            EvidenceGroupId::for_request(&item_id, request_index).map_err(CoreError::from)?;
        let mut staged = Staged::new(item);
        staged.dispute = Some((arbitrator.address(), dispute_id));
        staged.events.push(RegistryEvent::Dispute {
            arbitrator: arbitrator.address(),
            dispute_id,
            meta_evidence_id,
            evidence_group,
        });
        staged.events.push(status_change(&staged.item));
        if let Some(evidence) = evidence {
            staged.events.push(RegistryEvent::Evidence {
                arbitrator: arbitrator.address(),
                evidence_group,
                party: caller,
                evidence: evidence.to_string(),
            });
        }
        tracing::info!(%item_id, %dispute_id, challenger = %caller, deposit = total, "request challenged");
        self.apply(staged);
        journal.commit();
        Ok(dispute_id)
    }

    /// Contribute up to `offered` towards `side`'s appeal stake. Returns
    /// the amount actually taken. When both sides are funded the appeal is
    /// raised immediately.
    pub fn fund_appeal(
        &self,
        caller: Address,
        item_id: ItemId,
        side: Party,
        offered: Amount,
    ) -> Result<Amount, RegistryError> {
        let _entered = self.enter()?;
        if !side.is_side() {
            return Err(RegistryError::InvalidSide { side });
        }
        if offered == 0 {
            return Err(RegistryError::ZeroContribution);
        }
        let now = self.now();
        let (mut item, params) = {
            let state = self.state.lock();
            let item = state.item(&item_id)?.clone();
            (item, state.params.clone())
        };
        let request_index = item.requests.len().saturating_sub(1);
        let request = last_request_mut(&mut item)?;
        if request.resolved {
            return Err(RegistryError::RequestResolved { item_id });
        }
        let dispute_id = match (request.disputed, request.dispute_id) {
            (true, Some(id)) => id,
            _ => return Err(RegistryError::NotDisputed { item_id }),
        };
        let arbitrator = request.arbitrator.clone();
        let period = match arbitrator
            .appeal_period(dispute_id)
            .map_err(RegistryError::Arbitrator)?
        {
            Some(period) if period.contains(now) => period,
            _ => return Err(RegistryError::NotAppealable { item_id }),
        };
        let current = arbitrator
            .current_ruling(dispute_id)
            .map_err(RegistryError::Arbitrator)?;
        let multiplier = if current == Party::None {
            params.shared_stake_multiplier
        } else if current == side {
            params.winner_stake_multiplier
        } else {
            if now.secs_since(&period.start) >= period.duration_secs() / 2 {
                return Err(RegistryError::LoserDeadlinePassed { item_id });
            }
            params.loser_stake_multiplier
        };
        let appeal_cost = arbitrator
            .appeal_cost(dispute_id, &request.arbitrator_extra_data)
            .map_err(RegistryError::Arbitrator)?;
        let total_required = appeal_cost.add_cap(apply_bps(appeal_cost, multiplier));

        let round_index = request.rounds.len().saturating_sub(1);
        let round = request
            .rounds
            .last_mut()
            .ok_or_else(|| RegistryError::InvariantViolation(format!("{item_id} request has no round")))?;
        if round.has_paid[side] {
            return Err(RegistryError::SideAlreadyFunded { item_id, side });
        }
        // Zero when the stake is already covered; settling still marks the side paid.
        let contribution = round.contribution_for(side, offered, total_required);

        let mut journal = self.journal();
        let mut events = Vec::new();
        if contribution > 0 {
            journal
                .pull(caller, contribution)
                .map_err(|reason| RegistryError::InsufficientFunding {
                    account: caller,
                    required: contribution,
                    reason,
                })?;
            round.record(caller, side, contribution);
            events.push(RegistryEvent::AppealContribution {
                item_id,
                contributor: caller,
                request: request_index,
                round: round_index,
                side,
                amount: contribution,
            });
        }
        let side_paid = round.settle_side(side, total_required);
        if side_paid {
            events.push(RegistryEvent::HasPaidAppealFee {
                item_id,
                request: request_index,
                round: round_index,
                side,
            });
        }
        if round.both_paid() {
            journal.approve(arbitrator.address(), appeal_cost)?;
            arbitrator
                .appeal(self.address, dispute_id, &request.arbitrator_extra_data)
                .map_err(RegistryError::Arbitrator)?;
            round.consume_fee(appeal_cost);
            request.rounds.push(ContributionRound::new());
            events.push(status_change(&item));
            tracing::info!(%item_id, %dispute_id, round = round_index, appeal_cost, "appeal raised");
        }

        tracing::info!(%item_id, contributor = %caller, %side, contribution, "appeal contribution");
        let mut staged = Staged::new(item);
        staged.events = events;
        self.apply(staged);
        journal.commit();
        Ok(contribution)
    }

    /// Pay `beneficiary` its fees and rewards from one round of a resolved
    /// request. A second withdrawal from the same round pays nothing.
    pub fn withdraw_fees_and_rewards(
        &self,
        beneficiary: Address,
        item_id: ItemId,
        request_index: usize,
        round_index: usize,
    ) -> Result<Amount, RegistryError> {
        let _entered = self.enter()?;
        let mut item = self.state.lock().item(&item_id)?.clone();
        let request = item
            .requests
            .get_mut(request_index)
            .ok_or(RegistryError::UnknownRequest {
                item_id,
                request: request_index,
            })?;
        if !request.resolved {
            return Err(RegistryError::RequestNotResolved {
                item_id,
                request: request_index,
            });
        }
        let ruling = request.ruling;
        let round = request
            .rounds
            .get_mut(round_index)
            .ok_or(RegistryError::UnknownRound {
                item_id,
                request: request_index,
                round: round_index,
            })?;
        let had_record = round.contributions_of(&beneficiary).sides().any(|(_, paid)| *paid > 0);
        let amount = round.take_reward(&beneficiary, ruling);
        if amount == 0 {
            tracing::debug!(%item_id, request = request_index, round = round_index, %beneficiary, "nothing to withdraw");
            if had_record {
                self.apply(Staged::new(item));
            }
            return Ok(0);
        }

        let mut journal = self.journal();
        journal.pay(beneficiary, amount)?;
        let mut staged = Staged::new(item);
        staged.events.push(RegistryEvent::RewardWithdrawn {
            item_id,
            request: request_index,
            round: round_index,
            beneficiary,
            amount,
        });
        tracing::info!(%item_id, request = request_index, round = round_index, %beneficiary, amount, "fees and rewards withdrawn");
        self.apply(staged);
        journal.commit();
        Ok(amount)
    }

    /// Accept an unchallenged request once its challenge period is over,
    /// and refund the requester's deposit. Returns the new status.
    pub fn execute_request(&self, item_id: ItemId) -> Result<ItemStatus, RegistryError> {
        let _entered = self.enter()?;
        let now = self.now();
        let (mut item, challenge_period) = {
            let state = self.state.lock();
            (state.item(&item_id)?.clone(), state.params.challenge_period_secs)
        };
        if !item.status.is_pending() {
            return Err(RegistryError::WrongStatus {
                item_id,
                expected: "a pending request",
                actual: item.status,
            });
        }
        let previous = item.status;
        let request_index = item.requests.len().saturating_sub(1);
        let request = last_request_mut(&mut item)?;
        if now.secs_since(&request.submission_time) <= challenge_period {
            return Err(RegistryError::ChallengePeriodOpen { item_id });
        }
        if request.disputed {
            return Err(RegistryError::AlreadyDisputed { item_id });
        }
        request.resolved = true;
        let ruling = request.ruling;
        let requester = request.parties[Party::Requester];
        let refund = match (requester, request.rounds.first_mut()) {
            (Some(requester), Some(round)) => Some((requester, round.take_reward(&requester, ruling))),
            _ => None,
        };
        item.status = previous.resolved(Party::Requester);

        let mut journal = self.journal();
        let mut staged_events = Vec::new();
        if let Some((requester, amount)) = refund {
            journal.pay(requester, amount)?;
            if amount > 0 {
                staged_events.push(RegistryEvent::RewardWithdrawn {
                    item_id,
                    request: request_index,
                    round: 0,
                    beneficiary: requester,
                    amount,
                });
            }
        }
        self.run_hooks(&item, previous)?;

        let status = item.status;
        let mut staged = Staged::new(item);
        staged.events.push(status_change(&staged.item));
        staged.events.extend(staged_events);
        tracing::info!(%item_id, %previous, %status, "request executed");
        self.apply(staged);
        journal.commit();
        Ok(status)
    }

    /// Attach evidence to the latest request on `item_id`.
    pub fn submit_evidence(
        &self,
        caller: Address,
        item_id: ItemId,
        evidence: &str,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        let item = state.item(&item_id)?;
        let request_index = item
            .last_request_index()
            .ok_or(RegistryError::UnknownRequest { item_id, request: 0 })?;
        let request = &item.requests[request_index];
        if request.resolved {
            return Err(RegistryError::RequestResolved { item_id });
        }
        let arbitrator = request.arbitrator.address();
        let evidence_group =
            EvidenceGroupId::for_request(&item_id, request_index).map_err(CoreError::from)?;
        state.events.push(RegistryEvent::Evidence {
            arbitrator,
            evidence_group,
            party: caller,
            evidence: evidence.to_string(),
        });
        tracing::debug!(%item_id, party = %caller, "evidence submitted");
        Ok(())
    }

    // ── Rulings ────────────────────────────────────────────────────────

    /// Apply the arbitrator's ruling to the disputed request.
    ///
    /// If only one side funded the last appeal round, that side wins
    /// whatever the ruling. The winner's round-0 deposit is paid out
    /// immediately; on a ruling of `None` both parties get theirs.
    pub fn rule_dispute(
        &self,
        caller: Address,
        dispute_id: DisputeId,
        ruling: u32,
    ) -> Result<Party, RegistryError> {
        let _entered = self.enter()?;
        let given = Party::from_ruling(ruling).ok_or(RegistryError::InvalidRuling { ruling })?;
        let mut item = {
            let state = self.state.lock();
            let item_id = match state.dispute_to_item.get(&(caller, dispute_id)) {
                Some(id) => *id,
                None => {
                    if state.dispute_to_item.keys().any(|(_, id)| *id == dispute_id) {
                        return Err(RegistryError::NotArbitrator { caller, dispute_id });
                    }
                    return Err(RegistryError::UnknownDispute {
                        arbitrator: caller,
                        dispute_id,
                    });
                }
            };
            state.item(&item_id)?.clone()
        };
        let item_id = item.id;
        let previous = item.status;
        let request_index = item.requests.len().saturating_sub(1);
        let request = last_request_mut(&mut item)?;
        if request.resolved
            || request.dispute_id != Some(dispute_id)
            || request.arbitrator.address() != caller
        {
            return Err(RegistryError::RequestResolved { item_id });
        }

        let last_round = request
            .rounds
            .last()
            .ok_or_else(|| RegistryError::InvariantViolation(format!("{item_id} request has no round")))?;
        let requester_paid = last_round.has_paid[Party::Requester];
        let challenger_paid = last_round.has_paid[Party::Challenger];
        let winner = match (requester_paid, challenger_paid) {
            (true, false) => Party::Requester,
            (false, true) => Party::Challenger,
            _ => given,
        };
        if winner != given {
            tracing::info!(%item_id, %dispute_id, %given, %winner, "ruling inverted by unfunded appeal");
        }
        request.resolved = true;
        request.ruling = winner;
        let payees: Vec<Address> = match winner {
            Party::None => [Party::Requester, Party::Challenger]
                .iter()
                .filter_map(|p| request.parties[*p])
                .collect(),
            side => request.parties[side].into_iter().collect(),
        };
        let mut payouts = Vec::new();
        if let Some(round) = request.rounds.first_mut() {
            for payee in payees {
                let amount = round.take_reward(&payee, winner);
                payouts.push((payee, amount));
            }
        }
        item.status = previous.resolved(winner);

        let mut journal = self.journal();
        let mut staged_events = vec![RegistryEvent::Ruling {
            arbitrator: caller,
            dispute_id,
            ruling: winner,
        }];
        for (payee, amount) in payouts {
            journal.pay(payee, amount)?;
            if amount > 0 {
                staged_events.push(RegistryEvent::RewardWithdrawn {
                    item_id,
                    request: request_index,
                    round: 0,
                    beneficiary: payee,
                    amount,
                });
            }
        }
        self.run_hooks(&item, previous)?;

        let mut staged = Staged::new(item);
        staged.events.extend(staged_events);
        staged.events.push(status_change(&staged.item));
        tracing::info!(%item_id, %dispute_id, ruling = %winner, status = %staged.item.status, "ruling applied");
        self.apply(staged);
        journal.commit();
        Ok(winner)
    }

    fn run_hooks(&self, item: &Item, previous: ItemStatus) -> Result<(), RegistryError> {
        match (previous, item.status) {
            (ItemStatus::RegistrationRequested, ItemStatus::Registered) => self
                .hooks
                .on_item_registered(&item.id, &item.data)
                .map_err(RegistryError::Hook),
            (ItemStatus::ClearingRequested, ItemStatus::Absent) => self
                .hooks
                .on_item_removed(&item.id)
                .map_err(RegistryError::Hook),
            _ => Ok(()),
        }
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Address holding deposits.
    pub fn account(&self) -> Address {
        self.address
    }

    /// Current governor.
    pub fn governor(&self) -> Address {
        self.state.lock().governor
    }

    /// Current parameters.
    pub fn params(&self) -> RegistryParams {
        self.state.lock().params.clone()
    }

    /// Arbitrator used for new requests.
    pub fn arbitrator_address(&self) -> Address {
        self.state.lock().arbitrator.address()
    }

    /// Number of meta-evidence updates since creation.
    pub fn meta_evidence_updates(&self) -> u64 {
        self.state.lock().meta_evidence_updates
    }

    /// Number of items ever submitted.
    pub fn item_count(&self) -> usize {
        self.state.lock().item_list.len()
    }

    /// Item ids in submission order.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.state.lock().item_list.clone()
    }

    /// Status and payload of one item.
    pub fn get_item_info(&self, item_id: &ItemId) -> Result<ItemInfo, RegistryError> {
        let state = self.state.lock();
        let item = state.item(item_id)?;
        Ok(ItemInfo {
            id: item.id,
            data: item.data.clone(),
            status: item.status,
            number_of_requests: item.requests.len(),
        })
    }

    /// Read model of one request; `request_index` counts from the first submission.
    pub fn get_request_info(
        &self,
        item_id: &ItemId,
        request_index: usize,
    ) -> Result<RequestInfo, RegistryError> {
        let state = self.state.lock();
        let request = request_at(state.item(item_id)?, request_index)?;
        Ok(RequestInfo::from(request))
    }

    /// Funding state of one round. `appealed` is true for every round but
    /// the last, each of which paid for the dispute or an appeal.
    pub fn get_round_info(
        &self,
        item_id: &ItemId,
        request_index: usize,
        round_index: usize,
    ) -> Result<RoundInfo, RegistryError> {
        let state = self.state.lock();
        let request = request_at(state.item(item_id)?, request_index)?;
        let round = round_at(item_id, request, request_index, round_index)?;
        Ok(RoundInfo {
            appealed: round_index + 1 < request.rounds.len(),
            amount_paid: round.amount_paid,
            has_paid: round.has_paid,
            fee_rewards: round.fee_rewards,
        })
    }

    /// Outstanding contributions of `contributor` to one round.
    pub fn get_contributions(
        &self,
        item_id: &ItemId,
        request_index: usize,
        round_index: usize,
        contributor: &Address,
    ) -> Result<Sides<Amount>, RegistryError> {
        let state = self.state.lock();
        let request = request_at(state.item(item_id)?, request_index)?;
        Ok(round_at(item_id, request, request_index, round_index)?.contributions_of(contributor))
    }

    /// Item disputed under `dispute_id` of `arbitrator`.
    pub fn dispute_item(&self, arbitrator: &Address, dispute_id: DisputeId) -> Option<ItemId> {
        self.state
            .lock()
            .dispute_to_item
            .get(&(*arbitrator, dispute_id))
            .copied()
    }

    /// Snapshot of the event log.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.state.lock().events.clone()
    }
}

fn status_change(item: &Item) -> RegistryEvent {
    let request = item.requests.last();
    RegistryEvent::ItemStatusChange {
        item_id: item.id,
        request: item.requests.len().saturating_sub(1),
        round: request.map_or(0, |r| r.rounds.len().saturating_sub(1)),
        status: item.status,
        disputed: request.is_some_and(|r| r.disputed),
        resolved: request.is_some_and(|r| r.resolved),
    }
}

fn last_request(item: &Item) -> Result<&Request, RegistryError> {
    item.requests
        .last()
        .ok_or_else(|| RegistryError::InvariantViolation(format!("{} is pending with no request", item.id)))
}

fn last_request_mut(item: &mut Item) -> Result<&mut Request, RegistryError> {
    let id = item.id;
    item.requests
        .last_mut()
        .ok_or_else(|| RegistryError::InvariantViolation(format!("{id} has no request")))
}

fn request_at(item: &Item, request_index: usize) -> Result<&Request, RegistryError> {
    item.requests
        .get(request_index)
        .ok_or(RegistryError::UnknownRequest {
            item_id: item.id,
            request: request_index,
        })
}

fn round_at<'a>(
    item_id: &ItemId,
    request: &'a Request,
    request_index: usize,
    round_index: usize,
) -> Result<&'a ContributionRound, RegistryError> {
    request
        .rounds
        .get(round_index)
        .ok_or(RegistryError::UnknownRound {
            item_id: *item_id,
            request: request_index,
            round: round_index,
        })
}

impl Arbitrable for GeneralizedTcr {
    fn address(&self) -> Address {
        self.address
    }

    fn rule(&self, caller: Address, dispute_id: DisputeId, ruling: u32) -> Result<(), CallError> {
        self.rule_dispute(caller, dispute_id, ruling)
            .map(|_| ())
            .map_err(|e| e.into_call_error("rule"))
    }
}
