//! # Commit-Reveal Arbitrator
//!
//! Token-weighted voting over disputes raised by a single arbitrable.
//!
//! ## Flow
//!
//! 1. The arbitrable calls [`create_dispute`](Arbitrator::create_dispute);
//!    the arbitration cost is pulled from it and round 0 is opened.
//! 2. Voters with snapshot power [`commit_vote`](CommitRevealArbitrator::commit_vote)
//!    during `Active` and [`reveal_vote`](CommitRevealArbitrator::reveal_vote)
//!    during `Reveal`.
//! 3. During `Appealable` the arbitrable may [`appeal`](Arbitrator::appeal),
//!    paying `appeal_cost * 2^round` and opening a fresh round.
//! 4. Once the last round is final, anyone calls
//!    [`execute_ruling`](CommitRevealArbitrator::execute_ruling), which
//!    delivers the ruling through [`Arbitrable::rule`].
//! 5. Revealed voters on the winning choice (every revealed voter on a
//!    tie) [`withdraw_voter_rewards`](CommitRevealArbitrator::withdraw_voter_rewards)
//!    from that round's cost.
//!
//! ## Locking
//!
//! Mutators enter the reentrancy guard, then lock the state. The ruling
//! callback runs with neither held: the dispute is marked executed first,
//! and the mark is reverted if the arbitrable rejects the ruling.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use tcr_core::{
    compute_reward, Address, Amount, AppealPeriod, Arbitrable, Arbitrator, AssetLedger, CallError,
    Clock, Digest32, DisputeId, DisputeStatus, Party, ReentrancyGuard, Sides, Timestamp,
    RULING_OPTIONS,
};
use tcr_core::capped::{apply_bps, doubled};

use crate::commit::commit_hash;
use crate::config::ArbitratorParams;
use crate::dispute::{Dispute, Receipt, RoundSchedule, RoundState, VotingRound};
use crate::error::ArbitratorError;
use crate::events::ArbitratorEvent;

/// Mutable arbitrator state.
#[derive(Debug)]
pub(crate) struct ArbitratorState {
    pub(crate) owner: Address,
    pub(crate) arbitrable: Address,
    pub(crate) params: ArbitratorParams,
    pub(crate) disputes: Vec<Dispute>,
    pub(crate) events: Vec<ArbitratorEvent>,
}

impl ArbitratorState {
    fn dispute(&self, id: DisputeId) -> Result<&Dispute, ArbitratorError> {
        self.disputes
            .get(id.index())
            .ok_or(ArbitratorError::UnknownDispute { dispute_id: id })
    }

    fn dispute_mut(&mut self, id: DisputeId) -> Result<&mut Dispute, ArbitratorError> {
        self.disputes
            .get_mut(id.index())
            .ok_or(ArbitratorError::UnknownDispute { dispute_id: id })
    }

    fn round(&self, id: DisputeId, round: usize) -> Result<&VotingRound, ArbitratorError> {
        self.dispute(id)?
            .rounds
            .get(round)
            .ok_or(ArbitratorError::UnknownRound { dispute_id: id, round })
    }

    fn current_round(&self, id: DisputeId) -> Result<(usize, &VotingRound), ArbitratorError> {
        let dispute = self.dispute(id)?;
        let index = dispute.current_round_index();
        let round = dispute.rounds.get(index).ok_or_else(|| {
            ArbitratorError::InvariantViolation(format!("{id} has no voting round"))
        })?;
        Ok((index, round))
    }

    pub(crate) fn require_owner(&self, caller: Address) -> Result<(), ArbitratorError> {
        if caller != self.owner {
            return Err(ArbitratorError::NotOwner { caller });
        }
        Ok(())
    }
}

/// Summary of a dispute, without per-voter data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisputeInfo {
    pub id: DisputeId,
    pub arbitrable: Address,
    pub choices: u32,
    pub executed: bool,
    pub ruling: Party,
    pub current_round: usize,
    pub rounds: usize,
}

/// Summary of a voting round, without per-voter data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VotingRoundInfo {
    pub state: RoundState,
    pub voting_start: Timestamp,
    pub voting_end: Timestamp,
    pub reveal_end: Timestamp,
    pub appeal_end: Timestamp,
    pub votes: Amount,
    pub choice_votes: Vec<Amount>,
    pub winning_choice: u32,
    pub snapshot: Timestamp,
    pub total_supply: Amount,
    pub quorum_votes: Amount,
    pub cost: Amount,
}

/// A commit-reveal arbitrator serving one arbitrable.
pub struct CommitRevealArbitrator {
    address: Address,
    ledger: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
    guard: ReentrancyGuard,
    pub(crate) state: Mutex<ArbitratorState>,
    arbitrable_ref: RwLock<Option<Weak<dyn Arbitrable>>>,
}

impl std::fmt::Debug for CommitRevealArbitrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitRevealArbitrator")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl CommitRevealArbitrator {
    /// Create an arbitrator at `address` that accepts disputes from
    /// `arbitrable` only.
    pub fn new(
        address: Address,
        owner: Address,
        arbitrable: Address,
        ledger: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
        params: ArbitratorParams,
    ) -> Result<Self, ArbitratorError> {
        params.validate()?;
        tracing::info!(%address, %owner, %arbitrable, "arbitrator created");
        Ok(Self {
            address,
            ledger,
            clock,
            guard: ReentrancyGuard::new("arbitrator"),
            state: Mutex::new(ArbitratorState {
                owner,
                arbitrable,
                params,
                disputes: Vec::new(),
                events: Vec::new(),
            }),
            arbitrable_ref: RwLock::new(None),
        })
    }

    /// Attach the arbitrable that receives rulings. Allowed once; the
    /// object must live at the address given to [`new`](Self::new).
    pub fn connect_arbitrable(&self, arbitrable: &Arc<dyn Arbitrable>) -> Result<(), ArbitratorError> {
        let expected = self.state.lock().arbitrable;
        if arbitrable.address() != expected {
            return Err(ArbitratorError::ArbitrableMismatch {
                expected,
                actual: arbitrable.address(),
            });
        }
        let mut slot = self.arbitrable_ref.write();
        if slot.is_some() {
            return Err(ArbitratorError::ArbitrableAlreadyConnected);
        }
        *slot = Some(Arc::downgrade(arbitrable));
        Ok(())
    }

    pub(crate) fn enter(&self) -> Result<tcr_core::Entered<'_>, ArbitratorError> {
        Ok(self.guard.enter()?)
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn open_round(&self, params: &ArbitratorParams, round_index: usize, cost: Amount, now: Timestamp) -> VotingRound {
        let snapshot = now.saturating_sub_secs(1);
        let total_supply = self.ledger.past_total_supply(snapshot);
        let quorum_votes = apply_bps(total_supply, params.quorum_bps);
        let appeal_period_secs = if (round_index as u64) < u64::from(params.max_appeal_rounds) {
            params.appeal_period_secs
        } else {
            0
        };
        let schedule = RoundSchedule {
            opened_at: now,
            voting_delay_secs: params.voting_delay_secs,
            voting_period_secs: params.voting_period_secs,
            reveal_period_secs: params.reveal_period_secs,
            appeal_period_secs,
        };
        tracing::debug!(round = round_index, %snapshot, total_supply, quorum_votes, cost, "opening voting round");
        VotingRound::open(&schedule, RULING_OPTIONS, snapshot, total_supply, quorum_votes, cost)
    }

    // ── Arbitrable-facing operations ───────────────────────────────────

    /// Raise a dispute on behalf of `caller`, which must be the arbitrable.
    pub fn raise_dispute(
        &self,
        caller: Address,
        choices: u32,
        extra_data: &[u8],
    ) -> Result<DisputeId, ArbitratorError> {
        let _entered = self.enter()?;
        let now = self.now();
        let mut state = self.state.lock();
        if caller != state.arbitrable {
            return Err(ArbitratorError::NotArbitrable { caller });
        }
        if choices != RULING_OPTIONS {
            return Err(ArbitratorError::UnsupportedChoices { choices });
        }
        let cost = state.params.arbitration_cost;
        self.ledger.transfer_from(self.address, caller, self.address, cost)?;

        let id = DisputeId(state.disputes.len() as u64);
        let round = self.open_round(&state.params, 0, cost, now);
        state.disputes.push(Dispute {
            id,
            arbitrable: caller,
            choices,
            extra_data: extra_data.to_vec(),
            executed: false,
            ruling: Party::None,
            rounds: vec![round],
        });
        state.events.push(ArbitratorEvent::DisputeCreated {
            dispute_id: id,
            arbitrable: caller,
            choices,
            cost,
            at: now,
        });
        tracing::info!(dispute_id = %id, arbitrable = %caller, cost, "dispute created");
        Ok(id)
    }

    /// Appeal the current ruling of `dispute_id` on behalf of `caller`,
    /// which must be the arbitrable.
    pub fn appeal_dispute(&self, caller: Address, dispute_id: DisputeId) -> Result<(), ArbitratorError> {
        let _entered = self.enter()?;
        let now = self.now();
        let mut state = self.state.lock();
        if caller != state.arbitrable {
            return Err(ArbitratorError::NotArbitrable { caller });
        }
        let (index, round) = state.current_round(dispute_id)?;
        let max = state.params.max_appeal_rounds;
        if index as u64 >= u64::from(max) {
            return Err(ArbitratorError::AppealLimitReached { dispute_id, max });
        }
        let round_state = round.state_at(now);
        if round_state != RoundState::Appealable {
            return Err(ArbitratorError::WrongPhase {
                dispute_id,
                round: index,
                expected: RoundState::Appealable.as_str(),
                actual: round_state,
            });
        }
        let cost = doubled(state.params.appeal_cost, index as u32);
        self.ledger.transfer_from(self.address, caller, self.address, cost)?;

        let params = state.params.clone();
        let new_round = self.open_round(&params, index + 1, cost, now);
        let dispute = state.dispute_mut(dispute_id)?;
        if let Some(previous) = dispute.rounds.last_mut() {
            previous.appealed = true;
        }
        dispute.rounds.push(new_round);
        state.events.push(ArbitratorEvent::AppealDecision {
            dispute_id,
            new_round: index + 1,
            cost,
        });
        tracing::info!(%dispute_id, new_round = index + 1, cost, "ruling appealed");
        Ok(())
    }

    // ── Voter operations ───────────────────────────────────────────────

    /// Commit `hash` for `voter` in the current round of `dispute_id`.
    pub fn commit_vote(
        &self,
        voter: Address,
        dispute_id: DisputeId,
        hash: Digest32,
    ) -> Result<(), ArbitratorError> {
        let _entered = self.enter()?;
        let now = self.now();
        let mut state = self.state.lock();
        let (index, round) = state.current_round(dispute_id)?;
        let round_state = round.state_at(now);
        if round_state != RoundState::Active {
            return Err(ArbitratorError::WrongPhase {
                dispute_id,
                round: index,
                expected: RoundState::Active.as_str(),
                actual: round_state,
            });
        }
        if round.receipt(&voter).has_committed {
            return Err(ArbitratorError::AlreadyCommitted { voter });
        }
        let votes = self.ledger.past_votes(&voter, round.snapshot);
        if votes == 0 {
            return Err(ArbitratorError::NoVotingPower { voter });
        }

        let round = current_round_mut(&mut state, dispute_id)?;
        round.receipts.insert(
            voter,
            Receipt {
                has_committed: true,
                has_revealed: false,
                commit_hash: Some(hash),
                choice: 0,
                votes,
            },
        );
        state.events.push(ArbitratorEvent::VoteCommitted {
            dispute_id,
            round: index,
            voter,
            commit_hash: hash,
        });
        tracing::info!(%dispute_id, round = index, %voter, "vote committed");
        Ok(())
    }

    /// Open `voter`'s commitment in the current round of `dispute_id`.
    ///
    /// The hash is checked before the choice, so a reveal that does not
    /// match the commitment fails whatever the choice.
    pub fn reveal_vote(
        &self,
        dispute_id: DisputeId,
        voter: Address,
        choice: u32,
        reason: &str,
        salt: &[u8],
    ) -> Result<(), ArbitratorError> {
        let _entered = self.enter()?;
        let now = self.now();
        let mut state = self.state.lock();
        let choices = state.dispute(dispute_id)?.choices;
        let (index, round) = state.current_round(dispute_id)?;
        let round_state = round.state_at(now);
        if round_state != RoundState::Reveal {
            return Err(ArbitratorError::WrongPhase {
                dispute_id,
                round: index,
                expected: RoundState::Reveal.as_str(),
                actual: round_state,
            });
        }
        let receipt = round.receipt(&voter);
        if !receipt.has_committed {
            return Err(ArbitratorError::NotCommitted { voter });
        }
        if receipt.has_revealed {
            return Err(ArbitratorError::AlreadyRevealed { voter });
        }
        let expected = commit_hash(choice, reason, salt).map_err(tcr_core::CoreError::from)?;
        if receipt.commit_hash != Some(expected) {
            tracing::warn!(%dispute_id, round = index, %voter, "reveal does not match commitment");
            return Err(ArbitratorError::HashMismatch { voter });
        }
        if choice == 0 || choice > choices {
            return Err(ArbitratorError::InvalidChoice { choice, choices });
        }

        let round = current_round_mut(&mut state, dispute_id)?;
        let votes = receipt.votes;
        round.votes = round.votes.saturating_add(votes);
        let slot = round.choice_votes.get_mut(choice as usize).ok_or_else(|| {
            ArbitratorError::InvariantViolation(format!("tally has no slot for choice {choice}"))
        })?;
        *slot = slot.saturating_add(votes);
        if let Some(stored) = round.receipts.get_mut(&voter) {
            stored.has_revealed = true;
            stored.choice = choice;
        }
        state.events.push(ArbitratorEvent::VoteRevealed {
            dispute_id,
            round: index,
            voter,
            choice,
            votes,
            reason: reason.to_string(),
        });
        tracing::info!(%dispute_id, round = index, %voter, choice, votes, "vote revealed");
        Ok(())
    }

    /// Deliver the final ruling of `dispute_id` to the arbitrable.
    pub fn execute_ruling(&self, dispute_id: DisputeId) -> Result<Party, ArbitratorError> {
        let (arbitrable, ruling) = {
            let _entered = self.enter()?;
            let now = self.now();
            let mut state = self.state.lock();
            let dispute = state.dispute(dispute_id)?;
            if dispute.executed {
                return Err(ArbitratorError::AlreadyExecuted { dispute_id });
            }
            let (index, round) = state.current_round(dispute_id)?;
            let round_state = round.state_at(now);
            if !round_state.is_final() {
                return Err(ArbitratorError::WrongPhase {
                    dispute_id,
                    round: index,
                    expected: RoundState::Solved.as_str(),
                    actual: round_state,
                });
            }
            let ruling = round.ruling();
            let arbitrable = self
                .arbitrable_ref
                .read()
                .as_ref()
                .and_then(Weak::upgrade)
                .ok_or(ArbitratorError::ArbitrableUnavailable)?;
            let dispute = state.dispute_mut(dispute_id)?;
            dispute.executed = true;
            dispute.ruling = ruling;
            tracing::debug!(%dispute_id, round = index, %round_state, %ruling, "ruling computed");
            (arbitrable, ruling)
        };

        if let Err(err) = arbitrable.rule(self.address, dispute_id, ruling.as_ruling()) {
            let mut state = self.state.lock();
            if let Ok(dispute) = state.dispute_mut(dispute_id) {
                dispute.executed = false;
                dispute.ruling = Party::None;
            }
            tracing::warn!(%dispute_id, error = %err, "arbitrable rejected ruling");
            return Err(ArbitratorError::Arbitrable(err));
        }

        self.state
            .lock()
            .events
            .push(ArbitratorEvent::RulingExecuted { dispute_id, ruling });
        tracing::info!(%dispute_id, %ruling, "ruling executed");
        Ok(ruling)
    }

    /// Pay `voter` its share of round `round`'s cost.
    ///
    /// Winners split the pool by revealed power; when the round has no
    /// winner every revealed voter shares it. Claiming twice is an error.
    pub fn withdraw_voter_rewards(
        &self,
        dispute_id: DisputeId,
        round: usize,
        voter: Address,
    ) -> Result<Amount, ArbitratorError> {
        let _entered = self.enter()?;
        let now = self.now();
        let mut state = self.state.lock();
        let voting_round = state.round(dispute_id, round)?;
        let round_state = voting_round.state_at(now);
        if !round_state.is_final() {
            return Err(ArbitratorError::WrongPhase {
                dispute_id,
                round,
                expected: RoundState::Solved.as_str(),
                actual: round_state,
            });
        }
        if voting_round.rewards_claimed.contains(&voter) {
            return Err(ArbitratorError::AlreadyClaimed { voter, round });
        }
        let receipt = voting_round.receipt(&voter);
        if !receipt.has_revealed {
            return Err(ArbitratorError::NotRevealed { voter });
        }
        let winning = voting_round.winning_choice();
        if winning != 0 && receipt.choice != winning {
            return Err(ArbitratorError::LosingSide {
                voter,
                choice: receipt.choice,
                ruling: winning,
            });
        }
        let pool_votes = if winning == 0 {
            voting_round.votes
        } else {
            voting_round.choice_votes.get(winning as usize).copied().unwrap_or(0)
        };
        if pool_votes == 0 {
            return Err(ArbitratorError::NoWinningVotes { dispute_id, round });
        }
        let amount = voter_reward(voting_round, &receipt);

        self.ledger.transfer(self.address, voter, amount)?;
        let voting_round = round_mut(&mut state, dispute_id, round)?;
        voting_round.rewards_claimed.insert(voter);
        state.events.push(ArbitratorEvent::RewardWithdrawn {
            dispute_id,
            round,
            voter,
            amount,
        });
        tracing::info!(%dispute_id, round, %voter, amount, "voter reward withdrawn");
        Ok(amount)
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Address of the arbitrator account.
    pub fn account(&self) -> Address {
        self.address
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.state.lock().owner
    }

    /// Current parameters (apply to rounds opened from now on).
    pub fn params(&self) -> ArbitratorParams {
        self.state.lock().params.clone()
    }

    /// Number of disputes raised so far.
    pub fn dispute_count(&self) -> usize {
        self.state.lock().disputes.len()
    }

    /// Summary of a dispute.
    pub fn dispute_info(&self, dispute_id: DisputeId) -> Result<DisputeInfo, ArbitratorError> {
        let state = self.state.lock();
        let dispute = state.dispute(dispute_id)?;
        Ok(DisputeInfo {
            id: dispute.id,
            arbitrable: dispute.arbitrable,
            choices: dispute.choices,
            executed: dispute.executed,
            ruling: dispute.ruling,
            current_round: dispute.current_round_index(),
            rounds: dispute.rounds.len(),
        })
    }

    /// Summary of a voting round.
    pub fn voting_round_info(
        &self,
        dispute_id: DisputeId,
        round: usize,
    ) -> Result<VotingRoundInfo, ArbitratorError> {
        let now = self.now();
        let state = self.state.lock();
        let r = state.round(dispute_id, round)?;
        Ok(VotingRoundInfo {
            state: r.state_at(now),
            voting_start: r.voting_start,
            voting_end: r.voting_end,
            reveal_end: r.reveal_end,
            appeal_end: r.appeal_end,
            votes: r.votes,
            choice_votes: r.choice_votes.clone(),
            winning_choice: r.winning_choice(),
            snapshot: r.snapshot,
            total_supply: r.total_supply,
            quorum_votes: r.quorum_votes,
            cost: r.cost,
        })
    }

    /// Phase of a round right now.
    pub fn round_state(&self, dispute_id: DisputeId, round: usize) -> Result<RoundState, ArbitratorError> {
        let now = self.now();
        Ok(self.state.lock().round(dispute_id, round)?.state_at(now))
    }

    /// Receipt of `voter` in a round (empty if the voter never committed).
    pub fn get_receipt(
        &self,
        dispute_id: DisputeId,
        round: usize,
        voter: &Address,
    ) -> Result<Receipt, ArbitratorError> {
        Ok(self.state.lock().round(dispute_id, round)?.receipt(voter))
    }

    /// Revealed power per choice (index 0 unused).
    pub fn get_votes_by_round(&self, dispute_id: DisputeId, round: usize) -> Result<Vec<Amount>, ArbitratorError> {
        Ok(self.state.lock().round(dispute_id, round)?.choice_votes.clone())
    }

    /// Total revealed power in a round.
    pub fn get_total_votes_by_round(&self, dispute_id: DisputeId, round: usize) -> Result<Amount, ArbitratorError> {
        Ok(self.state.lock().round(dispute_id, round)?.votes)
    }

    /// Snapshot voting power of `voter` for a round.
    pub fn voting_power_in_round(
        &self,
        dispute_id: DisputeId,
        round: usize,
        voter: &Address,
    ) -> Result<Amount, ArbitratorError> {
        let snapshot = self.state.lock().round(dispute_id, round)?.snapshot;
        Ok(self.ledger.past_votes(voter, snapshot))
    }

    /// Whether `voter` could commit in a round right now.
    pub fn can_vote_in_round(
        &self,
        dispute_id: DisputeId,
        round: usize,
        voter: &Address,
    ) -> Result<bool, ArbitratorError> {
        let now = self.now();
        let (is_current, active, committed, snapshot) = {
            let state = self.state.lock();
            let dispute = state.dispute(dispute_id)?;
            let r = state.round(dispute_id, round)?;
            (
                dispute.current_round_index() == round,
                r.state_at(now) == RoundState::Active,
                r.receipt(voter).has_committed,
                r.snapshot,
            )
        };
        Ok(is_current && active && !committed && self.ledger.past_votes(voter, snapshot) > 0)
    }

    /// Quorum threshold of a round (zero when quorum is off).
    pub fn quorum_votes(&self, dispute_id: DisputeId, round: usize) -> Result<Amount, ArbitratorError> {
        Ok(self.state.lock().round(dispute_id, round)?.quorum_votes)
    }

    /// Ruling the current round would produce now.
    pub fn current_ruling_of(&self, dispute_id: DisputeId) -> Result<Party, ArbitratorError> {
        let state = self.state.lock();
        let (_, round) = state.current_round(dispute_id)?;
        Ok(round.ruling())
    }

    /// Externally visible status of a dispute now.
    pub fn status_of(&self, dispute_id: DisputeId) -> Result<DisputeStatus, ArbitratorError> {
        let now = self.now();
        let state = self.state.lock();
        let (_, round) = state.current_round(dispute_id)?;
        Ok(match round.state_at(now) {
            RoundState::Pending | RoundState::Active | RoundState::Reveal => DisputeStatus::Waiting,
            RoundState::Appealable => DisputeStatus::Appealable,
            RoundState::Solved | RoundState::QuorumNotReached => DisputeStatus::Solved,
        })
    }

    /// Appeal window of the current round, if it has one.
    pub fn appeal_window(&self, dispute_id: DisputeId) -> Result<Option<AppealPeriod>, ArbitratorError> {
        let state = self.state.lock();
        let (_, round) = state.current_round(dispute_id)?;
        Ok(round.appeal_period())
    }

    /// Cost of the next appeal of `dispute_id`.
    pub fn next_appeal_cost(&self, dispute_id: DisputeId) -> Result<Amount, ArbitratorError> {
        let state = self.state.lock();
        let (index, _) = state.current_round(dispute_id)?;
        Ok(doubled(state.params.appeal_cost, index as u32))
    }

    /// Snapshot of the event log.
    pub fn events(&self) -> Vec<ArbitratorEvent> {
        self.state.lock().events.clone()
    }
}

/// Voter reward through the shared reward formula: revealed power plays
/// the part of a contribution, per-choice tallies the per-side totals and
/// the round cost the pool.
fn voter_reward(round: &VotingRound, receipt: &Receipt) -> Amount {
    let tally = |choice: usize| round.choice_votes.get(choice).copied().unwrap_or(0);
    let side = Party::from_choice(receipt.choice);
    let mut contribution = Sides::<Amount>::default();
    contribution[side] = receipt.votes;
    let paid = Sides::new(0, tally(1), tally(2));
    compute_reward(
        &contribution,
        &paid,
        &Sides::new(false, true, true),
        round.cost,
        round.ruling(),
    )
}

fn current_round_mut(
    state: &mut ArbitratorState,
    dispute_id: DisputeId,
) -> Result<&mut VotingRound, ArbitratorError> {
    state
        .dispute_mut(dispute_id)?
        .rounds
        .last_mut()
        .ok_or_else(|| ArbitratorError::InvariantViolation(format!("{dispute_id} has no voting round")))
}

fn round_mut(
    state: &mut ArbitratorState,
    dispute_id: DisputeId,
    round: usize,
) -> Result<&mut VotingRound, ArbitratorError> {
    state
        .dispute_mut(dispute_id)?
        .rounds
        .get_mut(round)
        .ok_or(ArbitratorError::UnknownRound { dispute_id, round })
}

impl Arbitrator for CommitRevealArbitrator {
    fn address(&self) -> Address {
        self.address
    }

    fn arbitration_cost(&self, _extra_data: &[u8]) -> Amount {
        self.state.lock().params.arbitration_cost
    }

    fn create_dispute(&self, caller: Address, choices: u32, extra_data: &[u8]) -> Result<DisputeId, CallError> {
        self.raise_dispute(caller, choices, extra_data)
            .map_err(|e| e.into_call_error("create_dispute"))
    }

    fn appeal_cost(&self, dispute_id: DisputeId, _extra_data: &[u8]) -> Result<Amount, CallError> {
        self.next_appeal_cost(dispute_id)
            .map_err(|e| e.into_call_error("appeal_cost"))
    }

    fn appeal(&self, caller: Address, dispute_id: DisputeId, _extra_data: &[u8]) -> Result<(), CallError> {
        self.appeal_dispute(caller, dispute_id)
            .map_err(|e| e.into_call_error("appeal"))
    }

    fn appeal_period(&self, dispute_id: DisputeId) -> Result<Option<AppealPeriod>, CallError> {
        self.appeal_window(dispute_id)
            .map_err(|e| e.into_call_error("appeal_period"))
    }

    fn dispute_status(&self, dispute_id: DisputeId) -> Result<DisputeStatus, CallError> {
        self.status_of(dispute_id)
            .map_err(|e| e.into_call_error("dispute_status"))
    }

    fn current_ruling(&self, dispute_id: DisputeId) -> Result<Party, CallError> {
        self.current_ruling_of(dispute_id)
            .map_err(|e| e.into_call_error("current_ruling"))
    }
}
