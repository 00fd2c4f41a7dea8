//! Commit-reveal voting against the in-memory token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tcr_arbitration::{
    commit_hash, ArbitratorError, ArbitratorEvent, ArbitratorParams, CommitRevealArbitrator,
    RoundState,
};
use tcr_core::{
    Address, Amount, Arbitrable, Arbitrator, AssetLedger, CallError, DisputeId, DisputeStatus,
    ManualClock, Party, Timestamp,
};
use tcr_token::InMemoryToken;

const T0: i64 = 1_000_000;
const ARBITRABLE: Address = Address::new([0xaa; 20]);
const ARBITRATOR: Address = Address::new([0xab; 20]);
const OWNER: Address = Address::new([0x0e; 20]);

fn voter(n: u8) -> Address {
    Address::new([n; 20])
}

#[derive(Default)]
struct RecordingArbitrable {
    rulings: Mutex<Vec<(DisputeId, u32)>>,
    reject: AtomicBool,
}

impl Arbitrable for RecordingArbitrable {
    fn address(&self) -> Address {
        ARBITRABLE
    }

    fn rule(&self, caller: Address, dispute_id: DisputeId, ruling: u32) -> Result<(), CallError> {
        assert_eq!(caller, ARBITRATOR);
        if self.reject.load(Ordering::SeqCst) {
            return Err(CallError::new("arbitrable", "rule", "rejected by test"));
        }
        self.rulings.lock().push((dispute_id, ruling));
        Ok(())
    }
}

struct Harness {
    clock: Arc<ManualClock>,
    token: Arc<InMemoryToken>,
    arbitrator: CommitRevealArbitrator,
    arbitrable: Arc<RecordingArbitrable>,
}

fn params() -> ArbitratorParams {
    ArbitratorParams {
        voting_delay_secs: 0,
        voting_period_secs: 100,
        reveal_period_secs: 50,
        appeal_period_secs: 40,
        arbitration_cost: 300,
        appeal_cost: 200,
        quorum_bps: 0,
        max_appeal_rounds: 3,
    }
}

fn harness(params: ArbitratorParams) -> Harness {
    let clock = Arc::new(ManualClock::new(Timestamp::from_epoch_secs(T0).unwrap()));
    let token = Arc::new(InMemoryToken::new(Address::new([0xee; 20]), clock.clone()));
    for n in 1..=3 {
        token.mint(voter(n), 100).unwrap();
    }
    token.mint(ARBITRABLE, 10_000).unwrap();
    token.approve(ARBITRABLE, ARBITRATOR, Amount::MAX).unwrap();
    let arbitrator = CommitRevealArbitrator::new(
        ARBITRATOR,
        OWNER,
        ARBITRABLE,
        token.clone(),
        clock.clone(),
        params,
    )
    .unwrap();
    let arbitrable = Arc::new(RecordingArbitrable::default());
    let as_dyn: Arc<dyn Arbitrable> = arbitrable.clone();
    arbitrator.connect_arbitrable(&as_dyn).unwrap();
    clock.advance(10);
    Harness {
        clock,
        token,
        arbitrator,
        arbitrable,
    }
}

fn salt(n: u8) -> Vec<u8> {
    vec![n; 16]
}

impl Harness {
    fn create(&self) -> DisputeId {
        self.arbitrator.create_dispute(ARBITRABLE, 2, b"").unwrap()
    }

    fn commit(&self, id: DisputeId, n: u8, choice: u32) {
        let hash = commit_hash(choice, "because", &salt(n)).unwrap();
        self.arbitrator.commit_vote(voter(n), id, hash).unwrap();
    }

    fn reveal(&self, id: DisputeId, n: u8, choice: u32) {
        self.arbitrator
            .reveal_vote(id, voter(n), choice, "because", &salt(n))
            .unwrap();
    }

    fn vote_round(&self, id: DisputeId, votes: &[(u8, u32)]) {
        for (n, choice) in votes {
            self.commit(id, *n, *choice);
        }
        self.clock.advance(100);
        for (n, choice) in votes {
            self.reveal(id, *n, *choice);
        }
        self.clock.advance(50);
    }
}

#[test]
fn majority_wins_and_winners_split_cost() {
    let h = harness(params());
    let id = h.create();
    assert_eq!(h.token.balance_of(&ARBITRATOR), 300);

    h.vote_round(id, &[(1, 1), (2, 2), (3, 1)]);
    assert_eq!(h.arbitrator.round_state(id, 0).unwrap(), RoundState::Appealable);
    assert_eq!(h.arbitrator.dispute_status(id).unwrap(), DisputeStatus::Appealable);
    assert_eq!(h.arbitrator.current_ruling(id).unwrap(), Party::Requester);
    assert_eq!(h.arbitrator.get_votes_by_round(id, 0).unwrap(), vec![0, 200, 100]);
    assert_eq!(h.arbitrator.get_total_votes_by_round(id, 0).unwrap(), 300);

    h.clock.advance(40);
    assert_eq!(h.arbitrator.dispute_status(id).unwrap(), DisputeStatus::Solved);
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::Requester);
    assert_eq!(*h.arbitrable.rulings.lock(), vec![(id, 1)]);

    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(1)).unwrap(), 150);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(3)).unwrap(), 150);
    let err = h.arbitrator.withdraw_voter_rewards(id, 0, voter(2)).unwrap_err();
    assert!(matches!(err, ArbitratorError::LosingSide { choice: 2, ruling: 1, .. }));
    let err = h.arbitrator.withdraw_voter_rewards(id, 0, voter(1)).unwrap_err();
    assert!(matches!(err, ArbitratorError::AlreadyClaimed { round: 0, .. }));
    assert_eq!(h.token.balance_of(&voter(1)), 250);
    assert_eq!(h.token.balance_of(&ARBITRATOR), 0);
}

#[test]
fn tie_rules_none_and_shares_pool() {
    let h = harness(params());
    let id = h.create();
    h.vote_round(id, &[(1, 1), (2, 2)]);
    h.clock.advance(40);
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::None);
    assert_eq!(*h.arbitrable.rulings.lock(), vec![(id, 0)]);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(1)).unwrap(), 150);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(2)).unwrap(), 150);
    let err = h.arbitrator.withdraw_voter_rewards(id, 0, voter(3)).unwrap_err();
    assert!(matches!(err, ArbitratorError::NotRevealed { .. }));
}

#[test]
fn no_votes_rules_none() {
    let h = harness(params());
    let id = h.create();
    h.clock.advance(190);
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::None);
}

#[test]
fn mismatched_reveal_always_fails() {
    let h = harness(params());
    let id = h.create();
    h.commit(id, 1, 1);
    h.clock.advance(100);
    for choice in [0, 1, 2, 7] {
        let err = h
            .arbitrator
            .reveal_vote(id, voter(1), choice, "other reason", &salt(1))
            .unwrap_err();
        assert!(matches!(err, ArbitratorError::HashMismatch { .. }));
    }
    let err = h
        .arbitrator
        .reveal_vote(id, voter(1), 2, "because", &salt(1))
        .unwrap_err();
    assert!(matches!(err, ArbitratorError::HashMismatch { .. }));
    h.reveal(id, 1, 1);
    let err = h
        .arbitrator
        .reveal_vote(id, voter(1), 1, "because", &salt(1))
        .unwrap_err();
    assert!(matches!(err, ArbitratorError::AlreadyRevealed { .. }));
}

#[test]
fn committed_invalid_choice_is_rejected_on_reveal() {
    let h = harness(params());
    let id = h.create();
    h.commit(id, 1, 5);
    h.clock.advance(100);
    let err = h
        .arbitrator
        .reveal_vote(id, voter(1), 5, "because", &salt(1))
        .unwrap_err();
    assert!(matches!(err, ArbitratorError::InvalidChoice { choice: 5, choices: 2 }));
}

#[test]
fn commit_preconditions() {
    let h = harness(params());
    let id = h.create();
    h.commit(id, 1, 1);
    let hash = commit_hash(1, "because", &salt(1)).unwrap();
    let err = h.arbitrator.commit_vote(voter(1), id, hash).unwrap_err();
    assert!(matches!(err, ArbitratorError::AlreadyCommitted { .. }));

    // minted after the snapshot
    h.token.mint(voter(9), 1_000).unwrap();
    let err = h.arbitrator.commit_vote(voter(9), id, hash).unwrap_err();
    assert!(matches!(err, ArbitratorError::NoVotingPower { .. }));
    assert!(!h.arbitrator.can_vote_in_round(id, 0, &voter(9)).unwrap());
    assert!(h.arbitrator.can_vote_in_round(id, 0, &voter(2)).unwrap());
    assert_eq!(h.arbitrator.voting_power_in_round(id, 0, &voter(2)).unwrap(), 100);

    h.clock.advance(100);
    let err = h.arbitrator.commit_vote(voter(2), id, hash).unwrap_err();
    assert!(matches!(
        err,
        ArbitratorError::WrongPhase { actual: RoundState::Reveal, .. }
    ));
}

#[test]
fn reveal_requires_commitment() {
    let h = harness(params());
    let id = h.create();
    h.clock.advance(100);
    let err = h
        .arbitrator
        .reveal_vote(id, voter(1), 1, "because", &salt(1))
        .unwrap_err();
    assert!(matches!(err, ArbitratorError::NotCommitted { .. }));
}

#[test]
fn only_arbitrable_creates_two_choice_disputes() {
    let h = harness(params());
    let err = h.arbitrator.raise_dispute(voter(1), 2, b"").unwrap_err();
    assert!(matches!(err, ArbitratorError::NotArbitrable { .. }));
    let err = h.arbitrator.raise_dispute(ARBITRABLE, 3, b"").unwrap_err();
    assert!(matches!(err, ArbitratorError::UnsupportedChoices { choices: 3 }));
    assert_eq!(h.arbitrator.dispute_count(), 0);
}

#[test]
fn appeal_cost_doubles_and_limit_is_final() {
    let mut p = params();
    p.max_appeal_rounds = 2;
    let h = harness(p);
    let id = h.create();

    h.vote_round(id, &[(1, 1)]);
    assert_eq!(h.arbitrator.appeal_cost(id, b"").unwrap(), 200);
    h.arbitrator.appeal(ARBITRABLE, id, b"").unwrap();
    assert_eq!(h.token.balance_of(&ARBITRATOR), 500);
    assert_eq!(h.arbitrator.round_state(id, 0).unwrap(), RoundState::Solved);
    assert_eq!(h.arbitrator.dispute_info(id).unwrap().rounds, 2);

    h.vote_round(id, &[(2, 2)]);
    assert_eq!(h.arbitrator.appeal_cost(id, b"").unwrap(), 400);
    h.arbitrator.appeal(ARBITRABLE, id, b"").unwrap();

    // round 2 is the last one: no window, no further appeal
    h.vote_round(id, &[(3, 2)]);
    assert!(h.arbitrator.appeal_period(id).unwrap().is_none());
    let err = h.arbitrator.appeal_dispute(ARBITRABLE, id).unwrap_err();
    assert!(matches!(err, ArbitratorError::AppealLimitReached { max: 2, .. }));
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::Challenger);

    // earlier rounds pay out on their own tally
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(1)).unwrap(), 300);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 1, voter(2)).unwrap(), 200);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 2, voter(3)).unwrap(), 400);
}

#[test]
fn appeal_outside_window_is_rejected() {
    let h = harness(params());
    let id = h.create();
    let err = h.arbitrator.appeal_dispute(ARBITRABLE, id).unwrap_err();
    assert!(matches!(err, ArbitratorError::WrongPhase { actual: RoundState::Active, .. }));
    let err = h.arbitrator.appeal_dispute(voter(1), id).unwrap_err();
    assert!(matches!(err, ArbitratorError::NotArbitrable { .. }));
}

#[test]
fn quorum_not_reached_rules_none() {
    let mut p = params();
    p.quorum_bps = 5_000;
    p.appeal_period_secs = 0;
    let h = harness(p);
    let id = h.create();
    // supply 10_300, quorum 5_150, revealed 200
    assert_eq!(h.arbitrator.quorum_votes(id, 0).unwrap(), 5_150);
    h.vote_round(id, &[(1, 1), (2, 1)]);
    assert_eq!(h.arbitrator.round_state(id, 0).unwrap(), RoundState::QuorumNotReached);
    assert_eq!(h.arbitrator.current_ruling(id).unwrap(), Party::None);
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::None);
    assert_eq!(h.arbitrator.withdraw_voter_rewards(id, 0, voter(1)).unwrap(), 150);
}

#[test]
fn execution_is_single_and_reverted_on_rejection() {
    let h = harness(params());
    let id = h.create();
    h.vote_round(id, &[(1, 2)]);
    let err = h.arbitrator.execute_ruling(id).unwrap_err();
    assert!(matches!(err, ArbitratorError::WrongPhase { actual: RoundState::Appealable, .. }));
    h.clock.advance(40);

    h.arbitrable.reject.store(true, Ordering::SeqCst);
    let err = h.arbitrator.execute_ruling(id).unwrap_err();
    assert!(matches!(err, ArbitratorError::Arbitrable(_)));
    assert!(!h.arbitrator.dispute_info(id).unwrap().executed);

    h.arbitrable.reject.store(false, Ordering::SeqCst);
    assert_eq!(h.arbitrator.execute_ruling(id).unwrap(), Party::Challenger);
    let err = h.arbitrator.execute_ruling(id).unwrap_err();
    assert!(matches!(err, ArbitratorError::AlreadyExecuted { .. }));
    assert!(h
        .arbitrator
        .events()
        .iter()
        .any(|e| matches!(e, ArbitratorEvent::RulingExecuted { ruling: Party::Challenger, .. })));
}

#[test]
fn governance_is_owner_gated_and_applies_to_new_rounds() {
    let h = harness(params());
    let first = h.create();
    let err = h.arbitrator.change_voting_period(voter(1), 500).unwrap_err();
    assert!(matches!(err, ArbitratorError::NotOwner { .. }));
    let err = h.arbitrator.change_voting_period(OWNER, 0).unwrap_err();
    assert!(matches!(err, ArbitratorError::InvalidParameter { .. }));
    h.arbitrator.change_voting_period(OWNER, 500).unwrap();
    h.arbitrator.change_arbitration_cost(OWNER, 50).unwrap();
    assert_eq!(h.arbitrator.arbitration_cost(b""), 50);

    let second = h.create();
    let a = h.arbitrator.voting_round_info(first, 0).unwrap();
    let b = h.arbitrator.voting_round_info(second, 0).unwrap();
    assert_eq!(a.voting_end.secs_since(&a.voting_start), 100);
    assert_eq!(b.voting_end.secs_since(&b.voting_start), 500);
    assert_eq!(a.cost, 300);
    assert_eq!(b.cost, 50);

    h.arbitrator.change_owner(OWNER, voter(7)).unwrap();
    assert_eq!(h.arbitrator.owner(), voter(7));
    assert!(h.arbitrator.change_quorum_bps(OWNER, 10).is_err());
}

#[test]
fn connecting_twice_or_wrong_address_fails() {
    let h = harness(params());
    let again: Arc<dyn Arbitrable> = h.arbitrable.clone();
    assert!(matches!(
        h.arbitrator.connect_arbitrable(&again).unwrap_err(),
        ArbitratorError::ArbitrableAlreadyConnected
    ));
}
