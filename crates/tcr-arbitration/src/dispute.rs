//! # Disputes and Voting Rounds
//!
//! A [`Dispute`] owns an append-only list of [`VotingRound`]s: one opened
//! at creation and one per successful appeal. Only the last round accepts
//! commits, reveals and appeals.
//!
//! ## Phases
//!
//! A round's phase is never stored. [`VotingRound::state_at`] derives it
//! from the round's deadlines, which are fixed when the round is opened:
//!
//! ```text
//! [created, voting_start)      Pending
//! [voting_start, voting_end)  Active      (commit)
//! [voting_end, reveal_end)    Reveal
//! [reveal_end, appeal_end)    Appealable  (only if the round has a window)
//! [appeal_end, ..)            Solved | QuorumNotReached
//! ```
//!
//! A round that has been appealed is final as soon as its reveal phase is
//! over. Every instant maps to exactly one phase.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use tcr_core::{Address, Amount, AppealPeriod, Digest32, DisputeId, Party, Timestamp};

/// Phase of a voting round at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Voting has not started.
    Pending,
    /// Commit phase.
    Active,
    /// Reveal phase.
    Reveal,
    /// Tally is known and the round can still be appealed.
    Appealable,
    /// The round is final.
    Solved,
    /// The round is final but fewer votes than the quorum were revealed.
    QuorumNotReached,
}

impl RoundState {
    /// Whether the round can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Solved | Self::QuorumNotReached)
    }

    /// Uppercase name, as shown in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Reveal => "REVEAL",
            Self::Appealable => "APPEALABLE",
            Self::Solved => "SOLVED",
            Self::QuorumNotReached => "QUORUM_NOT_REACHED",
        }
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A voter's record in one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// A commitment was submitted.
    pub has_committed: bool,
    /// The commitment was opened.
    pub has_revealed: bool,
    /// The submitted commitment.
    pub commit_hash: Option<Digest32>,
    /// The revealed choice (0 until revealed).
    pub choice: u32,
    /// Snapshot voting power counted for this voter.
    pub votes: Amount,
}

/// Deadlines and snapshot values fixed when a round is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSchedule {
    /// When the round was opened.
    pub opened_at: Timestamp,
    /// Seconds until voting starts.
    pub voting_delay_secs: u64,
    /// Commit phase length.
    pub voting_period_secs: u64,
    /// Reveal phase length.
    pub reveal_period_secs: u64,
    /// Appeal window length; zero for a round that cannot be appealed.
    pub appeal_period_secs: u64,
}

/// One commit/reveal vote over a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingRound {
    /// Start of the commit phase.
    pub voting_start: Timestamp,
    /// End of the commit phase.
    pub voting_end: Timestamp,
    /// End of the reveal phase.
    pub reveal_end: Timestamp,
    /// End of the appeal window. Equals `reveal_end` when the round
    /// cannot be appealed.
    pub appeal_end: Timestamp,
    /// Whether an appeal opened a later round.
    pub appealed: bool,
    /// Total revealed voting power.
    pub votes: Amount,
    /// Revealed voting power per choice; index 0 is unused.
    pub choice_votes: Vec<Amount>,
    /// Instant at which voting power is read.
    pub snapshot: Timestamp,
    /// Total supply at the snapshot.
    pub total_supply: Amount,
    /// Revealed power needed for the round to count. Zero when quorum is off.
    pub quorum_votes: Amount,
    /// Amount escrowed for this round; the pool voters are rewarded from.
    pub cost: Amount,
    /// Per-voter receipts.
    pub receipts: BTreeMap<Address, Receipt>,
    /// Voters that already withdrew their reward.
    pub rewards_claimed: BTreeSet<Address>,
}

impl VotingRound {
    /// Open a round for a dispute with `choices` options.
    pub fn open(
        schedule: &RoundSchedule,
        choices: u32,
        snapshot: Timestamp,
        total_supply: Amount,
        quorum_votes: Amount,
        cost: Amount,
    ) -> Self {
        let voting_start = schedule.opened_at.saturating_add_secs(schedule.voting_delay_secs);
        let voting_end = voting_start.saturating_add_secs(schedule.voting_period_secs);
        let reveal_end = voting_end.saturating_add_secs(schedule.reveal_period_secs);
        let appeal_end = reveal_end.saturating_add_secs(schedule.appeal_period_secs);
        Self {
            voting_start,
            voting_end,
            reveal_end,
            appeal_end,
            appealed: false,
            votes: 0,
            choice_votes: vec![0; choices as usize + 1],
            snapshot,
            total_supply,
            quorum_votes,
            cost,
            receipts: BTreeMap::new(),
            rewards_claimed: BTreeSet::new(),
        }
    }

    /// Phase of the round at `now`.
    pub fn state_at(&self, now: Timestamp) -> RoundState {
        if now < self.voting_start {
            RoundState::Pending
        } else if now < self.voting_end {
            RoundState::Active
        } else if now < self.reveal_end {
            RoundState::Reveal
        } else if !self.appealed && now < self.appeal_end {
            RoundState::Appealable
        } else if self.quorum_reached() {
            RoundState::Solved
        } else {
            RoundState::QuorumNotReached
        }
    }

    /// Whether revealed votes meet the quorum (always true when it is off).
    pub fn quorum_reached(&self) -> bool {
        self.votes >= self.quorum_votes
    }

    /// Whether this round was opened with an appeal window.
    pub fn has_appeal_window(&self) -> bool {
        self.appeal_end > self.reveal_end
    }

    /// The appeal window, if the round has one and has not been appealed.
    pub fn appeal_period(&self) -> Option<AppealPeriod> {
        (self.has_appeal_window() && !self.appealed).then_some(AppealPeriod {
            start: self.reveal_end,
            end: self.appeal_end,
        })
    }

    /// The choice with the most revealed votes; `0` on any tie (including
    /// no votes at all) or when quorum is not reached.
    pub fn winning_choice(&self) -> u32 {
        if !self.quorum_reached() {
            return 0;
        }
        winning_choice(&self.choice_votes)
    }

    /// The party the current tally favours.
    pub fn ruling(&self) -> Party {
        Party::from_choice(self.winning_choice())
    }

    /// The receipt of `voter`, or an empty one.
    pub fn receipt(&self, voter: &Address) -> Receipt {
        self.receipts.get(voter).cloned().unwrap_or_default()
    }
}

/// Index of the strictly highest tally in `choice_votes[1..]`, or `0`
/// when the highest tally is shared.
pub fn winning_choice(choice_votes: &[Amount]) -> u32 {
    let mut winner = 0u32;
    let mut best: Amount = 0;
    let mut tied = true;
    for (choice, votes) in choice_votes.iter().enumerate().skip(1) {
        if *votes > best {
            best = *votes;
            winner = choice as u32;
            tied = false;
        } else if *votes == best {
            tied = true;
        }
    }
    if tied {
        0
    } else {
        winner
    }
}

/// A dispute raised by the arbitrable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Position in the arbitrator's dispute list.
    pub id: DisputeId,
    /// The arbitrable that raised the dispute and receives the ruling.
    pub arbitrable: Address,
    /// Number of ruling options.
    pub choices: u32,
    /// Opaque data passed at creation.
    pub extra_data: Vec<u8>,
    /// Whether the ruling was delivered.
    pub executed: bool,
    /// Delivered ruling (meaningful once executed).
    pub ruling: Party,
    /// Voting rounds, oldest first.
    pub rounds: Vec<VotingRound>,
}

impl Dispute {
    /// Index of the round that currently accepts votes.
    pub fn current_round_index(&self) -> usize {
        self.rounds.len().saturating_sub(1)
    }

    /// The round that currently accepts votes.
    pub fn current_round(&self) -> Option<&VotingRound> {
        self.rounds.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    fn schedule(appeal: u64) -> RoundSchedule {
        RoundSchedule {
            opened_at: at(1_000),
            voting_delay_secs: 10,
            voting_period_secs: 100,
            reveal_period_secs: 50,
            appeal_period_secs: appeal,
        }
    }

    #[test]
    fn phases_follow_deadlines() {
        let round = VotingRound::open(&schedule(40), 2, at(999), 100, 0, 10);
        assert_eq!(round.state_at(at(1_000)), RoundState::Pending);
        assert_eq!(round.state_at(at(1_010)), RoundState::Active);
        assert_eq!(round.state_at(at(1_109)), RoundState::Active);
        assert_eq!(round.state_at(at(1_110)), RoundState::Reveal);
        assert_eq!(round.state_at(at(1_160)), RoundState::Appealable);
        assert_eq!(round.state_at(at(1_200)), RoundState::Solved);
    }

    #[test]
    fn round_without_window_skips_appealable() {
        let round = VotingRound::open(&schedule(0), 2, at(999), 100, 0, 10);
        assert!(round.appeal_period().is_none());
        assert_eq!(round.state_at(at(1_160)), RoundState::Solved);
    }

    #[test]
    fn appealed_round_is_final_after_reveal() {
        let mut round = VotingRound::open(&schedule(40), 2, at(999), 100, 0, 10);
        round.appealed = true;
        assert_eq!(round.state_at(at(1_170)), RoundState::Solved);
        assert!(round.appeal_period().is_none());
    }

    #[test]
    fn quorum_failure_is_terminal_state() {
        let mut round = VotingRound::open(&schedule(0), 2, at(999), 100, 30, 10);
        round.votes = 20;
        round.choice_votes = vec![0, 20, 0];
        assert_eq!(round.state_at(at(1_160)), RoundState::QuorumNotReached);
        assert_eq!(round.ruling(), Party::None);
        round.votes = 30;
        round.choice_votes = vec![0, 30, 0];
        assert_eq!(round.state_at(at(1_160)), RoundState::Solved);
        assert_eq!(round.ruling(), Party::Requester);
    }

    #[test]
    fn ties_have_no_winner() {
        assert_eq!(winning_choice(&[0, 0, 0]), 0);
        assert_eq!(winning_choice(&[0, 5, 5]), 0);
        assert_eq!(winning_choice(&[0, 5, 3]), 1);
        assert_eq!(winning_choice(&[0, 3, 5]), 2);
        assert_eq!(winning_choice(&[9, 3, 5]), 2);
    }

    #[test]
    fn every_instant_has_one_state() {
        let round = VotingRound::open(&schedule(40), 2, at(999), 100, 0, 10);
        let mut last = RoundState::Pending;
        let order = |s: RoundState| match s {
            RoundState::Pending => 0,
            RoundState::Active => 1,
            RoundState::Reveal => 2,
            RoundState::Appealable => 3,
            RoundState::Solved | RoundState::QuorumNotReached => 4,
        };
        for t in 990..1_300 {
            let s = round.state_at(at(t));
            assert!(order(s) >= order(last), "phase went backwards at {t}");
            last = s;
        }
        assert!(last.is_final());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn winner_has_strictly_most_votes(a in 0u128..1_000, b in 0u128..1_000) {
                let tally = vec![0, a, b];
                match winning_choice(&tally) {
                    0 => prop_assert_eq!(a, b),
                    1 => prop_assert!(a > b),
                    2 => prop_assert!(b > a),
                    other => prop_assert!(false, "unexpected choice {}", other),
                }
            }
        }
    }
}
