//! # Stake Ledger
//!
//! Per-round accounting of crowdfunded stakes and the reward formula that
//! splits a round's pool once the request it belongs to is resolved.
//!
//! ## Reward formula
//!
//! For a resolved round with per-side totals `P`, pool `F` and a
//! beneficiary's contributions `c`:
//!
//! - if either side never fully paid: `c[Requester] + c[Challenger]` (refund);
//! - else if the ruling is `None`: each side's contribution takes its share
//!   of `F` in proportion to `P[Requester] + P[Challenger]`;
//! - else: `c[ruling] * F / P[ruling]`. Losing contributions were already
//!   absorbed into `F`.
//!
//! ## Invariant
//!
//! Every share is `floor(part * pool / total)` with the product taken
//! first. Claimants are always rounded down, so the sum of all payouts
//! never exceeds the pool; the residue stays with the holder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capped::{Amount, CappedMath};
use crate::identity::Address;
use crate::party::{Party, Sides};

/// `floor(part * pool / total)`, or zero when `total` is zero.
pub fn proportional_share(part: Amount, pool: Amount, total: Amount) -> Amount {
    if total == 0 {
        return 0;
    }
    part.mul_cap(pool) / total
}

/// Reward owed to a beneficiary with contributions `contribution` in a
/// resolved round.
pub fn compute_reward(
    contribution: &Sides<Amount>,
    amount_paid: &Sides<Amount>,
    has_paid: &Sides<bool>,
    fee_rewards: Amount,
    ruling: Party,
) -> Amount {
    if !has_paid[Party::Requester] || !has_paid[Party::Challenger] {
        return contribution[Party::Requester].add_cap(contribution[Party::Challenger]);
    }
    match ruling {
        Party::None => {
            let total = amount_paid[Party::Requester].add_cap(amount_paid[Party::Challenger]);
            let requester_share = if amount_paid[Party::Requester] > 0 {
                proportional_share(contribution[Party::Requester], fee_rewards, total)
            } else {
                0
            };
            let challenger_share = if amount_paid[Party::Challenger] > 0 {
                proportional_share(contribution[Party::Challenger], fee_rewards, total)
            } else {
                0
            };
            requester_share.add_cap(challenger_share)
        }
        winner => proportional_share(contribution[winner], fee_rewards, amount_paid[winner]),
    }
}

/// One funding cycle of a request: the initial deposits, or one appeal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRound {
    /// Total paid per side.
    pub amount_paid: Sides<Amount>,
    /// Whether each side reached its required stake.
    pub has_paid: Sides<bool>,
    /// Contributions per contributor, per side.
    pub contributions: BTreeMap<Address, Sides<Amount>>,
    /// Distributable pool: contributions minus the fees consumed by the
    /// dispute or appeal this round paid for.
    pub fee_rewards: Amount,
}

impl ContributionRound {
    /// Create an empty round.
    pub fn new() -> Self {
        Self::default()
    }

    /// The part of `offered` that `side` still needs to reach
    /// `total_required`. Anything above it is never taken.
    pub fn contribution_for(&self, side: Party, offered: Amount, total_required: Amount) -> Amount {
        let remaining = total_required.sub_cap(self.amount_paid[side]);
        offered.min(remaining)
    }

    /// Record an accepted contribution.
    pub fn record(&mut self, contributor: Address, side: Party, amount: Amount) {
        let entry = self.contributions.entry(contributor).or_default();
        entry[side] = entry[side].add_cap(amount);
        self.amount_paid[side] = self.amount_paid[side].add_cap(amount);
        self.fee_rewards = self.fee_rewards.add_cap(amount);
    }

    /// Mark `side` as fully funded if it reached `total_required`.
    /// Returns whether the side is (now) fully funded.
    pub fn settle_side(&mut self, side: Party, total_required: Amount) -> bool {
        if self.amount_paid[side] >= total_required {
            self.has_paid[side] = true;
        }
        self.has_paid[side]
    }

    /// Whether both sides are fully funded.
    pub fn both_paid(&self) -> bool {
        self.has_paid[Party::Requester] && self.has_paid[Party::Challenger]
    }

    /// Remove the arbitration or appeal fee paid out of this round's pool.
    pub fn consume_fee(&mut self, fee: Amount) {
        self.fee_rewards = self.fee_rewards.sub_cap(fee);
    }

    /// Contributions of `contributor` (zero if none).
    pub fn contributions_of(&self, contributor: &Address) -> Sides<Amount> {
        self.contributions.get(contributor).copied().unwrap_or_default()
    }

    /// Reward owed to `beneficiary` under `ruling`, without mutating.
    pub fn reward_for(&self, beneficiary: &Address, ruling: Party) -> Amount {
        compute_reward(
            &self.contributions_of(beneficiary),
            &self.amount_paid,
            &self.has_paid,
            self.fee_rewards,
            ruling,
        )
    }

    /// Compute the reward owed to `beneficiary` and zero its contribution
    /// record. A second call returns zero.
    pub fn take_reward(&mut self, beneficiary: &Address, ruling: Party) -> Amount {
        let reward = self.reward_for(beneficiary, ruling);
        if let Some(entry) = self.contributions.get_mut(beneficiary) {
            *entry = Sides::default();
        }
        reward
    }
}
