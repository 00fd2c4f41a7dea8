//! # Collaborator Interfaces
//!
//! The registry and the arbitrator only know each other, the asset ledger
//! and the registration hooks through the traits in this module. All of
//! them are object-safe and wired as `Arc<dyn _>` (or `Weak<dyn _>` for
//! the arbitrator's back-reference to its arbitrable).
//!
//! Every call that acts on behalf of an account takes the acting account
//! as an explicit `caller` argument. Authorization checks compare it with
//! the stored owner, governor, arbitrator or arbitrable address.

use serde::{Deserialize, Serialize};

use crate::capped::Amount;
use crate::error::{CallError, LedgerError};
use crate::identity::{Address, DisputeId, ItemId};
use crate::party::Party;
use crate::temporal::Timestamp;

/// Externally visible status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Voting has not finished yet.
    Waiting,
    /// A ruling is available and can still be appealed.
    Appealable,
    /// The ruling is final.
    Solved,
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Waiting => "WAITING",
            Self::Appealable => "APPEALABLE",
            Self::Solved => "SOLVED",
        })
    }
}

/// The window during which an appeal can be funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealPeriod {
    /// First instant inside the window.
    pub start: Timestamp,
    /// First instant after the window.
    pub end: Timestamp,
}

impl AppealPeriod {
    /// Whether `now` lies in `[start, end)`.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.start <= now && now < self.end
    }

    /// Length of the window in seconds.
    pub fn duration_secs(&self) -> u64 {
        self.end.secs_since(&self.start)
    }
}

/// An arbitration service that resolves disputes raised by an arbitrable.
pub trait Arbitrator: Send + Sync {
    /// Account address of the arbitrator (escrows arbitration costs).
    fn address(&self) -> Address;

    /// Cost of raising a dispute with `extra_data`.
    fn arbitration_cost(&self, extra_data: &[u8]) -> Amount;

    /// Raise a dispute with `choices` ruling options. The arbitrator pulls
    /// [`arbitration_cost`](Self::arbitration_cost) from `caller`, which
    /// must have approved it beforehand.
    fn create_dispute(
        &self,
        caller: Address,
        choices: u32,
        extra_data: &[u8],
    ) -> Result<DisputeId, CallError>;

    /// Cost of appealing the current ruling of `dispute_id`.
    fn appeal_cost(&self, dispute_id: DisputeId, extra_data: &[u8]) -> Result<Amount, CallError>;

    /// Appeal the current ruling, pulling [`appeal_cost`](Self::appeal_cost)
    /// from `caller`.
    fn appeal(&self, caller: Address, dispute_id: DisputeId, extra_data: &[u8])
        -> Result<(), CallError>;

    /// The current appeal window, or `None` if the dispute is not
    /// appealable at this point.
    fn appeal_period(&self, dispute_id: DisputeId) -> Result<Option<AppealPeriod>, CallError>;

    /// Status of the dispute at the current time.
    fn dispute_status(&self, dispute_id: DisputeId) -> Result<DisputeStatus, CallError>;

    /// Ruling the dispute would produce if it ended now.
    fn current_ruling(&self, dispute_id: DisputeId) -> Result<Party, CallError>;
}

/// A component that accepts rulings from an arbitrator.
pub trait Arbitrable: Send + Sync {
    /// Account address of the arbitrable.
    fn address(&self) -> Address;

    /// Deliver the final `ruling` (`0` = none, `1` = requester,
    /// `2` = challenger) for `dispute_id`.
    fn rule(&self, caller: Address, dispute_id: DisputeId, ruling: u32) -> Result<(), CallError>;
}

/// A fungible asset ledger with historical balance snapshots.
///
/// `transfer` debits `from` directly and is only invoked by the holder of
/// `from` (or to compensate an earlier transfer by the same holder);
/// `transfer_from` debits through an allowance.
pub trait AssetLedger: Send + Sync {
    /// Account address of the ledger itself.
    fn address(&self) -> Address;

    /// Current balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Set the allowance of `spender` over `owner`'s funds.
    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Current allowance of `spender` over `owner`'s funds.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Voting power of `account` at `timepoint`.
    fn past_votes(&self, account: &Address, timepoint: Timestamp) -> Amount;

    /// Total supply at `timepoint`.
    fn past_total_supply(&self, timepoint: Timestamp) -> Amount;

    /// Current total supply.
    fn total_supply(&self) -> Amount;
}

/// Notified when an item enters or leaves the registry.
pub trait RegistryHooks: Send + Sync {
    /// The item reached `Registered`.
    fn on_item_registered(&self, item_id: &ItemId, data: &[u8]) -> Result<(), CallError>;

    /// The item went from `ClearingRequested` back to `Absent`.
    fn on_item_removed(&self, item_id: &ItemId) -> Result<(), CallError>;
}

/// Hooks that accept every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl RegistryHooks for NoopHooks {
    fn on_item_registered(&self, _item_id: &ItemId, _data: &[u8]) -> Result<(), CallError> {
        Ok(())
    }

    fn on_item_removed(&self, _item_id: &ItemId) -> Result<(), CallError> {
        Ok(())
    }
}

/// External oracle deciding whether `submitter` may list `data`
/// (e.g. proves ownership of, or delegation over, the listed account).
pub trait ItemDataVerifier: Send + Sync {
    /// Whether the submission is acceptable.
    fn verify(&self, submitter: &Address, data: &[u8]) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn appeal_period_is_half_open() {
        let p = AppealPeriod { start: at(100), end: at(200) };
        assert!(!p.contains(at(99)));
        assert!(p.contains(at(100)));
        assert!(p.contains(at(199)));
        assert!(!p.contains(at(200)));
        assert_eq!(p.duration_secs(), 100);
    }

    #[test]
    fn noop_hooks_accept() {
        let id = ItemId::from_content(b"x").unwrap();
        assert!(NoopHooks.on_item_registered(&id, b"x").is_ok());
        assert!(NoopHooks.on_item_removed(&id).is_ok());
    }

    #[test]
    fn traits_are_object_safe() {
        fn _arbitrator(_: &dyn Arbitrator) {}
        fn _arbitrable(_: &dyn Arbitrable) {}
        fn _ledger(_: &dyn AssetLedger) {}
        fn _hooks(_: &dyn RegistryHooks) {}
        fn _verifier(_: &dyn ItemDataVerifier) {}
    }
}
