//! # In-Memory Token
//!
//! Balances, allowances and timestamped checkpoints behind one
//! `parking_lot::Mutex`. Voting power is the account balance
//! (every holder is self-delegated), checkpointed at the clock's current
//! instant on every balance change.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tcr_core::{Address, Amount, AssetLedger, Clock, LedgerError, Timestamp};

use crate::checkpoints::Checkpoints;

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    votes: HashMap<Address, Checkpoints>,
    supply: Checkpoints,
}

impl TokenState {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, account: Address, value: Amount, now: Timestamp) {
        self.balances.insert(account, value);
        self.votes.entry(account).or_default().push(now, value);
    }

    fn move_funds(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "sender" });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "recipient" });
        }
        let available = self.balance(&from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                required: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance(&to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                account: to.to_string(),
            })?;
        self.set_balance(from, available - amount, now);
        self.set_balance(to, credited, now);
        Ok(())
    }
}

/// A fungible token held entirely in memory.
pub struct InMemoryToken {
    address: Address,
    clock: Arc<dyn Clock>,
    state: Mutex<TokenState>,
}

impl InMemoryToken {
    /// Create an empty token living at `address`.
    pub fn new(address: Address, clock: Arc<dyn Clock>) -> Self {
        Self {
            address,
            clock,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Create `amount` new units for `to`.
    pub fn mint(&self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "recipient" });
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        let overflow = || LedgerError::Overflow {
            account: to.to_string(),
        };
        let balance = state.balance(&to).checked_add(amount).ok_or_else(overflow)?;
        let supply = state.supply.latest().checked_add(amount).ok_or_else(overflow)?;
        state.set_balance(to, balance, now);
        state.supply.push(now, supply);
        tracing::debug!(account = %to, amount, supply, "minted");
        Ok(())
    }

    /// Number of vote checkpoints written for `account`.
    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.state
            .lock()
            .votes
            .get(account)
            .map(Checkpoints::len)
            .unwrap_or(0)
    }

    /// All non-zero balances, ordered by address.
    pub fn balances(&self) -> BTreeMap<Address, Amount> {
        self.state
            .lock()
            .balances
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(k, v)| (*k, *v))
            .collect()
    }
}

impl std::fmt::Debug for InMemoryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryToken")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl AssetLedger for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.state.lock().balance(account)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let now = self.clock.now();
        self.state.lock().move_funds(from, to, amount, now)?;
        tracing::debug!(%from, %to, amount, "transfer");
        Ok(())
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<(), LedgerError> {
        if owner.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "owner" });
        }
        if spender.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "spender" });
        }
        self.state.lock().allowances.insert((owner, spender), amount);
        tracing::debug!(%owner, %spender, amount, "approve");
        Ok(())
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state
            .lock()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let allowed = state.allowances.get(&(from, spender)).copied().unwrap_or(0);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                required: amount,
                available: allowed,
            });
        }
        state.move_funds(from, to, amount, now)?;
        if allowed != Amount::MAX {
            state.allowances.insert((from, spender), allowed - amount);
        }
        drop(state);
        tracing::debug!(%spender, %from, %to, amount, "transfer_from");
        Ok(())
    }

    fn past_votes(&self, account: &Address, timepoint: Timestamp) -> Amount {
        self.state
            .lock()
            .votes
            .get(account)
            .map(|cp| cp.at(timepoint))
            .unwrap_or(0)
    }

    fn past_total_supply(&self, timepoint: Timestamp) -> Amount {
        self.state.lock().supply.at(timepoint)
    }

    fn total_supply(&self) -> Amount {
        self.state.lock().supply.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tcr_core::ManualClock;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn setup() -> (Arc<ManualClock>, InMemoryToken) {
        let clock = Arc::new(ManualClock::new(Timestamp::from_epoch_secs(1_000).unwrap()));
        let token = InMemoryToken::new(addr(0xee), clock.clone());
        (clock, token)
    }

    #[test]
    fn mint_and_transfer() {
        let (_, token) = setup();
        token.mint(addr(1), 100).unwrap();
        token.transfer(addr(1), addr(2), 30).unwrap();
        assert_eq!(token.balance_of(&addr(1)), 70);
        assert_eq!(token.balance_of(&addr(2)), 30);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let (_, token) = setup();
        token.mint(addr(1), 10).unwrap();
        let err = token.transfer(addr(1), addr(2), 11).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { required: 11, available: 10, .. }
        ));
        assert_eq!(token.balance_of(&addr(1)), 10);
    }

    #[test]
    fn zero_address_rejected() {
        let (_, token) = setup();
        assert!(token.mint(Address::ZERO, 1).is_err());
        token.mint(addr(1), 10).unwrap();
        assert!(token.transfer(addr(1), Address::ZERO, 1).is_err());
        assert!(token.approve(addr(1), Address::ZERO, 1).is_err());
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let (_, token) = setup();
        token.mint(addr(1), 100).unwrap();
        token.approve(addr(1), addr(9), 60).unwrap();
        token.transfer_from(addr(9), addr(1), addr(9), 40).unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(9)), 20);
        let err = token.transfer_from(addr(9), addr(1), addr(9), 21).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(token.balance_of(&addr(9)), 40);
    }

    #[test]
    fn unlimited_allowance_is_not_consumed() {
        let (_, token) = setup();
        token.mint(addr(1), 100).unwrap();
        token.approve(addr(1), addr(9), Amount::MAX).unwrap();
        token.transfer_from(addr(9), addr(1), addr(2), 50).unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(9)), Amount::MAX);
    }

    #[test]
    fn past_votes_follow_checkpoints() {
        let (clock, token) = setup();
        token.mint(addr(1), 100).unwrap();
        clock.advance(10);
        token.transfer(addr(1), addr(2), 40).unwrap();
        let t0 = Timestamp::from_epoch_secs(1_000).unwrap();
        let t1 = Timestamp::from_epoch_secs(1_010).unwrap();
        assert_eq!(token.past_votes(&addr(1), t0), 100);
        assert_eq!(token.past_votes(&addr(1), t1), 60);
        assert_eq!(token.past_votes(&addr(2), t0), 0);
        assert_eq!(token.past_votes(&addr(2), t1), 40);
        assert_eq!(token.past_total_supply(t0.saturating_sub_secs(1)), 0);
        assert_eq!(token.past_total_supply(t1), 100);
        assert_eq!(token.num_checkpoints(&addr(1)), 2);
    }

    proptest! {
        #[test]
        fn transfers_conserve_supply(moves in proptest::collection::vec((1u8..5, 1u8..5, 0u64..500), 0..40)) {
            let (_, token) = setup();
            for n in 1u8..5 {
                token.mint(addr(n), 1_000).unwrap();
            }
            for (from, to, amount) in moves {
                let _ = token.transfer(addr(from), addr(to), u128::from(amount));
            }
            let sum: u128 = token.balances().values().sum();
            prop_assert_eq!(sum, 4_000);
            prop_assert_eq!(token.total_supply(), 4_000);
        }
    }
}
