//! # Effect Journal
//!
//! Ledger effects of one registry call, recorded as they succeed. If the
//! journal is dropped without [`commit`](EffectJournal::commit), every
//! recorded effect is compensated in reverse order, so a call that fails
//! half-way leaves balances and allowances as they were.
//!
//! A compensation that itself fails is logged at `error` level with the
//! effect that could not be undone; it never panics.

use tcr_core::{Address, Amount, AssetLedger, LedgerError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Effect {
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        spender: Address,
        previous: Amount,
    },
}

/// Journal of ledger effects performed on behalf of the registry account.
pub(crate) struct EffectJournal<'a> {
    ledger: &'a dyn AssetLedger,
    registry: Address,
    done: Vec<Effect>,
    committed: bool,
}

impl<'a> EffectJournal<'a> {
    pub(crate) fn new(ledger: &'a dyn AssetLedger, registry: Address) -> Self {
        Self {
            ledger,
            registry,
            done: Vec::new(),
            committed: false,
        }
    }

    /// Pull `amount` from `from` into the registry through its allowance.
    pub(crate) fn pull(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.ledger
            .transfer_from(self.registry, from, self.registry, amount)?;
        self.done.push(Effect::Transfer {
            from,
            to: self.registry,
            amount,
        });
        Ok(())
    }

    /// Pay `amount` from the registry to `to`.
    pub(crate) fn pay(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.ledger.transfer(self.registry, to, amount)?;
        self.done.push(Effect::Transfer {
            from: self.registry,
            to,
            amount,
        });
        Ok(())
    }

    /// Let `spender` pull `amount` from the registry.
    pub(crate) fn approve(&mut self, spender: Address, amount: Amount) -> Result<(), LedgerError> {
        let previous = self.ledger.allowance(&self.registry, &spender);
        self.ledger.approve(self.registry, spender, amount)?;
        self.done.push(Effect::Approval { spender, previous });
        Ok(())
    }

    /// Keep every recorded effect.
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }

    fn compensate(&self, effect: &Effect) -> Result<(), LedgerError> {
        match effect {
            Effect::Transfer { from, to, amount } => self.ledger.transfer(*to, *from, *amount),
            Effect::Approval { spender, previous } => {
                self.ledger.approve(self.registry, *spender, *previous)
            }
        }
    }
}

impl Drop for EffectJournal<'_> {
    fn drop(&mut self) {
        if self.committed || self.done.is_empty() {
            return;
        }
        tracing::debug!(effects = self.done.len(), "rolling back ledger effects");
        for effect in self.done.iter().rev() {
            if let Err(err) = self.compensate(effect) {
                tracing::error!(?effect, error = %err, "compensation failed");
            }
        }
    }
}
