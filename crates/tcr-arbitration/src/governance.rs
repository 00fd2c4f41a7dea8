//! Owner-gated parameter setters.
//!
//! Each setter validates the full candidate parameter set before swapping
//! it in. Open rounds keep the values they were opened with.

use tcr_core::{Address, Amount};

use crate::arbitrator::CommitRevealArbitrator;
use crate::config::ArbitratorParams;
use crate::error::ArbitratorError;
use crate::events::ArbitratorEvent;

impl CommitRevealArbitrator {
    fn update_params(
        &self,
        caller: Address,
        name: &'static str,
        value: String,
        apply: impl FnOnce(&mut ArbitratorParams),
    ) -> Result<(), ArbitratorError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        state.require_owner(caller)?;
        let mut candidate = state.params.clone();
        apply(&mut candidate);
        candidate.validate()?;
        state.params = candidate;
        state.events.push(ArbitratorEvent::ParameterChanged {
            name: name.to_string(),
            value: value.clone(),
        });
        tracing::info!(parameter = name, %value, "arbitrator parameter changed");
        Ok(())
    }

    /// Hand ownership to `new_owner`.
    pub fn change_owner(&self, caller: Address, new_owner: Address) -> Result<(), ArbitratorError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        state.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ArbitratorError::InvalidParameter {
                name: "owner",
                reason: "zero address".to_string(),
            });
        }
        let previous = std::mem::replace(&mut state.owner, new_owner);
        state.events.push(ArbitratorEvent::OwnerChanged {
            previous,
            owner: new_owner,
        });
        tracing::info!(%previous, owner = %new_owner, "arbitrator owner changed");
        Ok(())
    }

    /// Set the delay before voting starts.
    pub fn change_voting_delay(&self, caller: Address, secs: u64) -> Result<(), ArbitratorError> {
        self.update_params(caller, "voting_delay_secs", secs.to_string(), |p| {
            p.voting_delay_secs = secs
        })
    }

    /// Set the commit phase length.
    pub fn change_voting_period(&self, caller: Address, secs: u64) -> Result<(), ArbitratorError> {
        self.update_params(caller, "voting_period_secs", secs.to_string(), |p| {
            p.voting_period_secs = secs
        })
    }

    /// Set the reveal phase length.
    pub fn change_reveal_period(&self, caller: Address, secs: u64) -> Result<(), ArbitratorError> {
        self.update_params(caller, "reveal_period_secs", secs.to_string(), |p| {
            p.reveal_period_secs = secs
        })
    }

    /// Set the appeal window length. Zero disables appeals for new rounds.
    pub fn change_appeal_period(&self, caller: Address, secs: u64) -> Result<(), ArbitratorError> {
        self.update_params(caller, "appeal_period_secs", secs.to_string(), |p| {
            p.appeal_period_secs = secs
        })
    }

    /// Set the cost of raising a dispute.
    pub fn change_arbitration_cost(&self, caller: Address, cost: Amount) -> Result<(), ArbitratorError> {
        self.update_params(caller, "arbitration_cost", cost.to_string(), |p| {
            p.arbitration_cost = cost
        })
    }

    /// Set the base appeal cost.
    pub fn change_appeal_cost(&self, caller: Address, cost: Amount) -> Result<(), ArbitratorError> {
        self.update_params(caller, "appeal_cost", cost.to_string(), |p| p.appeal_cost = cost)
    }

    /// Set the quorum in basis points of the snapshot supply.
    pub fn change_quorum_bps(&self, caller: Address, bps: u64) -> Result<(), ArbitratorError> {
        self.update_params(caller, "quorum_bps", bps.to_string(), |p| p.quorum_bps = bps)
    }
}
