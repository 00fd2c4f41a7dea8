//! Governor-gated setters.
//!
//! Pending requests keep the arbitrator, extra data and meta-evidence they
//! were created with; deposits and multipliers apply from the next call.

use std::sync::Arc;

use tcr_core::{Address, Amount, Arbitrator};

use crate::config::{validate_challenge_period, validate_meta_evidence, validate_multiplier, RegistryParams};
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::item::ArbitratorRef;
use crate::registry::GeneralizedTcr;

impl GeneralizedTcr {
    fn update_params(
        &self,
        caller: Address,
        name: &'static str,
        value: String,
        apply: impl FnOnce(&mut RegistryParams),
    ) -> Result<(), RegistryError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        state.require_governor(caller)?;
        let mut candidate = state.params.clone();
        apply(&mut candidate);
        candidate.validate()?;
        state.params = candidate;
        state.events.push(RegistryEvent::ParameterChanged {
            name: name.to_string(),
            value: value.clone(),
        });
        tracing::info!(parameter = name, %value, "registry parameter changed");
        Ok(())
    }

    /// Set how long new and pending requests stay open to challenges.
    pub fn change_challenge_period(&self, caller: Address, secs: u64) -> Result<(), RegistryError> {
        validate_challenge_period(secs)?;
        self.update_params(caller, "challenge_period_secs", secs.to_string(), |p| {
            p.challenge_period_secs = secs
        })
    }

    /// Base deposit for new registration requests.
    pub fn change_submission_base_deposit(&self, caller: Address, amount: Amount) -> Result<(), RegistryError> {
        self.update_params(caller, "submission_base_deposit", amount.to_string(), |p| {
            p.submission_base_deposit = amount
        })
    }

    /// Base deposit for new removal requests.
    pub fn change_removal_base_deposit(&self, caller: Address, amount: Amount) -> Result<(), RegistryError> {
        self.update_params(caller, "removal_base_deposit", amount.to_string(), |p| {
            p.removal_base_deposit = amount
        })
    }

    /// Base deposit for challenging a registration request.
    pub fn change_submission_challenge_base_deposit(
        &self,
        caller: Address,
        amount: Amount,
    ) -> Result<(), RegistryError> {
        self.update_params(caller, "submission_challenge_base_deposit", amount.to_string(), |p| {
            p.submission_challenge_base_deposit = amount
        })
    }

    /// Base deposit for challenging a removal request.
    pub fn change_removal_challenge_base_deposit(
        &self,
        caller: Address,
        amount: Amount,
    ) -> Result<(), RegistryError> {
        self.update_params(caller, "removal_challenge_base_deposit", amount.to_string(), |p| {
            p.removal_challenge_base_deposit = amount
        })
    }

    /// Multiplier applied when the current ruling has no winner.
    pub fn change_shared_stake_multiplier(&self, caller: Address, bps: u64) -> Result<(), RegistryError> {
        validate_multiplier("shared_stake_multiplier", bps)?;
        self.update_params(caller, "shared_stake_multiplier", bps.to_string(), |p| {
            p.shared_stake_multiplier = bps
        })
    }

    /// Multiplier applied to the side the current ruling favors.
    pub fn change_winner_stake_multiplier(&self, caller: Address, bps: u64) -> Result<(), RegistryError> {
        validate_multiplier("winner_stake_multiplier", bps)?;
        self.update_params(caller, "winner_stake_multiplier", bps.to_string(), |p| {
            p.winner_stake_multiplier = bps
        })
    }

    /// Multiplier applied to the side the current ruling disfavors.
    pub fn change_loser_stake_multiplier(&self, caller: Address, bps: u64) -> Result<(), RegistryError> {
        validate_multiplier("loser_stake_multiplier", bps)?;
        self.update_params(caller, "loser_stake_multiplier", bps.to_string(), |p| {
            p.loser_stake_multiplier = bps
        })
    }

    /// Route new requests to `arbitrator` with `extra_data`.
    pub fn change_arbitrator(
        &self,
        caller: Address,
        arbitrator: Arc<dyn Arbitrator>,
        extra_data: Vec<u8>,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        state.require_governor(caller)?;
        let address = arbitrator.address();
        if address.is_zero() {
            return Err(RegistryError::ZeroAddress { role: "arbitrator" });
        }
        state.arbitrator = ArbitratorRef(arbitrator);
        state.params.arbitrator_extra_data = extra_data.clone();
        state.events.push(RegistryEvent::ArbitratorChanged {
            arbitrator: address,
            extra_data,
        });
        tracing::info!(arbitrator = %address, "registry arbitrator changed");
        Ok(())
    }

    /// Publish new meta-evidence for both request kinds. Pending requests
    /// keep referring to the meta-evidence they were created under.
    pub fn change_meta_evidence(
        &self,
        caller: Address,
        registration: String,
        clearing: String,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter()?;
        validate_meta_evidence("registration_meta_evidence", &registration)?;
        validate_meta_evidence("clearing_meta_evidence", &clearing)?;
        let mut state = self.state.lock();
        state.require_governor(caller)?;
        state.meta_evidence_updates = state.meta_evidence_updates.saturating_add(1);
        let base = state.meta_evidence_updates.saturating_mul(2);
        state.params.registration_meta_evidence = registration.clone();
        state.params.clearing_meta_evidence = clearing.clone();
        state.events.push(RegistryEvent::MetaEvidence {
            meta_evidence_id: base,
            uri: registration,
        });
        state.events.push(RegistryEvent::MetaEvidence {
            meta_evidence_id: base.saturating_add(1),
            uri: clearing,
        });
        tracing::info!(updates = state.meta_evidence_updates, "meta-evidence updated");
        Ok(())
    }

    /// Hand governance to `new_governor`.
    pub fn change_governor(&self, caller: Address, new_governor: Address) -> Result<(), RegistryError> {
        let _entered = self.enter()?;
        let mut state = self.state.lock();
        state.require_governor(caller)?;
        if new_governor.is_zero() {
            return Err(RegistryError::ZeroAddress { role: "governor" });
        }
        let previous = std::mem::replace(&mut state.governor, new_governor);
        state.events.push(RegistryEvent::GovernorChanged {
            previous,
            governor: new_governor,
        });
        tracing::info!(%previous, governor = %new_governor, "registry governor changed");
        Ok(())
    }
}
