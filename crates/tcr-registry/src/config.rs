//! # Registry Parameters
//!
//! Deposits are in the ledger's smallest unit. Stake multipliers are basis
//! points over [`MULTIPLIER_DIVISOR`]: the stake a side must raise to fund
//! an appeal is `appeal_cost + appeal_cost * multiplier / 10_000`.

use serde::{Deserialize, Serialize};

use tcr_core::{Amount, CanonicalizationError, ItemId, MULTIPLIER_DIVISOR};

use crate::error::RegistryError;

const DAY: u64 = 24 * 60 * 60;

/// Longest accepted challenge period.
pub const MAX_CHALLENGE_PERIOD: u64 = 365 * DAY;
/// Largest accepted stake multiplier (100x).
pub const MAX_STAKE_MULTIPLIER: u64 = 100 * MULTIPLIER_DIVISOR;

/// How item ids are derived from item data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemIdScheme {
    /// `sha256(data)`: the same data is always the same item.
    #[default]
    ContentHash,
    /// `sha256(data, item_count)`: every submission creates a new item.
    Sequential,
}

impl ItemIdScheme {
    /// Id of `data` when it would be the `item_count`-th item.
    pub fn derive(&self, data: &[u8], item_count: usize) -> Result<ItemId, CanonicalizationError> {
        match self {
            Self::ContentHash => ItemId::from_content(data),
            Self::Sequential => ItemId::from_sequence(data, item_count as u64),
        }
    }
}

/// Tunable parameters of a [`GeneralizedTcr`](crate::GeneralizedTcr).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryParams {
    /// Seconds after submission during which a request can be challenged.
    pub challenge_period_secs: u64,
    /// Requester deposit for a registration, on top of the arbitration cost.
    pub submission_base_deposit: Amount,
    /// Requester deposit for a removal, on top of the arbitration cost.
    pub removal_base_deposit: Amount,
    /// Challenger deposit against a registration.
    pub submission_challenge_base_deposit: Amount,
    /// Challenger deposit against a removal.
    pub removal_challenge_base_deposit: Amount,
    /// Multiplier for both sides when the current ruling has no winner.
    pub shared_stake_multiplier: u64,
    /// Multiplier for the side the current ruling favours.
    pub winner_stake_multiplier: u64,
    /// Multiplier for the side the current ruling goes against.
    pub loser_stake_multiplier: u64,
    /// Extra data passed to the arbitrator.
    pub arbitrator_extra_data: Vec<u8>,
    /// URI describing what registration requests are about.
    pub registration_meta_evidence: String,
    /// URI describing what removal requests are about.
    pub clearing_meta_evidence: String,
    /// Item id derivation.
    pub item_id_scheme: ItemIdScheme,
}

impl Default for RegistryParams {
    fn default() -> Self {
        Self {
            challenge_period_secs: 3 * DAY,
            submission_base_deposit: 1_000,
            removal_base_deposit: 1_000,
            submission_challenge_base_deposit: 1_000,
            removal_challenge_base_deposit: 1_000,
            shared_stake_multiplier: MULTIPLIER_DIVISOR,
            winner_stake_multiplier: MULTIPLIER_DIVISOR,
            loser_stake_multiplier: 2 * MULTIPLIER_DIVISOR,
            arbitrator_extra_data: Vec::new(),
            registration_meta_evidence: "/ipfs/registration-policy.json".to_string(),
            clearing_meta_evidence: "/ipfs/clearing-policy.json".to_string(),
            item_id_scheme: ItemIdScheme::ContentHash,
        }
    }
}

impl RegistryParams {
    /// Check every field against its bounds.
    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_challenge_period(self.challenge_period_secs)?;
        validate_multiplier("shared_stake_multiplier", self.shared_stake_multiplier)?;
        validate_multiplier("winner_stake_multiplier", self.winner_stake_multiplier)?;
        validate_multiplier("loser_stake_multiplier", self.loser_stake_multiplier)?;
        validate_meta_evidence("registration_meta_evidence", &self.registration_meta_evidence)?;
        validate_meta_evidence("clearing_meta_evidence", &self.clearing_meta_evidence)?;
        Ok(())
    }
}

pub(crate) fn validate_challenge_period(secs: u64) -> Result<(), RegistryError> {
    if secs == 0 || secs > MAX_CHALLENGE_PERIOD {
        return Err(RegistryError::InvalidParameter {
            name: "challenge_period_secs",
            reason: format!("{secs} outside [1, {MAX_CHALLENGE_PERIOD}]"),
        });
    }
    Ok(())
}

pub(crate) fn validate_multiplier(name: &'static str, bps: u64) -> Result<(), RegistryError> {
    if bps > MAX_STAKE_MULTIPLIER {
        return Err(RegistryError::InvalidParameter {
            name,
            reason: format!("{bps} bps exceeds {MAX_STAKE_MULTIPLIER}"),
        });
    }
    Ok(())
}

pub(crate) fn validate_meta_evidence(name: &'static str, uri: &str) -> Result<(), RegistryError> {
    if uri.trim().is_empty() {
        return Err(RegistryError::InvalidParameter {
            name,
            reason: "empty meta-evidence".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        RegistryParams::default().validate().unwrap();
    }

    #[test]
    fn zero_challenge_period_rejected() {
        let params = RegistryParams {
            challenge_period_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            RegistryError::InvalidParameter { name: "challenge_period_secs", .. }
        ));
    }

    #[test]
    fn empty_meta_evidence_rejected() {
        let params = RegistryParams {
            clearing_meta_evidence: "  ".to_string(),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn absurd_multiplier_rejected() {
        let params = RegistryParams {
            loser_stake_multiplier: MAX_STAKE_MULTIPLIER + 1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn schemes_differ() {
        let a = ItemIdScheme::ContentHash.derive(b"x", 0).unwrap();
        let b = ItemIdScheme::ContentHash.derive(b"x", 5).unwrap();
        let c = ItemIdScheme::Sequential.derive(b"x", 5).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn scheme_parses_snake_case() {
        let params: RegistryParams =
            serde_json::from_str(r#"{"item_id_scheme": "sequential"}"#).unwrap();
        assert_eq!(params.item_id_scheme, ItemIdScheme::Sequential);
    }
}
