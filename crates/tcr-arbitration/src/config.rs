//! # Arbitrator Parameters
//!
//! Durations are whole seconds. Changes made through the owner setters
//! only affect rounds opened afterwards; a running round keeps the
//! deadlines, cost and quorum it was opened with.

use serde::{Deserialize, Serialize};

use tcr_core::{Amount, MULTIPLIER_DIVISOR};

use crate::error::ArbitratorError;

const DAY: u64 = 24 * 60 * 60;

/// Longest delay between dispute creation and the start of voting.
pub const MAX_VOTING_DELAY: u64 = 7 * DAY;
/// Shortest commit phase.
pub const MIN_VOTING_PERIOD: u64 = 1;
/// Longest commit phase.
pub const MAX_VOTING_PERIOD: u64 = 30 * DAY;
/// Shortest reveal phase.
pub const MIN_REVEAL_PERIOD: u64 = 1;
/// Longest reveal phase.
pub const MAX_REVEAL_PERIOD: u64 = 30 * DAY;
/// Longest appeal window. Zero disables appeals.
pub const MAX_APPEAL_PERIOD: u64 = 30 * DAY;
/// Quorum is expressed in basis points of the snapshot total supply.
pub const MAX_QUORUM_BPS: u64 = MULTIPLIER_DIVISOR;
/// Default number of appeals a dispute can go through.
pub const DEFAULT_MAX_APPEAL_ROUNDS: u32 = 3;

/// Tunable parameters of a [`CommitRevealArbitrator`](crate::CommitRevealArbitrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitratorParams {
    /// Seconds between dispute creation (or appeal) and the start of voting.
    pub voting_delay_secs: u64,
    /// Length of the commit phase.
    pub voting_period_secs: u64,
    /// Length of the reveal phase.
    pub reveal_period_secs: u64,
    /// Length of the appeal window after the reveal phase. Zero disables appeals.
    pub appeal_period_secs: u64,
    /// Cost of raising a dispute.
    pub arbitration_cost: Amount,
    /// Cost of the first appeal; doubles with every further round.
    pub appeal_cost: Amount,
    /// Quorum in basis points of the snapshot supply. Zero disables quorum.
    pub quorum_bps: u64,
    /// Maximum number of appeals per dispute.
    pub max_appeal_rounds: u32,
}

impl Default for ArbitratorParams {
    fn default() -> Self {
        Self {
            voting_delay_secs: 0,
            voting_period_secs: 3 * DAY,
            reveal_period_secs: 2 * DAY,
            appeal_period_secs: 2 * DAY,
            arbitration_cost: 1_000,
            appeal_cost: 1_000,
            quorum_bps: 0,
            max_appeal_rounds: DEFAULT_MAX_APPEAL_ROUNDS,
        }
    }
}

impl ArbitratorParams {
    /// Check every field against its bounds.
    pub fn validate(&self) -> Result<(), ArbitratorError> {
        check_range("voting_delay_secs", self.voting_delay_secs, 0, MAX_VOTING_DELAY)?;
        check_range(
            "voting_period_secs",
            self.voting_period_secs,
            MIN_VOTING_PERIOD,
            MAX_VOTING_PERIOD,
        )?;
        check_range(
            "reveal_period_secs",
            self.reveal_period_secs,
            MIN_REVEAL_PERIOD,
            MAX_REVEAL_PERIOD,
        )?;
        check_range("appeal_period_secs", self.appeal_period_secs, 0, MAX_APPEAL_PERIOD)?;
        check_range("quorum_bps", self.quorum_bps, 0, MAX_QUORUM_BPS)?;
        Ok(())
    }

    /// Whether rounds opened under these parameters can be appealed at all.
    pub fn appeals_enabled(&self) -> bool {
        self.appeal_period_secs > 0 && self.max_appeal_rounds > 0
    }
}

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<(), ArbitratorError> {
    if value < min || value > max {
        return Err(ArbitratorError::InvalidParameter {
            name,
            reason: format!("{value} outside [{min}, {max}]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ArbitratorParams::default().validate().unwrap();
        assert!(ArbitratorParams::default().appeals_enabled());
    }

    #[test]
    fn zero_voting_period_rejected() {
        let params = ArbitratorParams {
            voting_period_secs: 0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            ArbitratorError::InvalidParameter { name: "voting_period_secs", .. }
        ));
    }

    #[test]
    fn quorum_above_divisor_rejected() {
        let params = ArbitratorParams {
            quorum_bps: MAX_QUORUM_BPS + 1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn long_delay_rejected() {
        let params = ArbitratorParams {
            voting_delay_secs: MAX_VOTING_DELAY + 1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_appeal_period_disables_appeals() {
        let params = ArbitratorParams {
            appeal_period_secs: 0,
            ..Default::default()
        };
        params.validate().unwrap();
        assert!(!params.appeals_enabled());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let params: ArbitratorParams =
            serde_json::from_str(r#"{"voting_period_secs": 60, "quorum_bps": 2000}"#).unwrap();
        assert_eq!(params.voting_period_secs, 60);
        assert_eq!(params.quorum_bps, 2000);
        assert_eq!(params.max_appeal_rounds, DEFAULT_MAX_APPEAL_ROUNDS);
    }
}
