//! # Dispute simulation
//!
//! `tcr simulate [scenario.yaml]` wires a registry and a commit-reveal
//! arbitrator over the in-memory ledger with a manual clock, then plays one
//! full dispute: submit, challenge, commit, reveal, execute the ruling and
//! withdraw every reward. The report (final balances and both event logs)
//! is printed as JSON.
//!
//! ```yaml
//! item: "0xdeadbeef token listing"
//! party_funds: 100000
//! voters:
//!   - { weight: 100, choice: 1 }
//!   - { weight: 60, choice: 2, reason: "duplicate entry" }
//! config:
//!   arbitrator:
//!     quorum_bps: 2000
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use tcr_arbitration::{commit_hash, ArbitratorEvent, CommitRevealArbitrator};
use tcr_core::{
    Address, Amount, Arbitrable, AssetLedger, DisputeId, ItemId, ManualClock, Party, Timestamp,
    RULING_OPTIONS,
};
use tcr_registry::{GeneralizedTcr, ItemStatus, RegistryEvent};
use tcr_token::InMemoryToken;

use crate::config::TcrConfig;

const START_EPOCH: i64 = 1_700_000_000;
const TOKEN: Address = Address::new([0xee; 20]);
const REGISTRY: Address = Address::new([0x7e; 20]);
const ARBITRATOR: Address = Address::new([0xab; 20]);
const GOVERNOR: Address = Address::new([0x0e; 20]);
const OWNER: Address = Address::new([0x0f; 20]);
const REQUESTER: Address = Address::new([0x01; 20]);
const CHALLENGER: Address = Address::new([0x02; 20]);
const MAX_VOTERS: usize = 200;
const VOTER_PREFIX: u8 = 0x50;

/// One voter of the simulated round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSpec {
    /// Tokens held at the snapshot.
    pub weight: Amount,
    /// 1 = requester, 2 = challenger.
    pub choice: u32,
    #[serde(default)]
    pub reason: String,
}

/// A simulated dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: TcrConfig,
    /// Item data submitted by the requester.
    pub item: String,
    /// Starting balance of the requester and of the challenger.
    pub party_funds: Amount,
    pub voters: Vec<VoterSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        let voter = |choice| VoterSpec {
            weight: 100,
            choice,
            reason: String::new(),
        };
        Self {
            config: TcrConfig::default(),
            item: "example-item".to_string(),
            party_funds: 100_000,
            voters: vec![voter(1), voter(1), voter(2)],
        }
    }
}

impl Scenario {
    /// Load a scenario from YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario: {}", path.display()))?;
        serde_yaml::from_str(&text).context("invalid scenario YAML")
    }
}

/// Outcome of a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub item_id: ItemId,
    pub dispute_id: DisputeId,
    pub ruling: Party,
    pub status: ItemStatus,
    pub balances: BTreeMap<String, Amount>,
    pub registry_events: Vec<RegistryEvent>,
    pub arbitrator_events: Vec<ArbitratorEvent>,
}

/// `0x50` followed by the big-endian index. The fixed accounts repeat one
/// byte across all 20, so the two ranges never meet.
fn voter_address(index: usize) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = VOTER_PREFIX;
    bytes[12..].copy_from_slice(&(index as u64).to_be_bytes());
    Address::new(bytes)
}

fn salt(index: usize) -> Vec<u8> {
    let mut salt = b"simulation-salt-".to_vec();
    salt.extend_from_slice(&(index as u64).to_be_bytes());
    salt
}

/// Play `scenario` to completion.
pub fn simulate(scenario: &Scenario) -> Result<SimulationReport> {
    scenario.config.validate()?;
    anyhow::ensure!(!scenario.voters.is_empty(), "scenario needs at least one voter");
    anyhow::ensure!(
        scenario.voters.len() <= MAX_VOTERS,
        "at most {MAX_VOTERS} voters are supported"
    );
    for (i, voter) in scenario.voters.iter().enumerate() {
        anyhow::ensure!(
            (1..=RULING_OPTIONS).contains(&voter.choice),
            "voter {i} has invalid choice {}",
            voter.choice
        );
    }

    let clock = Arc::new(ManualClock::new(Timestamp::from_epoch_secs(START_EPOCH)?));
    let token = Arc::new(InMemoryToken::new(TOKEN, clock.clone()));
    for party in [REQUESTER, CHALLENGER] {
        token.mint(party, scenario.party_funds)?;
        token.approve(party, REGISTRY, Amount::MAX)?;
    }
    for (i, voter) in scenario.voters.iter().enumerate() {
        token.mint(voter_address(i), voter.weight)?;
    }

    let params = scenario.config.arbitrator.clone();
    let arbitrator = Arc::new(CommitRevealArbitrator::new(
        ARBITRATOR,
        OWNER,
        REGISTRY,
        token.clone(),
        clock.clone(),
        params.clone(),
    )?);
    let registry = Arc::new(GeneralizedTcr::new(
        REGISTRY,
        GOVERNOR,
        arbitrator.clone(),
        token.clone(),
        clock.clone(),
        scenario.config.registry.clone(),
    )?);
    let arbitrable: Arc<dyn Arbitrable> = registry.clone();
    arbitrator.connect_arbitrable(&arbitrable)?;
    clock.advance(10);

    let item_id = registry.submit_item(REQUESTER, scenario.item.as_bytes())?;
    clock.advance(1);
    let dispute_id = registry.challenge_request(CHALLENGER, item_id, Some("/ipfs/challenge.json"))?;
    tracing::info!(%item_id, %dispute_id, "simulation: request challenged");

    clock.advance(params.voting_delay_secs);
    for (i, voter) in scenario.voters.iter().enumerate() {
        let hash = commit_hash(voter.choice, &voter.reason, &salt(i))?;
        arbitrator.commit_vote(voter_address(i), dispute_id, hash)?;
    }
    clock.advance(params.voting_period_secs);
    for (i, voter) in scenario.voters.iter().enumerate() {
        arbitrator.reveal_vote(dispute_id, voter_address(i), voter.choice, &voter.reason, &salt(i))?;
    }
    clock.advance(params.reveal_period_secs.saturating_add(params.appeal_period_secs));

    let ruling = arbitrator.execute_ruling(dispute_id)?;
    tracing::info!(%dispute_id, %ruling, "simulation: ruling executed");

    let winning = arbitrator.voting_round_info(dispute_id, 0)?.winning_choice;
    let total_votes = arbitrator.get_total_votes_by_round(dispute_id, 0)?;
    if total_votes > 0 {
        for (i, voter) in scenario.voters.iter().enumerate() {
            if winning == 0 || voter.choice == winning {
                arbitrator.withdraw_voter_rewards(dispute_id, 0, voter_address(i))?;
            }
        }
    }
    let rounds = registry.get_request_info(&item_id, 0)?.number_of_rounds;
    for round in 0..rounds {
        for party in [REQUESTER, CHALLENGER] {
            registry.withdraw_fees_and_rewards(party, item_id, 0, round)?;
        }
    }

    let mut balances = BTreeMap::new();
    balances.insert("requester".to_string(), token.balance_of(&REQUESTER));
    balances.insert("challenger".to_string(), token.balance_of(&CHALLENGER));
    balances.insert("registry".to_string(), token.balance_of(&REGISTRY));
    balances.insert("arbitrator".to_string(), token.balance_of(&ARBITRATOR));
    for i in 0..scenario.voters.len() {
        balances.insert(format!("voter-{i}"), token.balance_of(&voter_address(i)));
    }

    Ok(SimulationReport {
        item_id,
        dispute_id,
        ruling,
        status: registry.get_item_info(&item_id)?.status,
        balances,
        registry_events: registry.events(),
        arbitrator_events: arbitrator.events(),
    })
}

/// Simulation arguments.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario YAML. The built-in scenario runs when omitted.
    pub path: Option<PathBuf>,

    /// Print only the summary, without event logs.
    #[arg(long)]
    pub summary: bool,
}

/// Execute the simulate subcommand.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let mut scenario = match &args.path {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    scenario.config.apply_overrides(std::env::vars())?;
    let mut report = simulate(&scenario)?;
    if args.summary {
        report.registry_events.clear();
        report.arbitrator_events.clear();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_for_requester_registers_item() {
        let report = simulate(&Scenario::default()).unwrap();
        assert_eq!(report.ruling, Party::Requester);
        assert_eq!(report.status, ItemStatus::Registered);
        // Deposits: 1000 cost + 1000 base each side; pool 3000 to the winner.
        assert_eq!(report.balances["requester"], 101_000);
        assert_eq!(report.balances["challenger"], 98_000);
        assert_eq!(report.balances["registry"], 0);
        assert_eq!(report.balances["voter-0"], 600);
        assert_eq!(report.balances["voter-1"], 600);
        assert_eq!(report.balances["voter-2"], 100);
        assert_eq!(report.balances["arbitrator"], 0);
    }

    #[test]
    fn tie_refuses_to_rule() {
        let scenario = Scenario {
            voters: vec![
                VoterSpec { weight: 50, choice: 1, reason: String::new() },
                VoterSpec { weight: 50, choice: 2, reason: String::new() },
            ],
            ..Default::default()
        };
        let report = simulate(&scenario).unwrap();
        assert_eq!(report.ruling, Party::None);
        assert_eq!(report.status, ItemStatus::Absent);
        assert_eq!(report.balances["requester"], 99_500);
        assert_eq!(report.balances["challenger"], 99_500);
        assert_eq!(report.balances["voter-0"], 550);
        assert_eq!(report.balances["voter-1"], 550);
    }

    #[test]
    fn scenario_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        std::fs::write(
            &path,
            "item: listed\nvoters:\n  - { weight: 10, choice: 2, reason: spam }\n",
        )
        .unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.party_funds, 100_000);
        let report = simulate(&scenario).unwrap();
        assert_eq!(report.ruling, Party::Challenger);
        assert_eq!(report.status, ItemStatus::Absent);
        assert!(report
            .arbitrator_events
            .iter()
            .any(|e| matches!(e, ArbitratorEvent::RulingExecuted { .. })));
        serde_json::to_string(&report).unwrap();
    }

    #[test]
    fn voter_accounts_never_alias_fixed_accounts() {
        let fixed = [TOKEN, REGISTRY, ARBITRATOR, GOVERNOR, OWNER, REQUESTER, CHALLENGER];
        for i in 0..MAX_VOTERS {
            assert!(!fixed.contains(&voter_address(i)), "voter {i} aliases a fixed account");
        }

        let scenario = Scenario {
            voters: (0..MAX_VOTERS)
                .map(|i| VoterSpec {
                    weight: 1,
                    choice: if i % 3 == 0 { 2 } else { 1 },
                    reason: String::new(),
                })
                .collect(),
            ..Default::default()
        };
        let report = simulate(&scenario).unwrap();
        assert_eq!(report.ruling, Party::Requester);
        assert_eq!(report.balances.len(), MAX_VOTERS + 4);
        let held: Amount = report.balances.values().sum();
        assert_eq!(held, 2 * scenario.party_funds + MAX_VOTERS as Amount);
        assert_eq!(report.balances["voter-0"], 1);
    }

    #[test]
    fn invalid_choice_rejected() {
        let scenario = Scenario {
            voters: vec![VoterSpec { weight: 1, choice: 3, reason: String::new() }],
            ..Default::default()
        };
        assert!(simulate(&scenario).is_err());
    }
}
