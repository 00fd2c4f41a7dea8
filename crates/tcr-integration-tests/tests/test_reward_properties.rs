//! Property tests over whole simulated disputes: whatever the vote, tokens
//! are neither created nor destroyed and the item ends up where the ruling
//! says.

use proptest::prelude::*;

use tcr_cli::simulate::{simulate, Scenario, VoterSpec};
use tcr_core::{Amount, Party};
use tcr_registry::ItemStatus;

fn voters() -> impl Strategy<Value = Vec<VoterSpec>> {
    prop::collection::vec(
        (1u128..1_000, 1u32..=2).prop_map(|(weight, choice)| VoterSpec {
            weight,
            choice,
            reason: String::new(),
        }),
        1..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn dispute_conserves_tokens(voters in voters()) {
        let scenario = Scenario { voters: voters.clone(), ..Default::default() };
        let report = simulate(&scenario).unwrap();

        let minted: Amount = 2 * scenario.party_funds + voters.iter().map(|v| v.weight).sum::<Amount>();
        let held: Amount = report.balances.values().sum();
        prop_assert_eq!(held, minted);

        let expected = if report.ruling == Party::Requester {
            ItemStatus::Registered
        } else {
            ItemStatus::Absent
        };
        prop_assert_eq!(report.status, expected);
    }

    #[test]
    fn losing_voters_keep_only_their_stake(voters in voters()) {
        let scenario = Scenario { voters: voters.clone(), ..Default::default() };
        let report = simulate(&scenario).unwrap();

        for (i, voter) in voters.iter().enumerate() {
            let balance = report.balances[&format!("voter-{i}")];
            let won = report.ruling == Party::None || report.ruling.as_ruling() == voter.choice;
            if won {
                prop_assert!(balance >= voter.weight);
            } else {
                prop_assert_eq!(balance, voter.weight);
            }
        }
        // Rounding residue is all the arbitrator may keep.
        prop_assert!(report.balances["arbitrator"] < voters.len() as Amount);
    }

    #[test]
    fn majority_decides(voters in voters()) {
        let scenario = Scenario { voters: voters.clone(), ..Default::default() };
        let report = simulate(&scenario).unwrap();

        let tally = |choice: u32| -> Amount {
            voters.iter().filter(|v| v.choice == choice).map(|v| v.weight).sum()
        };
        let expected = match tally(1).cmp(&tally(2)) {
            std::cmp::Ordering::Greater => Party::Requester,
            std::cmp::Ordering::Less => Party::Challenger,
            std::cmp::Ordering::Equal => Party::None,
        };
        prop_assert_eq!(report.ruling, expected);
    }
}
