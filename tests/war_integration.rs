//! War engine integration tests
//!
//! End-to-end runs of wars and campaigns against the in-memory providers.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use territory_war::campaign::Campaign;
use territory_war::core::types::{NationId, TerritoryId};
use territory_war::nation::{InMemoryNations, Nation};
use territory_war::territory::{InMemoryTerritories, TerritoryStore};
use territory_war::war::{War, BATTLE_SCORE_DELTA, VICTORY_SCORE};

const ROUND_CAP: usize = 1000;

fn roster(attacker_forces: u32, defender_forces: u32) -> InMemoryNations {
    [
        Nation::new("Attacker").with_defense_forces(attacker_forces),
        Nation::new("Defender").with_defense_forces(defender_forces),
    ]
    .into_iter()
    .collect()
}

fn new_war() -> War {
    War::new(
        "war",
        NationId::new("Attacker"),
        NationId::new("Defender"),
        TerritoryId::new("A"),
    )
}

/// Fight to the end; returns the number of rounds
fn fight(war: &mut War, nations: &InMemoryNations, rng: &mut ChaCha8Rng) -> usize {
    let mut rounds = 0;
    while war.is_ongoing() && rounds < ROUND_CAP {
        war.tick(nations, rng).unwrap();
        rounds += 1;
    }
    rounds
}

#[test]
fn test_lopsided_war_is_a_deterministic_attacker_win() {
    let nations = roster(0, 100);

    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut war = new_war();

        let rounds = fight(&mut war, &nations, &mut rng);

        assert_eq!(rounds, 3);
        assert_eq!(war.score(), 120);
        assert!(!war.is_ongoing());
        assert_eq!(war.advantage(), Some(&NationId::new("Attacker")));
    }
}

#[test]
fn test_more_powerful_nation_doesnt_always_win() {
    let nations = roster(40, 60);
    let mut rng = ChaCha8Rng::seed_from_u64(2010);

    let trials = 1000;
    let mut attacker_wins = 0;
    let mut defender_wins = 0;
    let mut total_rounds = 0;
    let mut shortest = usize::MAX;

    for _ in 0..trials {
        let mut war = new_war();
        let rounds = fight(&mut war, &nations, &mut rng);

        // Every trial terminates inside the cap
        assert!(!war.is_ongoing());
        assert!(rounds < ROUND_CAP);

        match war.advantage() {
            Some(id) if id == &NationId::new("Attacker") => attacker_wins += 1,
            Some(_) => defender_wins += 1,
            None => {}
        }
        total_rounds += rounds;
        shortest = shortest.min(rounds);
    }

    // The nation with more defense forces loses more often, but not always
    // (attacker ~77% expected)
    assert!(
        attacker_wins > defender_wins,
        "attacker won {}, defender won {}",
        attacker_wins,
        defender_wins
    );
    assert!(defender_wins > trials / 10, "defender won {}", defender_wins);

    let min_rounds = (VICTORY_SCORE + BATTLE_SCORE_DELTA - 1) / BATTLE_SCORE_DELTA;
    assert_eq!(shortest, min_rounds as usize);

    let average = total_rounds as f64 / trials as f64;
    assert!(average < 12.0, "average war length {}", average);
}

#[test]
fn test_even_match_is_roughly_even() {
    let nations = roster(50, 50);
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let attacker_wins = (0..1000)
        .filter(|_| {
            let mut war = new_war();
            fight(&mut war, &nations, &mut rng);
            war.advantage() == Some(&NationId::new("Attacker"))
        })
        .count();

    assert!(attacker_wins > 400 && attacker_wins < 600, "attacker won {}", attacker_wins);
}

#[test]
fn test_completed_war_changes_residence_of_the_territory() {
    let nations: InMemoryNations = [
        Nation::new("Attacker").with_defense_forces(45),
        Nation::new("Defender").with_defense_forces(55),
    ]
    .into_iter()
    .collect();

    let mut changed_hands = 0;

    for seed in 0..200 {
        let mut store = InMemoryTerritories::with_territories(["A"]);
        store
            .set_resident(&"A".into(), NationId::new("Defender"))
            .unwrap();
        let mut campaign = Campaign::new(store, seed);

        campaign
            .declare_war(&nations, &NationId::new("Attacker"), &"A".into())
            .unwrap();

        for _ in 0..ROUND_CAP {
            campaign.advance_year(&nations).unwrap();
            if campaign.ongoing_wars().unwrap().is_empty() {
                break;
            }
        }

        let wars = campaign.store().wars().unwrap();
        assert_eq!(wars.len(), 1);
        let finished = &wars[0];
        assert!(!finished.is_ongoing());

        let resident = campaign.store().resident(&"A".into()).unwrap();
        assert_eq!(resident.as_ref(), finished.advantage());
        if resident == Some(NationId::new("Attacker")) {
            changed_hands += 1;
        }
    }

    assert!(changed_hands > 0 && changed_hands < 200);
}

#[test]
fn test_campaign_is_deterministic_for_a_seed() {
    let run = |seed: u64| {
        let nations = roster(40, 60);
        let mut store = InMemoryTerritories::with_territories(["A", "B", "C"]);
        for territory in ["A", "B", "C"] {
            store
                .set_resident(&territory.into(), NationId::new("Defender"))
                .unwrap();
        }
        let mut campaign = Campaign::new(store, seed);
        for territory in ["A", "B", "C"] {
            campaign
                .declare_war(&nations, &NationId::new("Attacker"), &territory.into())
                .unwrap();
        }
        for _ in 0..5 {
            campaign.advance_year(&nations).unwrap();
        }
        campaign
            .store()
            .wars()
            .unwrap()
            .iter()
            .map(|w| w.score())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(9), run(9));
}

#[test]
fn test_many_territories_resolve_independently() {
    let nations = roster(0, 100);
    let territories: Vec<String> = (0..16).map(|i| format!("T{}", i)).collect();

    let mut store =
        InMemoryTerritories::with_territories(territories.iter().map(String::as_str));
    for territory in &territories {
        store
            .set_resident(&TerritoryId::new(territory.clone()), NationId::new("Defender"))
            .unwrap();
    }
    let mut campaign = Campaign::new(store, 1);
    for territory in &territories {
        let territory = TerritoryId::new(territory.clone());
        campaign
            .declare_war(&nations, &NationId::new("Attacker"), &territory)
            .unwrap();
    }

    let mut reports = Vec::new();
    for _ in 0..3 {
        reports.push(campaign.advance_year(&nations).unwrap());
    }

    assert!(reports[0].concluded.is_empty());
    assert_eq!(reports[2].concluded.len(), 16);
    for (_, resident) in campaign.residents().unwrap() {
        assert_eq!(resident, Some(NationId::new("Attacker")));
    }
}
