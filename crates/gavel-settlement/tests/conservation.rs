//! Settlement sequences against an in-memory roster.
//!
//! Random interleavings of sales, reversals, reassignments, and booster
//! grants must keep every team's `purse + points_spent` on its ledger
//! baseline and keep roster counts in line with player records.

use std::sync::Arc;

use gavel_roster::{MemoryRoster, RosterStore};
use gavel_settlement::{SettlementEngine, audit_roster};
use gavel_types::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn roster(teams: usize, players_per_category: usize) -> (Vec<Team>, Vec<Player>) {
    let teams: Vec<Team> = (0..teams)
        .map(|i| Team::new(format!("Team {i}"), format!("Owner {i}"), 100_000, 3))
        .collect();
    let players = Category::ALL
        .iter()
        .flat_map(|&c| (0..players_per_category).map(move |i| Player::dummy_named(&format!("{c}-{i}"), c)))
        .collect();
    (teams, players)
}

#[test]
fn sale_and_revert_restore_purse() {
    let (teams, mut players) = roster(2, 1);
    let team = teams[0].clone();
    players[0].status = PlayerStatus::InFlight;
    let player_id = players[0].id;

    let store = Arc::new(MemoryRoster::with_records(teams, players));
    let mut engine = SettlementEngine::new(Arc::clone(&store));

    engine.settle_win(player_id, team.id, 20_000, vec![]).unwrap();
    assert_eq!(store.team(team.id).unwrap().purse, 80_000);

    engine.revert_to_unsold(player_id).unwrap();
    let after = store.team(team.id).unwrap();
    assert_eq!(after.purse, 100_000);
    assert_eq!(after.points_spent, 0);
    assert_eq!(after.roster_size(), 0);

    let player = store.player(player_id).unwrap();
    assert_eq!(player.status, PlayerStatus::Unsold);
    assert!(player.winning_team_id.is_none());
    engine.verify().unwrap();
}

#[test]
fn random_operation_sequences_conserve_budget() {
    let settings = Settings::default();
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (teams, players) = roster(4, 6);
        let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        let player_ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();

        let store = Arc::new(MemoryRoster::with_records(teams, players));
        let mut engine = SettlementEngine::new(Arc::clone(&store));

        for lot in 0..60u64 {
            let player_id = *player_ids.choose(&mut rng).unwrap();
            let team_id = *team_ids.choose(&mut rng).unwrap();
            let amount = rng.gen_range(1..=15) * 1_000;
            let status = store.player(player_id).unwrap().status;

            // Rejections are fine; they must leave no trace.
            let _ = match (status, rng.gen_range(0..4)) {
                (PlayerStatus::Available | PlayerStatus::Unsold, _) => {
                    engine.assign(player_id, team_id, amount).map(|_| ())
                }
                (PlayerStatus::Sold, 0) => engine.revert_to_unsold(player_id).map(|_| ()),
                (PlayerStatus::Sold, 1) => engine.revert_to_available(player_id).map(|_| ()),
                (PlayerStatus::Sold, 2) => engine.reassign(player_id, team_id, amount).map(|_| ()),
                (PlayerStatus::Sold, _) => engine.apply_booster(team_id, &settings).map(|_| ()),
                (PlayerStatus::InFlight, _) => engine
                    .settle_lot(LotId(lot), player_id, Some((team_id, amount)), vec![])
                    .map(|_| ()),
            };

            engine
                .verify()
                .unwrap_or_else(|e| panic!("seed {seed}, step {lot}: {e}"));
        }
        audit_roster(&store.snapshot()).unwrap();
    }
}

#[test]
fn storage_failure_mid_sequence_leaves_roster_intact() {
    let (teams, mut players) = roster(2, 1);
    let (a, b) = (teams[0].id, teams[1].id);
    players[0].status = PlayerStatus::InFlight;
    let player_id = players[0].id;

    let store = Arc::new(MemoryRoster::with_records(teams, players));
    let mut engine = SettlementEngine::new(Arc::clone(&store));
    engine.settle_win(player_id, a, 10_000, vec![]).unwrap();
    let before = store.snapshot();

    store.fail_next_commits(1);
    let err = engine.reassign(player_id, b, 12_000).unwrap_err();
    assert!(err.is_storage());
    assert_eq!(store.snapshot(), before);
    engine.verify().unwrap();
}
