//! Integration test: simulated auction
//!
//! A full simulated run must leave the roster consistent and every team's
//! budget conserved, and its report must agree with the roster it leaves.

use std::sync::Arc;
use std::time::Duration;

use gavel_roster::{MemoryRoster, RosterStore};
use gavel_session::{AuctionSession, ClientConnection, ClientMessage, SessionHandle, spawn};
use gavel_types::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config(seed: u64) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.simulation.step_delay_ms = 0;
    config.simulation.seed = Some(seed);
    config.initial_settings = Settings::default().finalize().unwrap();
    config
}

fn roster(teams: usize, per_category: usize) -> MemoryRoster {
    let teams = (0..teams)
        .map(|i| Team::new(format!("Team {i}"), format!("Owner {i}"), 100_000, 3))
        .collect();
    let players = Category::ALL
        .iter()
        .flat_map(|&c| (0..per_category).map(move |i| Player::dummy_named(&format!("{c}-{i}"), c)))
        .collect();
    MemoryRoster::with_records(teams, players)
}

fn start(store: &Arc<MemoryRoster>, seed: u64) -> SessionHandle {
    let config = config(seed);
    let session = AuctionSession::new(Arc::clone(store), &config, StdRng::seed_from_u64(seed));
    spawn(session, &config).0
}

async fn outcome(conn: &mut ClientConnection) -> AuctionEvent {
    let wait = async {
        loop {
            if let Some(ClientMessage::Direct(
                event @ (AuctionEvent::SimulationComplete { .. }
                | AuctionEvent::SimulationFailed { .. }),
            )) = conn.next().await
            {
                return event;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(30), wait)
        .await
        .expect("simulation finishes")
}

#[tokio::test]
async fn simulation_auctions_every_available_player() {
    let store = Arc::new(roster(4, 5));
    let handle = start(&store, 42);
    let mut conn = handle.connect().await.unwrap();

    let ack = handle.start_simulation(conn.client_id, None).await.unwrap();
    assert_eq!(ack, CommandAck::SimulationStarted);

    let AuctionEvent::SimulationComplete { report } = outcome(&mut conn).await else {
        panic!("simulation failed");
    };
    assert_eq!(report.lots, 15);
    assert_eq!(report.sold + report.unsold, report.lots);
    assert!(report.bids >= report.sold);

    let roster = store.snapshot();
    let sold = roster.players_in(PlayerStatus::Sold).count();
    assert_eq!(sold, report.sold);
    let spent: u64 = roster.teams.values().map(|t| t.points_spent).sum();
    assert_eq!(spent, report.points_spent);
    assert!(handle.snapshot().is_idle());
    handle.verify().await.unwrap();
}

#[tokio::test]
async fn simulation_respects_lot_count() {
    let store = Arc::new(roster(3, 4));
    let handle = start(&store, 7);
    let mut conn = handle.connect().await.unwrap();

    handle.start_simulation(conn.client_id, Some(5)).await.unwrap();
    let AuctionEvent::SimulationComplete { report } = outcome(&mut conn).await else {
        panic!("simulation failed");
    };
    assert_eq!(report.lots, 5);
    assert_eq!(store.snapshot().players_in(PlayerStatus::Available).count(), 7);
}

#[tokio::test]
async fn second_simulation_is_refused_while_running() {
    let store = Arc::new(roster(3, 10));
    let handle = start(&store, 3);
    let client = ClientId::new();

    handle.start_simulation(client, None).await.unwrap();
    let err = handle.start_simulation(client, None).await.unwrap_err();
    assert_eq!(err, GavelError::SimulationRunning);
}

#[tokio::test]
async fn simulation_needs_two_teams() {
    let store = Arc::new(roster(1, 2));
    let handle = start(&store, 1);
    let err = handle
        .start_simulation(ClientId::new(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GavelError::NotEnoughTeams {
            needed: 2,
            available: 1
        }
    );
}
