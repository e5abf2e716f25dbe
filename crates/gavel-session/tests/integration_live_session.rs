//! Integration test: live session through the actor
//!
//! NOMINATE → BID → (END | EXPIRE) → SETTLE
//!
//! Drives the session the way connected clients do and checks that racing
//! commands serialize, that reconnecting clients land on the same state as
//! clients that never left, and that a lot settles exactly once.

use std::sync::Arc;
use std::time::Duration;

use gavel_roster::{MemoryRoster, RosterStore};
use gavel_session::{AuctionSession, ClientConnection, ClientMessage, SessionHandle, spawn};
use gavel_types::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct Harness {
    handle: SessionHandle,
    store: Arc<MemoryRoster>,
    teams: Vec<TeamId>,
    client: ClientId,
}

async fn harness(timer_secs: u32, players: Vec<Player>) -> Harness {
    let teams: Vec<Team> = ["Alpha", "Bravo", "Charlie"]
        .iter()
        .map(|name| Team::new(*name, "Owner", 100_000, 3))
        .collect();
    let team_ids = teams.iter().map(|t| t.id).collect();
    let store = Arc::new(MemoryRoster::with_records(teams, players));

    let config = EngineConfig::default();
    let session = AuctionSession::new(Arc::clone(&store), &config, StdRng::seed_from_u64(11));
    let (handle, _task) = spawn(session, &config);

    let client = ClientId::new();
    let settings = Settings {
        timer_duration_secs: timer_secs,
        ..Settings::default()
    };
    handle.set_settings(client, settings).await.unwrap();
    Harness {
        handle,
        store,
        teams: team_ids,
        client,
    }
}

/// Every broadcast already queued for `conn`.
fn drain(conn: &mut ClientConnection) -> Vec<EventEnvelope> {
    std::iter::from_fn(|| conn.try_next())
        .filter_map(|m| match m {
            ClientMessage::Event(env) => Some(env),
            _ => None,
        })
        .collect()
}

fn settlements(events: &[EventEnvelope]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e.event,
                AuctionEvent::LotSold { .. } | AuctionEvent::LotUnsold { .. }
            )
        })
        .count()
}

#[tokio::test]
async fn concurrent_bids_at_same_amount_accept_exactly_one() {
    let h = harness(15, vec![Player::dummy(Category::Gold)]).await;
    h.handle.nominate(h.client).await.unwrap();

    let (a, b) = (h.teams[0], h.teams[1]);
    let (ra, rb) = tokio::join!(
        h.handle.bid(h.client, a, Some(5_000)),
        h.handle.bid(h.client, b, Some(5_000)),
    );

    let accepted = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "a={ra:?} b={rb:?}");
    let loser = if ra.is_ok() { rb } else { ra };
    assert_eq!(
        loser.unwrap_err(),
        GavelError::StaleBid {
            expected: 5_000,
            actual: 6_000
        }
    );

    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.current_bid, 5_000);
    assert_eq!(snapshot.bid_history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reply_is_visible_in_snapshot() {
    let h = harness(15, vec![Player::dummy(Category::Diamond)]).await;
    let CommandAck::Nominated { lot } = h.handle.nominate(h.client).await.unwrap() else {
        panic!("expected nomination");
    };
    let snapshot = h.handle.snapshot();
    assert_eq!(snapshot.lot_id, Some(lot.lot_id));
    assert_eq!(snapshot.current_bid, 10_000);
    assert_eq!(snapshot.time_left, 15);
}

#[tokio::test(start_paused = true)]
async fn reconnecting_client_converges_with_live_client() {
    let h = harness(
        15,
        vec![
            Player::dummy_named("one", Category::Gold),
            Player::dummy_named("two", Category::Platinum),
        ],
    )
    .await;
    let mut live = h.handle.connect().await.unwrap();
    let mut view = SessionView::from_snapshot(live.snapshot.clone());

    h.handle.nominate(h.client).await.unwrap();
    h.handle.bid(h.client, h.teams[0], None).await.unwrap();
    h.handle.bid(h.client, h.teams[1], None).await.unwrap();

    let mut late = h.handle.connect().await.unwrap();
    for env in drain(&mut live) {
        view.apply(&env).unwrap();
    }
    assert_eq!(view.seq(), late.snapshot.seq);
    assert_eq!(view.digest(), late.snapshot.digest());

    let mut late_view = SessionView::from_snapshot(late.snapshot.clone());
    h.handle.bid(h.client, h.teams[2], None).await.unwrap();
    h.handle.end_lot(h.client).await.unwrap();

    for env in drain(&mut live) {
        view.apply(&env).unwrap();
    }
    for env in drain(&mut late) {
        late_view.apply(&env).unwrap();
    }
    let authoritative = h.handle.snapshot();
    assert_eq!(view.state(), &authoritative);
    assert_eq!(late_view.state(), &authoritative);
}

#[tokio::test]
async fn rejection_goes_only_to_sender() {
    let h = harness(15, vec![Player::dummy(Category::Gold)]).await;
    let mut sender = h.handle.connect().await.unwrap();
    let mut bystander = h.handle.connect().await.unwrap();

    let err = h
        .handle
        .bid(sender.client_id, h.teams[0], None)
        .await
        .unwrap_err();
    assert_eq!(err, GavelError::NoLotInFlight);

    assert!(matches!(
        sender.try_next(),
        Some(ClientMessage::Direct(AuctionEvent::BidRejected { .. }))
    ));
    assert!(bystander.try_next().is_none());
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_sells_to_leader() {
    let h = harness(3, vec![Player::dummy(Category::Gold)]).await;
    let mut conn = h.handle.connect().await.unwrap();
    h.handle.nominate(h.client).await.unwrap();
    h.handle.bid(h.client, h.teams[0], None).await.unwrap();

    let mut ticks = Vec::new();
    loop {
        match conn.next().await.unwrap() {
            ClientMessage::Event(EventEnvelope {
                event: AuctionEvent::TimerTick { seconds_left },
                ..
            }) => ticks.push(seconds_left),
            ClientMessage::Event(EventEnvelope {
                event: AuctionEvent::LotSold { team_id, amount, .. },
                ..
            }) => {
                assert_eq!(team_id, h.teams[0]);
                assert_eq!(amount, 5_000);
                break;
            }
            _ => {}
        }
    }
    assert_eq!(ticks, [3, 3, 2, 1, 0]);
    assert!(h.handle.snapshot().is_idle());
    assert_eq!(h.store.team(h.teams[0]).unwrap().purse, 95_000);
    h.handle.verify().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn end_lot_racing_expiry_settles_once() {
    let h = harness(1, vec![Player::dummy(Category::Gold)]).await;
    let mut conn = h.handle.connect().await.unwrap();
    h.handle.nominate(h.client).await.unwrap();
    h.handle.bid(h.client, h.teams[1], None).await.unwrap();

    tokio::time::advance(Duration::from_secs(1)).await;
    let ack = h.handle.end_lot(h.client).await.unwrap();
    assert!(
        matches!(ack, CommandAck::Settled { .. } | CommandAck::NothingToSettle),
        "{ack:?}"
    );
    let again = h.handle.end_lot(h.client).await.unwrap();
    assert_eq!(again, CommandAck::NothingToSettle);

    assert_eq!(settlements(&drain(&mut conn)), 1);
    let team = h.store.team(h.teams[1]).unwrap();
    assert_eq!(team.purse, 95_000);
    assert_eq!(team.owned(Category::Gold), 1);
}

#[tokio::test]
async fn revert_and_reassign_after_sale() {
    let h = harness(15, vec![Player::dummy(Category::Gold)]).await;
    let CommandAck::Nominated { lot } = h.handle.nominate(h.client).await.unwrap() else {
        panic!("expected nomination");
    };
    h.handle.bid(h.client, h.teams[0], None).await.unwrap();
    h.handle.end_lot(h.client).await.unwrap();

    h.handle
        .reassign_player(h.client, lot.player.id, h.teams[1], 8_000)
        .await
        .unwrap();
    assert_eq!(h.store.team(h.teams[0]).unwrap().purse, 100_000);
    assert_eq!(h.store.team(h.teams[1]).unwrap().purse, 92_000);

    h.handle
        .revert_to_available(h.client, lot.player.id)
        .await
        .unwrap();
    assert_eq!(h.store.team(h.teams[1]).unwrap().purse, 100_000);
    assert_eq!(
        h.store.player(lot.player.id).unwrap().status,
        PlayerStatus::Available
    );
    h.handle.verify().await.unwrap();
}

#[tokio::test]
async fn purse_overflow_leaves_the_session_running() {
    let h = harness(15, vec![Player::dummy(Category::Gold)]).await;
    let team = h.teams[0];
    let update = TeamUpdate {
        purse: Some(u64::MAX),
        ..TeamUpdate::default()
    };
    h.handle.update_team(h.client, team, update).await.unwrap();

    let err = h.handle.apply_booster(h.client, team).await.unwrap_err();
    assert!(matches!(err, GavelError::PurseOverflow { .. }), "{err:?}");
    assert!(!h.handle.is_closed());

    h.handle.nominate(h.client).await.unwrap();
    h.handle.bid(h.client, h.teams[1], Some(5_000)).await.unwrap();
    h.handle.verify().await.unwrap();
}

#[tokio::test]
async fn confirmed_reset_clears_everything() {
    let h = harness(15, vec![Player::dummy(Category::Gold)]).await;
    let mut conn = h.handle.connect().await.unwrap();
    h.handle.nominate(h.client).await.unwrap();

    let CommandAck::ResetRequested { token } = h.handle.request_reset(h.client).await.unwrap()
    else {
        panic!("expected token");
    };
    h.handle.confirm_reset(h.client, token).await.unwrap();

    let events = drain(&mut conn);
    assert!(matches!(
        events.last().map(|e| &e.event),
        Some(AuctionEvent::AuctionReset { .. })
    ));
    let snapshot = h.handle.snapshot();
    assert!(snapshot.is_idle());
    assert!(!snapshot.settings.finalized);
    assert!(h.store.snapshot().teams.is_empty());
}

#[tokio::test]
async fn dropped_handles_stop_the_actor() {
    let store = Arc::new(MemoryRoster::new());
    let config = EngineConfig::default();
    let session = AuctionSession::new(store, &config, StdRng::seed_from_u64(1));
    let (handle, task) = spawn(session, &config);
    drop(handle);
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("actor exits")
        .unwrap();
}
