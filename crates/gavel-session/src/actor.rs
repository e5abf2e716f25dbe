//! Session actor: the single writer.
//!
//! One tokio task owns the [`AuctionSession`]. Clients talk to it through a
//! cloneable [`SessionHandle`] over a bounded command queue; each request
//! carries a oneshot for its reply. The countdown interval is a branch of
//! the same `select!`, so timer expiry and commands are serialized against
//! each other.
//!
//! After every step the actor publishes, in this order:
//! 1. the step's events to the broadcast hub,
//! 2. the new snapshot to the `watch` channel,
//! 3. the reply to the caller.
//!
//! A caller that sees its reply can therefore read a snapshot that already
//! reflects its command.

use std::sync::Arc;
use std::time::Duration;

use gavel_roster::RosterStore;
use gavel_types::{
    ClientId, Command, CommandAck, EngineConfig, GavelError, PlayerId, Result, Settings,
    SimulationConfig, SimulationReport, StateSnapshot, TeamId, TeamUpdate,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::broadcast::{BroadcastHub, ClientConnection};
use crate::session::AuctionSession;
use crate::simulation::SimulationDriver;

enum Request {
    Command {
        client: ClientId,
        command: Command,
        reply: oneshot::Sender<Result<CommandAck>>,
    },
    Connect {
        reply: oneshot::Sender<ClientConnection>,
    },
    Disconnect {
        client: ClientId,
    },
    Verify {
        reply: oneshot::Sender<Result<()>>,
    },
    SimulationDone {
        client: ClientId,
        result: Result<SimulationReport>,
    },
    Shutdown,
}

/// Cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Request>,
    state: watch::Receiver<StateSnapshot>,
}

impl SessionHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| GavelError::SessionClosed)?;
        rx.await.map_err(|_| GavelError::SessionClosed)
    }

    /// Run `command` on behalf of `client`.
    pub async fn execute(&self, client: ClientId, command: Command) -> Result<CommandAck> {
        self.request(|reply| Request::Command {
            client,
            command,
            reply,
        })
        .await?
    }

    /// Subscribe. The returned connection's snapshot and event streams are
    /// taken in the same actor step.
    pub async fn connect(&self) -> Result<ClientConnection> {
        self.request(|reply| Request::Connect { reply }).await
    }

    pub async fn disconnect(&self, client: ClientId) {
        let _ = self.tx.send(Request::Disconnect { client }).await;
    }

    /// Latest published snapshot. Never blocks on the actor.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    /// Watch snapshots as they are published.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<StateSnapshot> {
        self.state.clone()
    }

    /// Check purse conservation and roster consistency.
    pub async fn verify(&self) -> Result<()> {
        self.request(|reply| Request::Verify { reply }).await?
    }

    /// Stop the actor. Outstanding handles see `SessionClosed`.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown).await;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    // --- client commands ---

    pub async fn set_settings(&self, client: ClientId, settings: Settings) -> Result<CommandAck> {
        self.execute(client, Command::SetSettings { settings }).await
    }

    pub async fn nominate(&self, client: ClientId) -> Result<CommandAck> {
        self.execute(client, Command::NominateRandom).await
    }

    pub async fn start_new_round(&self, client: ClientId) -> Result<CommandAck> {
        self.execute(client, Command::StartNewRound).await
    }

    pub async fn bid(&self, client: ClientId, team_id: TeamId, expected: Option<u64>) -> Result<CommandAck> {
        self.execute(client, Command::Bid { team_id, expected }).await
    }

    pub async fn end_lot(&self, client: ClientId) -> Result<CommandAck> {
        self.execute(client, Command::EndLot).await
    }

    pub async fn apply_booster(&self, client: ClientId, team_id: TeamId) -> Result<CommandAck> {
        self.execute(client, Command::ApplyBooster { team_id }).await
    }

    pub async fn start_simulation(&self, client: ClientId, count: Option<usize>) -> Result<CommandAck> {
        self.execute(client, Command::StartSimulation { count }).await
    }

    // --- administrative operations ---

    pub async fn assign_player(
        &self,
        client: ClientId,
        player_id: PlayerId,
        team_id: TeamId,
        price: u64,
    ) -> Result<CommandAck> {
        self.execute(
            client,
            Command::AssignPlayer {
                player_id,
                team_id,
                price,
            },
        )
        .await
    }

    pub async fn reassign_player(
        &self,
        client: ClientId,
        player_id: PlayerId,
        team_id: TeamId,
        price: u64,
    ) -> Result<CommandAck> {
        self.execute(
            client,
            Command::ReassignPlayer {
                player_id,
                team_id,
                price,
            },
        )
        .await
    }

    pub async fn revert_to_unsold(&self, client: ClientId, player_id: PlayerId) -> Result<CommandAck> {
        self.execute(client, Command::RevertToUnsold { player_id }).await
    }

    pub async fn revert_to_available(&self, client: ClientId, player_id: PlayerId) -> Result<CommandAck> {
        self.execute(client, Command::RevertToAvailable { player_id }).await
    }

    pub async fn update_team(&self, client: ClientId, team_id: TeamId, update: TeamUpdate) -> Result<CommandAck> {
        self.execute(client, Command::UpdateTeam { team_id, update }).await
    }

    pub async fn request_reset(&self, client: ClientId) -> Result<CommandAck> {
        self.execute(client, Command::RequestReset).await
    }

    pub async fn confirm_reset(&self, client: ClientId, token: Uuid) -> Result<CommandAck> {
        self.execute(client, Command::ConfirmReset { token }).await
    }
}

/// Start the actor for `session`.
pub fn spawn<S: RosterStore>(
    session: AuctionSession<S>,
    config: &EngineConfig,
) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.command_queue);
    let (state_tx, state_rx) = watch::channel(session.snapshot());
    let actor = SessionActor {
        session,
        hub: BroadcastHub::new(config.event_buffer),
        rx,
        self_tx: tx.downgrade(),
        state_tx,
        tick_interval: config.tick_interval(),
        simulation: config.simulation.clone(),
    };
    let task = tokio::spawn(actor.run());
    (
        SessionHandle {
            tx,
            state: state_rx,
        },
        task,
    )
}

struct SessionActor<S> {
    session: AuctionSession<S>,
    hub: BroadcastHub,
    rx: mpsc::Receiver<Request>,
    /// Weak so that dropping every handle stops the actor.
    self_tx: mpsc::WeakSender<Request>,
    state_tx: watch::Sender<StateSnapshot>,
    tick_interval: Duration,
    simulation: SimulationConfig,
}

impl<S: RosterStore> SessionActor<S> {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        let mut generation = self.session.countdown().generation();

        info!(tick_ms = self.tick_interval.as_millis(), "session started");
        loop {
            tokio::select! {
                request = self.rx.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle(request),
                },
                _ = ticker.tick(), if self.session.countdown().is_running() => {
                    self.session.tick();
                    self.publish();
                }
            }
            realign(&mut ticker, &mut generation, self.session.countdown().generation());
        }
        info!(seq = self.session.seq(), "session stopped");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Command {
                client,
                command,
                reply,
            } => {
                let count = match &command {
                    Command::StartSimulation { count } => Some(*count),
                    _ => None,
                };
                let result = self.session.handle(client, command);
                if let (Ok(CommandAck::SimulationStarted), Some(count)) = (&result, count) {
                    self.start_simulation(client, count);
                }
                self.publish();
                let _ = reply.send(result);
            }
            Request::Connect { reply } => {
                let (client, events, direct) = self.hub.connect();
                let connection =
                    ClientConnection::new(client, self.session.snapshot(), events, direct);
                if reply.send(connection).is_err() {
                    self.hub.disconnect(client);
                }
            }
            Request::Disconnect { client } => self.hub.disconnect(client),
            Request::Verify { reply } => {
                let _ = reply.send(self.session.verify());
            }
            Request::SimulationDone { client, result } => {
                self.session.finish_simulation(client, result);
                self.publish();
            }
            // Handled by the run loop.
            Request::Shutdown => {}
        }
    }

    fn publish(&mut self) {
        for dispatch in self.session.drain_outbox() {
            self.hub.dispatch(dispatch);
        }
        self.state_tx.send_replace(self.session.snapshot());
    }

    fn start_simulation(&mut self, client: ClientId, count: Option<usize>) {
        let Some(tx) = self.self_tx.upgrade() else {
            error!("cannot start simulation: session is shutting down");
            self.session
                .finish_simulation(client, Err(GavelError::SessionClosed));
            return;
        };
        let handle = SessionHandle {
            tx: tx.clone(),
            state: self.state_tx.subscribe(),
        };
        let driver = SimulationDriver::new(
            handle,
            Arc::clone(self.session.store()),
            &self.simulation,
        );
        debug!(%client, ?count, "simulation driver spawned");
        tokio::spawn(async move {
            let result = driver.run(count).await;
            let _ = tx.send(Request::SimulationDone { client, result }).await;
        });
    }
}

/// Restart the interval whenever the countdown was started or reset, so the
/// next tick lands one full period later.
fn realign(ticker: &mut Interval, seen: &mut u64, current: u64) {
    if *seen != current {
        *seen = current;
        ticker.reset();
    }
}
