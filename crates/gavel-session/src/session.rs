//! The auction session: single owner of live lot state.
//!
//! [`AuctionSession`] is a plain state machine. Every command runs to
//! completion against it, one at a time, and leaves the events it produced
//! in an outbox. The actor in [`crate::actor`] drains the outbox after each
//! step, stamps nothing itself, and fans events out. Sequence numbers are
//! assigned here so a [`StateSnapshot`] and the broadcasts that follow it
//! always agree on where they are in the order.
//!
//! ```text
//!            nominate                 bid (resets timer)
//!   Idle ───────────────▶ InFlight ◀──────────────┐
//!    ▲                      │  │                  │
//!    │   LotSold/LotUnsold  │  └──────────────────┘
//!    └──────────────────────┘   end_lot | timer expiry
//! ```

use std::sync::Arc;

use gavel_roster::{NominationPolicy, PoolOutcome, RosterStore, start_new_round};
use gavel_settlement::SettlementEngine;
use gavel_types::{
    AuctionEvent, BidEntry, ClientId, Command, CommandAck, EngineConfig, EventEnvelope,
    GavelError, LotId, LotOutcome, NominatedLot, Player, PlayerId, Result, Settings,
    SimulationReport, StateSnapshot, TeamId, TeamUpdate,
};
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::timer::{Countdown, Tick};

/// The lot currently on the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    pub id: LotId,
    pub player: Player,
    pub base_price: u64,
    pub current_bid: u64,
    pub leading_team_id: Option<TeamId>,
    pub bid_history: Vec<BidEntry>,
}

impl Lot {
    /// Amount the next bid must be: the base price while nobody leads,
    /// otherwise one increment above the current bid.
    #[must_use]
    pub fn next_bid(&self, settings: &Settings) -> u64 {
        match self.leading_team_id {
            None => self.current_bid,
            Some(_) => self
                .current_bid
                .saturating_add(settings.increment_for(self.current_bid)),
        }
    }
}

/// Where an event goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// To every subscriber, in sequence order.
    Broadcast(EventEnvelope),
    /// To one client only; carries no sequence number.
    Unicast { client: ClientId, event: AuctionEvent },
}

/// Which rejection event a failed command produces.
#[derive(Debug, Clone, Copy)]
enum RejectionKind {
    Bid,
    Booster,
    Other(&'static str),
}

impl RejectionKind {
    fn of(command: &Command) -> Self {
        match command {
            Command::Bid { .. } => Self::Bid,
            Command::ApplyBooster { .. } => Self::Booster,
            other => Self::Other(other.name()),
        }
    }

    fn event(self, err: &GavelError) -> AuctionEvent {
        let reason = err.to_string();
        match self {
            Self::Bid => AuctionEvent::BidRejected { reason },
            Self::Booster => AuctionEvent::BoosterRejected { reason },
            Self::Other(command) => AuctionEvent::CommandRejected {
                command: command.to_string(),
                reason,
            },
        }
    }
}

pub struct AuctionSession<S> {
    settlement: SettlementEngine<S>,
    nomination: NominationPolicy,
    rng: StdRng,
    settings: Settings,
    initial_settings: Settings,
    lot: Option<Lot>,
    countdown: Countdown,
    next_lot: LotId,
    seq: u64,
    pending_reset: Option<Uuid>,
    simulation_running: bool,
    min_simulation_teams: usize,
    outbox: Vec<Dispatch>,
}

impl<S: RosterStore> AuctionSession<S> {
    /// Build a session over `store`. Settings start from
    /// `config.initial_settings` and are finalized only if they say so.
    pub fn new(store: Arc<S>, config: &EngineConfig, rng: StdRng) -> Self {
        let settings = config.initial_settings.clone();
        Self {
            settlement: SettlementEngine::new(store),
            nomination: NominationPolicy::new(config.hold_back.clone()),
            rng,
            initial_settings: settings.clone(),
            settings,
            lot: None,
            countdown: Countdown::new(),
            next_lot: LotId(0),
            seq: 0,
            pending_reset: None,
            simulation_running: false,
            min_simulation_teams: config.simulation.min_teams,
            outbox: Vec::new(),
        }
    }

    // =================================================================
    // Accessors
    // =================================================================

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        self.settlement.store()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn lot(&self) -> Option<&Lot> {
        self.lot.as_ref()
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Sequence number of the last broadcast.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn is_simulation_running(&self) -> bool {
        self.simulation_running
    }

    /// Full state as of the last broadcast.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let mut snapshot = StateSnapshot::idle(self.settings.clone(), self.seq);
        snapshot.time_left = self.countdown.remaining();
        if let Some(lot) = &self.lot {
            snapshot.lot_id = Some(lot.id);
            snapshot.current_player = Some(lot.player.clone());
            snapshot.base_price = Some(lot.base_price);
            snapshot.current_bid = lot.current_bid;
            snapshot.leading_team_id = lot.leading_team_id;
            snapshot.bid_history.clone_from(&lot.bid_history);
        }
        snapshot
    }

    /// Take everything produced since the last drain.
    pub fn drain_outbox(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    /// Conservation ledger and roster audit.
    pub fn verify(&self) -> Result<()> {
        self.settlement.verify()
    }

    // =================================================================
    // Command entry point
    // =================================================================

    /// Run one command. Failures are also reported to `client` as a
    /// rejection event; none of them end the session.
    pub fn handle(&mut self, client: ClientId, command: Command) -> Result<CommandAck> {
        let kind = RejectionKind::of(&command);
        let name = command.name();
        let result = self.apply(command);
        if let Err(err) = &result {
            if err.is_rejection() {
                warn!(%client, command = name, error = %err, "command rejected");
            } else {
                error!(%client, command = name, error = %err, "command failed");
            }
            self.outbox.push(Dispatch::Unicast {
                client,
                event: kind.event(err),
            });
        }
        result
    }

    fn apply(&mut self, command: Command) -> Result<CommandAck> {
        match command {
            Command::SetSettings { settings } => self.set_settings(settings),
            Command::NominateRandom => self.nominate(),
            Command::StartNewRound => self.start_new_round(),
            Command::Bid { team_id, expected } => self.bid(team_id, expected),
            Command::EndLot => self.end_lot(),
            Command::ApplyBooster { team_id } => self.apply_booster(team_id),
            Command::StartSimulation { .. } => self.begin_simulation(),
            Command::AssignPlayer {
                player_id,
                team_id,
                price,
            } => self.assign(player_id, team_id, price),
            Command::ReassignPlayer {
                player_id,
                team_id,
                price,
            } => self.reassign(player_id, team_id, price),
            Command::RevertToUnsold { player_id } => self.revert_to_unsold(player_id),
            Command::RevertToAvailable { player_id } => self.revert_to_available(player_id),
            Command::UpdateTeam { team_id, update } => self.update_team(team_id, &update),
            Command::RequestReset => Ok(self.request_reset()),
            Command::ConfirmReset { token } => self.confirm_reset(token),
        }
    }

    fn broadcast(&mut self, event: AuctionEvent) {
        self.seq += 1;
        self.outbox.push(Dispatch::Broadcast(EventEnvelope {
            seq: self.seq,
            event,
        }));
    }

    fn require_idle(&self) -> Result<()> {
        match &self.lot {
            Some(lot) => Err(GavelError::LotInFlight(lot.id)),
            None => Ok(()),
        }
    }

    // =================================================================
    // Settings
    // =================================================================

    /// Validate, finalize, and adopt new settings. Refused while a lot is
    /// on the block so its base price and ladder stay fixed.
    pub fn set_settings(&mut self, settings: Settings) -> Result<CommandAck> {
        self.require_idle()?;
        let settings = settings.finalize()?;
        self.settings = settings.clone();
        info!(
            timer_secs = settings.timer_duration_secs,
            tiers = settings.bid_increments.0.len(),
            "settings finalized"
        );
        self.broadcast(AuctionEvent::SettingsUpdated {
            settings: settings.clone(),
        });
        Ok(CommandAck::SettingsApplied { settings })
    }

    // =================================================================
    // Nomination
    // =================================================================

    /// Put a random eligible player on the block, starting a new round
    /// first if the Available pool is empty.
    pub fn nominate(&mut self) -> Result<CommandAck> {
        self.require_idle()?;
        if !self.settings.finalized {
            return Err(GavelError::SettingsNotFinalized);
        }

        let nomination = self
            .nomination
            .nominate(self.settlement.store().as_ref(), &mut self.rng)?;
        if nomination.promoted > 0 {
            self.broadcast(AuctionEvent::RoundStarted {
                promoted: nomination.promoted,
            });
        }

        let player = match nomination.outcome {
            PoolOutcome::Nominated(player) => player,
            PoolOutcome::Exhausted => {
                info!("no players left to nominate");
                self.broadcast(AuctionEvent::NoPlayersAvailable);
                return Ok(CommandAck::NoPlayersAvailable);
            }
        };

        self.next_lot = self.next_lot.next();
        let base_price = self.settings.base_price_for(player.category);
        let lot = NominatedLot {
            lot_id: self.next_lot,
            player: player.clone(),
            base_price,
        };
        self.lot = Some(Lot {
            id: lot.lot_id,
            player,
            base_price,
            current_bid: base_price,
            leading_team_id: None,
            bid_history: Vec::new(),
        });
        self.countdown.start(self.settings.timer_duration_secs);

        info!(
            lot = %lot.lot_id,
            player = %lot.player.id,
            name = %lot.player.name,
            category = %lot.player.category,
            base_price,
            "lot nominated"
        );
        self.broadcast(AuctionEvent::LotNominated { lot: lot.clone() });
        self.broadcast(AuctionEvent::BidAccepted {
            current_bid: base_price,
            leading_team_id: None,
        });
        self.broadcast(AuctionEvent::TimerTick {
            seconds_left: self.countdown.remaining(),
        });
        Ok(CommandAck::Nominated { lot })
    }

    /// Promote every Unsold player back to Available.
    pub fn start_new_round(&mut self) -> Result<CommandAck> {
        let promoted = start_new_round(self.settlement.store().as_ref())?;
        info!(promoted, "new round started");
        self.broadcast(AuctionEvent::RoundStarted { promoted });
        Ok(CommandAck::RoundStarted { promoted })
    }

    // =================================================================
    // Bidding
    // =================================================================

    /// Raise the lot by one increment on behalf of `team_id`.
    ///
    /// `expected` is the amount the bidder saw as the next bid; if the lot
    /// has moved since, the bid is refused rather than placed higher.
    pub fn bid(&mut self, team_id: TeamId, expected: Option<u64>) -> Result<CommandAck> {
        let lot = self.lot.as_ref().ok_or(GavelError::NoLotInFlight)?;
        if !self.countdown.is_running() {
            return Err(GavelError::SettlementPending(lot.id));
        }
        if lot.leading_team_id == Some(team_id) {
            return Err(GavelError::SelfOutbid);
        }
        let team = self
            .settlement
            .store()
            .team(team_id)
            .ok_or(GavelError::TeamNotFound(team_id))?;

        let amount = lot.next_bid(&self.settings);
        if let Some(expected) = expected {
            if expected != amount {
                return Err(GavelError::StaleBid {
                    expected,
                    actual: amount,
                });
            }
        }
        let max_bid = gavel_roster::max_bid(&team, &self.settings, Some(lot.player.category));
        if amount > max_bid {
            return Err(GavelError::BidUnaffordable {
                needed: amount,
                max_bid,
            });
        }

        let Some(lot) = self.lot.as_mut() else {
            return Err(GavelError::NoLotInFlight);
        };
        lot.current_bid = amount;
        lot.leading_team_id = Some(team_id);
        lot.bid_history.push(BidEntry { team_id, amount });
        let lot_id = lot.id;
        self.countdown.reset();

        debug!(lot = %lot_id, team = %team_id, amount, "bid accepted");
        self.broadcast(AuctionEvent::BidAccepted {
            current_bid: amount,
            leading_team_id: Some(team_id),
        });
        self.broadcast(AuctionEvent::TimerTick {
            seconds_left: self.countdown.remaining(),
        });
        Ok(CommandAck::BidAccepted { team_id, amount })
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// Close the lot now. A no-op when nothing is on the block, so a manual
    /// close racing the timer settles once.
    pub fn end_lot(&mut self) -> Result<CommandAck> {
        if self.lot.is_none() {
            return Ok(CommandAck::NothingToSettle);
        }
        self.settle().map(|outcome| CommandAck::Settled { outcome })
    }

    /// Advance the countdown by one period, settling on expiry.
    pub fn tick(&mut self) -> Option<Result<LotOutcome>> {
        match self.countdown.tick()? {
            Tick::Remaining(seconds_left) => {
                self.broadcast(AuctionEvent::TimerTick { seconds_left });
                None
            }
            Tick::Expired => {
                let result = self.settle();
                if let Err(err) = &result {
                    error!(error = %err, "settlement on timer expiry failed");
                }
                Some(result)
            }
        }
    }

    /// Settle the lot on the block. On failure the lot stays on the block
    /// with its countdown halted, and the close can be retried.
    fn settle(&mut self) -> Result<LotOutcome> {
        let lot = self.lot.as_ref().ok_or(GavelError::NoLotInFlight)?;
        self.countdown.halt();

        let winner = lot.leading_team_id.map(|team_id| (team_id, lot.current_bid));
        let outcome = self.settlement.settle_lot(
            lot.id,
            lot.player.id,
            winner,
            lot.bid_history.clone(),
        )?;

        let Some(lot) = self.lot.take() else {
            return Err(GavelError::NoLotInFlight);
        };
        self.countdown.stop();
        self.broadcast(AuctionEvent::TimerTick { seconds_left: 0 });
        match &outcome {
            LotOutcome::Sold(receipt) => {
                info!(
                    lot = %lot.id,
                    player = %receipt.player.name,
                    team = %receipt.team.name,
                    amount = receipt.amount,
                    bids = lot.bid_history.len(),
                    "lot sold"
                );
                self.broadcast(AuctionEvent::LotSold {
                    player: receipt.player.clone(),
                    team_id: receipt.team.id,
                    amount: receipt.amount,
                    updated_team: receipt.team.clone(),
                    bid_history: lot.bid_history,
                });
            }
            LotOutcome::Unsold { player } => {
                info!(lot = %lot.id, player = %player.name, "lot unsold");
                self.broadcast(AuctionEvent::LotUnsold {
                    player: player.clone(),
                });
            }
        }
        Ok(outcome)
    }

    // =================================================================
    // Boosters and administration
    // =================================================================

    pub fn apply_booster(&mut self, team_id: TeamId) -> Result<CommandAck> {
        let team = self.settlement.apply_booster(team_id, &self.settings)?;
        self.broadcast(AuctionEvent::BoosterApplied { team: team.clone() });
        Ok(CommandAck::BoosterApplied { team })
    }

    pub fn assign(&mut self, player_id: PlayerId, team_id: TeamId, price: u64) -> Result<CommandAck> {
        let receipt = self.settlement.assign(player_id, team_id, price)?;
        self.broadcast(AuctionEvent::PlayerAssigned {
            player: receipt.player.clone(),
            team: receipt.team.clone(),
        });
        Ok(CommandAck::Assigned { receipt })
    }

    pub fn reassign(&mut self, player_id: PlayerId, team_id: TeamId, amount: u64) -> Result<CommandAck> {
        let receipt = self.settlement.reassign(player_id, team_id, amount)?;
        self.broadcast(AuctionEvent::PlayerReassigned {
            player: receipt.player.clone(),
            from_team: receipt.from_team.clone(),
            to_team: receipt.to_team.clone(),
        });
        Ok(CommandAck::Reassigned { receipt })
    }

    pub fn revert_to_unsold(&mut self, player_id: PlayerId) -> Result<CommandAck> {
        let receipt = self.settlement.revert_to_unsold(player_id)?;
        self.broadcast(AuctionEvent::SaleReverted {
            player: receipt.player.clone(),
            refunded_team: receipt.refunded_team.clone(),
        });
        Ok(CommandAck::Reverted { receipt })
    }

    pub fn revert_to_available(&mut self, player_id: PlayerId) -> Result<CommandAck> {
        let receipt = self.settlement.revert_to_available(player_id)?;
        self.broadcast(AuctionEvent::SaleReverted {
            player: receipt.player.clone(),
            refunded_team: receipt.refunded_team.clone(),
        });
        Ok(CommandAck::Reverted { receipt })
    }

    pub fn update_team(&mut self, team_id: TeamId, update: &TeamUpdate) -> Result<CommandAck> {
        let team = self.settlement.update_team(team_id, update)?;
        self.broadcast(AuctionEvent::TeamUpdated { team: team.clone() });
        Ok(CommandAck::TeamUpdated { team })
    }

    // =================================================================
    // Reset
    // =================================================================

    /// First step of a reset: issue a token that `confirm_reset` must echo.
    /// A new request replaces any earlier token.
    pub fn request_reset(&mut self) -> CommandAck {
        let token = Uuid::now_v7();
        self.pending_reset = Some(token);
        warn!(%token, "reset requested");
        CommandAck::ResetRequested { token }
    }

    /// Second step: wipe the roster and return to the initial settings.
    pub fn confirm_reset(&mut self, token: Uuid) -> Result<CommandAck> {
        if self.pending_reset != Some(token) {
            return Err(GavelError::ResetNotConfirmed);
        }
        self.settlement.purge()?;
        self.pending_reset = None;
        self.lot = None;
        self.countdown.stop();
        self.settings = self.initial_settings.clone();
        warn!("auction reset");
        self.broadcast(AuctionEvent::AuctionReset {
            settings: self.settings.clone(),
        });
        Ok(CommandAck::ResetComplete)
    }

    // =================================================================
    // Simulation bookkeeping
    // =================================================================

    /// Claim the simulation slot. The actor starts the driver on success.
    pub fn begin_simulation(&mut self) -> Result<CommandAck> {
        if self.simulation_running {
            return Err(GavelError::SimulationRunning);
        }
        if !self.settings.finalized {
            return Err(GavelError::SettingsNotFinalized);
        }
        let available = self.settlement.store().snapshot().teams.len();
        if available < self.min_simulation_teams {
            return Err(GavelError::NotEnoughTeams {
                needed: self.min_simulation_teams,
                available,
            });
        }
        self.simulation_running = true;
        info!(teams = available, "simulation started");
        Ok(CommandAck::SimulationStarted)
    }

    /// Release the simulation slot and tell `client` how it went.
    pub fn finish_simulation(&mut self, client: ClientId, result: Result<SimulationReport>) {
        self.simulation_running = false;
        let event = match result {
            Ok(report) => {
                info!(
                    lots = report.lots,
                    sold = report.sold,
                    unsold = report.unsold,
                    bids = report.bids,
                    points_spent = report.points_spent,
                    "simulation complete"
                );
                AuctionEvent::SimulationComplete { report }
            }
            Err(err) => {
                warn!(error = %err, "simulation failed");
                AuctionEvent::SimulationFailed {
                    reason: err.to_string(),
                }
            }
        };
        self.outbox.push(Dispatch::Unicast { client, event });
    }
}
