//! Events pushed to connected clients.
//!
//! Broadcast events are wrapped in an [`EventEnvelope`] carrying a
//! session-wide sequence number. Team-directed events (rejections,
//! simulation results) are delivered only to the originating client and
//! carry no sequence number: they never change shared state.

use serde::{Deserialize, Serialize};

use crate::{BidEntry, LotId, Player, Settings, StateSnapshot, Team, TeamId};

/// A freshly nominated lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominatedLot {
    pub lot_id: LotId,
    pub player: Player,
    /// Opening price, taken from the settings at nomination time.
    pub base_price: u64,
}

/// Totals reported when a simulation run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub lots: usize,
    pub sold: usize,
    pub unsold: usize,
    pub bids: usize,
    pub points_spent: u64,
}

/// Everything the session tells its clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// Full state, sent on (re)connect.
    StateSnapshot { snapshot: StateSnapshot },
    LotNominated { lot: NominatedLot },
    /// New bid state. `leading_team_id` is `None` right after nomination.
    BidAccepted {
        current_bid: u64,
        leading_team_id: Option<TeamId>,
    },
    BidRejected { reason: String },
    LotSold {
        player: Player,
        team_id: TeamId,
        amount: u64,
        updated_team: Team,
        bid_history: Vec<BidEntry>,
    },
    LotUnsold { player: Player },
    RoundStarted { promoted: usize },
    NoPlayersAvailable,
    BoosterApplied { team: Team },
    BoosterRejected { reason: String },
    TimerTick { seconds_left: u32 },
    SettingsUpdated { settings: Settings },
    TeamUpdated { team: Team },
    PlayerAssigned { player: Player, team: Team },
    SaleReverted { player: Player, refunded_team: Team },
    PlayerReassigned {
        player: Player,
        from_team: Team,
        to_team: Team,
    },
    AuctionReset { settings: Settings },
    /// Any other rejected command, addressed to its sender.
    CommandRejected { command: String, reason: String },
    SimulationComplete { report: SimulationReport },
    SimulationFailed { reason: String },
}

impl AuctionEvent {
    /// Whether this event is only ever sent to one client.
    #[must_use]
    pub fn is_unicast(&self) -> bool {
        matches!(
            self,
            Self::StateSnapshot { .. }
                | Self::BidRejected { .. }
                | Self::BoosterRejected { .. }
                | Self::CommandRejected { .. }
                | Self::SimulationComplete { .. }
                | Self::SimulationFailed { .. }
        )
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateSnapshot { .. } => "state_snapshot",
            Self::LotNominated { .. } => "lot_nominated",
            Self::BidAccepted { .. } => "bid_accepted",
            Self::BidRejected { .. } => "bid_rejected",
            Self::LotSold { .. } => "lot_sold",
            Self::LotUnsold { .. } => "lot_unsold",
            Self::RoundStarted { .. } => "round_started",
            Self::NoPlayersAvailable => "no_players_available",
            Self::BoosterApplied { .. } => "booster_applied",
            Self::BoosterRejected { .. } => "booster_rejected",
            Self::TimerTick { .. } => "timer_tick",
            Self::SettingsUpdated { .. } => "settings_updated",
            Self::TeamUpdated { .. } => "team_updated",
            Self::PlayerAssigned { .. } => "player_assigned",
            Self::SaleReverted { .. } => "sale_reverted",
            Self::PlayerReassigned { .. } => "player_reassigned",
            Self::AuctionReset { .. } => "auction_reset",
            Self::CommandRejected { .. } => "command_rejected",
            Self::SimulationComplete { .. } => "simulation_complete",
            Self::SimulationFailed { .. } => "simulation_failed",
        }
    }
}

/// A broadcast event with its position in the session's total order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub seq: u64,
    pub event: AuctionEvent,
}
