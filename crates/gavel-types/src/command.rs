//! Commands accepted by the auction session and their acknowledgements.
//!
//! Role checks (auctioneer vs. team owner) happen before a command reaches
//! the session; the session only enforces state and business rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    LotOutcome, NominatedLot, PlayerId, ReassignReceipt, RevertReceipt, SaleReceipt, Settings,
    Team, TeamId, TeamUpdate,
};

/// A state-mutating request. Every variant is applied by the single
/// session writer, one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // --- client commands ---
    SetSettings {
        settings: Settings,
    },
    NominateRandom,
    StartNewRound,
    Bid {
        team_id: TeamId,
        /// The amount the client believes it is bidding. When present and
        /// different from the authoritative next bid, the bid is stale.
        #[serde(default)]
        expected: Option<u64>,
    },
    EndLot,
    ApplyBooster {
        team_id: TeamId,
    },
    StartSimulation {
        /// Maximum lots to run; `None` runs until the pool is exhausted.
        #[serde(default)]
        count: Option<usize>,
    },

    // --- administrative operations ---
    AssignPlayer {
        player_id: PlayerId,
        team_id: TeamId,
        price: u64,
    },
    ReassignPlayer {
        player_id: PlayerId,
        team_id: TeamId,
        price: u64,
    },
    RevertToUnsold {
        player_id: PlayerId,
    },
    RevertToAvailable {
        player_id: PlayerId,
    },
    UpdateTeam {
        team_id: TeamId,
        update: TeamUpdate,
    },
    RequestReset,
    ConfirmReset {
        token: Uuid,
    },
}

impl Command {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSettings { .. } => "set_settings",
            Self::NominateRandom => "nominate_random",
            Self::StartNewRound => "start_new_round",
            Self::Bid { .. } => "bid",
            Self::EndLot => "end_lot",
            Self::ApplyBooster { .. } => "apply_booster",
            Self::StartSimulation { .. } => "start_simulation",
            Self::AssignPlayer { .. } => "assign_player",
            Self::ReassignPlayer { .. } => "reassign_player",
            Self::RevertToUnsold { .. } => "revert_to_unsold",
            Self::RevertToAvailable { .. } => "revert_to_available",
            Self::UpdateTeam { .. } => "update_team",
            Self::RequestReset => "request_reset",
            Self::ConfirmReset { .. } => "confirm_reset",
        }
    }
}

/// What a successfully applied command did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandAck {
    SettingsApplied { settings: Settings },
    Nominated { lot: NominatedLot },
    NoPlayersAvailable,
    RoundStarted { promoted: usize },
    BidAccepted { team_id: TeamId, amount: u64 },
    Settled { outcome: LotOutcome },
    /// `end-lot` while idle: nothing happened.
    NothingToSettle,
    BoosterApplied { team: Team },
    SimulationStarted,
    Assigned { receipt: SaleReceipt },
    Reassigned { receipt: ReassignReceipt },
    Reverted { receipt: RevertReceipt },
    TeamUpdated { team: Team },
    ResetRequested { token: Uuid },
    ResetComplete,
}
