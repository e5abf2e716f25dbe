//! Error types for the Gavel auction engine.
//!
//! All errors use the `GV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Command rejections (state or business rule; never mutate state)
//! - 2xx: Roster preconditions (missing records, wrong status, purse)
//! - 3xx: Settings errors
//! - 4xx: Storage and integrity errors
//! - 5xx: Session errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{LotId, PlayerId, PlayerStatus, TeamId};

/// Central error enum for all Gavel operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GavelError {
    // =================================================================
    // Command Rejections (1xx)
    // =================================================================
    /// A lot-scoped command arrived while nothing is on the block.
    #[error("GV_ERR_100: No lot is currently on the block")]
    NoLotInFlight,

    /// `nominate` while a lot is already on the block.
    #[error("GV_ERR_101: A lot is already on the block: {0}")]
    LotInFlight(LotId),

    /// The team already holds the leading bid.
    #[error("GV_ERR_102: You are already the highest bidder")]
    SelfOutbid,

    /// The team cannot afford the next bid.
    #[error("GV_ERR_103: You cannot afford this bid: need {needed}, maximum possible bid is {max_bid}")]
    BidUnaffordable { needed: u64, max_bid: u64 },

    /// The client bid on a price that is no longer current.
    #[error("GV_ERR_104: Stale bid: expected to bid {expected}, next bid is {actual}")]
    StaleBid { expected: u64, actual: u64 },

    /// The team has no boosters left.
    #[error("GV_ERR_105: Team {team} has no boosters left")]
    NoBoostersLeft { team: String },

    /// Nomination or bidding before the auctioneer finalized settings.
    #[error("GV_ERR_106: Auction settings have not been finalized")]
    SettingsNotFinalized,

    /// `start-new-round` with nothing to roll over.
    #[error("GV_ERR_107: There are no unsold players to start a new round with")]
    NoUnsoldPlayers,

    /// The simulation needs more teams than the roster holds.
    #[error("GV_ERR_108: Need at least {needed} teams to run a simulation, have {available}")]
    NotEnoughTeams { needed: usize, available: usize },

    /// A simulation is already running against this session.
    #[error("GV_ERR_109: A simulation is already running")]
    SimulationRunning,

    /// The lot's settlement failed and is waiting on `end-lot` to retry.
    #[error("GV_ERR_110: Lot {0} is awaiting settlement; end the lot to retry")]
    SettlementPending(LotId),

    // =================================================================
    // Roster Preconditions (2xx)
    // =================================================================
    /// The referenced team record does not exist.
    #[error("GV_ERR_200: Team not found: {0}")]
    TeamNotFound(TeamId),

    /// The referenced player record does not exist.
    #[error("GV_ERR_201: Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The player is not in a status that allows the operation.
    #[error("GV_ERR_202: Player {player} is {actual}, expected {expected}")]
    WrongPlayerStatus {
        player: PlayerId,
        expected: &'static str,
        actual: PlayerStatus,
    },

    /// A debit would take the purse below zero.
    #[error("GV_ERR_203: Insufficient purse: need {needed}, have {available}")]
    InsufficientPurse { needed: u64, available: u64 },

    /// A reversal would take a counter below zero.
    #[error("GV_ERR_204: Roster counter underflow: {reason}")]
    CounterUnderflow { reason: String },

    /// The same lot was settled twice.
    #[error("GV_ERR_205: Lot already settled: {0}")]
    LotAlreadySettled(LotId),

    /// A credit would take `purse + points_spent` past `u64::MAX`.
    #[error("GV_ERR_206: Purse overflow for team {team}: {purse} + {points_spent} + {amount}")]
    PurseOverflow {
        team: String,
        purse: u64,
        points_spent: u64,
        amount: u64,
    },

    // =================================================================
    // Settings Errors (3xx)
    // =================================================================
    /// The submitted settings failed validation.
    #[error("GV_ERR_300: Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    // =================================================================
    // Storage / Integrity Errors (4xx)
    // =================================================================
    /// The transactional store failed to commit.
    #[error("GV_ERR_400: Storage failure: {reason}")]
    Storage { reason: String },

    /// `purse + points_spent` drifted from the recorded baseline.
    #[error("GV_ERR_401: Purse conservation violated: {reason}")]
    ConservationViolation { reason: String },

    /// Denormalized roster aggregates disagree with player records.
    #[error("GV_ERR_402: Roster inconsistency: {reason}")]
    RosterInconsistent { reason: String },

    // =================================================================
    // Session Errors (5xx)
    // =================================================================
    /// The session actor is gone.
    #[error("GV_ERR_500: Auction session is closed")]
    SessionClosed,

    /// `confirm-reset` without a matching `request-reset`.
    #[error("GV_ERR_501: Reset confirmation token is missing or does not match")]
    ResetNotConfirmed,

    /// A client view saw a broadcast out of order and must resync.
    #[error("GV_ERR_502: Event sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GV_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GV_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("GV_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("GV_ERR_903: I/O error: {0}")]
    Io(String),
}

impl GavelError {
    /// Whether this is a command rejection: reported only to the
    /// originating client, with no state change.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NoLotInFlight
                | Self::LotInFlight(_)
                | Self::SelfOutbid
                | Self::BidUnaffordable { .. }
                | Self::StaleBid { .. }
                | Self::NoBoostersLeft { .. }
                | Self::SettingsNotFinalized
                | Self::NoUnsoldPlayers
                | Self::NotEnoughTeams { .. }
                | Self::SimulationRunning
                | Self::SettlementPending(_)
        )
    }

    /// Whether this came from the storage layer rather than business rules.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GavelError>;

impl From<std::io::Error> for GavelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GavelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
