//! # gavel-types
//!
//! Shared types, errors, and configuration for the **Gavel** auction engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`TeamId`], [`PlayerId`], [`ClientId`], [`LotId`]
//! - **Roster model**: [`Player`], [`PlayerStatus`], [`Category`], [`BidEntry`], [`Team`], [`TeamUpdate`]
//! - **Settings**: [`Settings`], [`IncrementLadder`], [`IncrementTier`]
//! - **Restricted release**: [`HoldBackPolicy`], [`UnlockRule`], [`PoolStats`]
//! - **Wire protocol**: [`Command`], [`CommandAck`], [`AuctionEvent`], [`EventEnvelope`]
//! - **Sync**: [`StateSnapshot`], [`SessionView`]
//! - **Receipts**: [`SaleReceipt`], [`RevertReceipt`], [`ReassignReceipt`], [`LotOutcome`]
//! - **Configuration**: [`EngineConfig`], [`SimulationConfig`]
//! - **Errors**: [`GavelError`] with `GV_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod hold_back;
pub mod ids;
pub mod player;
pub mod receipt;
pub mod settings;
pub mod snapshot;
pub mod team;

// Re-export all primary types at crate root:
//   use gavel_types::{Player, Team, Settings, AuctionEvent, ...};

pub use command::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use hold_back::*;
pub use ids::*;
pub use player::*;
pub use receipt::*;
pub use settings::*;
pub use snapshot::*;
pub use team::*;

// Constants are accessed via `gavel_types::constants::FOO`.
