//! Settlement receipts.
//!
//! Every committed settlement-engine transaction returns a receipt holding
//! the post-commit records it touched, so callers can broadcast them without
//! re-reading the store.

use serde::{Deserialize, Serialize};

use crate::{Player, Team};

/// Result of `settle-win` (auction sale or manual assignment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub player: Player,
    pub team: Team,
    pub amount: u64,
}

/// Result of `revert-to-unsold` / `revert-to-available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertReceipt {
    pub player: Player,
    pub refunded_team: Team,
    pub refunded_amount: u64,
}

/// Result of `reassign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignReceipt {
    pub player: Player,
    /// The refunded previous owner. Equal to `to_team` when a sale is
    /// re-priced under the same team.
    pub from_team: Team,
    pub to_team: Team,
    pub amount: u64,
}

/// Outcome of settling a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotOutcome {
    Sold(SaleReceipt),
    Unsold { player: Player },
}

impl LotOutcome {
    #[must_use]
    pub fn player(&self) -> &Player {
        match self {
            Self::Sold(receipt) => &receipt.player,
            Self::Unsold { player } => player,
        }
    }

    #[must_use]
    pub fn is_sold(&self) -> bool {
        matches!(self, Self::Sold(_))
    }
}
