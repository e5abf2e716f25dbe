//! Player records: the lots that get nominated, bid on, and settled.
//!
//! ## Status machine
//!
//! ```text
//!   ┌───────────┐ nominate ┌──────────┐ settle-win   ┌──────┐
//!   │ AVAILABLE ├─────────▶│ IN_FLIGHT├─────────────▶│ SOLD │
//!   └─────▲─────┘          └────┬─────┘              └──┬───┘
//!         │ rollover            │ settle-no-sale        │ revert
//!   ┌─────┴─────┐◀──────────────┘                       │
//!   │  UNSOLD   │◀──────────────────────────────────────┘
//!   └───────────┘        (or straight back to AVAILABLE)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PlayerId, TeamId};

/// Player category. Drives base price and roster quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    Platinum,
    Gold,
    Diamond,
}

impl Category {
    /// Every category, in a stable order.
    pub const ALL: [Category; 3] = [Category::Platinum, Category::Gold, Category::Diamond];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platinum => write!(f, "PLATINUM"),
            Self::Gold => write!(f, "GOLD"),
            Self::Diamond => write!(f, "DIAMOND"),
        }
    }
}

/// Lifecycle status of a player record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Eligible for nomination.
    Available,
    /// Currently on the block. At most one player system-wide.
    InFlight,
    /// Settled to a team.
    Sold,
    /// Settled with no bids; returns to the pool on the next round rollover.
    Unsold,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "AVAILABLE"),
            Self::InFlight => write!(f, "IN_FLIGHT"),
            Self::Sold => write!(f, "SOLD"),
            Self::Unsold => write!(f, "UNSOLD"),
        }
    }
}

/// One accepted bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidEntry {
    pub team_id: TeamId,
    pub amount: u64,
}

/// A player record as held by the roster store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub category: Category,
    pub skill: String,
    pub country: String,
    pub status: PlayerStatus,
    /// Final price. Present iff `status == Sold`.
    pub selling_price: Option<u64>,
    /// Buyer. Present iff `status == Sold`.
    pub winning_team_id: Option<TeamId>,
    /// Accepted bids in order. Frozen once the lot settles.
    pub bid_history: Vec<BidEntry>,
    /// When the last settlement touched this record.
    pub settled_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a fresh, available player.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: Category,
        skill: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            category,
            skill: skill.into(),
            country: country.into(),
            status: PlayerStatus::Available,
            selling_price: None,
            winning_team_id: None,
            bid_history: Vec::new(),
            settled_at: None,
        }
    }

    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.status == PlayerStatus::Sold
    }

    /// Drop sale attribution (price, buyer, timestamp).
    pub fn clear_sale(&mut self) {
        self.selling_price = None;
        self.winning_team_id = None;
        self.settled_at = None;
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Player {
    pub fn dummy(category: Category) -> Self {
        Self::new(format!("player-{category}"), category, "All-Rounder", "India")
    }

    pub fn dummy_named(name: &str, category: Category) -> Self {
        Self::new(name, category, "All-Rounder", "India")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_is_available() {
        let p = Player::dummy(Category::Gold);
        assert_eq!(p.status, PlayerStatus::Available);
        assert!(p.selling_price.is_none());
        assert!(p.winning_team_id.is_none());
        assert!(p.bid_history.is_empty());
    }

    #[test]
    fn clear_sale_removes_attribution() {
        let mut p = Player::dummy(Category::Diamond);
        p.status = PlayerStatus::Sold;
        p.selling_price = Some(12_000);
        p.winning_team_id = Some(TeamId::new());
        p.settled_at = Some(Utc::now());
        p.clear_sale();
        assert!(p.selling_price.is_none());
        assert!(p.winning_team_id.is_none());
        assert!(p.settled_at.is_none());
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Platinum.to_string(), "PLATINUM");
        assert_eq!(Category::Gold.to_string(), "GOLD");
        assert_eq!(Category::Diamond.to_string(), "DIAMOND");
    }

    #[test]
    fn status_serde_roundtrip() {
        let json = serde_json::to_string(&PlayerStatus::InFlight).unwrap();
        let back: PlayerStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlayerStatus::InFlight);
    }
}
