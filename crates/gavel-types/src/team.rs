//! Team records: purse, spend, boosters, and the denormalized per-category
//! roster counts used by the affordability calculator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, TeamId};

/// A bidding team as held by the roster store.
///
/// `owned_by_category` is a cached aggregate of the Sold players attributed
/// to this team. It is only ever changed inside the same transaction that
/// changes the authoritative player status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub owner_name: String,
    /// Spendable budget.
    pub purse: u64,
    /// Cumulative points spent on players currently or previously won.
    pub points_spent: u64,
    pub boosters_available: u32,
    pub owned_by_category: BTreeMap<Category, u32>,
}

impl Team {
    /// Create a team with an empty roster.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        owner_name: impl Into<String>,
        purse: u64,
        boosters_available: u32,
    ) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            owner_name: owner_name.into(),
            purse,
            points_spent: 0,
            boosters_available,
            owned_by_category: BTreeMap::new(),
        }
    }

    /// Number of players of `category` this team owns.
    #[must_use]
    pub fn owned(&self, category: Category) -> u32 {
        self.owned_by_category.get(&category).copied().unwrap_or(0)
    }

    /// Total players owned across categories.
    #[must_use]
    pub fn roster_size(&self) -> u32 {
        self.owned_by_category.values().sum()
    }

    /// `purse + points_spent`: the quantity conserved by settlement.
    #[must_use]
    pub fn budget_total(&self) -> u64 {
        self.purse.saturating_add(self.points_spent)
    }

    /// `purse + points_spent + amount`, or `None` past `u64::MAX`.
    #[must_use]
    pub fn checked_total_with(&self, amount: u64) -> Option<u64> {
        self.purse.checked_add(self.points_spent)?.checked_add(amount)
    }
}

/// Partial update applied by the administrative `update-team` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub owner_name: Option<String>,
    pub purse: Option<u64>,
}

impl TeamUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.owner_name.is_none() && self.purse.is_none()
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Team {
    pub fn dummy(purse: u64) -> Self {
        Self::new("Test XI", "Owner", purse, 3)
    }

    pub fn dummy_owning(purse: u64, owned: &[(Category, u32)]) -> Self {
        let mut team = Self::dummy(purse);
        for (category, count) in owned {
            team.owned_by_category.insert(*category, *count);
        }
        team
    }
}
