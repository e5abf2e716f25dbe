//! Maximum legal bid for a team.
//!
//! A team must keep enough purse to fill its remaining minimum quotas at
//! base price. The lot on the block counts toward its own category's
//! quota, so one slot of that category is not reserved.
//!
//! Quotas are a reserve target only: a team that has met a category's
//! minimum may keep buying players of that category.

use std::collections::BTreeMap;

use gavel_types::{Category, Settings, Team};
use serde::{Deserialize, Serialize};

/// Breakdown of a team's buying power for one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordability {
    pub max_bid: u64,
    /// Purse held back for unmet quotas.
    pub reserve: u64,
    /// Unmet quota per category after crediting the lot on the block.
    pub unmet: BTreeMap<Category, u32>,
}

impl Affordability {
    #[must_use]
    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.max_bid
    }
}

/// Assess `team` against `lot_category` (the category of the player on the
/// block, if any).
#[must_use]
pub fn assess(team: &Team, settings: &Settings, lot_category: Option<Category>) -> Affordability {
    let mut unmet: BTreeMap<Category, u32> = Category::ALL
        .iter()
        .map(|&category| {
            let missing = settings
                .min_required_for(category)
                .saturating_sub(team.owned(category));
            (category, missing)
        })
        .collect();

    if let Some(category) = lot_category {
        if let Some(slots) = unmet.get_mut(&category) {
            *slots = slots.saturating_sub(1);
        }
    }

    let reserve = unmet
        .iter()
        .map(|(&category, &slots)| u64::from(slots) * settings.base_price_for(category))
        .sum::<u64>();

    Affordability {
        max_bid: team.purse.saturating_sub(reserve),
        reserve,
        unmet,
    }
}

/// Shorthand for `assess(..).max_bid`.
#[must_use]
pub fn max_bid(team: &Team, settings: &Settings, lot_category: Option<Category>) -> u64 {
    assess(team, settings, lot_category).max_bid
}
