//! Auction settings: timer, base prices, roster quotas, booster economics,
//! and the bid-increment ladder.
//!
//! Settings arrive from the auctioneer as a typed payload and are validated
//! as a whole before they replace the live settings. Successful validation
//! marks them `finalized`, which is what allows nomination and bidding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, GavelError, Result, constants};

/// One tier of the increment ladder: bids in `[from, to)` step by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementTier {
    pub from: u64,
    /// Exclusive upper bound. `None` means unbounded.
    #[serde(default)]
    pub to: Option<u64>,
    pub step: u64,
}

impl IncrementTier {
    #[must_use]
    pub fn new(from: u64, to: Option<u64>, step: u64) -> Self {
        Self { from, to, step }
    }

    #[must_use]
    pub fn contains(&self, bid: u64) -> bool {
        bid >= self.from && self.to.is_none_or(|to| bid < to)
    }
}

/// Ordered increment tiers covering `[0, ∞)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncrementLadder(pub Vec<IncrementTier>);

impl IncrementLadder {
    /// Step to add to `current_bid` to form the next bid.
    ///
    /// Falls back to the last tier's step when no tier contains the bid.
    #[must_use]
    pub fn increment_for(&self, current_bid: u64) -> u64 {
        self.0
            .iter()
            .find(|tier| tier.contains(current_bid))
            .or_else(|| self.0.last())
            .map_or(constants::FALLBACK_INCREMENT, |tier| tier.step)
    }

    /// Check that the tiers are contiguous from 0 and end unbounded.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.0.first() else {
            return Err(invalid("increment ladder is empty"));
        };
        if first.from != 0 {
            return Err(invalid(format!(
                "increment ladder must start at 0, starts at {}",
                first.from
            )));
        }
        let last_index = self.0.len() - 1;
        for (i, tier) in self.0.iter().enumerate() {
            if tier.step == 0 {
                return Err(invalid(format!("tier {i} has a zero step")));
            }
            match (tier.to, i == last_index) {
                (None, true) => {}
                (None, false) => {
                    return Err(invalid(format!("tier {i} is unbounded but not last")));
                }
                (Some(_), true) => {
                    return Err(invalid("last tier must be unbounded"));
                }
                (Some(to), false) => {
                    if to <= tier.from {
                        return Err(invalid(format!(
                            "tier {i} is empty: from {} to {to}",
                            tier.from
                        )));
                    }
                    let next = &self.0[i + 1];
                    if next.from != to {
                        return Err(invalid(format!(
                            "tier {} starts at {} but tier {i} ends at {to}",
                            i + 1,
                            next.from
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for IncrementLadder {
    fn default() -> Self {
        Self(vec![
            IncrementTier::new(0, Some(10_000), 1_000),
            IncrementTier::new(10_000, Some(30_000), 2_000),
            IncrementTier::new(30_000, None, 5_000),
        ])
    }
}

/// Live auction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub timer_duration_secs: u32,
    pub base_price: BTreeMap<Category, u64>,
    /// Quota each team must be able to fill; drives the affordability reserve.
    pub min_required: BTreeMap<Category, u32>,
    pub points_per_booster: u64,
    pub initial_boosters_per_team: u32,
    pub bid_increments: IncrementLadder,
    /// Set once the auctioneer has submitted valid settings.
    #[serde(default)]
    pub finalized: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_duration_secs: constants::DEFAULT_TIMER_SECS,
            base_price: BTreeMap::from([
                (Category::Platinum, 3_000),
                (Category::Gold, 5_000),
                (Category::Diamond, 10_000),
            ]),
            min_required: BTreeMap::from([
                (Category::Platinum, 2),
                (Category::Gold, 3),
                (Category::Diamond, 1),
            ]),
            points_per_booster: constants::DEFAULT_POINTS_PER_BOOSTER,
            initial_boosters_per_team: constants::DEFAULT_INITIAL_BOOSTERS,
            bid_increments: IncrementLadder::default(),
            finalized: false,
        }
    }
}

impl Settings {
    /// Base price for a category. Categories without a configured price
    /// cost nothing (validated settings always configure every category).
    #[must_use]
    pub fn base_price_for(&self, category: Category) -> u64 {
        self.base_price.get(&category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn min_required_for(&self, category: Category) -> u32 {
        self.min_required.get(&category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn increment_for(&self, current_bid: u64) -> u64 {
        self.bid_increments.increment_for(current_bid)
    }

    /// Validate every field.
    pub fn validate(&self) -> Result<()> {
        if self.timer_duration_secs == 0 {
            return Err(invalid("timer duration must be positive"));
        }
        for category in Category::ALL {
            if !self.base_price.contains_key(&category) {
                return Err(invalid(format!("missing base price for {category}")));
            }
        }
        self.bid_increments.validate()
    }

    /// Validate and return a finalized copy.
    pub fn finalize(mut self) -> Result<Self> {
        self.validate()?;
        self.finalized = true;
        Ok(self)
    }
}

fn invalid(reason: impl Into<String>) -> GavelError {
    GavelError::InvalidSettings {
        reason: reason.into(),
    }
}
