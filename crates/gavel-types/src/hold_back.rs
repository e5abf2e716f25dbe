//! Declarative hold-back policy for restricted nomination.
//!
//! In restricted mode some named players are kept off the block early in
//! the auction. A name is released once the sold fraction crosses
//! `release_sold_fraction`, or, for conditionally held names, once that
//! name's own unlock rule is satisfied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Condition under which a conditionally held player is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockRule {
    /// Released once at least `count` players of `category` are Sold.
    CategorySoldAtLeast { category: Category, count: u32 },
    /// Released once the Available pool holds at most `remaining` players.
    PoolAtMost { remaining: usize },
}

/// A single conditionally held name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalHold {
    pub name: String,
    pub rule: UnlockRule,
}

/// Pool facts an unlock rule is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub total_players: usize,
    pub sold_players: usize,
    pub available_players: usize,
    pub sold_by_category: BTreeMap<Category, u32>,
}

impl PoolStats {
    #[must_use]
    pub fn sold_in(&self, category: Category) -> u32 {
        self.sold_by_category.get(&category).copied().unwrap_or(0)
    }

    /// Fraction of all players already Sold. Zero for an empty roster.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sold_fraction(&self) -> f64 {
        if self.total_players == 0 {
            0.0
        } else {
            self.sold_players as f64 / self.total_players as f64
        }
    }
}

impl UnlockRule {
    #[must_use]
    pub fn is_satisfied(&self, stats: &PoolStats) -> bool {
        match *self {
            Self::CategorySoldAtLeast { category, count } => stats.sold_in(category) >= count,
            Self::PoolAtMost { remaining } => stats.available_players <= remaining,
        }
    }
}

/// Restricted-release configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldBackPolicy {
    /// Restricted mode switch.
    pub enabled: bool,
    /// Names held until the late phase. Compared case-insensitively.
    #[serde(default)]
    pub held_back: Vec<String>,
    /// Names held until their own rule (or the late phase) releases them.
    #[serde(default)]
    pub conditional: Vec<ConditionalHold>,
    /// Sold fraction at which every hold is lifted.
    pub release_sold_fraction: f64,
}

impl Default for HoldBackPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            held_back: Vec::new(),
            conditional: Vec::new(),
            release_sold_fraction: crate::constants::DEFAULT_RELEASE_SOLD_FRACTION,
        }
    }
}

impl HoldBackPolicy {
    /// Whether the late phase has started, lifting every hold.
    #[must_use]
    pub fn is_late_phase(&self, stats: &PoolStats) -> bool {
        stats.total_players > 0 && stats.sold_fraction() >= self.release_sold_fraction
    }

    /// Lower-cased names that are currently held back.
    #[must_use]
    pub fn held_names(&self, stats: &PoolStats) -> Vec<String> {
        if !self.enabled || self.is_late_phase(stats) {
            return Vec::new();
        }
        let mut names: Vec<String> = self.held_back.iter().map(|n| n.to_lowercase()).collect();
        names.extend(
            self.conditional
                .iter()
                .filter(|hold| !hold.rule.is_satisfied(stats))
                .map(|hold| hold.name.to_lowercase()),
        );
        names
    }

    /// Whether `name` is held back right now.
    #[must_use]
    pub fn holds(&self, name: &str, stats: &PoolStats) -> bool {
        let name = name.to_lowercase();
        self.held_names(stats).contains(&name)
    }
}
