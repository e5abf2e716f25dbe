//! Purse conservation and roster audit.
//!
//! Per team, settlement moves points between `purse` and `points_spent` and
//! never creates or destroys them:
//! ```text
//! ∀ team: purse + points_spent == baseline
//! baseline = first observed total + Σ booster grants + Σ admin purse edits
//! ```
//!
//! The roster audit checks the denormalized aggregates against the player
//! records they summarize.

use std::collections::BTreeMap;

use gavel_roster::Roster;
use gavel_types::{Category, GavelError, PlayerStatus, Result, Team, TeamId};

/// Tracks each team's conserved total.
#[derive(Debug, Default, Clone)]
pub struct ConservationLedger {
    baselines: BTreeMap<TeamId, u64>,
    granted: BTreeMap<TeamId, u64>,
}

impl ConservationLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed baselines from every team in `roster`.
    #[must_use]
    pub fn from_roster(roster: &Roster) -> Self {
        let mut ledger = Self::new();
        for team in roster.teams.values() {
            ledger.observe(team);
        }
        ledger
    }

    /// Record `team`'s current total as its baseline if it has none yet.
    pub fn observe(&mut self, team: &Team) {
        self.baselines.entry(team.id).or_insert(team.budget_total());
    }

    /// Record a booster grant. `before` is the team's total before the grant.
    pub fn record_grant(&mut self, team_id: TeamId, before: u64, amount: u64) {
        let baseline = self.baselines.entry(team_id).or_insert(before);
        *baseline = baseline.saturating_add(amount);
        let granted = self.granted.entry(team_id).or_insert(0);
        *granted = granted.saturating_add(amount);
    }

    /// Record an administrative purse edit from `before` to `after` total.
    pub fn record_adjustment(&mut self, team_id: TeamId, before: u64, after: u64) {
        let baseline = self.baselines.entry(team_id).or_insert(before);
        if after >= before {
            *baseline = baseline.saturating_add(after - before);
        } else {
            *baseline = baseline.saturating_sub(before - after);
        }
    }

    #[must_use]
    pub fn expected(&self, team_id: TeamId) -> Option<u64> {
        self.baselines.get(&team_id).copied()
    }

    /// Total points granted to `team_id` by boosters.
    #[must_use]
    pub fn granted(&self, team_id: TeamId) -> u64 {
        self.granted.get(&team_id).copied().unwrap_or(0)
    }

    /// Check one team. Teams without a baseline pass.
    pub fn check(&self, team: &Team) -> Result<()> {
        let Some(expected) = self.expected(team.id) else {
            return Ok(());
        };
        let actual = team.budget_total();
        if actual != expected {
            return Err(GavelError::ConservationViolation {
                reason: format!(
                    "{} ({}): purse {} + spent {} = {actual} != baseline {expected} (granted={})",
                    team.id,
                    team.name,
                    team.purse,
                    team.points_spent,
                    self.granted(team.id),
                ),
            });
        }
        Ok(())
    }

    /// Check every team in `teams`.
    pub fn verify<'a>(&self, teams: impl IntoIterator<Item = &'a Team>) -> Result<()> {
        teams.into_iter().try_for_each(|team| self.check(team))
    }

    pub fn forget(&mut self, team_id: TeamId) {
        self.baselines.remove(&team_id);
        self.granted.remove(&team_id);
    }

    pub fn clear(&mut self) {
        self.baselines.clear();
        self.granted.clear();
    }

    #[must_use]
    pub fn tracked_teams(&self) -> usize {
        self.baselines.len()
    }
}

/// Check roster-wide structural invariants:
/// - every team's `owned_by_category` matches its Sold players
/// - Sold players carry a price and a winning team that exists
/// - players that are not Sold carry no sale attribution
/// - at most one player is InFlight
pub fn audit_roster(roster: &Roster) -> Result<()> {
    let mut counted: BTreeMap<TeamId, BTreeMap<Category, u32>> = BTreeMap::new();
    let mut in_flight = 0usize;

    for player in roster.players.values() {
        match player.status {
            PlayerStatus::Sold => {
                let (Some(team_id), Some(_)) = (player.winning_team_id, player.selling_price)
                else {
                    return Err(inconsistent(format!(
                        "{} is SOLD without price or winning team",
                        player.id
                    )));
                };
                if roster.team(team_id).is_none() {
                    return Err(inconsistent(format!(
                        "{} is owned by missing {team_id}",
                        player.id
                    )));
                }
                *counted
                    .entry(team_id)
                    .or_default()
                    .entry(player.category)
                    .or_insert(0) += 1;
            }
            status => {
                if player.winning_team_id.is_some() || player.selling_price.is_some() {
                    return Err(inconsistent(format!(
                        "{} is {status} but still carries sale attribution",
                        player.id
                    )));
                }
                if status == PlayerStatus::InFlight {
                    in_flight += 1;
                }
            }
        }
    }

    if in_flight > 1 {
        return Err(inconsistent(format!("{in_flight} players are IN_FLIGHT")));
    }

    for team in roster.teams.values() {
        let owned = counted.remove(&team.id).unwrap_or_default();
        for category in Category::ALL {
            let actual = owned.get(&category).copied().unwrap_or(0);
            if team.owned(category) != actual {
                return Err(inconsistent(format!(
                    "{} records {} {category} players but owns {actual}",
                    team.id,
                    team.owned(category)
                )));
            }
        }
    }
    Ok(())
}

fn inconsistent(reason: String) -> GavelError {
    GavelError::RosterInconsistent { reason }
}
