//! Transactional roster storage.
//!
//! Team and player records live behind the [`RosterStore`] trait. Every
//! mutation goes through [`RosterStore::transact`]: the closure stages
//! writes against a [`RosterTxn`], and the store commits all of them or
//! none. A closure that returns `Err` leaves the store untouched.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use gavel_types::{GavelError, Player, PlayerId, PlayerStatus, PoolStats, Result, Team, TeamId};
use parking_lot::RwLock;
use tracing::{debug, error};

/// A consistent copy of every team and player record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub teams: BTreeMap<TeamId, Team>,
    pub players: BTreeMap<PlayerId, Player>,
}

impl Roster {
    #[must_use]
    pub fn from_records(teams: Vec<Team>, players: Vec<Player>) -> Self {
        Self {
            teams: teams.into_iter().map(|t| (t.id, t)).collect(),
            players: players.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    #[must_use]
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Players currently in `status`.
    pub fn players_in(&self, status: PlayerStatus) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |p| p.status == status)
    }

    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        pool_stats(self.players.values())
    }
}

/// Counts used by hold-back unlock rules.
pub fn pool_stats<'a>(players: impl IntoIterator<Item = &'a Player>) -> PoolStats {
    let mut stats = PoolStats::default();
    for player in players {
        stats.total_players += 1;
        match player.status {
            PlayerStatus::Available => stats.available_players += 1,
            PlayerStatus::Sold => {
                stats.sold_players += 1;
                *stats.sold_by_category.entry(player.category).or_insert(0) += 1;
            }
            PlayerStatus::InFlight | PlayerStatus::Unsold => {}
        }
    }
    stats
}

/// Staged writes over a read-only base roster.
///
/// Reads see staged records first, so a closure observes its own writes.
pub struct RosterTxn<'a> {
    base: &'a Roster,
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    purged: bool,
}

impl<'a> RosterTxn<'a> {
    #[must_use]
    pub fn new(base: &'a Roster) -> Self {
        Self {
            base,
            teams: BTreeMap::new(),
            players: BTreeMap::new(),
            purged: false,
        }
    }

    #[must_use]
    pub fn team(&self, id: TeamId) -> Option<Team> {
        if let Some(team) = self.teams.get(&id) {
            return Some(team.clone());
        }
        if self.purged {
            return None;
        }
        self.base.team(id).cloned()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<Player> {
        if let Some(player) = self.players.get(&id) {
            return Some(player.clone());
        }
        if self.purged {
            return None;
        }
        self.base.player(id).cloned()
    }

    pub fn require_team(&self, id: TeamId) -> Result<Team> {
        self.team(id).ok_or(GavelError::TeamNotFound(id))
    }

    pub fn require_player(&self, id: PlayerId) -> Result<Player> {
        self.player(id).ok_or(GavelError::PlayerNotFound(id))
    }

    pub fn put_team(&mut self, team: Team) {
        self.teams.insert(team.id, team);
    }

    pub fn put_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    /// Every player as this transaction sees it.
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        let mut merged = if self.purged {
            BTreeMap::new()
        } else {
            self.base.players.clone()
        };
        merged.extend(self.players.iter().map(|(id, p)| (*id, p.clone())));
        merged.into_values().collect()
    }

    /// Every team as this transaction sees it.
    #[must_use]
    pub fn teams(&self) -> Vec<Team> {
        let mut merged = if self.purged {
            BTreeMap::new()
        } else {
            self.base.teams.clone()
        };
        merged.extend(self.teams.iter().map(|(id, t)| (*id, t.clone())));
        merged.into_values().collect()
    }

    /// Drop every record, including anything staged so far.
    pub fn purge(&mut self) {
        self.purged = true;
        self.teams.clear();
        self.players.clear();
    }

    /// Number of records this transaction will write.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.teams.len() + self.players.len()
    }

    fn into_writes(self) -> Writes {
        Writes {
            teams: self.teams,
            players: self.players,
            purged: self.purged,
        }
    }
}

struct Writes {
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    purged: bool,
}

impl Writes {
    fn apply(self, roster: &mut Roster) {
        if self.purged {
            roster.teams.clear();
            roster.players.clear();
        }
        roster.teams.extend(self.teams);
        roster.players.extend(self.players);
    }
}

/// Durable team and player records with atomic multi-record transactions.
pub trait RosterStore: Send + Sync + 'static {
    /// A consistent copy of every record.
    fn snapshot(&self) -> Roster;

    fn team(&self, id: TeamId) -> Option<Team>;

    fn player(&self, id: PlayerId) -> Option<Player>;

    /// Run `f` against a fresh transaction and commit its writes atomically.
    ///
    /// Transactions are serialized with respect to each other. If `f`
    /// fails, or the commit itself fails, nothing is written.
    fn transact<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut RosterTxn<'_>) -> Result<R>;
}

/// In-memory [`RosterStore`].
///
/// Supports injecting commit failures so callers can exercise their
/// storage-error paths.
#[derive(Default)]
pub struct MemoryRoster {
    inner: RwLock<Roster>,
    failing_commits: AtomicU32,
}

impl MemoryRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            inner: RwLock::new(roster),
            failing_commits: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_records(teams: Vec<Team>, players: Vec<Player>) -> Self {
        Self::with_roster(Roster::from_records(teams, players))
    }

    /// Make the next `n` commits fail with a storage error.
    pub fn fail_next_commits(&self, n: u32) {
        self.failing_commits.store(n, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl RosterStore for MemoryRoster {
    fn snapshot(&self) -> Roster {
        self.inner.read().clone()
    }

    fn team(&self, id: TeamId) -> Option<Team> {
        self.inner.read().team(id).cloned()
    }

    fn player(&self, id: PlayerId) -> Option<Player> {
        self.inner.read().player(id).cloned()
    }

    fn transact<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut RosterTxn<'_>) -> Result<R>,
    {
        let mut guard = self.inner.write();
        let (result, writes) = {
            let mut txn = RosterTxn::new(&guard);
            let result = f(&mut txn)?;
            (result, txn.into_writes())
        };

        if self.take_injected_failure() {
            error!("roster commit failed (injected)");
            return Err(GavelError::Storage {
                reason: "commit rejected by store".into(),
            });
        }

        debug!(
            teams = writes.teams.len(),
            players = writes.players.len(),
            purged = writes.purged,
            "roster commit"
        );
        writes.apply(&mut guard);
        Ok(result)
    }
}
