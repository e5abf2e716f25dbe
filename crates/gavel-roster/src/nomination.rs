//! Nomination policy: picks the next lot.
//!
//! The pool is every Available player. An empty pool triggers a round
//! rollover (every Unsold player becomes Available again) before giving up.
//! In restricted mode the hold-back policy filters the pool, falling back
//! to the unfiltered pool rather than stalling the auction.
//!
//! Rollover, selection, and the chosen player's move to InFlight commit in
//! one roster transaction.

use gavel_types::{GavelError, HoldBackPolicy, Player, PlayerStatus, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::store::{RosterStore, RosterTxn, pool_stats};

/// What a nomination attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolOutcome {
    /// The player now on the block, already marked InFlight.
    Nominated(Player),
    /// Nothing Available and nothing Unsold to roll over.
    Exhausted,
}

/// Result of one nomination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nomination {
    /// Players promoted from Unsold by an automatic rollover.
    pub promoted: usize,
    pub outcome: PoolOutcome,
}

/// Chooses lots from the Available pool.
#[derive(Debug, Clone, Default)]
pub struct NominationPolicy {
    hold_back: Option<HoldBackPolicy>,
}

impl NominationPolicy {
    /// A policy that applies `hold_back` only if it is enabled.
    #[must_use]
    pub fn new(hold_back: Option<HoldBackPolicy>) -> Self {
        Self {
            hold_back: hold_back.filter(|p| p.enabled),
        }
    }

    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.hold_back.is_some()
    }

    /// Available players eligible for nomination, given the full player list.
    ///
    /// Empty only when nothing is Available.
    #[must_use]
    pub fn eligible<'a>(&self, players: &'a [Player]) -> Vec<&'a Player> {
        let available: Vec<&Player> = players
            .iter()
            .filter(|p| p.status == PlayerStatus::Available)
            .collect();

        let Some(policy) = &self.hold_back else {
            return available;
        };
        let stats = pool_stats(players);
        let held = policy.held_names(&stats);
        if held.is_empty() {
            return available;
        }

        let normal: Vec<&Player> = available
            .iter()
            .copied()
            .filter(|p| !held.contains(&p.name.to_lowercase()))
            .collect();
        if normal.is_empty() {
            debug!(available = available.len(), "every available player is held; using full pool");
            available
        } else {
            debug!(
                eligible = normal.len(),
                held = available.len() - normal.len(),
                "restricted nomination pool"
            );
            normal
        }
    }

    /// Nominate a uniformly random eligible player.
    pub fn nominate<S, R>(&self, store: &S, rng: &mut R) -> Result<Nomination>
    where
        S: RosterStore,
        R: Rng + ?Sized,
    {
        store.transact(|txn| {
            if let Some(in_flight) = txn
                .players()
                .into_iter()
                .find(|p| p.status == PlayerStatus::InFlight)
            {
                return Err(GavelError::RosterInconsistent {
                    reason: format!("{} is already in flight", in_flight.id),
                });
            }

            let mut players = txn.players();
            let mut promoted = 0;
            if !players.iter().any(|p| p.status == PlayerStatus::Available) {
                promoted = promote_unsold(txn);
                if promoted == 0 {
                    return Ok(Nomination {
                        promoted,
                        outcome: PoolOutcome::Exhausted,
                    });
                }
                info!(promoted, "pool empty; new round started");
                players = txn.players();
            }

            let eligible = self.eligible(&players);
            let Some(chosen) = eligible.choose(rng) else {
                return Ok(Nomination {
                    promoted,
                    outcome: PoolOutcome::Exhausted,
                });
            };

            let mut player = (*chosen).clone();
            player.status = PlayerStatus::InFlight;
            player.bid_history.clear();
            txn.put_player(player.clone());
            Ok(Nomination {
                promoted,
                outcome: PoolOutcome::Nominated(player),
            })
        })
    }
}

/// Promote every Unsold player to Available. Fails if there is nothing to
/// promote.
pub fn start_new_round<S: RosterStore>(store: &S) -> Result<usize> {
    store.transact(|txn| {
        let promoted = promote_unsold(txn);
        if promoted == 0 {
            return Err(GavelError::NoUnsoldPlayers);
        }
        Ok(promoted)
    })
}

fn promote_unsold(txn: &mut RosterTxn<'_>) -> usize {
    let unsold: Vec<Player> = txn
        .players()
        .into_iter()
        .filter(|p| p.status == PlayerStatus::Unsold)
        .collect();
    let promoted = unsold.len();
    for mut player in unsold {
        player.status = PlayerStatus::Available;
        txn.put_player(player);
    }
    promoted
}
