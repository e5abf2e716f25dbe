//! Simulated auction run.
//!
//! The driver plays every team through the normal command path: it
//! nominates, lets each interested team bid up to a private ceiling, and
//! closes the lot. It holds no special access to the session, so a
//! simulation exercises exactly what live clients do.
//!
//! A team's ceiling for a lot is a category-dependent share of its legal
//! maximum, jittered by ±0.1 and never below the base price:
//!
//! | Category | Share |
//! |----------|-------|
//! | Gold     | 0.50  |
//! | Platinum | 0.65  |
//! | Diamond  | 0.80  |

use std::sync::Arc;
use std::time::Duration;

use gavel_roster::{RosterStore, max_bid};
use gavel_types::{
    Category, ClientId, Command, CommandAck, GavelError, LotOutcome, NominatedLot, PlayerStatus,
    Result, Settings, SimulationConfig, SimulationReport, StateSnapshot, TeamId,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::actor::SessionHandle;

/// A team taking part in one lot, with the most it will pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bidder {
    pub team_id: TeamId,
    pub ceiling: u64,
}

fn willingness(category: Category) -> f64 {
    match category {
        Category::Gold => 0.5,
        Category::Platinum => 0.65,
        Category::Diamond => 0.8,
    }
}

/// Teams that can afford the opening price, each with a jittered ceiling.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn interested_bidders<S, R>(store: &S, settings: &Settings, lot: &NominatedLot, rng: &mut R) -> Vec<Bidder>
where
    S: RosterStore,
    R: Rng + ?Sized,
{
    let category = lot.player.category;
    store
        .snapshot()
        .teams
        .values()
        .filter_map(|team| {
            let max = max_bid(team, settings, Some(category));
            if max < lot.base_price {
                return None;
            }
            let share = willingness(category) + rng.gen_range(-0.1..0.1);
            let ceiling = ((max as f64) * share).floor() as u64;
            Some(Bidder {
                team_id: team.id,
                ceiling: ceiling.max(lot.base_price),
            })
        })
        .collect()
}

/// Next legal bid as seen in `snapshot`.
fn next_bid(snapshot: &StateSnapshot) -> u64 {
    match snapshot.leading_team_id {
        None => snapshot.current_bid,
        Some(_) => snapshot.current_bid + snapshot.settings.increment_for(snapshot.current_bid),
    }
}

pub struct SimulationDriver<S> {
    handle: SessionHandle,
    store: Arc<S>,
    client: ClientId,
    rng: StdRng,
    step_delay: Duration,
}

impl<S: RosterStore> SimulationDriver<S> {
    #[must_use]
    pub fn new(handle: SessionHandle, store: Arc<S>, config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            handle,
            store,
            client: ClientId::new(),
            rng,
            step_delay: Duration::from_millis(config.step_delay_ms),
        }
    }

    fn pool_is_empty(&self) -> bool {
        !self
            .store
            .snapshot()
            .players
            .values()
            .any(|p| p.status == PlayerStatus::Available)
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    /// Auction up to `count` lots, or until no player is Available.
    ///
    /// Unsold players are left Unsold; the run never starts a new round.
    pub async fn run(mut self, count: Option<usize>) -> Result<SimulationReport> {
        let mut report = SimulationReport::default();
        while count.is_none_or(|limit| report.lots < limit) {
            if self.pool_is_empty() {
                break;
            }
            let lot = match self.handle.execute(self.client, Command::NominateRandom).await? {
                CommandAck::Nominated { lot } => lot,
                CommandAck::NoPlayersAvailable => break,
                other => {
                    return Err(GavelError::Internal(format!(
                        "unexpected reply to nomination: {other:?}"
                    )));
                }
            };
            report.lots += 1;
            self.pause().await;

            let settings = self.handle.snapshot().settings;
            let mut bidders =
                interested_bidders(self.store.as_ref(), &settings, &lot, &mut self.rng);
            bidders.shuffle(&mut self.rng);
            debug!(lot = %lot.lot_id, player = %lot.player.name, bidders = bidders.len(), "simulating lot");

            report.bids += self.bidding_war(&bidders).await?;
            self.close(&lot, &mut report).await?;
            self.pause().await;
        }
        info!(lots = report.lots, sold = report.sold, "simulation finished");
        Ok(report)
    }

    /// Rounds of bids until a full round passes with none placed.
    async fn bidding_war(&self, bidders: &[Bidder]) -> Result<usize> {
        let mut placed = 0;
        loop {
            let mut placed_this_round = false;
            for bidder in bidders {
                let snapshot = self.handle.snapshot();
                if snapshot.leading_team_id == Some(bidder.team_id) {
                    continue;
                }
                let amount = next_bid(&snapshot);
                if amount > bidder.ceiling {
                    continue;
                }
                match self.handle.bid(self.client, bidder.team_id, Some(amount)).await {
                    Ok(_) => {
                        placed += 1;
                        placed_this_round = true;
                        self.pause().await;
                    }
                    // The lot moved or the team's purse changed; skip this turn.
                    Err(err) if err.is_rejection() => {
                        debug!(team = %bidder.team_id, error = %err, "simulated bid refused");
                    }
                    Err(err) => return Err(err),
                }
            }
            if !placed_this_round {
                return Ok(placed);
            }
        }
    }

    async fn close(&self, lot: &NominatedLot, report: &mut SimulationReport) -> Result<()> {
        let outcome = match self.handle.end_lot(self.client).await? {
            CommandAck::Settled { outcome } => Some(outcome),
            // Already closed by the countdown.
            _ => None,
        };
        match outcome {
            Some(LotOutcome::Sold(receipt)) => {
                report.sold += 1;
                report.points_spent += receipt.amount;
            }
            Some(LotOutcome::Unsold { .. }) => report.unsold += 1,
            None => match self.store.player(lot.player.id) {
                Some(player) if player.status == PlayerStatus::Sold => {
                    report.sold += 1;
                    report.points_spent += player.selling_price.unwrap_or(0);
                }
                _ => report.unsold += 1,
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gavel_roster::MemoryRoster;
    use gavel_types::{LotId, Player, Team};

    use super::*;

    fn lot(category: Category, base_price: u64) -> NominatedLot {
        NominatedLot {
            lot_id: LotId(1),
            player: Player::dummy(category),
            base_price,
        }
    }

    #[test]
    fn ceilings_follow_category_share() {
        let store = MemoryRoster::with_records(
            vec![Team::new("A", "a", 100_000, 0), Team::new("B", "b", 100_000, 0)],
            vec![],
        );
        let settings = Settings::default();
        let mut rng = StdRng::seed_from_u64(3);
        let lot = lot(Category::Diamond, 10_000);
        let roster = store.snapshot();
        let max = max_bid(roster.teams.values().next().unwrap(), &settings, Some(Category::Diamond));

        for bidder in interested_bidders(&store, &settings, &lot, &mut rng) {
            assert!(bidder.ceiling >= lot.base_price);
            assert!(bidder.ceiling <= max * 9 / 10, "{} > 0.9 x {max}", bidder.ceiling);
            assert!(bidder.ceiling >= max * 7 / 10 - 1, "{} < 0.7 x {max}", bidder.ceiling);
        }
    }

    #[test]
    fn teams_below_base_price_sit_out() {
        let store = MemoryRoster::with_records(
            vec![Team::new("Rich", "r", 100_000, 0), Team::new("Broke", "b", 100, 0)],
            vec![],
        );
        let mut rng = StdRng::seed_from_u64(3);
        let bidders = interested_bidders(&store, &Settings::default(), &lot(Category::Gold, 5_000), &mut rng);
        assert_eq!(bidders.len(), 1);
    }

    #[test]
    fn ceiling_never_below_base_price() {
        let mut settings = Settings::default();
        settings.min_required.clear();
        let store = MemoryRoster::with_records(vec![Team::new("Tight", "t", 5_000, 0)], vec![]);
        let mut rng = StdRng::seed_from_u64(9);
        let bidders = interested_bidders(&store, &settings, &lot(Category::Gold, 5_000), &mut rng);
        assert_eq!(bidders[0].ceiling, 5_000);
    }

    #[test]
    fn next_bid_opens_at_base() {
        let mut snapshot = StateSnapshot::idle(Settings::default(), 0);
        snapshot.current_bid = 5_000;
        assert_eq!(next_bid(&snapshot), 5_000);
        snapshot.leading_team_id = Some(TeamId::new());
        assert_eq!(next_bid(&snapshot), 6_000);
    }
}
