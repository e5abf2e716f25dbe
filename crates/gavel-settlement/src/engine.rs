//! The settlement engine.
//!
//! Every operation runs as one roster transaction:
//! 1. Check the lot idempotency guard (lot settlements only)
//! 2. Read the player and team records inside the transaction
//! 3. Check preconditions (status, purse, counters)
//! 4. Stage the player and team writes
//! 5. Check purse conservation on every staged team
//! 6. Commit, then update the guard and the ledger
//!
//! A failure at any step leaves the roster unchanged.

use std::sync::Arc;

use chrono::Utc;
use gavel_roster::RosterStore;
use gavel_types::{
    BidEntry, GavelError, LotId, LotOutcome, Player, PlayerId, PlayerStatus, ReassignReceipt,
    Result, RevertReceipt, SaleReceipt, Settings, Team, TeamId, TeamUpdate,
};
use tracing::{error, info, warn};

use crate::conservation::{ConservationLedger, audit_roster};
use crate::idempotency::IdempotencyGuard;

/// Where a reverted player goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertTarget {
    /// Back to Unsold; bid history is kept.
    Unsold,
    /// Back to Available; bid history is cleared.
    Available,
}

impl RevertTarget {
    fn status(self) -> PlayerStatus {
        match self {
            Self::Unsold => PlayerStatus::Unsold,
            Self::Available => PlayerStatus::Available,
        }
    }
}

/// Applies every purse, roster-count, and player-status change.
pub struct SettlementEngine<S> {
    store: Arc<S>,
    guard: IdempotencyGuard,
    ledger: ConservationLedger,
}

impl<S: RosterStore> SettlementEngine<S> {
    /// Create an engine over `store`, taking every current team total as
    /// its conservation baseline.
    pub fn new(store: Arc<S>) -> Self {
        let ledger = ConservationLedger::from_roster(&store.snapshot());
        Self {
            store,
            guard: IdempotencyGuard::default(),
            ledger,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub fn ledger(&self) -> &ConservationLedger {
        &self.ledger
    }

    #[must_use]
    pub fn is_settled(&self, lot: LotId) -> bool {
        self.guard.is_settled(lot)
    }

    // =================================================================
    // Lot settlement
    // =================================================================

    /// Settle the lot on the block: a sale to `winner` at its amount, or a
    /// no-sale when there is no winner.
    pub fn settle_lot(
        &mut self,
        lot: LotId,
        player_id: PlayerId,
        winner: Option<(TeamId, u64)>,
        history: Vec<BidEntry>,
    ) -> Result<LotOutcome> {
        self.guard.check(lot)?;
        let outcome = match winner {
            Some((team_id, amount)) => {
                let receipt = self.win(player_id, team_id, amount, history, &[PlayerStatus::InFlight])?;
                LotOutcome::Sold(receipt)
            }
            None => LotOutcome::Unsold {
                player: self.settle_no_sale(player_id)?,
            },
        };
        self.guard.mark_settled(lot)?;
        Ok(outcome)
    }

    /// Sell an InFlight player to `team_id` for `amount`.
    pub fn settle_win(
        &mut self,
        player_id: PlayerId,
        team_id: TeamId,
        amount: u64,
        history: Vec<BidEntry>,
    ) -> Result<SaleReceipt> {
        self.win(player_id, team_id, amount, history, &[PlayerStatus::InFlight])
    }

    /// Close an InFlight player with no bids.
    pub fn settle_no_sale(&mut self, player_id: PlayerId) -> Result<Player> {
        let player = self.store.transact(|txn| {
            let mut player = txn.require_player(player_id)?;
            expect_status(&player, &[PlayerStatus::InFlight])?;
            player.status = PlayerStatus::Unsold;
            player.settled_at = Some(Utc::now());
            txn.put_player(player.clone());
            Ok(player)
        })?;
        info!(player = %player.id, name = %player.name, "lot closed unsold");
        Ok(player)
    }

    /// Manually sell a player that was never auctioned (Available or Unsold).
    pub fn assign(&mut self, player_id: PlayerId, team_id: TeamId, price: u64) -> Result<SaleReceipt> {
        self.win(
            player_id,
            team_id,
            price,
            Vec::new(),
            &[PlayerStatus::Available, PlayerStatus::Unsold],
        )
    }

    fn win(
        &mut self,
        player_id: PlayerId,
        team_id: TeamId,
        amount: u64,
        history: Vec<BidEntry>,
        allowed: &[PlayerStatus],
    ) -> Result<SaleReceipt> {
        let ledger = &self.ledger;
        let receipt = self
            .store
            .transact(|txn| {
                let mut player = txn.require_player(player_id)?;
                expect_status(&player, allowed)?;
                let mut team = txn.require_team(team_id)?;
                debit(&mut team, &player, amount)?;
                ledger.check(&team)?;

                player.status = PlayerStatus::Sold;
                player.selling_price = Some(amount);
                player.winning_team_id = Some(team_id);
                player.bid_history = history;
                player.settled_at = Some(Utc::now());

                txn.put_team(team.clone());
                txn.put_player(player.clone());
                Ok(SaleReceipt {
                    player,
                    team,
                    amount,
                })
            })
            .inspect_err(|e| log_failure("settle-win", e))?;

        self.ledger.observe(&receipt.team);
        info!(
            player = %receipt.player.id,
            name = %receipt.player.name,
            team = %receipt.team.id,
            amount,
            purse = receipt.team.purse,
            "player sold"
        );
        Ok(receipt)
    }

    // =================================================================
    // Reversal
    // =================================================================

    /// Undo one sale: refund the buyer and return the player to `target`.
    pub fn revert(&mut self, player_id: PlayerId, target: RevertTarget) -> Result<RevertReceipt> {
        let ledger = &self.ledger;
        let receipt = self
            .store
            .transact(|txn| {
                let mut player = txn.require_player(player_id)?;
                let (team_id, amount) = sale_of(&player)?;
                let mut team = txn.require_team(team_id)?;
                refund(&mut team, &player, amount)?;
                ledger.check(&team)?;

                player.status = target.status();
                player.clear_sale();
                if target == RevertTarget::Available {
                    player.bid_history.clear();
                }

                txn.put_team(team.clone());
                txn.put_player(player.clone());
                Ok(RevertReceipt {
                    player,
                    refunded_team: team,
                    refunded_amount: amount,
                })
            })
            .inspect_err(|e| log_failure("revert", e))?;

        info!(
            player = %receipt.player.id,
            team = %receipt.refunded_team.id,
            refunded = receipt.refunded_amount,
            status = %receipt.player.status,
            "sale reverted"
        );
        Ok(receipt)
    }

    pub fn revert_to_unsold(&mut self, player_id: PlayerId) -> Result<RevertReceipt> {
        self.revert(player_id, RevertTarget::Unsold)
    }

    pub fn revert_to_available(&mut self, player_id: PlayerId) -> Result<RevertReceipt> {
        self.revert(player_id, RevertTarget::Available)
    }

    /// Move a Sold player to `new_team` at `new_amount` in one transaction.
    /// The bid history is kept.
    pub fn reassign(
        &mut self,
        player_id: PlayerId,
        new_team: TeamId,
        new_amount: u64,
    ) -> Result<ReassignReceipt> {
        let ledger = &self.ledger;
        let receipt = self
            .store
            .transact(|txn| {
                let mut player = txn.require_player(player_id)?;
                let (old_team_id, old_amount) = sale_of(&player)?;

                let mut from_team = txn.require_team(old_team_id)?;
                refund(&mut from_team, &player, old_amount)?;
                ledger.check(&from_team)?;
                txn.put_team(from_team.clone());

                // Re-read so a same-team reprice sees the refund.
                let mut to_team = txn.require_team(new_team)?;
                debit(&mut to_team, &player, new_amount)?;
                ledger.check(&to_team)?;
                txn.put_team(to_team.clone());

                let from_team = txn.require_team(old_team_id)?;
                player.selling_price = Some(new_amount);
                player.winning_team_id = Some(new_team);
                player.settled_at = Some(Utc::now());
                txn.put_player(player.clone());

                Ok(ReassignReceipt {
                    player,
                    from_team,
                    to_team,
                    amount: new_amount,
                })
            })
            .inspect_err(|e| log_failure("reassign", e))?;

        self.ledger.observe(&receipt.to_team);
        info!(
            player = %receipt.player.id,
            from = %receipt.from_team.id,
            to = %receipt.to_team.id,
            amount = receipt.amount,
            "player reassigned"
        );
        Ok(receipt)
    }

    // =================================================================
    // Team operations
    // =================================================================

    /// Spend one booster: `points_per_booster` is added to the purse.
    pub fn apply_booster(&mut self, team_id: TeamId, settings: &Settings) -> Result<Team> {
        let grant = settings.points_per_booster;
        let (team, before) = self.store.transact(|txn| {
            let mut team = txn.require_team(team_id)?;
            if team.boosters_available == 0 {
                return Err(GavelError::NoBoostersLeft {
                    team: team.name.clone(),
                });
            }
            let before = team.budget_total();
            credit(&mut team, grant)?;
            team.boosters_available -= 1;
            txn.put_team(team.clone());
            Ok((team, before))
        })?;

        self.ledger.record_grant(team.id, before, grant);
        info!(
            team = %team.id,
            grant,
            purse = team.purse,
            boosters_left = team.boosters_available,
            "booster applied"
        );
        Ok(team)
    }

    /// Administrative edit of a team's name, owner, or purse.
    pub fn update_team(&mut self, team_id: TeamId, update: &TeamUpdate) -> Result<Team> {
        let (team, before) = self.store.transact(|txn| {
            let mut team = txn.require_team(team_id)?;
            let before = team.budget_total();
            if let Some(name) = &update.name {
                team.name.clone_from(name);
            }
            if let Some(owner) = &update.owner_name {
                team.owner_name.clone_from(owner);
            }
            if let Some(purse) = update.purse {
                if purse.checked_add(team.points_spent).is_none() {
                    return Err(overflow(&team, purse.saturating_sub(team.purse)));
                }
                team.purse = purse;
            }
            txn.put_team(team.clone());
            Ok((team, before))
        })?;

        if update.purse.is_some() {
            self.ledger
                .record_adjustment(team.id, before, team.budget_total());
            warn!(team = %team.id, purse = team.purse, "purse edited by administrator");
        }
        Ok(team)
    }

    /// Delete every team and player record.
    pub fn purge(&mut self) -> Result<()> {
        self.store.transact(|txn| {
            txn.purge();
            Ok(())
        })?;
        self.ledger.clear();
        info!("roster purged");
        Ok(())
    }

    // =================================================================
    // Verification
    // =================================================================

    /// Check purse conservation for every team and the roster audit.
    pub fn verify(&self) -> Result<()> {
        let roster = self.store.snapshot();
        self.ledger
            .verify(roster.teams.values())
            .and_then(|()| audit_roster(&roster))
            .inspect_err(|e| error!(error = %e, "roster verification failed"))
    }
}

fn expect_status(player: &Player, allowed: &[PlayerStatus]) -> Result<()> {
    if allowed.contains(&player.status) {
        return Ok(());
    }
    let expected = match allowed {
        [PlayerStatus::InFlight] => "IN_FLIGHT",
        [PlayerStatus::Sold] => "SOLD",
        _ => "AVAILABLE or UNSOLD",
    };
    Err(GavelError::WrongPlayerStatus {
        player: player.id,
        expected,
        actual: player.status,
    })
}

/// The buyer and price of a Sold player.
fn sale_of(player: &Player) -> Result<(TeamId, u64)> {
    expect_status(player, &[PlayerStatus::Sold])?;
    match (player.winning_team_id, player.selling_price) {
        (Some(team), Some(amount)) => Ok((team, amount)),
        _ => Err(GavelError::RosterInconsistent {
            reason: format!("{} is SOLD without price or winning team", player.id),
        }),
    }
}

fn debit(team: &mut Team, player: &Player, amount: u64) -> Result<()> {
    if amount > team.purse {
        return Err(GavelError::InsufficientPurse {
            needed: amount,
            available: team.purse,
        });
    }
    let spent = team
        .points_spent
        .checked_add(amount)
        .ok_or_else(|| overflow(team, amount))?;
    team.purse -= amount;
    team.points_spent = spent;
    *team.owned_by_category.entry(player.category).or_insert(0) += 1;
    Ok(())
}

fn refund(team: &mut Team, player: &Player, amount: u64) -> Result<()> {
    let owned = team.owned(player.category);
    if owned == 0 {
        return Err(GavelError::CounterUnderflow {
            reason: format!("{} owns no {} players", team.id, player.category),
        });
    }
    if team.points_spent < amount {
        return Err(GavelError::CounterUnderflow {
            reason: format!(
                "{} has spent {} but refund is {amount}",
                team.id, team.points_spent
            ),
        });
    }
    team.purse = team
        .purse
        .checked_add(amount)
        .ok_or_else(|| overflow(team, amount))?;
    team.points_spent -= amount;
    team.owned_by_category.insert(player.category, owned - 1);
    Ok(())
}

/// Add `amount` to the purse, refusing if `purse + points_spent` would
/// leave the `u64` range.
fn credit(team: &mut Team, amount: u64) -> Result<()> {
    if team.checked_total_with(amount).is_none() {
        return Err(overflow(team, amount));
    }
    team.purse += amount;
    Ok(())
}

fn overflow(team: &Team, amount: u64) -> GavelError {
    GavelError::PurseOverflow {
        team: team.name.clone(),
        purse: team.purse,
        points_spent: team.points_spent,
        amount,
    }
}

fn log_failure(operation: &str, err: &GavelError) {
    if err.is_storage() || matches!(err, GavelError::ConservationViolation { .. }) {
        error!(operation, error = %err, "settlement failed");
    } else {
        warn!(operation, error = %err, "settlement rejected");
    }
}

#[cfg(test)]
mod tests {
    use gavel_roster::MemoryRoster;
    use gavel_types::Category;

    use super::*;

    struct Fixture {
        engine: SettlementEngine<MemoryRoster>,
        team_a: TeamId,
        team_b: TeamId,
        player: PlayerId,
    }

    fn fixture(status: PlayerStatus) -> Fixture {
        let a = Team::dummy(100_000);
        let b = Team::dummy(50_000);
        let mut p = Player::dummy(Category::Gold);
        p.status = status;
        Fixture {
            team_a: a.id,
            team_b: b.id,
            player: p.id,
            engine: SettlementEngine::new(Arc::new(MemoryRoster::with_records(
                vec![a, b],
                vec![p],
            ))),
        }
    }

    fn team(f: &Fixture, id: TeamId) -> Team {
        f.engine.store().team(id).unwrap()
    }

    fn player(f: &Fixture) -> Player {
        f.engine.store().player(f.player).unwrap()
    }

    #[test]
    fn win_moves_purse_and_counts() {
        let mut f = fixture(PlayerStatus::InFlight);
        let history = vec![BidEntry {
            team_id: f.team_a,
            amount: 20_000,
        }];
        let receipt = f
            .engine
            .settle_win(f.player, f.team_a, 20_000, history.clone())
            .unwrap();
        assert_eq!(receipt.team.purse, 80_000);
        assert_eq!(receipt.team.points_spent, 20_000);
        assert_eq!(receipt.team.owned(Category::Gold), 1);

        let p = player(&f);
        assert_eq!(p.status, PlayerStatus::Sold);
        assert_eq!(p.selling_price, Some(20_000));
        assert_eq!(p.winning_team_id, Some(f.team_a));
        assert_eq!(p.bid_history, history);
        assert!(p.settled_at.is_some());
        f.engine.verify().unwrap();
    }

    #[test]
    fn win_then_revert_restores_team() {
        let mut f = fixture(PlayerStatus::InFlight);
        let before = team(&f, f.team_a);
        f.engine.settle_win(f.player, f.team_a, 20_000, vec![]).unwrap();
        let receipt = f.engine.revert_to_unsold(f.player).unwrap();

        assert_eq!(receipt.refunded_amount, 20_000);
        assert_eq!(team(&f, f.team_a), before);
        let p = player(&f);
        assert_eq!(p.status, PlayerStatus::Unsold);
        assert!(p.winning_team_id.is_none());
        assert!(p.selling_price.is_none());
        f.engine.verify().unwrap();
    }

    #[test]
    fn revert_to_available_clears_history() {
        let mut f = fixture(PlayerStatus::InFlight);
        let history = vec![BidEntry {
            team_id: f.team_a,
            amount: 5_000,
        }];
        f.engine.settle_win(f.player, f.team_a, 5_000, history).unwrap();
        f.engine.revert_to_available(f.player).unwrap();
        let p = player(&f);
        assert_eq!(p.status, PlayerStatus::Available);
        assert!(p.bid_history.is_empty());
    }

    #[test]
    fn win_for_missing_team_changes_nothing() {
        let mut f = fixture(PlayerStatus::InFlight);
        let err = f
            .engine
            .settle_win(f.player, TeamId::new(), 1_000, vec![])
            .unwrap_err();
        assert!(matches!(err, GavelError::TeamNotFound(_)));
        assert_eq!(player(&f).status, PlayerStatus::InFlight);
    }

    #[test]
    fn win_above_purse_rejected() {
        let mut f = fixture(PlayerStatus::InFlight);
        let err = f
            .engine
            .settle_win(f.player, f.team_b, 50_001, vec![])
            .unwrap_err();
        assert!(matches!(err, GavelError::InsufficientPurse { .. }));
        assert_eq!(team(&f, f.team_b).purse, 50_000);
    }

    #[test]
    fn revert_requires_sold() {
        let mut f = fixture(PlayerStatus::Available);
        let err = f.engine.revert_to_unsold(f.player).unwrap_err();
        assert!(matches!(
            err,
            GavelError::WrongPlayerStatus {
                expected: "SOLD",
                actual: PlayerStatus::Available,
                ..
            }
        ));
    }

    #[test]
    fn no_sale_marks_unsold() {
        let mut f = fixture(PlayerStatus::InFlight);
        let p = f.engine.settle_no_sale(f.player).unwrap();
        assert_eq!(p.status, PlayerStatus::Unsold);
        assert_eq!(team(&f, f.team_a).purse, 100_000);
    }

    #[test]
    fn lot_settles_once() {
        let mut f = fixture(PlayerStatus::InFlight);
        let outcome = f
            .engine
            .settle_lot(LotId(1), f.player, Some((f.team_a, 5_000)), vec![])
            .unwrap();
        assert!(outcome.is_sold());
        assert!(f.engine.is_settled(LotId(1)));

        let err = f
            .engine
            .settle_lot(LotId(1), f.player, Some((f.team_a, 5_000)), vec![])
            .unwrap_err();
        assert_eq!(err, GavelError::LotAlreadySettled(LotId(1)));
        assert_eq!(team(&f, f.team_a).purse, 95_000);
    }

    #[test]
    fn failed_lot_can_be_retried() {
        let mut f = fixture(PlayerStatus::InFlight);
        f.engine.store().fail_next_commits(1);
        let err = f
            .engine
            .settle_lot(LotId(3), f.player, None, vec![])
            .unwrap_err();
        assert!(err.is_storage());
        assert!(!f.engine.is_settled(LotId(3)));

        let outcome = f.engine.settle_lot(LotId(3), f.player, None, vec![]).unwrap();
        assert!(!outcome.is_sold());
    }

    #[test]
    fn assign_accepts_available_and_unsold_only() {
        let mut f = fixture(PlayerStatus::Unsold);
        let receipt = f.engine.assign(f.player, f.team_b, 7_000).unwrap();
        assert!(receipt.player.bid_history.is_empty());
        assert_eq!(receipt.team.purse, 43_000);

        let err = f.engine.assign(f.player, f.team_a, 7_000).unwrap_err();
        assert!(matches!(err, GavelError::WrongPlayerStatus { .. }));

        let mut f = fixture(PlayerStatus::InFlight);
        assert!(f.engine.assign(f.player, f.team_a, 1).is_err());
    }

    #[test]
    fn reassign_moves_sale_between_teams() {
        let mut f = fixture(PlayerStatus::InFlight);
        let history = vec![BidEntry {
            team_id: f.team_a,
            amount: 20_000,
        }];
        f.engine
            .settle_win(f.player, f.team_a, 20_000, history.clone())
            .unwrap();
        let receipt = f.engine.reassign(f.player, f.team_b, 15_000).unwrap();

        assert_eq!(receipt.from_team.purse, 100_000);
        assert_eq!(receipt.from_team.owned(Category::Gold), 0);
        assert_eq!(receipt.to_team.purse, 35_000);
        assert_eq!(receipt.to_team.owned(Category::Gold), 1);
        let p = player(&f);
        assert_eq!(p.winning_team_id, Some(f.team_b));
        assert_eq!(p.selling_price, Some(15_000));
        assert_eq!(p.bid_history, history);
        f.engine.verify().unwrap();
    }

    #[test]
    fn reassign_same_team_reprices() {
        let mut f = fixture(PlayerStatus::InFlight);
        f.engine.settle_win(f.player, f.team_a, 20_000, vec![]).unwrap();
        let receipt = f.engine.reassign(f.player, f.team_a, 30_000).unwrap();
        assert_eq!(receipt.to_team.purse, 70_000);
        assert_eq!(receipt.to_team.points_spent, 30_000);
        assert_eq!(receipt.to_team.owned(Category::Gold), 1);
        assert_eq!(receipt.from_team, receipt.to_team);
        f.engine.verify().unwrap();
    }

    #[test]
    fn reassign_is_all_or_nothing() {
        let mut f = fixture(PlayerStatus::InFlight);
        f.engine.settle_win(f.player, f.team_a, 20_000, vec![]).unwrap();
        let err = f.engine.reassign(f.player, f.team_b, 60_000).unwrap_err();
        assert!(matches!(err, GavelError::InsufficientPurse { .. }));
        assert_eq!(team(&f, f.team_a).purse, 80_000);
        assert_eq!(team(&f, f.team_b).purse, 50_000);
        assert_eq!(player(&f).winning_team_id, Some(f.team_a));
    }

    #[test]
    fn booster_grants_and_exhausts() {
        let mut f = fixture(PlayerStatus::Available);
        let settings = Settings::default();
        for expected_purse in [60_000, 70_000, 80_000] {
            let t = f.engine.apply_booster(f.team_b, &settings).unwrap();
            assert_eq!(t.purse, expected_purse);
        }
        let err = f.engine.apply_booster(f.team_b, &settings).unwrap_err();
        assert!(matches!(err, GavelError::NoBoostersLeft { .. }));
        assert_eq!(f.engine.ledger().granted(f.team_b), 30_000);
        f.engine.verify().unwrap();
    }

    #[test]
    fn purse_edit_moves_baseline() {
        let mut f = fixture(PlayerStatus::Available);
        let update = TeamUpdate {
            name: Some("Renamed XI".into()),
            purse: Some(75_000),
            ..TeamUpdate::default()
        };
        let t = f.engine.update_team(f.team_a, &update).unwrap();
        assert_eq!(t.name, "Renamed XI");
        assert_eq!(t.purse, 75_000);
        f.engine.verify().unwrap();
    }

    #[test]
    fn booster_past_u64_max_is_refused() {
        let mut f = fixture(PlayerStatus::Available);
        let update = TeamUpdate {
            purse: Some(u64::MAX),
            ..TeamUpdate::default()
        };
        f.engine.update_team(f.team_a, &update).unwrap();

        let err = f
            .engine
            .apply_booster(f.team_a, &Settings::default())
            .unwrap_err();
        assert!(matches!(err, GavelError::PurseOverflow { amount: 10_000, .. }));
        let t = team(&f, f.team_a);
        assert_eq!(t.purse, u64::MAX);
        assert_eq!(t.boosters_available, 3);
        assert_eq!(f.engine.ledger().granted(f.team_a), 0);
        f.engine.verify().unwrap();
    }

    #[test]
    fn purse_edit_cannot_overflow_total() {
        let mut f = fixture(PlayerStatus::Available);
        f.engine.assign(f.player, f.team_a, 5_000).unwrap();
        let update = TeamUpdate {
            purse: Some(u64::MAX),
            ..TeamUpdate::default()
        };
        let err = f.engine.update_team(f.team_a, &update).unwrap_err();
        assert!(matches!(err, GavelError::PurseOverflow { .. }));
        assert_eq!(team(&f, f.team_a).purse, 95_000);

        let update = TeamUpdate {
            purse: Some(u64::MAX - 5_000),
            ..TeamUpdate::default()
        };
        f.engine.update_team(f.team_a, &update).unwrap();
        f.engine.revert_to_available(f.player).unwrap();
        assert_eq!(team(&f, f.team_a).purse, u64::MAX);
        f.engine.verify().unwrap();
    }

    #[test]
    fn purge_clears_everything() {
        let mut f = fixture(PlayerStatus::Available);
        f.engine.purge().unwrap();
        let roster = f.engine.store().snapshot();
        assert!(roster.teams.is_empty());
        assert!(roster.players.is_empty());
        assert_eq!(f.engine.ledger().tracked_teams(), 0);
    }
}
