//! Full-state snapshots and the client-side view that follows them.
//!
//! A client (re)connects by taking a [`StateSnapshot`], then folds every
//! subsequent [`EventEnvelope`] into a [`SessionView`]. Sequence numbers are
//! contiguous; a view that sees a gap refuses the event and the client must
//! take a fresh snapshot. Events are never replayed.
//!
//! Both sides can compute a SHA-256 digest over the same fields, so a view
//! and the authoritative snapshot at the same `seq` can be compared cheaply.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AuctionEvent, BidEntry, EventEnvelope, GavelError, LotId, Player, Result, Settings, TeamId};

/// Everything a client needs to render the live auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Sequence number of the last broadcast this snapshot reflects.
    pub seq: u64,
    pub lot_id: Option<LotId>,
    pub current_player: Option<Player>,
    pub base_price: Option<u64>,
    /// Zero while idle.
    pub current_bid: u64,
    pub leading_team_id: Option<TeamId>,
    pub bid_history: Vec<BidEntry>,
    pub time_left: u32,
    pub settings: Settings,
}

impl StateSnapshot {
    /// Snapshot of a session with nothing on the block.
    #[must_use]
    pub fn idle(settings: Settings, seq: u64) -> Self {
        Self {
            seq,
            lot_id: None,
            current_player: None,
            base_price: None,
            current_bid: 0,
            leading_team_id: None,
            bid_history: Vec::new(),
            time_left: 0,
            settings,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.lot_id.is_none()
    }

    /// Deterministic digest of the observable state.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"gavel:state:v1:");
        hasher.update(self.seq.to_le_bytes());
        hasher.update(self.lot_id.map_or(0, |lot| lot.0).to_le_bytes());
        match &self.current_player {
            Some(player) => {
                hasher.update([1]);
                hasher.update(player.id.0.as_bytes());
                hasher.update(player.status.to_string().as_bytes());
            }
            None => hasher.update([0]),
        }
        hasher.update(self.base_price.unwrap_or(0).to_le_bytes());
        hasher.update(self.current_bid.to_le_bytes());
        match self.leading_team_id {
            Some(team) => hasher.update(team.0.as_bytes()),
            None => hasher.update([0u8; 16]),
        }
        hasher.update((self.bid_history.len() as u64).to_le_bytes());
        for entry in &self.bid_history {
            hasher.update(entry.team_id.0.as_bytes());
            hasher.update(entry.amount.to_le_bytes());
        }
        hasher.update(self.time_left.to_le_bytes());
        hash_settings(&mut hasher, &self.settings);

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    /// Hex form of [`digest`](Self::digest), for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

fn hash_settings(hasher: &mut Sha256, settings: &Settings) {
    hasher.update(settings.timer_duration_secs.to_le_bytes());
    for (category, price) in &settings.base_price {
        hasher.update(category.to_string().as_bytes());
        hasher.update(price.to_le_bytes());
    }
    for (category, min) in &settings.min_required {
        hasher.update(category.to_string().as_bytes());
        hasher.update(min.to_le_bytes());
    }
    hasher.update(settings.points_per_booster.to_le_bytes());
    hasher.update(settings.initial_boosters_per_team.to_le_bytes());
    for tier in &settings.bid_increments.0 {
        hasher.update(tier.from.to_le_bytes());
        hasher.update(tier.to.unwrap_or(u64::MAX).to_le_bytes());
        hasher.update(tier.step.to_le_bytes());
    }
    hasher.update([u8::from(settings.finalized)]);
}

/// A client's local copy of the session, maintained from broadcasts only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    state: StateSnapshot,
}

impl SessionView {
    #[must_use]
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self { state: snapshot }
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.state.seq
    }

    #[must_use]
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        self.state.digest()
    }

    /// Fold one broadcast into the view.
    ///
    /// Returns `Ok(false)` for an envelope the view has already seen and
    /// [`GavelError::SequenceGap`] when one or more broadcasts were missed.
    pub fn apply(&mut self, envelope: &EventEnvelope) -> Result<bool> {
        if envelope.seq <= self.state.seq {
            return Ok(false);
        }
        let expected = self.state.seq + 1;
        if envelope.seq != expected {
            return Err(GavelError::SequenceGap {
                expected,
                got: envelope.seq,
            });
        }

        let state = &mut self.state;
        match &envelope.event {
            AuctionEvent::StateSnapshot { snapshot } => {
                *state = snapshot.clone();
            }
            AuctionEvent::LotNominated { lot } => {
                state.lot_id = Some(lot.lot_id);
                state.current_player = Some(lot.player.clone());
                state.base_price = Some(lot.base_price);
                state.current_bid = lot.base_price;
                state.leading_team_id = None;
                state.bid_history.clear();
            }
            AuctionEvent::BidAccepted {
                current_bid,
                leading_team_id,
            } => {
                state.current_bid = *current_bid;
                state.leading_team_id = *leading_team_id;
                match leading_team_id {
                    Some(team_id) => state.bid_history.push(BidEntry {
                        team_id: *team_id,
                        amount: *current_bid,
                    }),
                    None => state.bid_history.clear(),
                }
            }
            AuctionEvent::TimerTick { seconds_left } => {
                state.time_left = *seconds_left;
            }
            AuctionEvent::LotSold { .. } | AuctionEvent::LotUnsold { .. } => {
                clear_lot(state);
            }
            AuctionEvent::SettingsUpdated { settings } => {
                state.settings = settings.clone();
            }
            AuctionEvent::AuctionReset { settings } => {
                clear_lot(state);
                state.time_left = 0;
                state.settings = settings.clone();
            }
            _ => {}
        }
        state.seq = envelope.seq;
        Ok(true)
    }
}

fn clear_lot(state: &mut StateSnapshot) {
    state.lot_id = None;
    state.current_player = None;
    state.base_price = None;
    state.current_bid = 0;
    state.leading_team_id = None;
    state.bid_history.clear();
}
