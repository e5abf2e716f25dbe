//! Lot idempotency guard: each lot settles at most once.
//!
//! Settling the same `LotId` twice returns
//! [`GavelError::LotAlreadySettled`]. The guard is bounded with oldest-first
//! eviction; lot ids only grow, so an evicted id is never presented again.

use std::collections::{HashSet, VecDeque};

use gavel_types::{GavelError, LotId, Result};

/// Default number of settled lots remembered.
pub const DEFAULT_GUARD_CAPACITY: usize = 4_096;

/// Remembers which lots have settled.
#[derive(Debug)]
pub struct IdempotencyGuard {
    settled: HashSet<LotId>,
    /// Insertion order, oldest first.
    order: VecDeque<LotId>,
    max_size: usize,
}

impl IdempotencyGuard {
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "IdempotencyGuard max_size must be > 0");
        Self {
            settled: HashSet::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Fail if `lot` has already settled.
    pub fn check(&self, lot: LotId) -> Result<()> {
        if self.settled.contains(&lot) {
            return Err(GavelError::LotAlreadySettled(lot));
        }
        Ok(())
    }

    /// Record `lot` as settled.
    pub fn mark_settled(&mut self, lot: LotId) -> Result<()> {
        self.check(lot)?;

        if self.settled.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.settled.remove(&oldest);
            }
        }

        self.settled.insert(lot);
        self.order.push_back(lot);
        Ok(())
    }

    #[must_use]
    pub fn is_settled(&self, lot: LotId) -> bool {
        self.settled.contains(&lot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

impl Default for IdempotencyGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_CAPACITY)
    }
}
