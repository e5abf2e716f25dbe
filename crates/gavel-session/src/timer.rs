//! Per-lot countdown.
//!
//! The countdown is plain state; the session actor drives it from a tokio
//! interval. Every start or reset bumps `generation` so the actor knows to
//! realign its interval with the new full period.

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left.
    Remaining(u32),
    /// Reached zero. The countdown has stopped itself.
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
    generation: u64,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `duration` seconds.
    pub fn start(&mut self, duration: u32) {
        self.duration = duration;
        self.remaining = duration;
        self.running = true;
        self.generation += 1;
    }

    /// Back to full duration (anti-snipe). No effect when stopped.
    pub fn reset(&mut self) {
        if self.running {
            self.remaining = self.duration;
            self.generation += 1;
        }
    }

    /// Stop and clear.
    pub fn stop(&mut self) {
        self.running = false;
        self.remaining = 0;
    }

    /// Stop without clearing the remaining time.
    pub fn halt(&mut self) {
        self.running = false;
    }

    /// Advance one period. `None` when not running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Some(Tick::Expired)
        } else {
            Some(Tick::Remaining(self.remaining))
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
