//! System-wide constants for the Gavel auction engine.

/// Default countdown per lot, in seconds.
pub const DEFAULT_TIMER_SECS: u32 = 15;

/// Default purse injected by one booster.
pub const DEFAULT_POINTS_PER_BOOSTER: u64 = 10_000;

/// Default boosters granted to each team at registration.
pub const DEFAULT_INITIAL_BOOSTERS: u32 = 3;

/// Default purse for teams created by the simulation harness.
pub const DEFAULT_TEAM_PURSE: u64 = 100_000;

/// Increment used only if a ladder has no tiers at all.
pub const FALLBACK_INCREMENT: u64 = 1_000;

/// Sold fraction after which restricted mode releases every hold.
pub const DEFAULT_RELEASE_SOLD_FRACTION: f64 = 0.6;

/// Default timer tick period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Default capacity of the broadcast event buffer per subscriber.
pub const DEFAULT_EVENT_BUFFER: usize = 1_024;

/// Default depth of the session command queue.
pub const DEFAULT_COMMAND_QUEUE: usize = 256;

/// Default pause between simulated actions, in milliseconds.
pub const DEFAULT_SIM_STEP_DELAY_MS: u64 = 10;

/// Minimum number of teams a simulation needs.
pub const MIN_SIMULATION_TEAMS: usize = 2;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Gavel";
