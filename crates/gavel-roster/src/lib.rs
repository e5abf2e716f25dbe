//! # gavel-roster
//!
//! Team and player records for the **Gavel** auction engine, and the two
//! read-side policies computed over them.
//!
//! - [`RosterStore`]: atomic multi-record transactions ([`MemoryRoster`] in memory)
//! - [`affordability`]: a team's maximum legal bid under its quota reserve
//! - [`NominationPolicy`]: round rollover, hold-back filtering, random selection

pub mod affordability;
pub mod nomination;
pub mod store;

pub use affordability::{Affordability, assess, max_bid};
pub use nomination::{Nomination, NominationPolicy, PoolOutcome, start_new_round};
pub use store::{MemoryRoster, Roster, RosterStore, RosterTxn, pool_stats};
