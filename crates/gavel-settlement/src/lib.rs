//! # gavel-settlement
//!
//! **Settlement engine** for the Gavel auction: the only code that changes
//! purses, roster counts, or player status after nomination.
//!
//! ## Operations
//!
//! Each runs as one roster transaction and returns a receipt:
//! - **settle-win / settle-no-sale**: close the lot on the block
//! - **revert-to-unsold / revert-to-available**: exact inverse of one sale
//! - **reassign**: refund the old buyer and charge the new one together
//! - **assign**: manual sale of a player that was never auctioned
//! - **apply-booster / update-team**: purse grants and admin edits
//!
//! ## Safety nets
//!
//! - [`IdempotencyGuard`]: a lot settles at most once
//! - [`ConservationLedger`]: `purse + points_spent` is conserved per team
//! - [`audit_roster`]: owned counts match Sold players; one lot in flight

pub mod conservation;
pub mod engine;
pub mod idempotency;

pub use conservation::{ConservationLedger, audit_roster};
pub use engine::{RevertTarget, SettlementEngine};
pub use idempotency::IdempotencyGuard;
