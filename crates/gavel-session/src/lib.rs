//! # gavel-session
//!
//! The live auction session for **Gavel**.
//!
//! - [`AuctionSession`]: the state machine that owns the lot on the block,
//!   validates bids, runs the countdown, and settles through
//!   [`gavel_settlement::SettlementEngine`].
//! - [`spawn`] / [`SessionHandle`]: the single-writer actor around it.
//! - [`BroadcastHub`] / [`ClientConnection`]: sequenced fan-out and
//!   per-client delivery.
//! - [`SimulationDriver`]: a full auction played through the command path.
//!
//! ## Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gavel_roster::MemoryRoster;
//! use gavel_session::{AuctionSession, spawn};
//! use gavel_types::EngineConfig;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # async fn demo() -> gavel_types::Result<()> {
//! let config = EngineConfig::default();
//! let store = Arc::new(MemoryRoster::new());
//! let session = AuctionSession::new(store, &config, StdRng::from_entropy());
//! let (handle, _task) = spawn(session, &config);
//!
//! let mut conn = handle.connect().await?;
//! println!("connected at seq {}", conn.snapshot.seq);
//! while let Some(msg) = conn.next().await {
//!     println!("{msg:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod broadcast;
pub mod session;
pub mod simulation;
pub mod timer;

pub use actor::{SessionHandle, spawn};
pub use broadcast::{BroadcastHub, ClientConnection, ClientMessage};
pub use session::{AuctionSession, Dispatch, Lot};
pub use simulation::{Bidder, SimulationDriver, interested_bidders};
pub use timer::{Countdown, Tick};
