//! # Set Engine
//!
//! The concurrency coordination core of the tile-matching card game "Set":
//! a dealer managing a shared table of cards and a turn timer, and a pool of
//! independent player agents placing token marks and submitting claims.
//!
//! ## Architecture
//!
//! Every actor runs as a task on the tokio multi-thread runtime:
//!
//! - **Dealer**: seeds and reshuffles the table, runs the countdown, drains
//!   the claim queue and adjudicates one claim at a time.
//! - **PlayerAgent** (one per player): reads slot choices from a bounded
//!   input queue, toggles marks on the table, and suspends on a per-claim
//!   oneshot until the dealer's verdict arrives.
//! - **Generator** (one per automated player): pushes pseudo-random slot
//!   choices into the same input queue, back-pressured by its capacity.
//!
//! Shared state lives behind the [`table::Table`] boundary: a board-wide
//! lock for the slot/card bijection and cross-player sweeps, plus one lock
//! per player for that player's own marks, always acquired board-first.
//!
//! Rendering and combination validity are external collaborators, consumed
//! through the [`render::RenderSink`] and [`game::ComboOracle`] traits.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use set_engine::{FeatureOracle, GameConfig, GameSession, LogRender};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = GameSession::spawn(
//!         GameConfig::default(),
//!         Arc::new(FeatureOracle::classic()),
//!         Arc::new(LogRender),
//!     )?;
//!     let outcome = session.completed().await?;
//!     println!("winners: {:?}", outcome.winners);
//!     Ok(())
//! }
//! ```

/// Claim hand-off between players and the dealer.
pub mod claim;

/// The dealer actor.
pub mod dealer;

/// Core game domain: configuration, deck, oracle.
pub mod game;

/// Player agents and the automated input generator.
pub mod player;

/// Display interface.
pub mod render;

/// Session wiring and external control surface.
pub mod session;

/// The shared table and its synchronization discipline.
pub mod table;

pub use claim::{Claim, ClaimError, ClaimVerdict};
pub use dealer::{Dealer, GameOutcome};
pub use game::{
    CardId, ComboOracle, ConfigError, Deck, FeatureOracle, GameConfig, PlayerId, SlotId,
};
pub use player::PlayerAgent;
pub use render::{LogRender, NullRender, RenderSink};
pub use session::{GameSession, SessionError};
pub use table::{Table, TokenPlacement};
