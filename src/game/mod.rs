//! Core game domain: identifiers, configuration, the dealer's deck and the
//! combination-validity oracle.

pub mod config;
pub mod deck;
pub mod oracle;

pub use config::{ConfigError, GameConfig};
pub use deck::Deck;
pub use oracle::{ComboOracle, FeatureOracle};

/// Index of a grid slot on the table, dense in `[0, grid_size)`.
pub type SlotId = usize;

/// Index of a card in the full deck, dense in `[0, deck_size)`.
pub type CardId = usize;

/// Index of a player, dense in `[0, players)`.
pub type PlayerId = usize;
