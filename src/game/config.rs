//! Game configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::PlayerId;

/// Read-only game configuration.
///
/// Everything the engine needs to know up front: table geometry, deck and
/// combination sizes, player counts, and the timing constants driving the
/// dealer's countdown and the players' freeze periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of grid rows.
    pub rows: usize,

    /// Number of grid columns.
    pub columns: usize,

    /// Cards per combination (K). A claim materializes at exactly K marks.
    pub combo_size: usize,

    /// Total number of distinct cards in the deck.
    pub deck_size: usize,

    /// Total number of players.
    pub players: usize,

    /// How many of the players are human. Players `0..human_players` read
    /// external input only; the rest get an automated key-press generator.
    pub human_players: usize,

    /// Turn length before the dealer reshuffles the whole table.
    pub turn_timeout: Duration,

    /// Window before the deadline in which the countdown switches to the
    /// fine-grained warning display.
    pub turn_timeout_warning: Duration,

    /// Freeze applied to a player after an accepted claim.
    pub point_freeze: Duration,

    /// Freeze applied to a player after a rejected claim.
    pub penalty_freeze: Duration,

    /// Simulated dealing latency per card placement/removal.
    pub deal_delay: Duration,

    /// Log every valid combination on the table after each reseed.
    pub hints: bool,

    /// Release a player's marks when their claim is rejected. When `false`
    /// (the default) rejected marks stay until the player toggles them off.
    pub clear_marks_on_penalty: bool,

    /// Seed for every rng in the engine. `None` seeds from the OS; setting
    /// it makes card draws and generated key presses reproducible.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 4,
            combo_size: 3,
            deck_size: 81,
            players: 2,
            human_players: 0,
            turn_timeout: Duration::from_secs(60),
            turn_timeout_warning: Duration::from_secs(5),
            point_freeze: Duration::from_secs(1),
            penalty_freeze: Duration::from_secs(3),
            deal_delay: Duration::from_millis(100),
            hints: false,
            clear_marks_on_penalty: false,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Number of slots on the table grid.
    pub fn grid_size(&self) -> usize {
        self.rows * self.columns
    }

    /// Whether the given player takes external input instead of running a
    /// generator.
    pub fn is_human(&self, player: PlayerId) -> bool {
        player < self.human_players
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::invalid("rows/columns", "grid must be non-empty"));
        }

        if self.combo_size == 0 {
            return Err(ConfigError::invalid("combo_size", "must be greater than 0"));
        }

        if self.combo_size > self.grid_size() {
            return Err(ConfigError::invalid(
                "combo_size",
                "cannot exceed the number of grid slots",
            ));
        }

        if self.deck_size < self.grid_size() {
            return Err(ConfigError::invalid(
                "deck_size",
                "must cover at least one full grid",
            ));
        }

        if self.players == 0 {
            return Err(ConfigError::invalid("players", "must be greater than 0"));
        }

        if self.human_players > self.players {
            return Err(ConfigError::invalid(
                "human_players",
                "cannot exceed the total player count",
            ));
        }

        if self.turn_timeout.is_zero() {
            return Err(ConfigError::invalid("turn_timeout", "must be greater than 0"));
        }

        if self.turn_timeout_warning > self.turn_timeout {
            return Err(ConfigError::invalid(
                "turn_timeout_warning",
                "cannot exceed the turn timeout",
            ));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
