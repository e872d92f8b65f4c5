//! Display interface consumed by the engine.
//!
//! Every callback is fire-and-forget: implementations must return quickly
//! and never block, since several are invoked while table locks are held.

use std::time::Duration;

use crate::game::{CardId, PlayerId, SlotId};

/// Sink for everything a display layer would want to draw.
///
/// All methods default to no-ops so implementations only override what they
/// render.
pub trait RenderSink: Send + Sync {
    fn on_card_placed(&self, _card: CardId, _slot: SlotId) {}

    fn on_card_removed(&self, _slot: SlotId) {}

    fn on_token_placed(&self, _player: PlayerId, _slot: SlotId) {}

    fn on_token_removed(&self, _player: PlayerId, _slot: SlotId) {}

    /// Every player's token on `slot` was swept away with the card.
    fn on_tokens_cleared(&self, _slot: SlotId) {}

    fn on_score_changed(&self, _player: PlayerId, _score: u32) {}

    /// Countdown refresh; `warning` marks the fine-grained final stretch.
    fn on_countdown(&self, _remaining: Duration, _warning: bool) {}

    /// Freeze countdown for a player; a final call with zero ends it.
    fn on_freeze(&self, _player: PlayerId, _remaining: Duration) {}

    fn on_winners(&self, _players: &[PlayerId]) {}
}

/// Discards every event. Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullRender;

impl RenderSink for NullRender {}

/// Writes every event through the `log` facade.
#[derive(Debug, Default)]
pub struct LogRender;

impl RenderSink for LogRender {
    fn on_card_placed(&self, card: CardId, slot: SlotId) {
        log::debug!("card {card} placed on slot {slot}");
    }

    fn on_card_removed(&self, slot: SlotId) {
        log::debug!("card removed from slot {slot}");
    }

    fn on_token_placed(&self, player: PlayerId, slot: SlotId) {
        log::debug!("player {player} marked slot {slot}");
    }

    fn on_token_removed(&self, player: PlayerId, slot: SlotId) {
        log::debug!("player {player} unmarked slot {slot}");
    }

    fn on_tokens_cleared(&self, slot: SlotId) {
        log::debug!("all tokens cleared from slot {slot}");
    }

    fn on_score_changed(&self, player: PlayerId, score: u32) {
        log::info!("player {player} score is now {score}");
    }

    fn on_countdown(&self, remaining: Duration, warning: bool) {
        if warning {
            log::debug!("countdown {}ms (warning)", remaining.as_millis());
        } else {
            log::trace!("countdown {}ms", remaining.as_millis());
        }
    }

    fn on_freeze(&self, player: PlayerId, remaining: Duration) {
        log::debug!("player {player} frozen for {}ms", remaining.as_millis());
    }

    fn on_winners(&self, players: &[PlayerId]) {
        log::info!("winners: {players:?}");
    }
}
