//! The shared table: slot/card state plus every player's token marks behind
//! one coordination boundary.
//!
//! Two mutual-exclusion scopes protect the state:
//!
//! - the **board-wide** lock (`RwLock<SlotBoard>`) guards the slot-to-card
//!   bijection and every operation that sweeps across players' marks;
//! - one **per-player** lock (`Mutex<MarkSet>`) guards that player's own
//!   mark cells for single-player toggle operations.
//!
//! Whenever both are needed the board-wide lock is acquired first, never
//! the reverse.

pub mod board;
pub mod tokens;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::game::{CardId, ComboOracle, GameConfig, PlayerId, SlotId};
use crate::render::RenderSink;
use board::{BoardError, SlotBoard};
use tokens::MarkSet;

/// What happened to a requested token placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    /// Nothing changed: table closed, slot empty, duplicate mark, or no
    /// free mark cell.
    Ignored,
    /// Mark placed; the player still has free cells.
    Placed,
    /// Mark placed and it was the K-th one: the claim is ready to submit.
    CompletedClaim,
}

/// Shared table state. All mutating operations are atomic with respect to
/// each other under the locking scheme described in the module docs.
pub struct Table {
    board: RwLock<SlotBoard>,
    marks: Vec<Mutex<MarkSet>>,
    accepting: AtomicBool,
    deal_delay: Duration,
    render: Arc<dyn RenderSink>,
}

impl Table {
    pub fn new(config: &GameConfig, render: Arc<dyn RenderSink>) -> Self {
        let marks = (0..config.players)
            .map(|_| Mutex::new(MarkSet::new(config.combo_size)))
            .collect();
        Self {
            board: RwLock::new(SlotBoard::new(config.grid_size(), config.deck_size)),
            marks,
            accepting: AtomicBool::new(false),
            deal_delay: config.deal_delay,
            render,
        }
    }

    /// Whether mark placement is currently accepted. The dealer closes the
    /// table during clearing and seeding windows; placements requested
    /// while closed are ignored, not queued.
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::Release);
    }

    /// Put `card` on the empty slot `slot`.
    ///
    /// The simulated dealing latency elapses while the board-wide lock is
    /// held, so concurrent placements never interleave partially.
    pub async fn place_card(&self, card: CardId, slot: SlotId) -> Result<(), BoardError> {
        let mut board = self.board.write().await;
        if !self.deal_delay.is_zero() {
            tokio::time::sleep(self.deal_delay).await;
        }
        board.place(card, slot)?;
        self.render.on_card_placed(card, slot);
        Ok(())
    }

    /// Clear `slot`, sweeping away every player's mark still referencing
    /// it, and return the card that was there.
    pub async fn remove_card(&self, slot: SlotId) -> Option<CardId> {
        let mut board = self.board.write().await;
        if !self.deal_delay.is_zero() {
            tokio::time::sleep(self.deal_delay).await;
        }
        let card = board.remove(slot)?;
        self.clear_marks_at(slot).await;
        self.render.on_card_removed(slot);
        Some(card)
    }

    /// Remove every player's mark on `slot`; returns whether any existed.
    pub async fn remove_token(&self, slot: SlotId) -> bool {
        let _board = self.board.write().await;
        self.clear_marks_at(slot).await
    }

    /// Sweep all players' marks off `slot`. Caller holds the board-wide
    /// write lock.
    async fn clear_marks_at(&self, slot: SlotId) -> bool {
        let mut removed = false;
        for marks in &self.marks {
            if marks.lock().await.remove(slot) {
                removed = true;
            }
        }
        if removed {
            self.render.on_tokens_cleared(slot);
        }
        removed
    }

    /// Place a mark for `player` on `slot`.
    ///
    /// The mark lands in the player's first free cell. Requests are ignored
    /// while the table is closed, when the slot holds no card, when the
    /// player already marks the slot, or when no cell is free; the caller
    /// is expected to check [`Table::free_mark_cell`] first.
    pub async fn place_token(&self, player: PlayerId, slot: SlotId) -> TokenPlacement {
        if !self.is_accepting() {
            return TokenPlacement::Ignored;
        }
        let Some(cell) = self.marks.get(player) else {
            return TokenPlacement::Ignored;
        };

        let board = self.board.read().await;
        if board.card_at(slot).is_none() {
            return TokenPlacement::Ignored;
        }

        let mut marks = cell.lock().await;
        if !marks.place(slot) {
            return TokenPlacement::Ignored;
        }
        self.render.on_token_placed(player, slot);
        if marks.is_full() {
            TokenPlacement::CompletedClaim
        } else {
            TokenPlacement::Placed
        }
    }

    /// Remove `player`'s own mark on `slot` (toggle-off); returns whether
    /// it existed. Always permitted, even while the table is closed.
    pub async fn remove_token_by_player(&self, player: PlayerId, slot: SlotId) -> bool {
        let Some(cell) = self.marks.get(player) else {
            return false;
        };
        let removed = cell.lock().await.remove(slot);
        if removed {
            self.render.on_token_removed(player, slot);
        }
        removed
    }

    /// Drop every mark held by `player` (rejected-claim cleanup).
    pub async fn clear_marks(&self, player: PlayerId) {
        let _board = self.board.read().await;
        let Some(cell) = self.marks.get(player) else {
            return;
        };
        let mut marks = cell.lock().await;
        for slot in marks.slots() {
            self.render.on_token_removed(player, slot);
        }
        marks.clear();
    }

    /// True iff the player's mark count equals K exactly.
    pub async fn has_full_claim(&self, player: PlayerId) -> bool {
        match self.marks.get(player) {
            Some(cell) => cell.lock().await.is_full(),
            None => false,
        }
    }

    /// Index of the player's first free mark cell.
    pub async fn free_mark_cell(&self, player: PlayerId) -> Option<usize> {
        self.marks.get(player)?.lock().await.free_cell()
    }

    /// The slots the player currently marks.
    pub async fn marked_slots(&self, player: PlayerId) -> Vec<SlotId> {
        match self.marks.get(player) {
            Some(cell) => cell.lock().await.slots(),
            None => Vec::new(),
        }
    }

    /// Consistent snapshot of a full claim: the player's K marked slots and
    /// the cards on them, read under the board-wide lock.
    ///
    /// `None` when the claim is stale: the marks are no longer full, or a
    /// marked slot lost its card since submission.
    pub async fn claim_snapshot(&self, player: PlayerId) -> Option<Vec<(SlotId, CardId)>> {
        let board = self.board.read().await;
        let marks = self.marks.get(player)?.lock().await;
        if !marks.is_full() {
            return None;
        }
        marks
            .slots()
            .into_iter()
            .map(|slot| board.card_at(slot).map(|card| (slot, card)))
            .collect()
    }

    /// Every player currently marking `slot`.
    pub async fn players_marking(&self, slot: SlotId) -> Vec<PlayerId> {
        let _board = self.board.read().await;
        let mut players = Vec::new();
        for (player, cell) in self.marks.iter().enumerate() {
            if cell.lock().await.contains(slot) {
                players.push(player);
            }
        }
        players
    }

    /// Number of cards currently on the table.
    pub async fn count_cards(&self) -> usize {
        self.board.read().await.occupied()
    }

    /// The card on `slot`, if any.
    pub async fn card_at(&self, slot: SlotId) -> Option<CardId> {
        self.board.read().await.card_at(slot)
    }

    /// Every valid combination currently displayed, as sorted slot groups.
    pub async fn hints(&self, oracle: &dyn ComboOracle) -> Vec<Vec<SlotId>> {
        let board = self.board.read().await;
        let cards = board.cards();
        oracle
            .find_combos(&cards, usize::MAX)
            .into_iter()
            .map(|combo| {
                let mut slots: Vec<SlotId> = combo
                    .into_iter()
                    .filter_map(|card| board.slot_of(card))
                    .collect();
                slots.sort_unstable();
                slots
            })
            .collect()
    }
}
