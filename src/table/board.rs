//! Bidirectional slot-to-card mapping.

use thiserror::Error;

use crate::game::{CardId, SlotId};

/// Errors from board mutations whose preconditions were violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("slot {0} is out of range")]
    SlotOutOfRange(SlotId),
    #[error("card {0} is out of range")]
    CardOutOfRange(CardId),
    #[error("slot {0} is already occupied")]
    SlotOccupied(SlotId),
    #[error("card {0} is already on the table")]
    CardAlreadyPlaced(CardId),
}

/// The slot-to-card partial bijection.
///
/// Invariant: `slot_to_card[s] == Some(c)` iff `card_to_slot[c] == Some(s)`,
/// and a card is on at most one slot.
#[derive(Debug)]
pub struct SlotBoard {
    slot_to_card: Vec<Option<CardId>>,
    card_to_slot: Vec<Option<SlotId>>,
}

impl SlotBoard {
    pub fn new(grid_size: usize, deck_size: usize) -> Self {
        Self {
            slot_to_card: vec![None; grid_size],
            card_to_slot: vec![None; deck_size],
        }
    }

    /// Number of grid slots.
    pub fn grid_size(&self) -> usize {
        self.slot_to_card.len()
    }

    /// The card on `slot`, if any.
    pub fn card_at(&self, slot: SlotId) -> Option<CardId> {
        self.slot_to_card.get(slot).copied().flatten()
    }

    /// The slot holding `card`, if any.
    pub fn slot_of(&self, card: CardId) -> Option<SlotId> {
        self.card_to_slot.get(card).copied().flatten()
    }

    /// Put `card` on the empty slot `slot`.
    pub fn place(&mut self, card: CardId, slot: SlotId) -> Result<(), BoardError> {
        if slot >= self.slot_to_card.len() {
            return Err(BoardError::SlotOutOfRange(slot));
        }
        if card >= self.card_to_slot.len() {
            return Err(BoardError::CardOutOfRange(card));
        }
        if self.slot_to_card[slot].is_some() {
            return Err(BoardError::SlotOccupied(slot));
        }
        if self.card_to_slot[card].is_some() {
            return Err(BoardError::CardAlreadyPlaced(card));
        }
        self.slot_to_card[slot] = Some(card);
        self.card_to_slot[card] = Some(slot);
        Ok(())
    }

    /// Clear `slot`, returning the card that was on it.
    pub fn remove(&mut self, slot: SlotId) -> Option<CardId> {
        let card = self.slot_to_card.get_mut(slot)?.take()?;
        self.card_to_slot[card] = None;
        Some(card)
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slot_to_card.iter().flatten().count()
    }

    /// Every card currently on the table.
    pub fn cards(&self) -> Vec<CardId> {
        self.slot_to_card.iter().copied().flatten().collect()
    }
}
