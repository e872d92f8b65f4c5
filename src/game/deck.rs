//! The dealer's deck: cards not currently on the table.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::CardId;

/// Cards remaining in the dealer's hand.
///
/// Order is irrelevant; drawing picks uniformly without replacement. Cards
/// removed by an accepted claim never come back, cards cleared on a turn
/// timeout do. The deck never grows past its original size.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<CardId>,
    rng: StdRng,
}

impl Deck {
    /// Full deck of `deck_size` cards. A seed makes the draw order
    /// reproducible; `None` seeds from the OS.
    pub fn new(deck_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            cards: (0..deck_size).collect(),
            rng,
        }
    }

    /// Draw a uniformly random card, or `None` when the deck is empty.
    pub fn draw(&mut self) -> Option<CardId> {
        if self.cards.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.cards.len());
        Some(self.cards.swap_remove(idx))
    }

    /// Return a card cleared off the table.
    pub fn put_back(&mut self, card: CardId) {
        debug_assert!(!self.cards.contains(&card));
        self.cards.push(card);
    }

    /// Cards still in the deck, in no particular order.
    pub fn remaining(&self) -> &[CardId] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
