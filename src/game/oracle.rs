//! Combination-validity oracle.
//!
//! The engine treats validity as an external, pure and possibly expensive
//! question. [`FeatureOracle`] implements the actual Set rule for the
//! standard feature-vector card encoding; tests substitute their own
//! implementations.

use super::CardId;

/// Decides whether a group of cards forms a valid combination, and
/// enumerates the combinations hidden in a pile of cards.
pub trait ComboOracle: Send + Sync {
    /// True iff `cards` is a valid combination.
    fn is_valid_combo(&self, cards: &[CardId]) -> bool;

    /// Up to `limit` valid combinations drawable from `cards`.
    ///
    /// `limit == 1` is the cheap existence probe used for end-of-game
    /// detection; `usize::MAX` enumerates everything (hints).
    fn find_combos(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>>;
}

/// The classic Set rule over feature-vector cards.
///
/// A card id encodes `features` digits in base `options`. A combination of
/// `combo_size` cards is valid iff for every feature the digits are either
/// all equal or all distinct across the cards.
#[derive(Debug, Clone)]
pub struct FeatureOracle {
    combo_size: usize,
    features: usize,
    options: usize,
}

impl FeatureOracle {
    pub fn new(combo_size: usize, features: usize, options: usize) -> Self {
        Self {
            combo_size,
            features,
            options,
        }
    }

    /// The standard game: 3-card combinations, 4 features, 3 options each
    /// (81 cards).
    pub fn classic() -> Self {
        Self::new(3, 4, 3)
    }

    fn feature(&self, card: CardId, index: usize) -> usize {
        (card / self.options.pow(index as u32)) % self.options
    }

    fn feature_ok(&self, cards: &[CardId], index: usize) -> bool {
        let first = self.feature(cards[0], index);
        let all_equal = cards.iter().all(|&c| self.feature(c, index) == first);
        if all_equal {
            return true;
        }
        let mut digits: Vec<usize> = cards.iter().map(|&c| self.feature(c, index)).collect();
        digits.sort_unstable();
        digits.windows(2).all(|w| w[0] != w[1])
    }
}

impl ComboOracle for FeatureOracle {
    fn is_valid_combo(&self, cards: &[CardId]) -> bool {
        if cards.is_empty() || cards.len() != self.combo_size {
            return false;
        }
        (0..self.features).all(|f| self.feature_ok(cards, f))
    }

    fn find_combos(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        let mut found = Vec::new();
        if limit == 0 || cards.len() < self.combo_size {
            return found;
        }

        // Lexicographic walk over index combinations of size combo_size.
        let k = self.combo_size;
        let mut indices: Vec<usize> = (0..k).collect();
        loop {
            let combo: Vec<CardId> = indices.iter().map(|&i| cards[i]).collect();
            if self.is_valid_combo(&combo) {
                found.push(combo);
                if found.len() >= limit {
                    return found;
                }
            }

            // Advance to the next combination, rightmost index first.
            let mut i = k;
            loop {
                if i == 0 {
                    return found;
                }
                i -= 1;
                if indices[i] != i + cards.len() - k {
                    break;
                }
            }
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
        }
    }
}
