//! The dealer actor: seeds the table, runs the turn timer, adjudicates
//! claims and ends the game.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::claim::{Claim, ClaimReceiver, ClaimVerdict};
use crate::game::{CardId, ComboOracle, Deck, GameConfig, PlayerId, SlotId};
use crate::render::RenderSink;
use crate::table::Table;

/// Countdown refresh cadence outside the warning window.
const NORMAL_TICK: Duration = Duration::from_millis(1000);

/// Refresh cadence once inside the warning window.
const WARNING_TICK: Duration = Duration::from_millis(10);

/// Final scores and winners reported when the game ends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameOutcome {
    /// Score per player, indexed by player id.
    pub scores: Vec<u32>,
    /// Every player holding the maximum score (ties allowed).
    pub winners: Vec<PlayerId>,
}

/// The single arbiter of the game.
///
/// Owns the deck and the claim queue's receiving half. Runs rounds until an
/// external termination request arrives or no combination remains in the
/// deck, then joins every player task and announces the winners.
pub struct Dealer {
    config: GameConfig,
    table: Arc<Table>,
    oracle: Arc<dyn ComboOracle>,
    render: Arc<dyn RenderSink>,
    claims: ClaimReceiver,
    agents: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    deck: Deck,
    scores: Vec<u32>,
    deadline: Instant,
    rewarded: Option<(PlayerId, Vec<SlotId>)>,
    board_cleared: bool,
}

impl Dealer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GameConfig,
        table: Arc<Table>,
        oracle: Arc<dyn ComboOracle>,
        render: Arc<dyn RenderSink>,
        claims: ClaimReceiver,
        agents: Vec<JoinHandle<()>>,
        cancel: CancellationToken,
    ) -> Self {
        let deck = Deck::new(config.deck_size, config.rng_seed);
        let scores = vec![0; config.players];
        let deadline = Instant::now() + config.turn_timeout;
        Self {
            config,
            table,
            oracle,
            render,
            claims,
            agents,
            cancel,
            deck,
            scores,
            deadline,
            rewarded: None,
            board_cleared: true,
        }
    }

    /// Main loop of the dealer task.
    pub async fn run(mut self) -> GameOutcome {
        log::info!("dealer starting");
        while !self.should_finish() {
            self.seed_table().await;
            self.timer_loop().await;
            self.clear_table().await;
        }
        self.cancel.cancel();
        self.join_agents().await;
        let outcome = self.announce_winners();
        log::info!("dealer terminated");
        outcome
    }

    /// Game over: termination requested, or the remaining deck holds no
    /// combination at all.
    fn should_finish(&self) -> bool {
        self.cancel.is_cancelled() || self.oracle.find_combos(self.deck.remaining(), 1).is_empty()
    }

    /// Fill the whole grid from the deck after a clear.
    async fn seed_table(&mut self) {
        if !self.board_cleared {
            return;
        }
        log::debug!("seeding the full table, {} cards in deck", self.deck.len());
        for slot in 0..self.config.grid_size() {
            let Some(card) = self.deck.draw() else {
                break;
            };
            if let Err(e) = self.table.place_card(card, slot).await {
                log::error!("seeding slot {slot} failed: {e}");
            }
        }
        self.board_cleared = false;
        if self.config.hints {
            for hint in self.table.hints(self.oracle.as_ref()).await {
                log::info!("hint: combination at slots {hint:?}");
            }
        }
        self.table.set_accepting(true);
    }

    /// Inner loop: block on the claim queue with a deadline, refreshing the
    /// countdown on every wake, until the turn times out or termination is
    /// requested.
    async fn timer_loop(&mut self) {
        self.deadline = Instant::now() + self.config.turn_timeout;
        self.render_countdown();
        loop {
            let now = Instant::now();
            if self.cancel.is_cancelled() || now >= self.deadline {
                return;
            }
            let tick = if self.in_warning_window() {
                WARNING_TICK
            } else {
                NORMAL_TICK
            };
            let wake_at = (now + tick).min(self.deadline);

            let claim = tokio::select! {
                _ = self.cancel.cancelled() => return,
                claim = self.claims.await_claim(wake_at) => claim,
            };
            if let Some(claim) = claim {
                self.adjudicate(claim).await;
                self.refill().await;
            }
            self.render_countdown();
        }
    }

    /// Decide one claim. The marked slots are re-read under the board-wide
    /// lock; a stale claim (marks no longer full, or a marked slot lost its
    /// card) is discarded with a void verdict rather than adjudicated.
    async fn adjudicate(&mut self, claim: Claim) {
        let player = claim.player;
        let Some(snapshot) = self.table.claim_snapshot(player).await else {
            log::debug!("discarding stale claim from player {player}");
            claim.resolve(ClaimVerdict::Void);
            return;
        };

        let cards: Vec<CardId> = snapshot.iter().map(|&(_, card)| card).collect();
        if self.oracle.is_valid_combo(&cards) {
            self.scores[player] += 1;
            log::debug!("player {player} scored, now at {}", self.scores[player]);
            self.render.on_score_changed(player, self.scores[player]);
            let slots = snapshot.iter().map(|&(slot, _)| slot).collect();
            self.rewarded = Some((player, slots));
            self.reset_countdown();
            claim.resolve(ClaimVerdict::Point);
        } else {
            log::debug!("player {player} claimed an invalid combination");
            if self.config.clear_marks_on_penalty {
                self.table.clear_marks(player).await;
            }
            claim.resolve(ClaimVerdict::Penalty);
        }
    }

    /// Replace the cards taken by an accepted claim, preserving the spatial
    /// layout: replacements land on exactly the claimed slots.
    async fn refill(&mut self) {
        let Some((player, slots)) = self.rewarded.take() else {
            return;
        };
        self.table.set_accepting(false);
        for &slot in &slots {
            // Accepted cards are discarded for good, not returned to the deck.
            self.table.remove_card(slot).await;
        }
        if self.deck.len() < slots.len() {
            log::info!("deck cannot refill the table, ending the game");
            self.cancel.cancel();
        } else {
            for slot in slots {
                let Some(card) = self.deck.draw() else {
                    break;
                };
                if let Err(e) = self.table.place_card(card, slot).await {
                    log::error!("refill placement on slot {slot} failed: {e}");
                }
            }
            log::debug!("refilled claimed slots of player {player}");
        }
        self.table.set_accepting(true);
    }

    /// Turn timed out (or the round is over): return every card to the
    /// deck, sweep all tokens, discard pending claims and mark the board
    /// for a full reseed.
    async fn clear_table(&mut self) {
        self.table.set_accepting(false);
        for slot in 0..self.config.grid_size() {
            if let Some(card) = self.table.remove_card(slot).await {
                self.deck.put_back(card);
            }
        }
        // Claims that raced the clear are stale by definition; void them so
        // no submitter stays suspended waiting for an adjudication that
        // will never happen.
        for claim in self.claims.drain() {
            log::debug!("discarding pending claim from player {}", claim.player);
            claim.resolve(ClaimVerdict::Void);
        }
        self.board_cleared = true;
        self.render.on_countdown(self.config.turn_timeout, false);
    }

    async fn join_agents(&mut self) {
        for handle in self.agents.drain(..) {
            if let Err(e) = handle.await {
                log::error!("player task failed: {e}");
            }
        }
    }

    fn announce_winners(&self) -> GameOutcome {
        let best = self.scores.iter().copied().max().unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score == best)
            .map(|(player, _)| player)
            .collect();
        self.render.on_winners(&winners);
        log::info!("winners: {winners:?} with {best} points");
        GameOutcome {
            scores: self.scores.clone(),
            winners,
        }
    }

    fn in_warning_window(&self) -> bool {
        self.deadline.saturating_duration_since(Instant::now()) <= self.config.turn_timeout_warning
    }

    fn reset_countdown(&mut self) {
        self.deadline = Instant::now() + self.config.turn_timeout;
        self.render.on_countdown(self.config.turn_timeout, false);
    }

    fn render_countdown(&self) {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        self.render
            .on_countdown(remaining, remaining <= self.config.turn_timeout_warning);
    }
}
