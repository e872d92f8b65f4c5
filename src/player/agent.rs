//! Per-player agent: the state machine between the input queue, the table
//! and the dealer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::claim::{Claim, ClaimSender, ClaimVerdict};
use crate::game::{GameConfig, PlayerId, SlotId};
use crate::player::generator;
use crate::render::RenderSink;
use crate::table::{Table, TokenPlacement};

/// Coarse tick for the visible freeze countdown.
const FREEZE_TICK: Duration = Duration::from_secs(1);

/// One player's main task.
///
/// Reads slot choices from its bounded input queue, toggles marks on the
/// table, submits a claim when the K-th mark lands and suspends until the
/// dealer's verdict arrives, then serves the point or penalty freeze.
/// At most one claim is ever outstanding: the agent does not read input
/// while suspended.
pub struct PlayerAgent {
    id: PlayerId,
    config: GameConfig,
    table: Arc<Table>,
    claims: ClaimSender,
    input: mpsc::Receiver<SlotId>,
    input_tx: mpsc::Sender<SlotId>,
    render: Arc<dyn RenderSink>,
    cancel: CancellationToken,
}

impl PlayerAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PlayerId,
        config: GameConfig,
        table: Arc<Table>,
        claims: ClaimSender,
        input: mpsc::Receiver<SlotId>,
        input_tx: mpsc::Sender<SlotId>,
        render: Arc<dyn RenderSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            config,
            table,
            claims,
            input,
            input_tx,
            render,
            cancel,
        }
    }

    /// Main loop of the player task. Exits when termination is requested;
    /// an automated player's generator is joined before returning.
    pub async fn run(mut self) {
        log::info!("player {} starting", self.id);

        let generator = if self.config.is_human(self.id) {
            None
        } else {
            let seed = self.config.rng_seed.map(|s| s ^ (self.id as u64 + 1));
            Some(tokio::spawn(generator::run(
                self.id,
                self.config.grid_size(),
                seed,
                self.input_tx.clone(),
                self.cancel.clone(),
            )))
        };

        loop {
            let slot = tokio::select! {
                _ = self.cancel.cancelled() => break,
                slot = self.input.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };
            self.handle_key(slot).await;
            if self.cancel.is_cancelled() {
                break;
            }
        }

        if let Some(generator) = generator {
            if let Err(e) = generator.await {
                log::error!("generator task for player {} failed: {e}", self.id);
            }
        }
        log::info!("player {} terminated", self.id);
    }

    /// React to one slot choice: toggle an existing mark off, or place a
    /// new one and claim if it was the K-th.
    async fn handle_key(&mut self, slot: SlotId) {
        if self.table.remove_token_by_player(self.id, slot).await {
            return;
        }
        if self.table.free_mark_cell(self.id).await.is_none() {
            return;
        }
        if self.table.place_token(self.id, slot).await == TokenPlacement::CompletedClaim {
            self.claim_and_await().await;
        }
    }

    /// Submit the claim and suspend until the dealer's verdict. The oneshot
    /// cannot fire before the dealer resolves it, so there is no stale
    /// condition to re-check on wake.
    async fn claim_and_await(&mut self) {
        let (claim, verdict) = Claim::new(self.id);
        if self.claims.submit(claim).await.is_err() {
            log::debug!("player {}: claim queue closed, game is over", self.id);
            return;
        }
        log::debug!("player {} suspended awaiting adjudication", self.id);

        let verdict = tokio::select! {
            _ = self.cancel.cancelled() => return,
            verdict = verdict => verdict,
        };
        match verdict {
            Ok(ClaimVerdict::Point) => self.freeze(self.config.point_freeze).await,
            Ok(ClaimVerdict::Penalty) => self.freeze(self.config.penalty_freeze).await,
            // Discarded claim: resume input immediately, nothing to serve.
            Ok(ClaimVerdict::Void) => {}
            // Dealer dropped the claim on shutdown; the loop exits on the
            // cancellation flag.
            Err(_) => {}
        }
    }

    /// Serve a freeze, updating the visible remaining time roughly once a
    /// second. Only termination interrupts it.
    async fn freeze(&self, total: Duration) {
        let until = Instant::now() + total;
        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.render.on_freeze(self.id, remaining);
            let step = remaining.min(FREEZE_TICK);
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(step) => {}
            }
        }
        self.render.on_freeze(self.id, Duration::ZERO);
    }
}
