//! Game wiring: build the shared state and channels, spawn every task, and
//! expose the external control surface.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::claim::claim_channel;
use crate::dealer::{Dealer, GameOutcome};
use crate::game::{ComboOracle, ConfigError, GameConfig, PlayerId, SlotId};
use crate::player::PlayerAgent;
use crate::render::RenderSink;
use crate::table::Table;

/// Errors surfaced by the session wrapper.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("dealer task failed: {0}")]
    Dealer(#[from] tokio::task::JoinError),
}

/// A running game: one dealer task, one agent task per player and one
/// generator task per automated player, all on the current runtime.
pub struct GameSession {
    table: Arc<Table>,
    inputs: Vec<mpsc::Sender<SlotId>>,
    cancel: CancellationToken,
    dealer: JoinHandle<GameOutcome>,
}

impl GameSession {
    /// Validate the configuration and spawn the whole system.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`SessionError::Config`] when the configuration is invalid; nothing
    /// is spawned in that case.
    pub fn spawn(
        config: GameConfig,
        oracle: Arc<dyn ComboOracle>,
        render: Arc<dyn RenderSink>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let table = Arc::new(Table::new(&config, render.clone()));
        let (claim_tx, claim_rx) = claim_channel(config.players);
        let cancel = CancellationToken::new();

        let mut inputs = Vec::with_capacity(config.players);
        let mut agents = Vec::with_capacity(config.players);
        for id in 0..config.players {
            let (input_tx, input_rx) = mpsc::channel(config.combo_size);
            let agent = PlayerAgent::new(
                id,
                config.clone(),
                table.clone(),
                claim_tx.clone(),
                input_rx,
                input_tx.clone(),
                render.clone(),
                cancel.clone(),
            );
            inputs.push(input_tx);
            agents.push(tokio::spawn(agent.run()));
        }

        let dealer = Dealer::new(
            config,
            table.clone(),
            oracle,
            render,
            claim_rx,
            agents,
            cancel.clone(),
        );
        let dealer = tokio::spawn(dealer.run());

        Ok(Self {
            table,
            inputs,
            cancel,
            dealer,
        })
    }

    /// Feed one key press into a player's input queue.
    ///
    /// Non-blocking: the press is dropped when the queue is full or the
    /// player id is unknown. Returns whether it was accepted.
    pub fn key_pressed(&self, player: PlayerId, slot: SlotId) -> bool {
        match self.inputs.get(player) {
            Some(tx) => tx.try_send(slot).is_ok(),
            None => false,
        }
    }

    /// Read access to the shared table, for display layers.
    pub fn table(&self) -> Arc<Table> {
        self.table.clone()
    }

    /// Request termination. Idempotent; every blocking wait in the engine
    /// wakes on it.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// Wait for the game to end and collect the final outcome. The dealer
    /// joins every player task before reporting.
    ///
    /// # Errors
    ///
    /// [`SessionError::Dealer`] when the dealer task itself failed.
    pub async fn completed(self) -> Result<GameOutcome, SessionError> {
        Ok(self.dealer.await?)
    }
}
