//! Claim hand-off between player agents and the dealer.
//!
//! A bounded FIFO channel carries [`Claim`] values from the agents to the
//! single dealer; each claim carries its own oneshot completion so the
//! verdict reaches exactly the submitting agent. Capacity equals the player
//! count, and each player has at most one claim in flight, so a submit can
//! never actually block on a full queue.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::game::PlayerId;

/// Outcome of a claim's adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClaimVerdict {
    /// Valid combination: score awarded, point freeze follows.
    Point,
    /// Invalid combination: penalty freeze follows.
    Penalty,
    /// Discarded without adjudication (board cleared, stale marks, or
    /// shutdown): the player resumes immediately.
    Void,
}

/// A player's submission for adjudication, created when the K-th mark lands.
#[derive(Debug)]
pub struct Claim {
    pub player: PlayerId,
    verdict: oneshot::Sender<ClaimVerdict>,
}

impl Claim {
    /// New claim plus the receiver the submitting agent suspends on.
    pub fn new(player: PlayerId) -> (Self, oneshot::Receiver<ClaimVerdict>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                player,
                verdict: tx,
            },
            rx,
        )
    }

    /// Deliver the verdict and wake the submitting agent.
    ///
    /// A gone receiver means the agent was cancelled while suspended; that
    /// is not an error.
    pub fn resolve(self, verdict: ClaimVerdict) {
        if self.verdict.send(verdict).is_err() {
            log::debug!("player {} left before its claim was resolved", self.player);
        }
    }
}

#[derive(Debug, Error)]
pub enum ClaimError {
    /// The dealer dropped its end of the queue; the game is over.
    #[error("claim channel closed")]
    Shutdown,
}

/// Submitting half, cloned into every player agent.
#[derive(Debug, Clone)]
pub struct ClaimSender {
    tx: mpsc::Sender<Claim>,
}

impl ClaimSender {
    /// Enqueue a claim for the dealer.
    ///
    /// # Errors
    ///
    /// [`ClaimError::Shutdown`] when the dealer is gone.
    pub async fn submit(&self, claim: Claim) -> Result<(), ClaimError> {
        self.tx.send(claim).await.map_err(|_| ClaimError::Shutdown)
    }
}

/// Dealer's receiving half.
#[derive(Debug)]
pub struct ClaimReceiver {
    rx: mpsc::Receiver<Claim>,
}

impl ClaimReceiver {
    /// Next claim in FIFO order, or `None` once `deadline` passes.
    ///
    /// When every sender is gone and the queue is empty this degrades to a
    /// pure timer instead of returning early, so the caller's loop keeps
    /// its tick cadence.
    pub async fn await_claim(&mut self, deadline: Instant) -> Option<Claim> {
        match tokio::time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(claim)) => Some(claim),
            Ok(None) => {
                tokio::time::sleep_until(deadline).await;
                None
            }
            Err(_) => None,
        }
    }

    /// Pull everything queued right now, without waiting.
    pub fn drain(&mut self) -> Vec<Claim> {
        let mut drained = Vec::new();
        while let Ok(claim) = self.rx.try_recv() {
            drained.push(claim);
        }
        drained
    }
}

/// Bounded FIFO claim channel; `capacity` must be the player count.
pub fn claim_channel(capacity: usize) -> (ClaimSender, ClaimReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ClaimSender { tx }, ClaimReceiver { rx })
}
