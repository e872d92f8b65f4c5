//! Automated key-press generator for non-human players.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::game::{PlayerId, SlotId};

/// Produce uniformly random slot choices into the player's input queue.
///
/// The send blocks when the queue is full, so the generator is
/// back-pressured by queue capacity whenever its player is suspended or
/// frozen. Once enqueued, generated presses are indistinguishable from
/// human ones.
pub async fn run(
    player: PlayerId,
    grid_size: usize,
    seed: Option<u64>,
    input: mpsc::Sender<SlotId>,
    cancel: CancellationToken,
) {
    log::info!("generator for player {player} starting");
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    loop {
        let slot = rng.random_range(0..grid_size);
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = input.send(slot) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    log::info!("generator for player {player} terminated");
}
