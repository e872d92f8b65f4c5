//! Integration tests for game flow scenarios.
//!
//! These tests spawn the whole system (dealer, agents, generators), drive
//! it through the external surface and assert on the events observed by a
//! recording render sink. Every wait is bounded so a lost wakeup fails the
//! test instead of hanging it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use set_engine::game::ComboOracle;
use set_engine::{
    CardId, FeatureOracle, GameConfig, GameSession, PlayerId, RenderSink, SlotId,
};

/// Everything the engine reported through the render sink.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    CardPlaced(CardId, SlotId),
    CardRemoved(SlotId),
    TokenPlaced(PlayerId, SlotId),
    TokenRemoved(PlayerId, SlotId),
    TokensCleared(SlotId),
    Score(PlayerId, u32),
    Countdown(Duration, bool),
    Freeze(PlayerId, Duration),
    Winners(Vec<PlayerId>),
}

#[derive(Default)]
struct RecordingRender {
    events: Mutex<Vec<Event>>,
}

impl RecordingRender {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl RenderSink for RecordingRender {
    fn on_card_placed(&self, card: CardId, slot: SlotId) {
        self.record(Event::CardPlaced(card, slot));
    }
    fn on_card_removed(&self, slot: SlotId) {
        self.record(Event::CardRemoved(slot));
    }
    fn on_token_placed(&self, player: PlayerId, slot: SlotId) {
        self.record(Event::TokenPlaced(player, slot));
    }
    fn on_token_removed(&self, player: PlayerId, slot: SlotId) {
        self.record(Event::TokenRemoved(player, slot));
    }
    fn on_tokens_cleared(&self, slot: SlotId) {
        self.record(Event::TokensCleared(slot));
    }
    fn on_score_changed(&self, player: PlayerId, score: u32) {
        self.record(Event::Score(player, score));
    }
    fn on_countdown(&self, remaining: Duration, warning: bool) {
        self.record(Event::Countdown(remaining, warning));
    }
    fn on_freeze(&self, player: PlayerId, remaining: Duration) {
        self.record(Event::Freeze(player, remaining));
    }
    fn on_winners(&self, players: &[PlayerId]) {
        self.record(Event::Winners(players.to_vec()));
    }
}

/// Treats every K-card group as valid. `find_combos` reports one group per
/// call so end-of-game probes keep the game alive while cards remain.
struct AcceptAll {
    combo: usize,
}

impl ComboOracle for AcceptAll {
    fn is_valid_combo(&self, cards: &[CardId]) -> bool {
        cards.len() == self.combo
    }
    fn find_combos(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        if limit == 0 || cards.len() < self.combo {
            return Vec::new();
        }
        vec![cards[..self.combo].to_vec()]
    }
}

/// Rejects every claim while still reporting that combinations exist, so
/// the game keeps running.
struct RejectAll;

impl ComboOracle for RejectAll {
    fn is_valid_combo(&self, _cards: &[CardId]) -> bool {
        false
    }
    fn find_combos(&self, _cards: &[CardId], _limit: usize) -> Vec<Vec<CardId>> {
        vec![vec![0]]
    }
}

/// Reports that no combination exists anywhere.
struct NoCombos;

impl ComboOracle for NoCombos {
    fn is_valid_combo(&self, _cards: &[CardId]) -> bool {
        false
    }
    fn find_combos(&self, _cards: &[CardId], _limit: usize) -> Vec<Vec<CardId>> {
        Vec::new()
    }
}

/// Accepts like [`AcceptAll`] but takes `delay` to decide, modelling the
/// possibly expensive external oracle.
struct SlowAccept {
    combo: usize,
    delay: Duration,
}

impl ComboOracle for SlowAccept {
    fn is_valid_combo(&self, cards: &[CardId]) -> bool {
        std::thread::sleep(self.delay);
        cards.len() == self.combo
    }
    fn find_combos(&self, cards: &[CardId], limit: usize) -> Vec<Vec<CardId>> {
        AcceptAll { combo: self.combo }.find_combos(cards, limit)
    }
}

/// Small grid, two-card combinations, one human player, instant dealing.
fn small_config() -> GameConfig {
    GameConfig {
        rows: 1,
        columns: 4,
        combo_size: 2,
        deck_size: 6,
        players: 1,
        human_players: 1,
        turn_timeout: Duration::from_secs(60),
        turn_timeout_warning: Duration::from_secs(5),
        point_freeze: Duration::from_millis(50),
        penalty_freeze: Duration::from_millis(50),
        deal_delay: Duration::ZERO,
        hints: false,
        clear_marks_on_penalty: false,
        rng_seed: Some(11),
    }
}

/// Poll `cond` every 10 ms until it holds or `timeout` elapses.
async fn wait_until(mut cond: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn wait_for_seeding(render: &RecordingRender, cards: usize) {
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::CardPlaced(..))) >= cards,
            Duration::from_secs(5),
        )
        .await,
        "table was not seeded in time"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn accepted_claim_scores_freezes_and_refills() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let session = GameSession::spawn(
        small_config(),
        Arc::new(AcceptAll { combo: 2 }),
        render.clone(),
    )?;
    let table = session.table();

    wait_for_seeding(&render, 4).await;
    let untouched_2 = table.card_at(2).await;
    let untouched_3 = table.card_at(3).await;
    assert!(untouched_2.is_some() && untouched_3.is_some());

    assert!(session.key_pressed(0, 0));
    assert!(session.key_pressed(0, 1));

    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::Score(0, 1))) == 1,
            Duration::from_secs(5),
        )
        .await,
        "accepted claim was not scored"
    );

    // The claimed slots are removed and refilled in place.
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::CardPlaced(..))) >= 6,
            Duration::from_secs(5),
        )
        .await,
        "claimed slots were not refilled"
    );
    assert_eq!(table.card_at(2).await, untouched_2);
    assert_eq!(table.card_at(3).await, untouched_3);

    // The winning marks were swept with their cards.
    assert!(table.marked_slots(0).await.is_empty());
    assert!(render.count(|e| matches!(e, Event::TokensCleared(_))) >= 1);

    // The point freeze was visible and ended.
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::Freeze(0, d) if d.is_zero())) >= 1,
            Duration::from_secs(5),
        )
        .await
    );
    assert!(render.count(|e| matches!(e, Event::Freeze(0, d) if !d.is_zero())) >= 1);

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores, vec![1]);
    assert_eq!(outcome.winners, vec![0]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejected_claim_penalizes_and_leaves_the_board_alone() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let session = GameSession::spawn(small_config(), Arc::new(RejectAll), render.clone())?;
    let table = session.table();

    wait_for_seeding(&render, 4).await;
    let mut cards_before = Vec::new();
    for slot in 0..4 {
        cards_before.push(table.card_at(slot).await);
    }

    assert!(session.key_pressed(0, 2));
    assert!(session.key_pressed(0, 3));

    // Penalty freeze runs and finishes.
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::Freeze(0, d) if d.is_zero())) >= 1,
            Duration::from_secs(5),
        )
        .await,
        "penalty freeze did not run"
    );

    // Score untouched, no card moved, marks still in place.
    assert_eq!(render.count(|e| matches!(e, Event::Score(..))), 0);
    assert_eq!(render.count(|e| matches!(e, Event::CardRemoved(_))), 0);
    for (slot, card) in cards_before.iter().enumerate() {
        assert_eq!(table.card_at(slot).await, *card);
    }
    let mut marks = table.marked_slots(0).await;
    marks.sort_unstable();
    assert_eq!(marks, vec![2, 3]);

    // Rejected marks come off only by explicit toggle.
    assert!(session.key_pressed(0, 2));
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::TokenRemoved(0, 2))) == 1,
            Duration::from_secs(5),
        )
        .await
    );
    assert_eq!(table.marked_slots(0).await, vec![3]);

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores, vec![0]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_remaining_combination_ends_the_game_with_tied_winners() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let config = GameConfig {
        players: 2,
        human_players: 2,
        ..small_config()
    };
    let session = GameSession::spawn(config, Arc::new(NoCombos), render.clone())?;

    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores, vec![0, 0]);
    assert_eq!(outcome.winners, vec![0, 1]);
    assert_eq!(
        render.count(|e| matches!(e, Event::Winners(w) if w == &vec![0, 1])),
        1
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn termination_wakes_a_player_suspended_on_its_claim() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let oracle = SlowAccept {
        combo: 2,
        delay: Duration::from_millis(400),
    };
    let session = GameSession::spawn(small_config(), Arc::new(oracle), render.clone())?;

    wait_for_seeding(&render, 4).await;
    assert!(session.key_pressed(0, 0));
    assert!(session.key_pressed(0, 1));

    // The second mark lands and the claim goes out; the dealer is now stuck
    // inside the slow oracle while the player is suspended.
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::TokenPlaced(0, 1))) == 1,
            Duration::from_secs(5),
        )
        .await
    );
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await;

    // The player woke on the termination flag, before any verdict, so no
    // freeze was ever served.
    assert!(outcome.is_ok(), "player thread did not exit in time");
    assert_eq!(render.count(|e| matches!(e, Event::Freeze(..))), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn turn_timeout_clears_and_reseeds_the_whole_table() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let config = GameConfig {
        turn_timeout: Duration::from_millis(300),
        turn_timeout_warning: Duration::from_millis(100),
        ..small_config()
    };
    let timeout = config.turn_timeout;
    let session = GameSession::spawn(config, Arc::new(AcceptAll { combo: 2 }), render.clone())?;

    // No claims arrive, so the timer expires: all four cards return to the
    // deck and a full second seeding follows from the restored deck.
    assert!(
        wait_until(
            || {
                render.count(|e| matches!(e, Event::CardRemoved(_))) >= 4
                    && render.count(|e| matches!(e, Event::CardPlaced(..))) >= 8
            },
            Duration::from_secs(5),
        )
        .await,
        "table was not cleared and reseeded"
    );

    let events = render.events();
    // The clear resets the countdown display to the full turn timeout.
    assert!(events.contains(&Event::Countdown(timeout, false)));
    // The final stretch ran on the fine-grained warning display.
    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::Countdown(_, true)))
    );

    session.terminate();
    tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn claims_are_adjudicated_in_submission_order() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let config = GameConfig {
        rows: 1,
        columns: 9,
        deck_size: 15,
        players: 3,
        human_players: 3,
        point_freeze: Duration::from_millis(10),
        ..small_config()
    };
    let oracle = SlowAccept {
        combo: 2,
        delay: Duration::from_millis(150),
    };
    let session = GameSession::spawn(config, Arc::new(oracle), render.clone())?;

    wait_for_seeding(&render, 9).await;

    // Stagger the three claims so their submission order is fixed; the slow
    // oracle keeps the dealer busy on the first while the rest queue up.
    assert!(session.key_pressed(0, 0));
    assert!(session.key_pressed(0, 1));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(session.key_pressed(1, 2));
    assert!(session.key_pressed(1, 3));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(session.key_pressed(2, 4));
    assert!(session.key_pressed(2, 5));

    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::Score(..))) == 3,
            Duration::from_secs(10),
        )
        .await,
        "not all claims were adjudicated"
    );

    let scored: Vec<PlayerId> = render
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Score(player, _) => Some(player),
            _ => None,
        })
        .collect();
    assert_eq!(scored, vec![0, 1, 2], "adjudication order was not FIFO");

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores, vec![1, 1, 1]);
    assert_eq!(outcome.winners, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn losing_a_shared_slot_race_voids_the_stale_claim() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let config = GameConfig {
        players: 2,
        human_players: 2,
        point_freeze: Duration::from_millis(30),
        ..small_config()
    };
    let oracle = SlowAccept {
        combo: 2,
        delay: Duration::from_millis(150),
    };
    let session = GameSession::spawn(config, Arc::new(oracle), render.clone())?;
    let table = session.table();

    wait_for_seeding(&render, 4).await;

    // Both players claim the same two slots; player 0 is first in the
    // queue. Its accepted claim removes the cards and sweeps player 1's
    // marks, so player 1's queued claim is stale by adjudication time.
    assert!(session.key_pressed(0, 0));
    assert!(session.key_pressed(0, 1));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(session.key_pressed(1, 0));
    assert!(session.key_pressed(1, 1));

    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::Score(0, 1))) == 1,
            Duration::from_secs(5),
        )
        .await
    );

    // Player 1 must be woken by the void verdict: no freeze, no score, and
    // its swept marks stay gone. Give the dealer time to reach the stale
    // claim.
    assert!(
        wait_until(
            || render.count(|e| matches!(e, Event::TokensCleared(_))) >= 1,
            Duration::from_secs(5),
        )
        .await
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(render.count(|e| matches!(e, Event::Score(1, _))), 0);
    assert_eq!(render.count(|e| matches!(e, Event::Freeze(1, _))), 0);
    assert!(table.marked_slots(1).await.is_empty());

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores, vec![1, 0]);
    assert_eq!(outcome.winners, vec![0]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn automated_players_run_and_shut_down_cleanly() -> Result<()> {
    let render = Arc::new(RecordingRender::default());
    let config = GameConfig {
        players: 2,
        human_players: 0,
        turn_timeout: Duration::from_millis(500),
        turn_timeout_warning: Duration::from_millis(100),
        point_freeze: Duration::from_millis(20),
        penalty_freeze: Duration::from_millis(20),
        deal_delay: Duration::from_millis(1),
        hints: true,
        rng_seed: Some(99),
        ..GameConfig::default()
    };
    let session = GameSession::spawn(config, Arc::new(FeatureOracle::classic()), render.clone())?;

    // Let the generators hammer the table across at least one reshuffle.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(render.count(|e| matches!(e, Event::TokenPlaced(..))) > 0);

    session.terminate();
    let outcome = tokio::time::timeout(Duration::from_secs(10), session.completed()).await??;
    assert_eq!(outcome.scores.len(), 2);
    assert!(!outcome.winners.is_empty());
    Ok(())
}
