use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::client::LeaderboardClient;
use crate::leaderboard::ScoreEntry;

/// Outcome of a background submit-and-rank round trip
#[derive(Clone, Debug, PartialEq)]
pub struct RankingReply {
    /// Session generation that asked for it; stale replies are dropped
    pub generation: u64,
    pub result: Result<Vec<ScoreEntry>, String>,
    /// Set when the score itself was not accepted
    pub submit_error: Option<String>,
}

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Ranking(RankingReply),
}

/// Source of terminal events (keyboard, resize, background replies)
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;

    /// Handle for background work to post events back to the loop
    fn sender(&self) -> Sender<GameEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        let input_tx = tx.clone();
        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => GameEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("terminal input failed: {e}");
                    break;
                }
            };
            if input_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(tx: Sender<GameEvent>, rx: Receiver<GameEvent>) -> Self {
        Self { tx, rx }
    }

    pub fn channel() -> Self {
        let (tx, rx) = mpsc::channel();
        Self::new(tx, rx)
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<GameEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// Submit `entry` and fetch the ranking off the UI thread; the outcome comes
/// back through `tx` as a `GameEvent::Ranking`.
pub fn spawn_submission(
    tx: Sender<GameEvent>,
    client: Arc<dyn LeaderboardClient>,
    generation: u64,
    entry: ScoreEntry,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let outcome = client.submit_and_rank(&entry);
        let submit_error = outcome.submitted.err().map(|e| {
            tracing::warn!("submission for {} failed: {e}", entry.player_name);
            e.to_string()
        });
        let result = outcome.ranking.map_err(|e| {
            tracing::warn!("ranking fetch failed: {e}");
            e.to_string()
        });
        // the loop may already be gone if the player quit
        let _ = tx.send(GameEvent::Ranking(RankingReply {
            generation,
            result,
            submit_error,
        }));
    })
}
