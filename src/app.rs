use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::Game;
use crate::leaderboard::ScoreEntry;
use crate::runtime::RankingReply;
use crate::session::{SessionResult, Transition};

const MAX_NAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Start,
    Playing,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingState {
    Idle,
    Pending,
    Loaded(Vec<ScoreEntry>),
    Failed(String),
}

/// Side effects the event loop has to carry out after a key
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    None,
    Quit,
    Started { player_name: String },
    Submit { generation: u64, entry: ScoreEntry },
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub state: AppState,
    pub name_input: String,
    pub alert: Option<String>,
    pub ranking: RankingState,
    pub submit_error: Option<String>,
    pub last_result: Option<SessionResult>,
    generation: u64,
}

impl App {
    pub fn new(game: Game, player_name: String) -> Self {
        Self {
            game,
            state: AppState::Start,
            name_input: player_name,
            alert: None,
            ranking: RankingState::Idle,
            submit_error: None,
            last_result: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        self.on_key_at(key, chrono::Utc::now().timestamp_millis())
    }

    pub fn on_key_at(&mut self, key: KeyEvent, now_ms: i64) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match self.state {
            AppState::Start => self.on_start_key(key, now_ms),
            AppState::Playing => self.on_playing_key(key, now_ms),
            AppState::Results => match key.code {
                KeyCode::Enter | KeyCode::Char('n') => {
                    self.new_game();
                    AppAction::None
                }
                KeyCode::Esc | KeyCode::Char('q') => AppAction::Quit,
                _ => AppAction::None,
            },
        }
    }

    fn on_start_key(&mut self, key: KeyEvent, now_ms: i64) -> AppAction {
        match key.code {
            KeyCode::Esc => AppAction::Quit,
            KeyCode::Backspace => {
                self.name_input.pop();
                AppAction::None
            }
            KeyCode::Char(c) => {
                if self.name_input.chars().count() < MAX_NAME_LEN {
                    self.name_input.push(c);
                }
                AppAction::None
            }
            KeyCode::Enter => match self.game.start_at(&self.name_input, now_ms) {
                Ok(()) => {
                    self.generation += 1;
                    self.alert = None;
                    self.state = AppState::Playing;
                    AppAction::Started {
                        player_name: self.game.state.player_name.clone(),
                    }
                }
                Err(e) => {
                    self.alert = Some(e.to_string());
                    AppAction::None
                }
            },
            _ => AppAction::None,
        }
    }

    fn on_playing_key(&mut self, key: KeyEvent, now_ms: i64) -> AppAction {
        match key.code {
            KeyCode::Esc => {
                // abandon the session, nothing is submitted
                self.new_game();
                AppAction::None
            }
            KeyCode::Char(c) => match self.game.on_key_press_at(c, now_ms) {
                Transition::Completed(result) => {
                    let entry = ScoreEntry::new(result.player_name.clone(), result.score);
                    self.last_result = Some(result);
                    self.ranking = RankingState::Pending;
                    self.state = AppState::Results;
                    AppAction::Submit {
                        generation: self.generation,
                        entry,
                    }
                }
                _ => AppAction::None,
            },
            _ => AppAction::None,
        }
    }

    pub fn on_ranking(&mut self, reply: RankingReply) {
        if reply.generation != self.generation || self.state != AppState::Results {
            tracing::debug!(generation = reply.generation, "dropping stale ranking");
            return;
        }
        self.submit_error = reply.submit_error;
        self.ranking = match reply.result {
            Ok(entries) => RankingState::Loaded(entries),
            Err(message) => RankingState::Failed(message),
        };
    }

    /// Back to name entry; the typed name is kept
    pub fn new_game(&mut self) {
        self.game.reset();
        self.state = AppState::Start;
        self.ranking = RankingState::Idle;
        self.submit_error = None;
        self.last_result = None;
        self.alert = None;
    }
}
