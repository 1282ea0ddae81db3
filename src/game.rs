use crate::questions::Question;
use crate::scoring::ScoreRule;
use crate::session::{apply, SessionError, SessionEvent, SessionState, Transition};
use chrono::Utc;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// represents a game being displayed to the user
#[derive(Debug, Clone)]
pub struct Game {
    questions: Vec<Question>,
    rule: ScoreRule,
    pub state: SessionState,
}

impl Game {
    pub fn new(questions: Vec<Question>, rule: ScoreRule) -> Self {
        Self {
            questions,
            rule,
            state: SessionState::default(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.state.question_index)
    }

    pub fn start(&mut self, player_name: &str) -> Result<(), SessionError> {
        self.start_at(player_name, now_ms())
    }

    pub fn start_at(&mut self, player_name: &str, now_ms: i64) -> Result<(), SessionError> {
        apply(
            &mut self.state,
            &self.questions,
            &self.rule,
            SessionEvent::Start {
                player_name,
                now_ms,
            },
        )
        .map(|_| ())
    }

    pub fn on_key_press(&mut self, key: char) -> Transition {
        self.on_key_press_at(key, now_ms())
    }

    pub fn on_key_press_at(&mut self, key: char, now_ms: i64) -> Transition {
        apply(
            &mut self.state,
            &self.questions,
            &self.rule,
            SessionEvent::Key { key, now_ms },
        )
        // key events never fail
        .unwrap_or(Transition::Ignored)
    }

    pub fn reset(&mut self) {
        self.state = SessionState::default();
    }

    pub fn has_started(&self) -> bool {
        self.state.started
    }

    pub fn has_finished(&self) -> bool {
        self.state.completed
    }

    /// Milliseconds since start; frozen once the session completes
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms_at(now_ms())
    }

    pub fn elapsed_ms_at(&self, now_ms: i64) -> i64 {
        if !self.state.started {
            0
        } else if self.state.completed {
            self.state.elapsed_ms
        } else {
            (now_ms - self.state.start_timestamp_ms).max(0)
        }
    }

    /// The typed prefix and the remaining suffix of the current question
    pub fn split_current(&self) -> (String, String) {
        match self.current_question() {
            Some(q) => {
                let typed = q.text.chars().take(self.state.char_position).collect();
                let rest = q.text.chars().skip(self.state.char_position).collect();
                (typed, rest)
            }
            None => (String::new(), String::new()),
        }
    }
}
