use crate::questions::Question;
use crate::scoring::ScoreRule;
use thiserror::Error;

/// Everything a single playthrough tracks. Created on start, finalised on completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub question_index: usize,
    pub char_position: usize,
    pub started: bool,
    pub completed: bool,
    pub player_name: String,
    pub start_timestamp_ms: i64,
    pub elapsed_ms: i64,
    pub score: f64,
    // Keys that did not match; counted for display only
    pub mistypes: u32,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.started && !self.completed
    }
}

/// Final numbers of a completed session, ready to be submitted
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub player_name: String,
    pub elapsed_ms: i64,
    pub score: f64,
    pub mistypes: u32,
}

impl SessionResult {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    Start { player_name: &'a str, now_ms: i64 },
    Key { key: char, now_ms: i64 },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Started,
    /// Session not running, nothing happened
    Ignored,
    Mismatch,
    Advanced,
    QuestionCleared { next_index: usize },
    Completed(SessionResult),
    Reset,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter your name")]
    MissingPlayerName,

    #[error("there are no questions to play")]
    NoQuestions,
}

/// Advance `state` by one event. On error the state is left untouched.
pub fn apply(
    state: &mut SessionState,
    questions: &[Question],
    rule: &ScoreRule,
    event: SessionEvent,
) -> Result<Transition, SessionError> {
    match event {
        SessionEvent::Start {
            player_name,
            now_ms,
        } => {
            let player_name = player_name.trim();
            if player_name.is_empty() {
                return Err(SessionError::MissingPlayerName);
            }
            if questions.is_empty() {
                return Err(SessionError::NoQuestions);
            }
            *state = SessionState {
                player_name: player_name.to_string(),
                start_timestamp_ms: now_ms,
                started: true,
                ..SessionState::default()
            };
            Ok(Transition::Started)
        }
        SessionEvent::Key { key, now_ms } => Ok(on_key(state, questions, rule, key, now_ms)),
        SessionEvent::Reset => {
            *state = SessionState::default();
            Ok(Transition::Reset)
        }
    }
}

fn on_key(
    state: &mut SessionState,
    questions: &[Question],
    rule: &ScoreRule,
    key: char,
    now_ms: i64,
) -> Transition {
    if !state.is_running() {
        return Transition::Ignored;
    }

    let Some(question) = questions.get(state.question_index) else {
        return Transition::Ignored;
    };
    let Some(expected) = question.char_at(state.char_position) else {
        return Transition::Ignored;
    };

    if !same_key(key, expected) {
        state.mistypes += 1;
        return Transition::Mismatch;
    }

    state.char_position += 1;
    if state.char_position < question.len() {
        return Transition::Advanced;
    }

    if state.question_index + 1 < questions.len() {
        state.question_index += 1;
        state.char_position = 0;
        return Transition::QuestionCleared {
            next_index: state.question_index,
        };
    }

    state.elapsed_ms = (now_ms - state.start_timestamp_ms).max(0);
    state.score = rule.score(state.elapsed_ms);
    state.completed = true;

    Transition::Completed(SessionResult {
        player_name: state.player_name.clone(),
        elapsed_ms: state.elapsed_ms,
        score: state.score,
        mistypes: state.mistypes,
    })
}

fn same_key(pressed: char, expected: char) -> bool {
    pressed == expected || pressed.to_lowercase().eq(expected.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::default_questions;
    use assert_matches::assert_matches;

    fn key(state: &mut SessionState, questions: &[Question], c: char, now_ms: i64) -> Transition {
        apply(
            state,
            questions,
            &ScoreRule::default(),
            SessionEvent::Key { key: c, now_ms },
        )
        .unwrap()
    }

    fn started(questions: &[Question]) -> SessionState {
        let mut state = SessionState::default();
        apply(
            &mut state,
            questions,
            &ScoreRule::default(),
            SessionEvent::Start {
                player_name: "alice",
                now_ms: 1_000,
            },
        )
        .unwrap();
        state
    }

    #[test]
    fn start_requires_a_name() {
        let questions = default_questions();
        let mut state = SessionState::default();
        for name in ["", "   "] {
            let res = apply(
                &mut state,
                &questions,
                &ScoreRule::default(),
                SessionEvent::Start {
                    player_name: name,
                    now_ms: 5,
                },
            );
            assert_eq!(res, Err(SessionError::MissingPlayerName));
            assert_eq!(state, SessionState::default());
        }
    }

    #[test]
    fn start_resets_counters_and_records_timestamp() {
        let questions = default_questions();
        let mut state = SessionState {
            question_index: 3,
            char_position: 2,
            mistypes: 7,
            completed: true,
            ..SessionState::default()
        };
        let res = apply(
            &mut state,
            &questions,
            &ScoreRule::default(),
            SessionEvent::Start {
                player_name: " bob ",
                now_ms: 42,
            },
        );
        assert_eq!(res, Ok(Transition::Started));
        assert_eq!(state.player_name, "bob");
        assert_eq!(state.start_timestamp_ms, 42);
        assert!(state.started);
        assert!(!state.completed);
        assert_eq!((state.question_index, state.char_position, state.mistypes), (0, 0, 0));
    }

    #[test]
    fn keys_before_start_are_ignored() {
        let questions = default_questions();
        let mut state = SessionState::default();
        assert_eq!(key(&mut state, &questions, 'r', 10), Transition::Ignored);
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn mismatch_leaves_position_unchanged() {
        let questions = default_questions();
        let mut state = started(&questions);
        key(&mut state, &questions, 'r', 1_100);

        assert_eq!(key(&mut state, &questions, 'x', 1_200), Transition::Mismatch);
        assert_eq!(state.char_position, 1);
        assert_eq!(state.question_index, 0);
        assert_eq!(state.mistypes, 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let questions = default_questions();
        let mut state = started(&questions);
        assert_eq!(key(&mut state, &questions, 'r', 1_100), Transition::Advanced);
        assert_eq!(key(&mut state, &questions, 'E', 1_200), Transition::Advanced);
        assert_eq!(state.char_position, 2);
    }

    #[test]
    fn clearing_a_question_moves_to_the_next() {
        let questions = default_questions();
        let mut state = started(&questions);
        let mut last = Transition::Ignored;
        for c in "react".chars() {
            last = key(&mut state, &questions, c, 2_000);
        }
        assert_eq!(last, Transition::QuestionCleared { next_index: 1 });
        assert_eq!(state.question_index, 1);
        assert_eq!(state.char_position, 0);
    }

    #[test]
    fn completing_all_questions_in_ten_seconds_scores_9000() {
        let questions = default_questions();
        let mut state = started(&questions);
        let all: String = questions.iter().map(|q| q.text.as_str()).collect();
        let mut last = Transition::Ignored;
        for c in all.chars() {
            last = key(&mut state, &questions, c, 11_000);
        }

        assert_matches!(last, Transition::Completed(ref result) => {
            assert_eq!(result.player_name, "alice");
            assert_eq!(result.elapsed_ms, 10_000);
            assert_eq!(result.score, 9000.0);
            assert_eq!(result.elapsed_secs(), 10.0);
        });
        assert!(state.completed);
        assert_eq!(state.score, 9000.0);

        // finished sessions ignore further input
        assert_eq!(key(&mut state, &questions, 'j', 12_000), Transition::Ignored);
        assert_eq!(state.elapsed_ms, 10_000);
    }

    #[test]
    fn floor_applies_on_completion() {
        let questions = vec![Question::new("a", "")];
        let mut state = started(&questions);
        let rule = ScoreRule::with_floor(Some(0.0));
        let res = apply(
            &mut state,
            &questions,
            &rule,
            SessionEvent::Key {
                key: 'a',
                now_ms: 1_000 + 500_000,
            },
        )
        .unwrap();
        assert_matches!(res, Transition::Completed(r) if r.score == 0.0);
    }

    #[test]
    fn reset_returns_to_defaults() {
        let questions = default_questions();
        let mut state = started(&questions);
        key(&mut state, &questions, 'r', 1_100);
        let res = apply(&mut state, &questions, &ScoreRule::default(), SessionEvent::Reset);
        assert_eq!(res, Ok(Transition::Reset));
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn start_without_questions_fails() {
        let mut state = SessionState::default();
        let res = apply(
            &mut state,
            &[],
            &ScoreRule::default(),
            SessionEvent::Start {
                player_name: "alice",
                now_ms: 0,
            },
        );
        assert_eq!(res, Err(SessionError::NoQuestions));
        assert!(!state.started);
    }
}
