use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A single word or phrase the player has to type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(rename = "imageRef", alias = "image")]
    pub image_ref: String,
}

impl Question {
    pub fn new(text: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_ref: image_ref.into(),
        }
    }

    /// Length in chars, which is what the cursor counts
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.text.chars().nth(idx)
    }
}

#[derive(Error, Debug)]
pub enum QuestionError {
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question list is empty")]
    Empty,

    #[error("question {0} has no text")]
    BlankQuestion(usize),
}

/// The stock question list, one monster per word
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new("React", "./monster1.jpg"),
        Question::new("Next.js", "./monster2.jpg"),
        Question::new("Tailwind CSS", "./monster3.jpg"),
        Question::new("TypeScript", "./monster4.jpg"),
        Question::new("JavaScript", "./monster5.jpg"),
    ]
}

/// Load a question list from a JSON array of `{ "text", "imageRef" }` objects
pub fn load_questions<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, QuestionError> {
    let bytes = fs::read(path)?;
    let questions: Vec<Question> = serde_json::from_slice(&bytes)?;
    validate(&questions)?;
    Ok(questions)
}

pub fn validate(questions: &[Question]) -> Result<(), QuestionError> {
    if questions.is_empty() {
        return Err(QuestionError::Empty);
    }
    if let Some(idx) = questions.iter().position(Question::is_empty) {
        return Err(QuestionError::BlankQuestion(idx));
    }
    Ok(())
}

pub fn shuffled(mut questions: Vec<Question>) -> Vec<Question> {
    questions.shuffle(&mut rand::thread_rng());
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn default_list_has_five_questions() {
        let questions = default_questions();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].text, "React");
        assert_eq!(questions[4].image_ref, "./monster5.jpg");
        assert!(validate(&questions).is_ok());
    }

    #[test]
    fn char_helpers_count_chars_not_bytes() {
        let q = Question::new("café", "");
        assert_eq!(q.len(), 4);
        assert_eq!(q.char_at(3), Some('é'));
        assert_eq!(q.char_at(4), None);
    }

    #[test]
    fn load_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(
            &path,
            r#"[{"text":"Rust","imageRef":"crab.png"},{"text":"Cargo","image":"box.png"}]"#,
        )
        .unwrap();

        let questions = load_questions(&path).unwrap();
        assert_eq!(
            questions,
            vec![Question::new("Rust", "crab.png"), Question::new("Cargo", "box.png")]
        );
    }

    #[test]
    fn rejects_empty_and_blank_lists() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        assert_matches!(load_questions(&empty), Err(QuestionError::Empty));

        let blank = dir.path().join("blank.json");
        fs::write(&blank, r#"[{"text":"ok","imageRef":""},{"text":"","imageRef":""}]"#).unwrap();
        assert_matches!(load_questions(&blank), Err(QuestionError::BlankQuestion(1)));
    }

    #[test]
    fn shuffle_keeps_every_question() {
        let mut got = shuffled(default_questions());
        got.sort_by(|a, b| a.text.cmp(&b.text));
        let mut expected = default_questions();
        expected.sort_by(|a, b| a.text.cmp(&b.text));
        assert_eq!(got, expected);
    }
}
