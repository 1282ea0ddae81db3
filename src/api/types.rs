use crate::leaderboard::ScoreEntry;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/result`. Fields are optional so that a missing field is
/// reported as invalid input rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
}

impl From<&ScoreEntry> for SubmitRequest {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            score: Some(entry.score),
            user_name: Some(entry.player_name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    pub limit: Option<usize>,
}
