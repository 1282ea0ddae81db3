use crate::api::types::{ErrorResponse, MessageResponse, ResultsResponse, SubmitRequest};
use crate::leaderboard::ScoreEntry;
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("could not reach leaderboard: {0}")]
    Http(#[from] reqwest::Error),

    #[error("leaderboard answered {status}: {message}")]
    Api { status: u16, message: String },
}

/// Both halves of the round trip run when a game completes
#[derive(Debug)]
pub struct SubmitOutcome {
    pub submitted: Result<(), ClientError>,
    pub ranking: Result<Vec<ScoreEntry>, ClientError>,
}

/// Talks to the leaderboard on behalf of the game
pub trait LeaderboardClient: Send + Sync + 'static {
    fn ping(&self) -> Result<(), ClientError>;
    fn submit(&self, entry: &ScoreEntry) -> Result<(), ClientError>;
    fn top(&self) -> Result<Vec<ScoreEntry>, ClientError>;

    /// Submit, then fetch the ranking whether or not the submit went through
    fn submit_and_rank(&self, entry: &ScoreEntry) -> SubmitOutcome {
        let submitted = self.submit(entry);
        SubmitOutcome {
            submitted,
            ranking: self.top(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpLeaderboardClient {
    base_url: String,
    http: Client,
}

impl HttpLeaderboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

/// Turn a non-2xx reply into `ClientError::Api`, using the JSON error envelope when present
fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl LeaderboardClient for HttpLeaderboardClient {
    fn ping(&self) -> Result<(), ClientError> {
        let response = check(self.http.get(self.url("ping")).send()?)?;
        let _: MessageResponse = response.json()?;
        Ok(())
    }

    fn submit(&self, entry: &ScoreEntry) -> Result<(), ClientError> {
        let body = SubmitRequest::from(entry);
        let response = check(self.http.post(self.url("result")).json(&body).send()?)?;
        let _: MessageResponse = response.json()?;
        tracing::info!(player = %entry.player_name, score = entry.score, "result submitted");
        Ok(())
    }

    fn top(&self) -> Result<Vec<ScoreEntry>, ClientError> {
        let response = check(self.http.get(self.url("result")).send()?)?;
        let results: ResultsResponse = response.json()?;
        Ok(results.results)
    }
}
