use super::{format_score, SortedSetStore, StoreError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const URL_ENV: &str = "UPSTASH_REDIS_REST_URL";
pub const TOKEN_ENV: &str = "UPSTASH_REDIS_REST_TOKEN";

/// Redis over the Upstash REST API.
///
/// Commands are POSTed to the endpoint as a JSON array of strings and answered
/// with `{"result": ..}` or `{"error": ".."}`. A missing URL or token is only
/// reported when a command is attempted.
#[derive(Debug, Clone)]
pub struct UpstashStore {
    http: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UpstashReply {
    result: Option<Value>,
    error: Option<String>,
}

impl UpstashStore {
    pub fn new(url: Option<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.filter(|u| !u.is_empty()),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }

    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let url = self.url.as_deref().ok_or(StoreError::MissingConfig(URL_ENV))?;
        let token = self
            .token
            .as_deref()
            .ok_or(StoreError::MissingConfig(TOKEN_ENV))?;

        tracing::debug!(command = args.first().copied().unwrap_or_default(), "upstash request");

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(args)
            .send()
            .await?;
        let status = response.status();
        let reply: UpstashReply = response.json().await.map_err(|e| {
            if status.is_success() {
                StoreError::Transport(e)
            } else {
                StoreError::Rejected(format!("HTTP {status}"))
            }
        })?;

        if let Some(error) = reply.error {
            return Err(StoreError::Rejected(error));
        }
        reply
            .result
            .ok_or_else(|| StoreError::UnexpectedReply("reply has neither result nor error".into()))
    }
}

#[async_trait]
impl SortedSetStore for UpstashStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError> {
        let score = format_score(score);
        self.command(&["ZADD", key, &score, member]).await?;
        Ok(())
    }

    async fn zrange_rev_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let (start, stop) = (start.to_string(), stop.to_string());
        let result = self
            .command(&["ZRANGE", key, &start, &stop, "REV", "WITHSCORES"])
            .await?;

        let Value::Array(items) = result else {
            return Err(StoreError::UnexpectedReply(format!(
                "expected an array, got {result}"
            )));
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(StoreError::UnexpectedReply(format!(
                    "expected a string item, got {other}"
                ))),
            })
            .collect()
    }
}
