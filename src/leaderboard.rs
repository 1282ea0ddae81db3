use crate::store::{SortedSetStore, StoreError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_SET_KEY: &str = "typing-score-rank";
pub const DEFAULT_TOP_N: usize = 10;

/// One row of the ranking, as it travels over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "userName")]
    pub player_name: String,
    pub score: f64,
}

impl ScoreEntry {
    pub fn new(player_name: impl Into<String>, score: f64) -> Self {
        Self {
            player_name: player_name.into(),
            score,
        }
    }
}

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("malformed range reply: {0}")]
    MalformedReply(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pair up a flattened `member, score, member, score, ...` range reply.
///
/// An odd length means the reply was cut or shifted; pairing it anyway would
/// attach every score to the wrong name, so it is rejected.
pub fn pair_members_with_scores(flat: Vec<String>) -> Result<Vec<ScoreEntry>, LeaderboardError> {
    if flat.len() % 2 != 0 {
        return Err(LeaderboardError::MalformedReply(format!(
            "expected member/score pairs, got {} items",
            flat.len()
        )));
    }

    flat.into_iter()
        .tuples::<(String, String)>()
        .map(|(member, score)| {
            let score = score.parse::<f64>().map_err(|_| {
                LeaderboardError::MalformedReply(format!(
                    "score {score:?} of member {member:?} is not a number"
                ))
            })?;
            Ok(ScoreEntry::new(member, score))
        })
        .collect()
}

/// Export a ranking as `rank,userName,score` rows
pub fn write_csv<W: std::io::Write>(entries: &[ScoreEntry], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["rank", "userName", "score"])?;
    for (idx, entry) in entries.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            entry.player_name.clone(),
            entry.score.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Scores are falsy when zero or NaN, names when empty
fn is_valid_submission(player_name: &str, score: f64) -> bool {
    !player_name.is_empty() && score != 0.0 && !score.is_nan()
}

/// Ranked score storage on top of a single sorted set
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn SortedSetStore>,
    key: String,
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard").field("key", &self.key).finish()
    }
}

impl Leaderboard {
    pub fn new(store: Arc<dyn SortedSetStore>) -> Self {
        Self::with_key(store, DEFAULT_SET_KEY)
    }

    pub fn with_key(store: Arc<dyn SortedSetStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record `score` for `player_name`, replacing whatever they had before
    pub async fn submit(&self, player_name: &str, score: f64) -> Result<(), LeaderboardError> {
        if !is_valid_submission(player_name, score) {
            return Err(LeaderboardError::InvalidInput);
        }
        self.store.zadd(&self.key, score, player_name).await?;
        tracing::info!(player = player_name, score, "score submitted");
        Ok(())
    }

    /// The `n` best entries, highest score first
    pub async fn top_n(&self, n: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let stop = i64::try_from(n - 1).unwrap_or(i64::MAX);
        let flat = self.store.zrange_rev_with_scores(&self.key, 0, stop).await?;
        pair_members_with_scores(flat)
    }
}
