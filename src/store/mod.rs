//! Sorted-set storage behind the leaderboard.
//!
//! Every backend speaks the Redis vocabulary: `ZADD` to upsert a member and
//! `ZRANGE .. REV WITHSCORES` to read a window of ranks. The range reply is
//! kept flattened (`member, score, member, score, ...`) exactly as Redis and
//! the Upstash REST API return it; pairing happens in the leaderboard service.

pub mod memory;
pub mod sqlite;
pub mod upstash;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use upstash::UpstashStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("missing store configuration: {0} is not set")]
    MissingConfig(&'static str),

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected command: {0}")]
    Rejected(String),

    #[error("unexpected store reply: {0}")]
    UnexpectedReply(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait SortedSetStore: Send + Sync {
    /// Set `member`'s score in the set at `key`, replacing any previous score.
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError>;

    /// Members ranked `start..=stop` by descending score, flattened with their
    /// scores. Negative indices count from the lowest rank like Redis does.
    async fn zrange_rev_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError>;
}

/// Resolve Redis style inclusive rank indices against a set of `len` members.
/// Returns the half-open window to read, or `None` when it is empty.
pub fn rank_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize + 1))
}

/// Format a score the way Redis prints doubles in replies
pub fn format_score(score: f64) -> String {
    score.to_string()
}

/// Flatten `(member, score)` pairs into a range reply
pub(crate) fn flatten<I>(pairs: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, f64)>,
{
    pairs
        .into_iter()
        .flat_map(|(member, score)| [member, format_score(score)])
        .collect()
}
