use super::{flatten, rank_window, SortedSetStore, StoreError};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process local sorted sets. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Descending by score, ties broken by member descending (Redis REV order)
pub(crate) fn rev_rank_order(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.0.cmp(&a.0))
}

#[async_trait]
impl SortedSetStore for MemoryStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError> {
        let mut sets = self.sets.lock().map_err(|_| StoreError::Poisoned)?;
        sets.entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn zrange_rev_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let sets = self.sets.lock().map_err(|_| StoreError::Poisoned)?;
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(String, f64)> =
            set.iter().map(|(m, s)| (m.clone(), *s)).collect();
        ranked.sort_by(rev_rank_order);

        Ok(match rank_window(ranked.len(), start, stop) {
            Some((from, to)) => flatten(ranked.drain(from..to)),
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ranks_descending() {
        let store = MemoryStore::new();
        store.zadd("k", 9000.0, "alice").await.unwrap();
        store.zadd("k", 9500.0, "bob").await.unwrap();
        store.zadd("k", 100.0, "carol").await.unwrap();

        let flat = store.zrange_rev_with_scores("k", 0, 9).await.unwrap();
        assert_eq!(flat, vec!["bob", "9500", "alice", "9000", "carol", "100"]);
    }

    #[tokio::test]
    async fn zadd_overwrites_member() {
        let store = MemoryStore::new();
        store.zadd("k", 9000.0, "alice").await.unwrap();
        store.zadd("k", 1234.0, "alice").await.unwrap();

        let flat = store.zrange_rev_with_scores("k", 0, -1).await.unwrap();
        assert_eq!(flat, vec!["alice", "1234"]);
    }

    #[tokio::test]
    async fn ties_order_by_member_descending() {
        let store = MemoryStore::new();
        store.zadd("k", 10.0, "amy").await.unwrap();
        store.zadd("k", 10.0, "zed").await.unwrap();

        let flat = store.zrange_rev_with_scores("k", 0, -1).await.unwrap();
        assert_eq!(flat, vec!["zed", "10", "amy", "10"]);
    }

    #[tokio::test]
    async fn window_and_missing_key() {
        let store = MemoryStore::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            store.zadd("k", i as f64, name).await.unwrap();
        }
        let flat = store.zrange_rev_with_scores("k", 1, 2).await.unwrap();
        assert_eq!(flat, vec!["c", "2", "b", "1"]);

        assert!(store
            .zrange_rev_with_scores("other", 0, 9)
            .await
            .unwrap()
            .is_empty());
    }
}
