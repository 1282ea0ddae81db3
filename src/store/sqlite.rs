use super::{flatten, rank_window, SortedSetStore, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Sorted sets persisted in a local SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the table exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sorted_set_members (
                set_key TEXT NOT NULL,
                member TEXT NOT NULL,
                score REAL NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (set_key, member)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sorted_set_members_rank ON sorted_set_members(set_key, score DESC, member DESC)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl SortedSetStore for SqliteStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            r#"
            INSERT INTO sorted_set_members (set_key, member, score)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(set_key, member)
            DO UPDATE SET score = excluded.score, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, member, score],
        )?;
        Ok(())
    }

    async fn zrange_rev_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        let len: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sorted_set_members WHERE set_key = ?1",
            [key],
            |row| row.get(0),
        )?;
        let Some((from, to)) = rank_window(len as usize, start, stop) else {
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT member, score
            FROM sorted_set_members
            WHERE set_key = ?1
            ORDER BY score DESC, member DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let rows = stmt.query_map(params![key, (to - from) as i64, from as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut ranked = Vec::new();
        for row in rows {
            ranked.push(row?);
        }
        Ok(flatten(ranked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_and_rank() {
        let store = SqliteStore::in_memory().unwrap();
        store.zadd("k", 9000.0, "alice").await.unwrap();
        store.zadd("k", 9500.0, "bob").await.unwrap();
        store.zadd("k", 8000.0, "alice").await.unwrap();

        let flat = store.zrange_rev_with_scores("k", 0, 9).await.unwrap();
        assert_eq!(flat, vec!["bob", "9500", "alice", "8000"]);
    }

    #[tokio::test]
    async fn sets_are_isolated_by_key() {
        let store = SqliteStore::in_memory().unwrap();
        store.zadd("a", 1.0, "x").await.unwrap();
        store.zadd("b", 2.0, "y").await.unwrap();

        assert_eq!(
            store.zrange_rev_with_scores("a", 0, -1).await.unwrap(),
            vec!["x", "1"]
        );
    }

    #[tokio::test]
    async fn negative_window_reads_tail() {
        let store = SqliteStore::in_memory().unwrap();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            store.zadd("k", (i + 1) as f64 * 10.0, name).await.unwrap();
        }
        let flat = store.zrange_rev_with_scores("k", -2, -1).await.unwrap();
        assert_eq!(flat, vec!["b", "20", "a", "10"]);
        assert!(store.zrange_rev_with_scores("k", 5, 9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.zadd("k", 77.5, "alice").await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.zrange_rev_with_scores("k", 0, 9).await.unwrap(),
            vec!["alice", "77.5"]
        );
    }
}
