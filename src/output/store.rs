//! Relational persistence for emitted aggregates.
//!
//! Records each aggregate as one row in a SQLite `prefixes` table, stamped
//! with the origin AS it was summarized for and the run timestamp.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::AggregateResult;
use crate::models::Prefix;

/// SQLite-backed store with one row per emitted aggregate.
pub struct PrefixStore {
    conn: Connection,
}

impl PrefixStore {
    /// Open (or create) the store at `db_path` and make sure the schema
    /// exists.
    pub fn open(db_path: impl AsRef<Path>) -> AggregateResult<PrefixStore> {
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS prefixes (
                prefix_id INTEGER PRIMARY KEY AUTOINCREMENT,
                prefix TEXT NOT NULL,
                origin_as TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_origin_as ON prefixes(origin_as)",
            [],
        )?;
        log::debug!("prefix store schema ready");
        Ok(PrefixStore { conn })
    }

    /// Delete every stored row. Each summarization run starts from an empty
    /// table.
    pub fn clear(&self) -> AggregateResult<()> {
        let deleted = self.conn.execute("DELETE FROM prefixes", [])?;
        log::debug!("cleared {} stored prefixes", deleted);
        Ok(())
    }

    /// Insert one aggregate row.
    pub fn insert(&self, prefix: &Prefix, origin_as: &str) -> AggregateResult<()> {
        self.conn.execute(
            "INSERT INTO prefixes (prefix, origin_as, created_at) VALUES (?1, ?2, ?3)",
            params![prefix.to_string(), origin_as, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Insert a batch of aggregates in one transaction. Returns the number of
    /// rows inserted.
    pub fn insert_all<I>(&mut self, aggregates: I, origin_as: &str) -> AggregateResult<usize>
    where
        I: IntoIterator<Item = Prefix>,
    {
        let created_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        for aggregate in aggregates {
            tx.execute(
                "INSERT INTO prefixes (prefix, origin_as, created_at) VALUES (?1, ?2, ?3)",
                params![aggregate.to_string(), origin_as, created_at],
            )?;
            inserted += 1;
        }
        tx.commit()?;

        log::info!("stored {} aggregates for AS{}", inserted, origin_as);
        Ok(inserted)
    }

    /// Stored prefix strings in insertion order.
    pub fn prefixes(&self) -> AggregateResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT prefix FROM prefixes ORDER BY prefix_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut prefixes = Vec::new();
        for row in rows {
            prefixes.push(row?);
        }
        Ok(prefixes)
    }
}
