mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::path::Path;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{BudgetRecord, NewRecord};

const SELECT_COLUMNS: &str = "SELECT id, tahun, kategori, subkategori, jumlah, created_at FROM apbd_data";

/// Local budget table kept in a SQLite file.
pub(crate) struct SqliteStore {
    conn: Connection,
    label: String,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut store = Self {
            conn,
            label: format!("sqlite:{}", path.display()),
        };
        store.migrate().context("Database migration failed")?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self {
            conn,
            label: "sqlite::memory".into(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::debug!(version = schema::CURRENT_VERSION, "created apbd_data schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }

        Ok(())
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> StoreResult<Vec<BudgetRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Insert many records in one transaction. Returns how many were written.
    pub(crate) fn insert_batch(&mut self, records: &[NewRecord]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        let now = chrono::Utc::now().to_rfc3339();
        for record in records {
            tx.execute(
                "INSERT INTO apbd_data (tahun, kategori, subkategori, jumlah, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.tahun,
                    record.kategori.as_str(),
                    record.subkategori,
                    record.jumlah,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        Ok(records.len())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<BudgetRecord> {
    Ok(BudgetRecord {
        id: row.get(0)?,
        tahun: row.get(1)?,
        kategori: row.get(2)?,
        subkategori: row.get(3)?,
        jumlah: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl RecordStore for SqliteStore {
    fn insert_many(&mut self, records: &[NewRecord]) -> StoreResult<usize> {
        self.insert_batch(records)
    }

    fn select_all(&self) -> StoreResult<Vec<BudgetRecord>> {
        self.query(
            &format!("{SELECT_COLUMNS} ORDER BY tahun DESC, kategori ASC, id ASC"),
            [],
        )
    }

    fn select_by_category(&self, kategori: &str) -> StoreResult<Vec<BudgetRecord>> {
        self.query(
            &format!(
                "{SELECT_COLUMNS} WHERE kategori = ?1 ORDER BY tahun DESC, subkategori ASC, id ASC"
            ),
            params![kategori],
        )
    }

    fn select_years(&self) -> StoreResult<Vec<i32>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tahun FROM apbd_data ORDER BY tahun DESC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn insert(&mut self, record: &NewRecord) -> StoreResult<BudgetRecord> {
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO apbd_data (tahun, kategori, subkategori, jumlah, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.tahun,
                record.kategori.as_str(),
                record.subkategori,
                record.jumlah,
                created_at,
            ],
        )?;
        Ok(BudgetRecord {
            id: self.conn.last_insert_rowid(),
            tahun: record.tahun,
            kategori: record.kategori.as_str().to_string(),
            subkategori: record.subkategori.clone(),
            jumlah: record.jumlah,
            created_at: Some(created_at),
        })
    }

    fn delete(&mut self, id: i64) -> StoreResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM apbd_data WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
