//! Backends for the budget table.
//!
//! A [`RecordStore`] performs exactly one round trip per call and reports
//! every failure. The failure policy the views rely on (reads degrade to
//! empty, writes carry a message) lives in [`crate::gateway`].

mod rest;
mod sqlite;

pub(crate) use rest::RestStore;
pub(crate) use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::{BudgetRecord, NewRecord};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store rejected request ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("no record with id {0}")]
    NotFound(i64),
    #[error("could not decode store response: {0}")]
    Decode(String),
    #[error("{0} is not supported by this store")]
    Unsupported(&'static str),
}

pub(crate) type StoreResult<T> = std::result::Result<T, StoreError>;

pub(crate) trait RecordStore: Send {
    /// All rows, ordered by `tahun` descending then `kategori` ascending.
    fn select_all(&self) -> StoreResult<Vec<BudgetRecord>>;

    /// Rows whose `kategori` equals `kategori`, ordered by `tahun` descending
    /// then `subkategori` ascending.
    fn select_by_category(&self, kategori: &str) -> StoreResult<Vec<BudgetRecord>>;

    /// The `tahun` column of every row, descending. May contain duplicates.
    fn select_years(&self) -> StoreResult<Vec<i32>>;

    fn insert(&mut self, record: &NewRecord) -> StoreResult<BudgetRecord>;

    /// Insert several rows, stopping at the first failure. Stores with
    /// transactions override this to write all rows or none.
    fn insert_many(&mut self, records: &[NewRecord]) -> StoreResult<usize> {
        for record in records {
            self.insert(record)?;
        }
        Ok(records.len())
    }

    /// Delete one row. Fails with [`StoreError::NotFound`] when nothing matched.
    fn delete(&mut self, id: i64) -> StoreResult<()>;

    /// Check credentials against the store's own auth facility.
    fn sign_in(&self, _username: &str, _password: &str) -> StoreResult<bool> {
        Err(StoreError::Unsupported("sign-in"))
    }

    fn describe(&self) -> String;
}
