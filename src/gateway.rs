//! Read/write access to the budget table with the dashboard's failure policy:
//! a failed read is logged and shows up as an empty result, a failed write is
//! handed back to the caller as a [`StoreError`] carrying the message.

use crate::models::{BudgetRecord, Kategori, NewRecord};
use crate::store::{RecordStore, StoreError};

pub(crate) struct Gateway {
    store: Box<dyn RecordStore>,
}

impl Gateway {
    pub(crate) fn new(store: Box<dyn RecordStore>) -> Self {
        tracing::info!(store = %store.describe(), "gateway ready");
        Self { store }
    }

    pub(crate) fn describe(&self) -> String {
        self.store.describe()
    }

    /// Every record, newest year first, then by category.
    pub(crate) fn fetch_all(&self) -> Vec<BudgetRecord> {
        self.store.select_all().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "error fetching data");
            Vec::new()
        })
    }

    /// Records of one category, newest year first, then by subcategory.
    pub(crate) fn fetch_by_category(&self, kategori: Kategori) -> Vec<BudgetRecord> {
        self.store
            .select_by_category(kategori.as_str())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, %kategori, "error fetching category data");
                Vec::new()
            })
    }

    /// Unique years present in the table, descending.
    pub(crate) fn list_distinct_years(&self) -> Vec<i32> {
        match self.store.select_years() {
            Ok(mut years) => {
                years.sort_unstable_by(|a, b| b.cmp(a));
                years.dedup();
                years
            }
            Err(err) => {
                tracing::warn!(error = %err, "error fetching years");
                Vec::new()
            }
        }
    }

    pub(crate) fn add(&mut self, record: &NewRecord) -> Result<BudgetRecord, StoreError> {
        match self.store.insert(record) {
            Ok(row) => {
                tracing::info!(id = row.id, tahun = row.tahun, kategori = %row.kategori, "record added");
                Ok(row)
            }
            Err(err) => {
                tracing::error!(error = %err, "error adding data");
                Err(err)
            }
        }
    }

    /// Bulk insert used by CSV import.
    pub(crate) fn add_many(&mut self, records: &[NewRecord]) -> Result<usize, StoreError> {
        match self.store.insert_many(records) {
            Ok(count) => {
                tracing::info!(count, "records imported");
                Ok(count)
            }
            Err(err) => {
                tracing::error!(error = %err, "error importing data");
                Err(err)
            }
        }
    }

    pub(crate) fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        match self.store.delete(id) {
            Ok(()) => {
                tracing::info!(id, "record deleted");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, id, "error deleting data");
                Err(err)
            }
        }
    }

    pub(crate) fn sign_in(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        self.store.sign_in(username, password)
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod gateway_tests;
