use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{BudgetRecord, NewRecord};

/// One row of an import file. Amount and year stay text so they go through
/// the same parsing as the add form.
#[derive(Debug, Deserialize)]
struct CsvRow {
    tahun: String,
    kategori: String,
    subkategori: String,
    jumlah: String,
}

/// Export layout. Every row carries every column, `created_at` blank when unknown.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: i64,
    tahun: i32,
    kategori: &'a str,
    subkategori: &'a str,
    jumlah: i64,
    created_at: &'a str,
}

impl<'a> From<&'a BudgetRecord> for ExportRow<'a> {
    fn from(r: &'a BudgetRecord) -> Self {
        Self {
            id: r.id,
            tahun: r.tahun,
            kategori: &r.kategori,
            subkategori: &r.subkategori,
            jumlah: r.jumlah,
            created_at: r.created_at.as_deref().unwrap_or(""),
        }
    }
}

/// Read `tahun,kategori,subkategori,jumlah` rows (header required, extra
/// columns ignored). The whole file is rejected if any row is invalid.
pub(crate) fn read_records(path: &Path) -> Result<Vec<NewRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("Failed to open CSV file")?;

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = result.with_context(|| format!("Line {line}: unreadable row"))?;
        let record = NewRecord::parse(&row.tahun, &row.kategori, &row.subkategori, &row.jumlah)
            .with_context(|| format!("Line {line}"))?;
        records.push(record);
    }

    if records.is_empty() {
        anyhow::bail!("CSV file has no data rows");
    }
    Ok(records)
}

/// Write every field of `records`, header included. Returns the row count.
pub(crate) fn write_records(path: &Path, records: &[BudgetRecord]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        wtr.serialize(ExportRow::from(record)).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV file")?;
    Ok(records.len())
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
