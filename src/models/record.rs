use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::Kategori;

/// One row of the budget table. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: i64,
    pub tahun: i32,
    pub kategori: String,
    pub subkategori: String,
    pub jumlah: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl BudgetRecord {
    /// The known category this row belongs to, if any. The store does not
    /// constrain `kategori`, so rows written elsewhere may carry other labels;
    /// only the exact stored spelling counts.
    pub fn category(&self) -> Option<Kategori> {
        Kategori::all()
            .iter()
            .copied()
            .find(|k| self.is_category(*k))
    }

    pub fn is_category(&self, kategori: Kategori) -> bool {
        self.kategori == kategori.as_str()
    }
}

/// A record as submitted for insertion. Has no id: the store assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    pub tahun: i32,
    #[serde(serialize_with = "serialize_kategori")]
    pub kategori: Kategori,
    pub subkategori: String,
    pub jumlah: i64,
}

pub const MIN_TAHUN: i32 = 1900;
pub const MAX_TAHUN: i32 = 9999;

impl NewRecord {
    pub fn new(tahun: i32, kategori: Kategori, subkategori: impl Into<String>, jumlah: i64) -> Self {
        Self {
            tahun,
            kategori,
            subkategori: subkategori.into(),
            jumlah,
        }
    }

    /// Build a record from raw form or command-line fields.
    pub fn parse(tahun: &str, kategori: &str, subkategori: &str, jumlah: &str) -> Result<Self> {
        let tahun: i32 = tahun
            .trim()
            .parse()
            .with_context(|| format!("Tahun must be a whole year, got '{}'", tahun.trim()))?;
        let kategori: Kategori = kategori.parse()?;
        let jumlah = parse_jumlah(jumlah)?;
        let record = Self::new(tahun, kategori, subkategori.trim(), jumlah);
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_TAHUN..=MAX_TAHUN).contains(&self.tahun) {
            bail!("Tahun {} is out of range ({MIN_TAHUN}-{MAX_TAHUN})", self.tahun);
        }
        if self.subkategori.trim().is_empty() {
            bail!("Subkategori must not be empty");
        }
        Ok(())
    }
}

/// Parse an amount, accepting `.` thousand separators and an optional `Rp` prefix.
/// Fractions are rejected: amounts are whole rupiah.
pub fn parse_jumlah(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let rest = rest
        .strip_prefix("Rp")
        .or_else(|| rest.strip_prefix("rp"))
        .unwrap_or(rest)
        .trim_start();
    let groups: Vec<&str> = rest.split('.').collect();
    let well_grouped = groups.iter().enumerate().all(|(i, g)| {
        !g.is_empty() && g.chars().all(|c| c.is_ascii_digit()) && (i == 0 || g.len() == 3)
    });
    if !well_grouped {
        bail!("Jumlah must be a whole number of rupiah, got '{trimmed}'");
    }
    let digits: String = groups.concat();
    let value: i64 = digits
        .parse()
        .with_context(|| format!("Jumlah '{trimmed}' is too large"))?;
    Ok(if negative { -value } else { value })
}

fn serialize_kategori<S: serde::Serializer>(kategori: &Kategori, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kategori.as_str())
}
