//! Pure reductions over fetched records. Every function is total: empty
//! input gives empty or zero output.

use std::collections::{BTreeMap, HashMap};

use crate::models::{BudgetRecord, Kategori};

/// How many subcategories the category bar chart shows.
pub(crate) const TOP_SUBCATEGORIES: usize = 15;

/// Totals for the three known categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CategoryTotals {
    pub(crate) pendapatan: i64,
    pub(crate) pembelanjaan: i64,
    pub(crate) pembiayaan: i64,
}

impl CategoryTotals {
    #[cfg(test)]
    pub(crate) fn get(&self, kategori: Kategori) -> i64 {
        match kategori {
            Kategori::Pendapatan => self.pendapatan,
            Kategori::Pembelanjaan => self.pembelanjaan,
            Kategori::Pembiayaan => self.pembiayaan,
        }
    }

    fn slot(&mut self, kategori: Kategori) -> &mut i64 {
        match kategori {
            Kategori::Pendapatan => &mut self.pendapatan,
            Kategori::Pembelanjaan => &mut self.pembelanjaan,
            Kategori::Pembiayaan => &mut self.pembiayaan,
        }
    }

    /// `(category, total)` in display order.
    pub(crate) fn entries(&self) -> [(Kategori, i64); 3] {
        [
            (Kategori::Pendapatan, self.pendapatan),
            (Kategori::Pembelanjaan, self.pembelanjaan),
            (Kategori::Pembiayaan, self.pembiayaan),
        ]
    }

    /// Revenue minus expenditure.
    pub(crate) fn surplus(&self) -> i64 {
        self.pendapatan.saturating_sub(self.pembelanjaan)
    }
}

/// Client-side filter applied to an already-fetched record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RecordFilter {
    pub(crate) kategori: Option<Kategori>,
    pub(crate) tahun: Option<i32>,
}

impl RecordFilter {
    pub(crate) fn matches(&self, record: &BudgetRecord) -> bool {
        self.kategori.map_or(true, |k| record.is_category(k))
            && self.tahun.map_or(true, |t| record.tahun == t)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.kategori.is_none() && self.tahun.is_none()
    }
}

pub(crate) fn totals_by_category(records: &[BudgetRecord]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for record in records {
        if let Some(kategori) = record.category() {
            let slot = totals.slot(kategori);
            *slot = slot.saturating_add(record.jumlah);
        }
    }
    totals
}

/// Sum per subcategory, largest first, cut to `top_n`. Equal sums keep the
/// order in which their subcategory was first seen.
pub(crate) fn totals_by_subcategory(records: &[BudgetRecord], top_n: usize) -> Vec<(String, i64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(String, i64)> = Vec::new();
    for record in records {
        match index.get(record.subkategori.as_str()) {
            Some(&i) => sums[i].1 = sums[i].1.saturating_add(record.jumlah),
            None => {
                index.insert(record.subkategori.as_str(), sums.len());
                sums.push((record.subkategori.clone(), record.jumlah));
            }
        }
    }
    // sort_by is stable
    sums.sort_by(|a, b| b.1.cmp(&a.1));
    sums.truncate(top_n);
    sums
}

/// Sum per year, ascending by year.
pub(crate) fn totals_by_year(records: &[BudgetRecord]) -> Vec<(i32, i64)> {
    let mut years: BTreeMap<i32, i64> = BTreeMap::new();
    for record in records {
        let sum = years.entry(record.tahun).or_insert(0);
        *sum = sum.saturating_add(record.jumlah);
    }
    years.into_iter().collect()
}

/// Unique years, descending.
pub(crate) fn distinct_years(records: &[BudgetRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.tahun).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub(crate) fn total_amount(records: &[BudgetRecord]) -> i64 {
    records
        .iter()
        .fold(0i64, |acc, r| acc.saturating_add(r.jumlah))
}

/// Records matching `filter`, in their original order.
pub(crate) fn filter_records(records: &[BudgetRecord], filter: &RecordFilter) -> Vec<BudgetRecord> {
    if filter.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod aggregate_tests;
