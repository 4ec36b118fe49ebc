//! Per-tab state. Each view caches its own fetch and derives everything it
//! renders from that cache, so switching tabs never touches another view.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::aggregate::{
    distinct_years, filter_records, total_amount, totals_by_category, totals_by_subcategory,
    totals_by_year, CategoryTotals, RecordFilter, TOP_SUBCATEGORIES,
};
use crate::gateway::Gateway;
use crate::models::{BudgetRecord, Kategori, NewRecord};

use super::util::{clamp_cursor, format_rupiah};

/// How long an admin banner stays up.
pub(crate) const BANNER_TTL: Duration = Duration::from_secs(3);

pub(crate) const LOGIN_REJECTED: &str = "Username atau password salah!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewStatus {
    Loading,
    Loaded,
    Empty,
    Error(String),
}

impl ViewStatus {
    fn from_rows(len: usize) -> Self {
        if len == 0 {
            Self::Empty
        } else {
            Self::Loaded
        }
    }
}

/// Owns at most one chart dataset.
#[derive(Debug)]
pub(crate) struct ChartSlot<T> {
    chart: Option<T>,
    #[cfg(test)]
    replacements: u64,
}

impl<T> Default for ChartSlot<T> {
    fn default() -> Self {
        Self {
            chart: None,
            #[cfg(test)]
            replacements: 0,
        }
    }
}

impl<T> ChartSlot<T> {
    /// Release the held chart, then take ownership of `chart`.
    pub(crate) fn replace(&mut self, chart: T) {
        drop(self.chart.take());
        self.chart = Some(chart);
        #[cfg(test)]
        {
            self.replacements += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn clear(&mut self) {
        self.chart = None;
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.chart.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn replacements(&self) -> u64 {
        self.replacements
    }
}

/// Year selector step over `All` followed by `years`, wrapping at both ends.
pub(crate) fn step_year(years: &[i32], current: Option<i32>, forward: bool) -> Option<i32> {
    let mut options: Vec<Option<i32>> = vec![None];
    options.extend(years.iter().copied().map(Some));
    let pos = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % options.len()
    } else {
        (pos + options.len() - 1) % options.len()
    };
    options[next]
}

pub(crate) fn year_label(year: Option<i32>) -> String {
    year.map_or_else(|| "Semua".to_string(), |y| y.to_string())
}

// ── Home ──────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct HomeView {
    pub(crate) status: ViewStatus,
    pub(crate) totals: CategoryTotals,
    pub(crate) record_count: usize,
    pub(crate) years: Vec<i32>,
    /// `None` shows the total over every year.
    pub(crate) selected_year: Option<i32>,
    pub(crate) chart: ChartSlot<Vec<(Kategori, i64)>>,
}

impl HomeView {
    pub(crate) fn new() -> Self {
        Self {
            status: ViewStatus::Loading,
            totals: CategoryTotals::default(),
            record_count: 0,
            years: Vec::new(),
            selected_year: None,
            chart: ChartSlot::default(),
        }
    }

    pub(crate) fn load(&mut self, gateway: &Gateway) {
        let records = gateway.fetch_all();
        self.years = gateway.list_distinct_years();
        if self.selected_year.is_some_and(|y| !self.years.contains(&y)) {
            self.selected_year = None;
        }
        let filter = RecordFilter {
            kategori: None,
            tahun: self.selected_year,
        };
        let visible = filter_records(&records, &filter);
        self.totals = totals_by_category(&visible);
        self.record_count = visible.len();
        self.chart.replace(self.totals.entries().to_vec());
        self.status = ViewStatus::from_rows(visible.len());
    }

    /// Move the year selector. The caller reloads afterwards.
    pub(crate) fn step_year(&mut self, forward: bool) {
        self.selected_year = step_year(&self.years, self.selected_year, forward);
    }
}

// ── Category ──────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct CategoryView {
    pub(crate) kategori: Kategori,
    pub(crate) status: ViewStatus,
    records: Vec<BudgetRecord>,
    pub(crate) years: Vec<i32>,
    pub(crate) year_filter: Option<i32>,
    pub(crate) visible: Vec<BudgetRecord>,
    pub(crate) total: i64,
    pub(crate) subcategories: ChartSlot<Vec<(String, i64)>>,
    pub(crate) trend: ChartSlot<Vec<(i32, i64)>>,
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

impl CategoryView {
    pub(crate) fn new(kategori: Kategori) -> Self {
        Self {
            kategori,
            status: ViewStatus::Loading,
            records: Vec::new(),
            years: Vec::new(),
            year_filter: None,
            visible: Vec::new(),
            total: 0,
            subcategories: ChartSlot::default(),
            trend: ChartSlot::default(),
            index: 0,
            scroll: 0,
        }
    }

    pub(crate) fn load(&mut self, gateway: &Gateway) {
        self.records = gateway.fetch_by_category(self.kategori);
        self.years = distinct_years(&self.records);
        if self.year_filter.is_some_and(|y| !self.years.contains(&y)) {
            self.year_filter = None;
        }
        self.derive();
    }

    /// Narrow to one year using the cached fetch.
    pub(crate) fn set_year(&mut self, year: Option<i32>) {
        self.year_filter = year;
        self.derive();
    }

    pub(crate) fn step_year(&mut self, forward: bool) {
        self.set_year(step_year(&self.years, self.year_filter, forward));
    }

    fn derive(&mut self) {
        let filter = RecordFilter {
            kategori: None,
            tahun: self.year_filter,
        };
        self.visible = filter_records(&self.records, &filter);
        self.total = total_amount(&self.visible);
        self.subcategories
            .replace(totals_by_subcategory(&self.visible, TOP_SUBCATEGORIES));
        self.trend.replace(totals_by_year(&self.visible));
        self.status = ViewStatus::from_rows(self.visible.len());
        clamp_cursor(&mut self.index, &mut self.scroll, self.visible.len());
    }
}

// ── Admin ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) focus: LoginField,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            focus: LoginField::Username,
        }
    }

    pub(crate) fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub(crate) fn pop_char(&mut self) {
        self.field_mut().pop();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Tahun,
    Kategori,
    Subkategori,
    Jumlah,
}

impl FormField {
    pub(crate) fn all() -> &'static [FormField] {
        &[Self::Tahun, Self::Kategori, Self::Subkategori, Self::Jumlah]
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Tahun => "Tahun",
            Self::Kategori => "Kategori",
            Self::Subkategori => "Subkategori",
            Self::Jumlah => "Jumlah",
        }
    }

    fn next(&self) -> Self {
        match self {
            Self::Tahun => Self::Kategori,
            Self::Kategori => Self::Subkategori,
            Self::Subkategori => Self::Jumlah,
            Self::Jumlah => Self::Tahun,
        }
    }

    fn prev(&self) -> Self {
        match self {
            Self::Tahun => Self::Jumlah,
            Self::Kategori => Self::Tahun,
            Self::Subkategori => Self::Kategori,
            Self::Jumlah => Self::Subkategori,
        }
    }
}

/// Add-record form. Kategori is never typed, only cycled.
#[derive(Debug, Clone)]
pub(crate) struct AddForm {
    pub(crate) open: bool,
    pub(crate) tahun: String,
    pub(crate) kategori: Kategori,
    pub(crate) subkategori: String,
    pub(crate) jumlah: String,
    pub(crate) focus: FormField,
}

impl AddForm {
    fn new() -> Self {
        Self {
            open: false,
            tahun: chrono::Local::now().format("%Y").to_string(),
            kategori: Kategori::Pendapatan,
            subkategori: String::new(),
            jumlah: String::new(),
            focus: FormField::Tahun,
        }
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Tahun => &self.tahun,
            FormField::Kategori => self.kategori.as_str(),
            FormField::Subkategori => &self.subkategori,
            FormField::Jumlah => &self.jumlah,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub(crate) fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub(crate) fn cycle_kategori(&mut self, forward: bool) {
        self.kategori = if forward {
            self.kategori.next()
        } else {
            self.kategori.prev()
        };
    }

    pub(crate) fn push_char(&mut self, c: char) {
        match self.focus {
            FormField::Tahun => {
                if c.is_ascii_digit() {
                    self.tahun.push(c);
                }
            }
            FormField::Kategori => {
                if c == ' ' {
                    self.cycle_kategori(true);
                }
            }
            FormField::Subkategori => self.subkategori.push(c),
            FormField::Jumlah => {
                if c.is_ascii_digit() || matches!(c, '.' | '-') {
                    self.jumlah.push(c);
                }
            }
        }
    }

    pub(crate) fn pop_char(&mut self) {
        match self.focus {
            FormField::Tahun => {
                self.tahun.pop();
            }
            FormField::Kategori => {}
            FormField::Subkategori => {
                self.subkategori.pop();
            }
            FormField::Jumlah => {
                self.jumlah.pop();
            }
        }
    }

    pub(crate) fn to_record(&self) -> Result<NewRecord> {
        NewRecord::parse(
            &self.tahun,
            self.kategori.as_str(),
            &self.subkategori,
            &self.jumlah,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BannerLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Banner {
    pub(crate) message: String,
    pub(crate) level: BannerLevel,
    shown_at: Instant,
}

impl Banner {
    pub(crate) fn new(message: impl Into<String>, level: BannerLevel, now: Instant) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: now,
        }
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= BANNER_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingDelete {
    pub(crate) id: i64,
    pub(crate) label: String,
}

#[derive(Debug)]
pub(crate) struct AdminView {
    pub(crate) status: ViewStatus,
    records: Vec<BudgetRecord>,
    pub(crate) years: Vec<i32>,
    pub(crate) filter: RecordFilter,
    pub(crate) visible: Vec<BudgetRecord>,
    pub(crate) index: usize,
    pub(crate) scroll: usize,
    pub(crate) login: LoginForm,
    pub(crate) form: AddForm,
    pub(crate) banner: Option<Banner>,
    pub(crate) pending_delete: Option<PendingDelete>,
}

impl AdminView {
    pub(crate) fn new() -> Self {
        Self {
            status: ViewStatus::Loading,
            records: Vec::new(),
            years: Vec::new(),
            filter: RecordFilter::default(),
            visible: Vec::new(),
            index: 0,
            scroll: 0,
            login: LoginForm::new(),
            form: AddForm::new(),
            banner: None,
            pending_delete: None,
        }
    }

    pub(crate) fn load(&mut self, gateway: &Gateway) {
        self.records = gateway.fetch_all();
        self.years = gateway.list_distinct_years();
        self.derive();
    }

    /// Drop everything tied to the logged-in session.
    pub(crate) fn reset(&mut self) {
        *self = Self {
            banner: self.banner.take(),
            ..Self::new()
        };
    }

    pub(crate) fn reject_login(&mut self) {
        self.login.password.clear();
        self.login.focus = LoginField::Password;
        self.status = ViewStatus::Error(LOGIN_REJECTED.to_string());
    }

    pub(crate) fn login_error(&self) -> Option<&str> {
        match &self.status {
            ViewStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub(crate) fn set_category_filter(&mut self, kategori: Option<Kategori>) {
        self.filter.kategori = kategori;
        self.derive();
    }

    /// All → Pendapatan → Pembelanjaan → Pembiayaan → All.
    pub(crate) fn cycle_category_filter(&mut self) {
        let next = match self.filter.kategori {
            None => Some(Kategori::Pendapatan),
            Some(Kategori::Pembiayaan) => None,
            Some(k) => Some(k.next()),
        };
        self.set_category_filter(next);
    }

    pub(crate) fn set_year_filter(&mut self, year: Option<i32>) {
        self.filter.tahun = year;
        self.derive();
    }

    pub(crate) fn step_year(&mut self, forward: bool) {
        self.set_year_filter(step_year(&self.years, self.filter.tahun, forward));
    }

    fn derive(&mut self) {
        self.visible = filter_records(&self.records, &self.filter);
        self.status = ViewStatus::from_rows(self.visible.len());
        clamp_cursor(&mut self.index, &mut self.scroll, self.visible.len());
    }

    pub(crate) fn selected(&self) -> Option<&BudgetRecord> {
        self.visible.get(self.index)
    }

    pub(crate) fn open_form(&mut self) {
        self.form = AddForm {
            open: true,
            ..AddForm::new()
        };
    }

    pub(crate) fn close_form(&mut self) {
        self.form.open = false;
    }

    /// Validate the form and post it. The form stays open on failure.
    pub(crate) fn submit_form(&mut self, gateway: &mut Gateway, now: Instant) -> bool {
        match self.form.to_record() {
            Ok(record) => {
                let added = self.add_record(gateway, &record, now);
                if added {
                    self.form = AddForm::new();
                }
                added
            }
            Err(e) => {
                self.banner = Some(Banner::new(e.to_string(), BannerLevel::Error, now));
                false
            }
        }
    }

    pub(crate) fn add_record(&mut self, gateway: &mut Gateway, record: &NewRecord, now: Instant) -> bool {
        match gateway.add(record) {
            Ok(_) => {
                self.banner = Some(Banner::new(
                    "Data berhasil ditambahkan!",
                    BannerLevel::Success,
                    now,
                ));
                self.load(gateway);
                true
            }
            Err(e) => {
                self.banner = Some(Banner::new(
                    format!("Gagal menambah data: {e}"),
                    BannerLevel::Error,
                    now,
                ));
                false
            }
        }
    }

    /// Hold the selected row until the user confirms or cancels.
    pub(crate) fn request_delete(&mut self) -> Option<&PendingDelete> {
        let record = self.selected()?;
        let pending = PendingDelete {
            id: record.id,
            label: format!(
                "{} {} {}",
                record.tahun,
                record.subkategori,
                format_rupiah(record.jumlah)
            ),
        };
        self.pending_delete = Some(pending);
        self.pending_delete.as_ref()
    }

    pub(crate) fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub(crate) fn confirm_delete(&mut self, gateway: &mut Gateway, now: Instant) -> bool {
        let Some(pending) = self.pending_delete.take() else {
            return false;
        };
        self.delete_record(gateway, pending.id, now)
    }

    pub(crate) fn delete_record(&mut self, gateway: &mut Gateway, id: i64, now: Instant) -> bool {
        match gateway.delete(id) {
            Ok(()) => {
                self.banner = Some(Banner::new(
                    "Data berhasil dihapus.",
                    BannerLevel::Success,
                    now,
                ));
                self.load(gateway);
                true
            }
            Err(e) => {
                self.banner = Some(Banner::new(
                    format!("Gagal menghapus data: {e}"),
                    BannerLevel::Error,
                    now,
                ));
                false
            }
        }
    }

    /// Clear the banner once its TTL has passed. True if one was cleared.
    pub(crate) fn expire_banner(&mut self, now: Instant) -> bool {
        if self.banner.as_ref().is_some_and(|b| b.is_expired(now)) {
            self.banner = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "views_tests.rs"]
mod views_tests;
