#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::store::{RecordStore, SqliteStore, StoreResult};

/// Sqlite-backed store that counts every round trip.
struct CountingStore {
    inner: SqliteStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordStore for CountingStore {
    fn select_all(&self) -> StoreResult<Vec<BudgetRecord>> {
        self.hit();
        self.inner.select_all()
    }
    fn select_by_category(&self, kategori: &str) -> StoreResult<Vec<BudgetRecord>> {
        self.hit();
        self.inner.select_by_category(kategori)
    }
    fn select_years(&self) -> StoreResult<Vec<i32>> {
        self.hit();
        self.inner.select_years()
    }
    fn insert(&mut self, record: &NewRecord) -> StoreResult<BudgetRecord> {
        self.hit();
        self.inner.insert(record)
    }
    fn delete(&mut self, id: i64) -> StoreResult<()> {
        self.hit();
        self.inner.delete(id)
    }
    fn describe(&self) -> String {
        "counting".into()
    }
}

fn sample() -> Vec<NewRecord> {
    vec![
        NewRecord::new(2024, Kategori::Pendapatan, "Pajak Daerah", 500),
        NewRecord::new(2024, Kategori::Pendapatan, "Retribusi", 200),
        NewRecord::new(2023, Kategori::Pendapatan, "Pajak Daerah", 300),
        NewRecord::new(2024, Kategori::Pembelanjaan, "Belanja Modal", 650),
        NewRecord::new(2022, Kategori::Pembiayaan, "SiLPA", 100),
    ]
}

fn seeded() -> (Gateway, Arc<AtomicUsize>) {
    let mut inner = SqliteStore::open_in_memory().unwrap();
    inner.insert_batch(&sample()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let gw = Gateway::new(Box::new(CountingStore {
        inner,
        calls: calls.clone(),
    }));
    (gw, calls)
}

fn empty() -> Gateway {
    Gateway::new(Box::new(SqliteStore::open_in_memory().unwrap()))
}

fn logged_in_admin(gw: &Gateway) -> AdminView {
    let mut view = AdminView::new();
    view.load(gw);
    view
}

// ── ChartSlot ─────────────────────────────────────────────────

struct Probe {
    live: Rc<RefCell<usize>>,
}

impl Probe {
    fn new(live: &Rc<RefCell<usize>>) -> Self {
        *live.borrow_mut() += 1;
        Self { live: live.clone() }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        *self.live.borrow_mut() -= 1;
    }
}

#[test]
fn test_chart_slot_holds_one_chart() {
    let live = Rc::new(RefCell::new(0));
    let mut slot = ChartSlot::default();
    for _ in 0..5 {
        slot.replace(Probe::new(&live));
        assert_eq!(*live.borrow(), 1);
    }
    assert_eq!(slot.replacements(), 5);
    slot.clear();
    assert_eq!(*live.borrow(), 0);
    assert!(slot.get().is_none());
}

// ── step_year ─────────────────────────────────────────────────

#[test]
fn test_step_year_wraps_through_all() {
    let years = [2024, 2023];
    assert_eq!(step_year(&years, None, true), Some(2024));
    assert_eq!(step_year(&years, Some(2024), true), Some(2023));
    assert_eq!(step_year(&years, Some(2023), true), None);
    assert_eq!(step_year(&years, None, false), Some(2023));
}

#[test]
fn test_step_year_no_years_stays_all() {
    assert_eq!(step_year(&[], None, true), None);
    assert_eq!(step_year(&[], Some(2020), false), None);
}

#[test]
fn test_year_label() {
    assert_eq!(year_label(None), "Semua");
    assert_eq!(year_label(Some(2024)), "2024");
}

// ── Home ──────────────────────────────────────────────────────

#[test]
fn test_home_load_all_years() {
    let (gw, _) = seeded();
    let mut home = HomeView::new();
    home.load(&gw);
    assert_eq!(home.status, ViewStatus::Loaded);
    assert_eq!(home.totals.pendapatan, 1000);
    assert_eq!(home.totals.pembelanjaan, 650);
    assert_eq!(home.totals.pembiayaan, 100);
    assert_eq!(home.years, vec![2024, 2023, 2022]);
    assert_eq!(home.chart.get().unwrap().len(), 3);
}

#[test]
fn test_home_selected_year_filters_summary() {
    let (gw, _) = seeded();
    let mut home = HomeView::new();
    home.load(&gw);
    home.step_year(true);
    assert_eq!(home.selected_year, Some(2024));
    home.load(&gw);
    assert_eq!(home.totals.pendapatan, 700);
    assert_eq!(home.totals.pembelanjaan, 650);
    assert_eq!(home.totals.pembiayaan, 0);
    assert_eq!(home.record_count, 3);
}

#[test]
fn test_home_year_change_refetches() {
    let (gw, calls) = seeded();
    let mut home = HomeView::new();
    home.load(&gw);
    let before = calls.load(Ordering::SeqCst);
    home.step_year(true);
    home.load(&gw);
    // fetch_all + years
    assert_eq!(calls.load(Ordering::SeqCst), before + 2);
}

#[test]
fn test_home_stale_year_reset_after_delete() {
    let (mut gw, _) = seeded();
    let mut home = HomeView::new();
    home.load(&gw);
    home.step_year(false);
    assert_eq!(home.selected_year, Some(2022));
    home.load(&gw);
    assert_eq!(home.record_count, 1);

    let silpa = gw
        .fetch_all()
        .into_iter()
        .find(|r| r.tahun == 2022)
        .unwrap();
    gw.delete(silpa.id).unwrap();
    home.load(&gw);
    assert_eq!(home.selected_year, None);
    assert_eq!(home.years, vec![2024, 2023]);
    assert_eq!(home.status, ViewStatus::Loaded);
    assert_eq!(home.record_count, 4);
}

#[test]
fn test_home_empty_store() {
    let gw = empty();
    let mut home = HomeView::new();
    home.load(&gw);
    assert_eq!(home.status, ViewStatus::Empty);
    assert_eq!(home.totals, CategoryTotals::default());
    assert!(home.years.is_empty());
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_load_derives_everything() {
    let (gw, _) = seeded();
    let mut view = CategoryView::new(Kategori::Pendapatan);
    view.load(&gw);
    assert_eq!(view.status, ViewStatus::Loaded);
    assert_eq!(view.total, 1000);
    assert_eq!(view.years, vec![2024, 2023]);
    assert_eq!(
        view.subcategories.get().unwrap(),
        &vec![("Pajak Daerah".to_string(), 800), ("Retribusi".to_string(), 200)]
    );
    assert_eq!(view.trend.get().unwrap(), &vec![(2023, 300), (2024, 700)]);
    assert!(view.visible.iter().all(|r| r.kategori == "Pendapatan"));
}

#[test]
fn test_category_year_filter_without_round_trip() {
    let (gw, calls) = seeded();
    let mut view = CategoryView::new(Kategori::Pendapatan);
    view.load(&gw);
    let after_load = calls.load(Ordering::SeqCst);
    view.set_year(Some(2023));
    assert_eq!(calls.load(Ordering::SeqCst), after_load);
    assert_eq!(view.total, 300);
    assert_eq!(view.visible.len(), 1);
    assert_eq!(view.trend.get().unwrap(), &vec![(2023, 300)]);
    view.set_year(None);
    assert_eq!(view.total, 1000);
    assert_eq!(calls.load(Ordering::SeqCst), after_load);
}

#[test]
fn test_category_stale_year_filter_reset_on_load() {
    let gw = empty();
    let mut view = CategoryView::new(Kategori::Pembiayaan);
    view.set_year(Some(1999));
    view.load(&gw);
    assert_eq!(view.year_filter, None);
    assert_eq!(view.status, ViewStatus::Empty);
}

#[test]
fn test_category_charts_replaced_not_stacked() {
    let (gw, _) = seeded();
    let mut view = CategoryView::new(Kategori::Pendapatan);
    view.load(&gw);
    view.step_year(true);
    view.step_year(true);
    assert_eq!(view.subcategories.replacements(), 3);
    assert_eq!(view.trend.replacements(), 3);
}

// ── Admin filters ─────────────────────────────────────────────

#[test]
fn test_admin_filters_rederive_without_round_trip() {
    let (gw, calls) = seeded();
    let mut admin = logged_in_admin(&gw);
    assert_eq!(admin.visible.len(), 5);
    let after_load = calls.load(Ordering::SeqCst);

    admin.cycle_category_filter();
    assert_eq!(admin.filter.kategori, Some(Kategori::Pendapatan));
    assert_eq!(admin.visible.len(), 3);

    admin.set_year_filter(Some(2024));
    assert_eq!(admin.visible.len(), 2);

    admin.set_category_filter(Some(Kategori::Pembiayaan));
    assert!(admin.visible.is_empty());
    assert_eq!(admin.status, ViewStatus::Empty);

    assert_eq!(calls.load(Ordering::SeqCst), after_load);
}

#[test]
fn test_admin_category_filter_cycle_returns_to_all() {
    let (gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    for _ in 0..4 {
        admin.cycle_category_filter();
    }
    assert_eq!(admin.filter.kategori, None);
    assert_eq!(admin.visible.len(), 5);
}

#[test]
fn test_admin_cursor_clamped_after_filter() {
    let (gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    admin.index = 4;
    admin.set_year_filter(Some(2022));
    assert_eq!(admin.index, 0);
    assert_eq!(admin.selected().unwrap().subkategori, "SiLPA");
}

// ── Admin add ─────────────────────────────────────────────────

#[test]
fn test_admin_submit_form_adds_and_refetches() {
    let (mut gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    let now = Instant::now();
    admin.open_form();
    admin.form.tahun = "2025".into();
    admin.form.cycle_kategori(true);
    admin.form.subkategori = "Belanja Pegawai".into();
    admin.form.jumlah = "1.500.000".into();

    assert!(admin.submit_form(&mut gw, now));
    assert!(!admin.form.open);
    assert_eq!(admin.visible.len(), 6);
    assert_eq!(admin.years.first(), Some(&2025));
    let banner = admin.banner.as_ref().unwrap();
    assert_eq!(banner.level, BannerLevel::Success);
    assert!(admin
        .visible
        .iter()
        .any(|r| r.kategori == "Pembelanjaan" && r.jumlah == 1_500_000));
}

#[test]
fn test_admin_submit_invalid_form_keeps_it_open() {
    let (mut gw, calls) = seeded();
    let mut admin = logged_in_admin(&gw);
    let before = calls.load(Ordering::SeqCst);
    admin.open_form();
    admin.form.jumlah = "100".into();

    assert!(!admin.submit_form(&mut gw, Instant::now()));
    assert!(admin.form.open);
    assert_eq!(admin.banner.as_ref().unwrap().level, BannerLevel::Error);
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[test]
fn test_form_input_rules() {
    let mut form = AddForm::new();
    form.tahun.clear();
    form.push_char('2');
    form.push_char('x');
    assert_eq!(form.tahun, "2");
    form.next_field();
    assert_eq!(form.focus, FormField::Kategori);
    form.push_char(' ');
    assert_eq!(form.kategori, Kategori::Pembelanjaan);
    form.prev_field();
    form.prev_field();
    assert_eq!(form.focus, FormField::Jumlah);
    form.push_char('a');
    form.push_char('5');
    assert_eq!(form.jumlah, "5");
    form.pop_char();
    assert_eq!(form.value(FormField::Jumlah), "");
}

// ── Admin delete ──────────────────────────────────────────────

#[test]
fn test_admin_request_then_cancel_delete() {
    let (gw, calls) = seeded();
    let mut admin = logged_in_admin(&gw);
    let id = admin.selected().unwrap().id;
    let pending = admin.request_delete().unwrap().clone();
    assert_eq!(pending.id, id);
    assert!(pending.label.contains("Rp\u{a0}"));
    let before = calls.load(Ordering::SeqCst);
    admin.cancel_delete();
    assert!(admin.pending_delete.is_none());
    assert_eq!(admin.visible.len(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[test]
fn test_admin_confirm_delete_removes_row() {
    let (mut gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    let id = admin.request_delete().unwrap().id;
    assert!(admin.confirm_delete(&mut gw, Instant::now()));
    assert!(admin.pending_delete.is_none());
    assert_eq!(admin.visible.len(), 4);
    assert!(admin.visible.iter().all(|r| r.id != id));
    assert_eq!(admin.banner.as_ref().unwrap().level, BannerLevel::Success);
}

#[test]
fn test_admin_confirm_without_pending_is_noop() {
    let (mut gw, calls) = seeded();
    let mut admin = logged_in_admin(&gw);
    let before = calls.load(Ordering::SeqCst);
    assert!(!admin.confirm_delete(&mut gw, Instant::now()));
    assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[test]
fn test_admin_delete_missing_id_shows_error() {
    let (mut gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    assert!(!admin.delete_record(&mut gw, 9_999, Instant::now()));
    let banner = admin.banner.as_ref().unwrap();
    assert_eq!(banner.level, BannerLevel::Error);
    assert!(banner.message.contains("9999"));
    assert_eq!(admin.visible.len(), 5);
}

#[test]
fn test_request_delete_with_no_rows() {
    let gw = empty();
    let mut admin = logged_in_admin(&gw);
    assert!(admin.request_delete().is_none());
    assert!(admin.pending_delete.is_none());
}

// ── Banner ────────────────────────────────────────────────────

#[test]
fn test_banner_expires_after_ttl() {
    let start = Instant::now();
    let mut admin = AdminView::new();
    admin.banner = Some(Banner::new("ok", BannerLevel::Success, start));
    assert!(!admin.expire_banner(start + Duration::from_millis(2_999)));
    assert!(admin.banner.is_some());
    assert!(admin.expire_banner(start + BANNER_TTL));
    assert!(admin.banner.is_none());
    assert!(!admin.expire_banner(start + BANNER_TTL * 2));
}

// ── Login state ───────────────────────────────────────────────

#[test]
fn test_reject_login_sets_inline_error() {
    let mut admin = AdminView::new();
    admin.login.username = "admin".into();
    admin.login.password = "wrong".into();
    admin.reject_login();
    assert_eq!(admin.login_error(), Some(LOGIN_REJECTED));
    assert!(admin.login.password.is_empty());
    assert_eq!(admin.login.username, "admin");
}

#[test]
fn test_reset_clears_session_state_but_keeps_banner() {
    let (gw, _) = seeded();
    let mut admin = logged_in_admin(&gw);
    admin.request_delete();
    admin.banner = Some(Banner::new("bye", BannerLevel::Success, Instant::now()));
    admin.reset();
    assert!(admin.visible.is_empty());
    assert!(admin.pending_delete.is_none());
    assert_eq!(admin.status, ViewStatus::Loading);
    assert!(admin.banner.is_some());
}

#[test]
fn test_login_form_typing_follows_focus() {
    let mut form = LoginForm::new();
    form.push_char('a');
    form.toggle_focus();
    form.push_char('b');
    form.push_char('c');
    form.pop_char();
    assert_eq!(form.username, "a");
    assert_eq!(form.password, "b");
}
