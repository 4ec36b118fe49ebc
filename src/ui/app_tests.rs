#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use super::*;
use crate::settings::AuthSettings;
use crate::store::SqliteStore;
use crate::ui::views::{BannerLevel, LOGIN_REJECTED};

fn seeded() -> Gateway {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store
        .insert_batch(&[
            NewRecord::new(2024, Kategori::Pendapatan, "Pajak Daerah", 500),
            NewRecord::new(2023, Kategori::Pendapatan, "Pajak Daerah", 300),
            NewRecord::new(2024, Kategori::Pembelanjaan, "Belanja Modal", 650),
        ])
        .unwrap();
    Gateway::new(Box::new(store))
}

fn make_app() -> App {
    App::new(Authenticator::from_settings(&AuthSettings::default()), "test")
}

fn logged_in(gw: &Gateway) -> App {
    let mut app = make_app();
    app.switch_screen(Screen::Admin);
    app.admin.login.username = "admin".into();
    app.admin.login.password = "admin123".into();
    app.submit_login(gw);
    app.load_current(gw);
    app
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn test_new_app_loads_home_first() {
    let gw = seeded();
    let mut app = make_app();
    assert!(app.needs_load);
    assert_eq!(app.home.status, ViewStatus::Loading);
    app.load_current(&gw);
    assert!(!app.needs_load);
    assert_eq!(app.home.status, ViewStatus::Loaded);
}

#[test]
fn test_screen_cycle_wraps() {
    let mut app = make_app();
    app.prev_screen();
    assert_eq!(app.screen, Screen::Admin);
    app.next_screen();
    assert_eq!(app.screen, Screen::Home);
    app.next_screen();
    assert_eq!(app.screen, Screen::Category(Kategori::Pendapatan));
}

#[test]
fn test_switching_tab_marks_view_loading() {
    let gw = seeded();
    let mut app = make_app();
    app.load_current(&gw);
    app.switch_screen(Screen::Category(Kategori::Pembelanjaan));
    assert!(app.needs_load);
    assert_eq!(
        app.category(Kategori::Pembelanjaan).status,
        ViewStatus::Loading
    );
    app.load_current(&gw);
    assert_eq!(app.category(Kategori::Pembelanjaan).total, 650);
    // other tabs keep their own state
    assert_eq!(app.home.status, ViewStatus::Loaded);
}

#[test]
fn test_screen_titles() {
    let titles: Vec<String> = Screen::all().iter().map(|s| s.to_string()).collect();
    assert_eq!(
        titles,
        vec!["Beranda", "Pendapatan", "Pembelanjaan", "Pembiayaan", "Admin"]
    );
}

// ── Home year selection ───────────────────────────────────────

#[test]
fn test_home_year_selection_filters_summary() {
    let gw = seeded();
    let mut app = make_app();
    app.load_current(&gw);
    assert_eq!(app.home.totals.pendapatan, 800);

    app.set_year(Some(2023));
    assert!(app.needs_load);
    app.load_current(&gw);
    assert_eq!(app.home.totals.pendapatan, 300);
    assert_eq!(app.home.totals.pembelanjaan, 0);

    app.set_year(None);
    app.load_current(&gw);
    assert_eq!(app.home.totals.pendapatan, 800);
}

#[test]
fn test_category_year_step_needs_no_reload() {
    let gw = seeded();
    let mut app = make_app();
    app.switch_screen(Screen::Category(Kategori::Pendapatan));
    app.load_current(&gw);
    app.step_year(true);
    assert!(!app.needs_load);
    assert_eq!(app.current_year(), Some(2024));
    assert_eq!(app.category(Kategori::Pendapatan).total, 500);
}

// ── Login / logout ────────────────────────────────────────────

#[test]
fn test_admin_tab_requires_login() {
    let mut app = make_app();
    app.switch_screen(Screen::Admin);
    assert_eq!(app.input_mode, InputMode::Login);
    assert!(!app.needs_load);
}

#[test]
fn test_login_success_loads_admin() {
    let gw = seeded();
    let app = logged_in(&gw);
    assert!(app.is_authenticated());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.admin.visible.len(), 3);
    assert!(app.admin.login.password.is_empty());
}

#[test]
fn test_login_failure_shows_inline_error() {
    let gw = seeded();
    let mut app = make_app();
    app.switch_screen(Screen::Admin);
    app.admin.login.username = "admin".into();
    app.admin.login.password = "salah".into();
    app.submit_login(&gw);
    assert!(!app.is_authenticated());
    assert_eq!(app.input_mode, InputMode::Login);
    assert_eq!(app.admin.login_error(), Some(LOGIN_REJECTED));
}

#[test]
fn test_logout_returns_to_login_form() {
    let gw = seeded();
    let mut app = logged_in(&gw);
    app.logout();
    assert!(!app.is_authenticated());
    assert_eq!(app.input_mode, InputMode::Login);
    assert!(app.admin.visible.is_empty());
}

#[test]
fn test_session_survives_tab_switches() {
    let gw = seeded();
    let mut app = logged_in(&gw);
    app.switch_screen(Screen::Home);
    app.switch_screen(Screen::Admin);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.needs_load);
}

// ── Admin actions ─────────────────────────────────────────────

#[test]
fn test_admin_actions_need_admin_tab() {
    let gw = seeded();
    let mut app = logged_in(&gw);
    app.switch_screen(Screen::Home);
    app.begin_delete();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.admin.pending_delete.is_none());
}

#[test]
fn test_admin_actions_need_session() {
    let mut app = make_app();
    app.switch_screen(Screen::Admin);
    app.input_mode = InputMode::Normal;
    app.open_add_form();
    assert!(!app.admin.form.open);
    assert_eq!(app.input_mode, InputMode::Login);
}

#[test]
fn test_delete_cancel_keeps_rows() {
    let mut gw = seeded();
    let mut app = logged_in(&gw);
    app.begin_delete();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(app.confirm_message.contains("[y/N]"));
    app.resolve_confirm(&mut gw, false, Instant::now());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.admin.pending_delete.is_none());
    assert_eq!(gw.fetch_all().len(), 3);
}

#[test]
fn test_delete_confirm_removes_row() {
    let mut gw = seeded();
    let mut app = logged_in(&gw);
    app.begin_delete();
    app.resolve_confirm(&mut gw, true, Instant::now());
    assert_eq!(gw.fetch_all().len(), 2);
    assert_eq!(app.admin.visible.len(), 2);
}

#[test]
fn test_add_form_submit_returns_to_normal() {
    let mut gw = seeded();
    let mut app = logged_in(&gw);
    app.open_add_form();
    assert_eq!(app.input_mode, InputMode::Form);
    app.admin.form.tahun = "2025".into();
    app.admin.form.subkategori = "Hibah".into();
    app.admin.form.jumlah = "10".into();
    app.submit_add_form(&mut gw, Instant::now());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.admin.visible.len(), 4);
}

#[test]
fn test_tick_clears_expired_banner() {
    let mut gw = seeded();
    let mut app = logged_in(&gw);
    let start = Instant::now();
    app.add_record(
        &mut gw,
        &NewRecord::new(2025, Kategori::Pembiayaan, "SiLPA", 5),
        start,
    );
    assert_eq!(app.admin.banner.as_ref().unwrap().level, BannerLevel::Success);
    app.tick(start + Duration::from_secs(1));
    assert!(app.admin.banner.is_some());
    app.tick(start + Duration::from_secs(3));
    assert!(app.admin.banner.is_none());
}
