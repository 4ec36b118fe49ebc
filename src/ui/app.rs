use std::time::Instant;

use crate::gateway::Gateway;
use crate::models::{Kategori, NewRecord};
use crate::session::{Authenticator, Session};

use super::views::{AdminView, CategoryView, HomeView, ViewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Category(Kategori),
    Admin,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Home,
            Self::Category(Kategori::Pendapatan),
            Self::Category(Kategori::Pembelanjaan),
            Self::Category(Kategori::Pembiayaan),
            Self::Admin,
        ]
    }

    pub(crate) fn index(&self) -> usize {
        Self::all().iter().position(|s| s == self).unwrap_or(0)
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Beranda"),
            Self::Category(k) => write!(f, "{k}"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Login,
    Form,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Login => write!(f, "LOGIN"),
            Self::Form => write!(f, "FORM"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) store_label: String,

    pub(crate) home: HomeView,
    pub(crate) categories: [CategoryView; 3],
    pub(crate) admin: AdminView,

    pub(crate) session: Session,
    pub(crate) auth: Authenticator,

    /// Set when the current view should fetch on the next loop turn, after
    /// its loading state has been drawn.
    pub(crate) needs_load: bool,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(auth: Authenticator, store_label: impl Into<String>) -> Self {
        Self {
            running: true,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            store_label: store_label.into(),

            home: HomeView::new(),
            categories: [
                CategoryView::new(Kategori::Pendapatan),
                CategoryView::new(Kategori::Pembelanjaan),
                CategoryView::new(Kategori::Pembiayaan),
            ],
            admin: AdminView::new(),

            session: Session::new(),
            auth,

            needs_load: true,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn category(&self, kategori: Kategori) -> &CategoryView {
        &self.categories[Self::slot(kategori)]
    }

    pub(crate) fn category_mut(&mut self, kategori: Kategori) -> &mut CategoryView {
        &mut self.categories[Self::slot(kategori)]
    }

    fn slot(kategori: Kategori) -> usize {
        match kategori {
            Kategori::Pendapatan => 0,
            Kategori::Pembelanjaan => 1,
            Kategori::Pembiayaan => 2,
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub(crate) fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.show_help = false;
        if screen == Screen::Admin && !self.is_authenticated() {
            self.input_mode = InputMode::Login;
            self.needs_load = false;
            return;
        }
        self.input_mode = InputMode::Normal;
        self.request_reload();
    }

    pub(crate) fn next_screen(&mut self) {
        let all = Screen::all();
        self.switch_screen(all[(self.screen.index() + 1) % all.len()]);
    }

    pub(crate) fn prev_screen(&mut self) {
        let all = Screen::all();
        self.switch_screen(all[(self.screen.index() + all.len() - 1) % all.len()]);
    }

    /// Show the loading state now and fetch on the next loop turn.
    pub(crate) fn request_reload(&mut self) {
        match self.screen {
            Screen::Home => self.home.status = ViewStatus::Loading,
            Screen::Category(k) => self.category_mut(k).status = ViewStatus::Loading,
            Screen::Admin => {
                if !self.is_authenticated() {
                    return;
                }
                self.admin.status = ViewStatus::Loading;
            }
        }
        self.needs_load = true;
    }

    pub(crate) fn load_current(&mut self, gateway: &Gateway) {
        self.needs_load = false;
        match self.screen {
            Screen::Home => self.home.load(gateway),
            Screen::Category(k) => self.category_mut(k).load(gateway),
            Screen::Admin => {
                if self.is_authenticated() {
                    self.admin.load(gateway);
                }
            }
        }
        tracing::debug!(screen = %self.screen, "view loaded");
    }

    /// Year selector. Home re-runs its whole fetch; the others re-derive.
    pub(crate) fn step_year(&mut self, forward: bool) {
        match self.screen {
            Screen::Home => {
                self.home.step_year(forward);
                self.request_reload();
            }
            Screen::Category(k) => self.category_mut(k).step_year(forward),
            Screen::Admin => {
                if self.is_authenticated() {
                    self.admin.step_year(forward);
                }
            }
        }
    }

    pub(crate) fn set_year(&mut self, year: Option<i32>) {
        match self.screen {
            Screen::Home => {
                self.home.selected_year = year;
                self.request_reload();
            }
            Screen::Category(k) => self.category_mut(k).set_year(year),
            Screen::Admin => {
                if self.is_authenticated() {
                    self.admin.set_year_filter(year);
                }
            }
        }
    }

    pub(crate) fn current_year(&self) -> Option<i32> {
        match self.screen {
            Screen::Home => self.home.selected_year,
            Screen::Category(k) => self.category(k).year_filter,
            Screen::Admin => self.admin.filter.tahun,
        }
    }

    pub(crate) fn submit_login(&mut self, gateway: &Gateway) {
        let login = &self.admin.login;
        if self
            .auth
            .validate_login(gateway, &login.username, &login.password)
        {
            tracing::info!(user = %login.username, "admin logged in");
            self.session.set_authenticated(true);
            self.admin.reset();
            self.input_mode = InputMode::Normal;
            self.set_status("Login berhasil");
            self.request_reload();
        } else {
            tracing::warn!(user = %login.username, "admin login rejected");
            self.admin.reject_login();
        }
    }

    pub(crate) fn logout(&mut self) {
        if !self.is_authenticated() {
            self.set_status("Belum login");
            return;
        }
        self.session.set_authenticated(false);
        self.admin.reset();
        tracing::info!("admin logged out");
        self.set_status("Logout berhasil");
        if self.screen == Screen::Admin {
            self.input_mode = InputMode::Login;
        }
    }

    /// Checks the session and the active tab before any admin action.
    pub(crate) fn require_admin(&mut self) -> bool {
        if self.screen != Screen::Admin {
            self.set_status("Perintah ini hanya untuk tab Admin");
            return false;
        }
        if !self.is_authenticated() {
            self.input_mode = InputMode::Login;
            self.set_status("Silakan login terlebih dahulu");
            return false;
        }
        true
    }

    pub(crate) fn open_add_form(&mut self) {
        if self.require_admin() {
            self.admin.open_form();
            self.input_mode = InputMode::Form;
        }
    }

    pub(crate) fn submit_add_form(&mut self, gateway: &mut Gateway, now: Instant) {
        if self.admin.submit_form(gateway, now) {
            self.input_mode = InputMode::Normal;
        }
    }

    pub(crate) fn add_record(&mut self, gateway: &mut Gateway, record: &NewRecord, now: Instant) {
        if self.require_admin() {
            self.admin.add_record(gateway, record, now);
        }
    }

    pub(crate) fn begin_delete(&mut self) {
        if !self.require_admin() {
            return;
        }
        match self.admin.request_delete() {
            Some(pending) => {
                self.confirm_message =
                    format!("Hapus data #{} ({})? [y/N]", pending.id, pending.label);
                self.input_mode = InputMode::Confirm;
            }
            None => self.set_status("Tidak ada data untuk dihapus"),
        }
    }

    pub(crate) fn resolve_confirm(&mut self, gateway: &mut Gateway, confirmed: bool, now: Instant) {
        if confirmed {
            self.admin.confirm_delete(gateway, now);
        } else {
            self.admin.cancel_delete();
            self.set_status("Dibatalkan");
        }
        self.confirm_message.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Housekeeping once per loop turn.
    pub(crate) fn tick(&mut self, now: Instant) {
        self.admin.expire_banner(now);
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
