use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{bail, Context};

use super::app::{App, Screen};
use crate::gateway::Gateway;
use crate::models::{Kategori, NewRecord};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Gateway) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("home", "Go to Beranda", cmd_home, r);
    register_command!("beranda", "Go to Beranda", cmd_home, r);
    register_command!("pendapatan", "Go to Pendapatan", cmd_pendapatan, r);
    register_command!("pembelanjaan", "Go to Pembelanjaan", cmd_pembelanjaan, r);
    register_command!("belanja", "Go to Pembelanjaan", cmd_pembelanjaan, r);
    register_command!("pembiayaan", "Go to Pembiayaan", cmd_pembiayaan, r);
    register_command!("admin", "Go to Admin", cmd_admin, r);
    register_command!("r", "Refetch the current view", cmd_refresh, r);
    register_command!("refresh", "Refetch the current view", cmd_refresh, r);
    register_command!("y", "Set year filter (e.g. :year 2024, :year all)", cmd_year, r);
    register_command!("year", "Set year filter (e.g. :year 2024, :year all)", cmd_year, r);
    register_command!(
        "k",
        "Admin kategori filter (e.g. :kategori pendapatan)",
        cmd_kategori,
        r
    );
    register_command!(
        "kategori",
        "Admin kategori filter (e.g. :kategori pendapatan)",
        cmd_kategori,
        r
    );
    register_command!(
        "add",
        "Add record (e.g. :add 2024 pendapatan 1.500.000 Pajak Daerah)",
        cmd_add,
        r
    );
    register_command!(
        "delete",
        "Delete selected record, or by id (e.g. :delete 12)",
        cmd_delete,
        r
    );
    register_command!("logout", "End the admin session", cmd_logout, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);

    r
});

/// Run one command line. Failures land in the status bar; none end the session.
pub(crate) fn handle_command(input: &str, app: &mut App, gateway: &mut Gateway) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, gateway) {
            tracing::debug!(command = cmd_name, error = %e, "command failed");
            app.set_status(format!("Error: {e:#}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

pub(crate) fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `all`/`semua`/empty clears the filter.
pub(crate) fn parse_year_arg(args: &str) -> anyhow::Result<Option<i32>> {
    match args.to_ascii_lowercase().as_str() {
        "" | "all" | "semua" => Ok(None),
        other => {
            let year: i32 = other
                .parse()
                .with_context(|| format!("Invalid year '{args}'. Use YYYY or all"))?;
            Ok(Some(year))
        }
    }
}

/// Split `<tahun> <kategori> <jumlah> <subkategori...>` into a record.
pub(crate) fn parse_add_args(args: &str) -> anyhow::Result<NewRecord> {
    let mut parts = args.split_whitespace();
    let (Some(tahun), Some(kategori), Some(jumlah)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("Usage: add <tahun> <kategori> <jumlah> <subkategori...>");
    };
    let subkategori = parts.collect::<Vec<_>>().join(" ");
    NewRecord::parse(tahun, kategori, &subkategori, jumlah)
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_home(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.switch_screen(Screen::Home);
    Ok(())
}

fn cmd_pendapatan(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.switch_screen(Screen::Category(Kategori::Pendapatan));
    Ok(())
}

fn cmd_pembelanjaan(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.switch_screen(Screen::Category(Kategori::Pembelanjaan));
    Ok(())
}

fn cmd_pembiayaan(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.switch_screen(Screen::Category(Kategori::Pembiayaan));
    Ok(())
}

fn cmd_admin(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.switch_screen(Screen::Admin);
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.request_reload();
    app.set_status("Refreshing…");
    Ok(())
}

fn cmd_year(args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    let year = parse_year_arg(args)?;
    app.set_year(year);
    app.set_status(match year {
        Some(y) => format!("Tahun {y}"),
        None => "Semua tahun".to_string(),
    });
    Ok(())
}

fn cmd_kategori(args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    if !app.require_admin() {
        return Ok(());
    }
    let kategori = match args.to_ascii_lowercase().as_str() {
        "" | "all" | "semua" => None,
        other => Some(other.parse::<Kategori>()?),
    };
    app.admin.set_category_filter(kategori);
    app.set_status(format!(
        "Filter kategori: {}",
        kategori.map_or("Semua", |k| k.as_str())
    ));
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, gw: &mut Gateway) -> anyhow::Result<()> {
    if args.is_empty() {
        app.open_add_form();
        return Ok(());
    }
    let record = parse_add_args(args)?;
    app.add_record(gw, &record, Instant::now());
    Ok(())
}

fn cmd_delete(args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    if !app.require_admin() {
        return Ok(());
    }
    if !args.is_empty() {
        let id: i64 = args
            .parse()
            .with_context(|| format!("Invalid id '{args}'"))?;
        let Some(pos) = app.admin.visible.iter().position(|r| r.id == id) else {
            bail!("No record #{id} in the current view");
        };
        app.admin.index = pos;
        if pos < app.admin.scroll || pos >= app.admin.scroll + app.visible_rows {
            app.admin.scroll = pos;
        }
    }
    app.begin_delete();
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.logout();
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _gw: &mut Gateway) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
