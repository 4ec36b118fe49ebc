use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::aggregate::{filter_records, totals_by_category, total_amount, RecordFilter};
use crate::gateway::Gateway;
use crate::models::{Kategori, NewRecord};
use crate::session::Authenticator;
use crate::ui::commands::parse_add_args;
use crate::ui::util::format_rupiah;

pub(crate) fn as_cli(args: &[String], gateway: &mut Gateway, auth: &Authenticator) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "summary" | "s" => cli_summary(rest, gateway),
        "list" | "ls" => cli_list(rest, gateway),
        "years" => cli_years(gateway),
        "export" => cli_export(rest, gateway),
        "import" => cli_import(rest, gateway, auth),
        "add" => cli_add(rest, gateway, auth),
        "delete" | "rm" => cli_delete(rest, gateway, auth),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("apbdui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("apbdui: regional budget (APBD) dashboard");
    println!();
    println!("Usage: apbdui [--config <file>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  summary [YYYY]                  Totals per kategori, all years by default");
    println!("  list [kategori] [--year YYYY]   List records");
    println!("  years                           List years that have data");
    println!("  export <file.csv>               Export every record to CSV");
    println!("  import <file.csv>               Import tahun,kategori,subkategori,jumlah rows");
    println!("  add <tahun> <kategori> <jumlah> <subkategori...>");
    println!("                                  Add one record");
    println!("  delete <id>                     Delete one record");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
    println!();
    println!("Write commands (import, add, delete) need --user <name> --password <pass>.");
}

/// Value following `flag`, e.g. `--year 2024`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments with every `--flag value` pair removed.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_year(raw: &str) -> Result<i32> {
    raw.parse()
        .with_context(|| format!("Invalid year '{raw}'. Expected YYYY"))
}

fn require_login(args: &[String], gateway: &Gateway, auth: &Authenticator) -> Result<()> {
    let (Some(user), Some(pass)) = (flag_value(args, "--user"), flag_value(args, "--password"))
    else {
        bail!("This command needs --user <name> --password <pass>");
    };
    if !auth.validate_login(gateway, user, pass) {
        tracing::warn!(user, "cli login rejected");
        bail!("Username atau password salah!");
    }
    Ok(())
}

fn cli_summary(args: &[String], gateway: &Gateway) -> Result<()> {
    let year = positional(args).first().map(|y| parse_year(y)).transpose()?;
    let records = filter_records(
        &gateway.fetch_all(),
        &RecordFilter {
            kategori: None,
            tahun: year,
        },
    );
    let totals = totals_by_category(&records);

    let label = year.map_or_else(|| "semua tahun".to_string(), |y| format!("tahun {y}"));
    println!("APBD, {label}");
    println!("{}", "─".repeat(44));
    for (kategori, total) in totals.entries() {
        println!("  {:<14} {:>26}", kategori.as_str(), format_rupiah(total));
    }
    let surplus = totals.surplus();
    let heading = if surplus >= 0 { "Surplus" } else { "Defisit" };
    println!("  {heading:<14} {:>26}", format_rupiah(surplus));
    println!("  {:<14} {:>26}", "Jumlah data", records.len());
    Ok(())
}

fn cli_list(args: &[String], gateway: &Gateway) -> Result<()> {
    let kategori = positional(args)
        .first()
        .map(|k| k.parse::<Kategori>())
        .transpose()?;
    let year = flag_value(args, "--year").map(parse_year).transpose()?;

    let fetched = match kategori {
        Some(k) => gateway.fetch_by_category(k),
        None => gateway.fetch_all(),
    };
    let records = filter_records(
        &fetched,
        &RecordFilter {
            kategori: None,
            tahun: year,
        },
    );
    if records.is_empty() {
        println!("Tidak ada data");
        return Ok(());
    }

    println!(
        "{:<6} {:<6} {:<14} {:<32} {:>22}",
        "ID", "Tahun", "Kategori", "Subkategori", "Jumlah"
    );
    println!("{}", "─".repeat(84));
    for r in &records {
        println!(
            "{:<6} {:<6} {:<14} {:<32} {:>22}",
            r.id,
            r.tahun,
            r.kategori,
            crate::ui::util::truncate(&r.subkategori, 32),
            format_rupiah(r.jumlah)
        );
    }
    println!("{}", "─".repeat(84));
    println!(
        "{} data, total {}",
        records.len(),
        format_rupiah(total_amount(&records))
    );
    Ok(())
}

fn cli_years(gateway: &Gateway) -> Result<()> {
    let years = gateway.list_distinct_years();
    if years.is_empty() {
        println!("Tidak ada data");
    }
    for year in years {
        println!("{year}");
    }
    Ok(())
}

fn cli_export(args: &[String], gateway: &Gateway) -> Result<()> {
    let Some(target) = positional(args).first().copied() else {
        bail!("Usage: apbdui export <file.csv>");
    };
    let path = shellexpand(target);
    let records = gateway.fetch_all();
    let count = crate::import::write_records(Path::new(&path), &records)?;
    println!("Exported {count} records to {path}");
    Ok(())
}

fn cli_import(args: &[String], gateway: &mut Gateway, auth: &Authenticator) -> Result<()> {
    let Some(source) = positional(args).first().copied() else {
        bail!("Usage: apbdui import <file.csv> --user <name> --password <pass>");
    };
    require_login(args, gateway, auth)?;

    let path = shellexpand(source);
    if !Path::new(&path).exists() {
        bail!("File not found: {path}");
    }
    let records = crate::import::read_records(Path::new(&path))?;
    println!("Parsed {} records", records.len());

    let added = gateway.add_many(&records)?;
    println!("Imported {added} records");
    Ok(())
}

fn cli_add(args: &[String], gateway: &mut Gateway, auth: &Authenticator) -> Result<()> {
    let record: NewRecord = parse_add_args(&positional(args).join(" "))?;
    require_login(args, gateway, auth)?;
    let added = gateway.add(&record)?;
    println!(
        "Added #{} {} {} {} {}",
        added.id,
        added.tahun,
        added.kategori,
        added.subkategori,
        format_rupiah(added.jumlah)
    );
    Ok(())
}

fn cli_delete(args: &[String], gateway: &mut Gateway, auth: &Authenticator) -> Result<()> {
    let Some(raw) = positional(args).first().copied() else {
        bail!("Usage: apbdui delete <id> --user <name> --password <pass>");
    };
    let id: i64 = raw
        .parse()
        .with_context(|| format!("Invalid id '{raw}'"))?;
    require_login(args, gateway, auth)?;
    gateway.delete(id)?;
    println!("Deleted #{id}");
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::settings::AuthSettings;
    use crate::store::SqliteStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn gateway() -> Gateway {
        Gateway::new(Box::new(SqliteStore::open_in_memory().unwrap()))
    }

    fn auth() -> Authenticator {
        Authenticator::from_settings(&AuthSettings::default())
    }

    // ── Argument helpers ──────────────────────────────────────

    #[test]
    fn test_flag_value() {
        let a = args(&["pendapatan", "--year", "2024"]);
        assert_eq!(flag_value(&a, "--year"), Some("2024"));
        assert_eq!(flag_value(&a, "--user"), None);
    }

    #[test]
    fn test_positional_skips_flag_pairs() {
        let a = args(&["2024", "--user", "admin", "pendapatan", "--password", "x", "100"]);
        assert_eq!(positional(&a), vec!["2024", "pendapatan", "100"]);
    }

    #[test]
    fn test_shellexpand_plain_path() {
        assert_eq!(shellexpand("/tmp/a.csv"), "/tmp/a.csv");
    }

    // ── Write commands ────────────────────────────────────────

    #[test]
    fn test_add_requires_credentials() {
        let mut gw = gateway();
        let a = args(&["2024", "pendapatan", "100", "Pajak"]);
        let err = cli_add(&a, &mut gw, &auth()).unwrap_err();
        assert!(err.to_string().contains("--user"));
        assert!(gw.fetch_all().is_empty());
    }

    #[test]
    fn test_add_rejects_bad_password() {
        let mut gw = gateway();
        let a = args(&[
            "2024", "pendapatan", "100", "Pajak", "--user", "admin", "--password", "nope",
        ]);
        assert!(cli_add(&a, &mut gw, &auth()).is_err());
        assert!(gw.fetch_all().is_empty());
    }

    #[test]
    fn test_add_then_delete() {
        let mut gw = gateway();
        let a = args(&[
            "2024",
            "pendapatan",
            "1.000",
            "Pajak",
            "Daerah",
            "--user",
            "admin",
            "--password",
            "admin123",
        ]);
        cli_add(&a, &mut gw, &auth()).unwrap();
        let all = gw.fetch_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].subkategori, "Pajak Daerah");
        assert_eq!(all[0].jumlah, 1_000);

        let id = all[0].id.to_string();
        let d = args(&[&id, "--user", "admin", "--password", "admin123"]);
        cli_delete(&d, &mut gw, &auth()).unwrap();
        assert!(gw.fetch_all().is_empty());
        assert!(cli_delete(&d, &mut gw, &auth()).is_err());
    }

    #[test]
    fn test_export_then_import() {
        let mut gw = gateway();
        gw.add(&NewRecord::new(2024, Kategori::Pendapatan, "Pajak", 10))
            .unwrap();
        gw.add(&NewRecord::new(2023, Kategori::Pembiayaan, "SiLPA", 20))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apbd.csv").to_string_lossy().to_string();

        cli_export(&args(&[&path]), &gw).unwrap();

        let mut other = gateway();
        let a = args(&[&path, "--user", "admin", "--password", "admin123"]);
        cli_import(&a, &mut other, &auth()).unwrap();
        assert_eq!(other.fetch_all().len(), 2);
        assert_eq!(other.list_distinct_years(), vec![2024, 2023]);
    }

    #[test]
    fn test_unknown_command_errors() {
        let mut gw = gateway();
        assert!(as_cli(&args(&["apbdui", "frobnicate"]), &mut gw, &auth()).is_err());
    }

    #[test]
    fn test_read_commands_on_empty_store() {
        let mut gw = gateway();
        for cmd in ["summary", "years", "list"] {
            as_cli(&args(&["apbdui", cmd]), &mut gw, &auth()).unwrap();
        }
        assert!(cli_summary(&args(&["20x4"]), &gw).is_err());
    }
}
