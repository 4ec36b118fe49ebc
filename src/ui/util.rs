/// Format a whole-rupiah amount the Indonesian way: `.` between thousands,
/// a non-breaking space after the symbol and no decimals.
/// e.g. `1234567` → `"Rp 1.234.567"`, `-5000` → `"-Rp 5.000"`
pub(crate) fn format_rupiah(val: i64) -> String {
    let grouped = group_thousands(val.unsigned_abs());
    if val < 0 {
        format!("-Rp\u{a0}{grouped}")
    } else {
        format!("Rp\u{a0}{grouped}")
    }
}

/// Short form for chart axes and bar labels.
/// e.g. `1_250_000_000` → `"1,2 M"`, `350_000_000` → `"350 jt"`
pub(crate) fn format_compact(val: i64) -> String {
    const UNITS: [(u64, &str); 4] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "M"),
        (1_000_000, "jt"),
        (1_000, "rb"),
    ];
    let abs = val.unsigned_abs();
    let sign = if val < 0 { "-" } else { "" };
    for (unit, suffix) in UNITS {
        if abs >= unit {
            let whole = abs / unit;
            let tenth = (abs % unit) * 10 / unit;
            return if whole >= 100 || tenth == 0 {
                format!("{sign}{whole} {suffix}")
            } else {
                format!("{sign}{whole},{tenth} {suffix}")
            };
        }
    }
    format!("{sign}{abs}")
}

fn group_thousands(abs: u64) -> String {
    let digits = abs.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(".")
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Mask a secret for display, one bullet per character.
pub(crate) fn mask(s: &str) -> String {
    "•".repeat(s.chars().count())
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}

/// Pull a cursor back inside a list that may have shrunk.
pub(crate) fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if len == 0 {
        *index = 0;
        *scroll = 0;
        return;
    }
    if *index >= len {
        *index = len - 1;
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
