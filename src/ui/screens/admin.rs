use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::{App, InputMode};
use crate::ui::theme;
use crate::ui::util::{format_rupiah, mask, truncate};
use crate::ui::views::{year_label, AdminView, BannerLevel, FormField, LoginField, ViewStatus};

use super::{centered_box, placeholder, titled_block};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if !app.is_authenticated() {
        render_login(f, area, &app.admin);
        return;
    }

    let admin = &app.admin;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filters
            Constraint::Length(1), // Banner
            Constraint::Min(5),    // Table
        ])
        .split(area);

    render_filters(f, chunks[0], admin);
    render_banner(f, chunks[1], admin);

    match &admin.status {
        ViewStatus::Loading => placeholder(f, chunks[2], " Kelola Data ", "Memuat data…"),
        ViewStatus::Empty => placeholder(
            f,
            chunks[2],
            " Kelola Data (0) ",
            "Tidak ada data. Tekan a untuk menambah",
        ),
        // Login errors never reach an authenticated view.
        ViewStatus::Error(msg) => placeholder(f, chunks[2], " Kelola Data ", msg),
        ViewStatus::Loaded => render_table(f, chunks[2], admin),
    }

    if admin.form.open {
        render_add_form(f, area, admin, app.input_mode == InputMode::Form);
    }
    if app.input_mode == InputMode::Confirm {
        render_delete_confirm(f, area, &app.confirm_message);
    }
}

fn render_login(f: &mut Frame, area: Rect, admin: &AdminView) {
    let card_area = centered_box(40, 7, area);
    f.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" Login Admin ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT));
    let inner = block.inner(card_area);
    f.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Username
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Password
        ])
        .margin(1)
        .split(inner);

    let login = &admin.login;
    render_input(
        f,
        rows[0],
        "Username",
        &login.username,
        login.focus == LoginField::Username,
    );
    render_input(
        f,
        rows[2],
        "Password",
        &mask(&login.password),
        login.focus == LoginField::Password,
    );

    let below = Rect {
        x: card_area.x,
        y: (card_area.y + card_area.height + 1).min(area.bottom().saturating_sub(1)),
        width: card_area.width,
        height: 1,
    };
    let hint = match admin.login_error() {
        Some(msg) => Span::styled(msg.to_string(), Style::default().fg(theme::RED)),
        None => Span::styled("Tab pindah kolom, Enter login", theme::dim_style()),
    };
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center), below);
}

fn render_input(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let cursor = if focused { "│" } else { "" };
    let value_style = if focused {
        theme::focused_field_style()
    } else {
        theme::normal_style()
    };
    let line = Line::from(vec![
        Span::styled(format!("{label:<10}"), theme::dim_style()),
        Span::styled(format!("{value}{cursor}"), value_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_filters(f: &mut Frame, area: Rect, admin: &AdminView) {
    let kategori = admin
        .filter
        .kategori
        .map_or("Semua", |k| k.as_str());
    let line = Line::from(vec![
        Span::styled(" Kategori: ", theme::dim_style()),
        Span::styled(format!("[{kategori}]"), theme::selected_style()),
        Span::styled(" (c)   Tahun: ", theme::dim_style()),
        Span::styled(
            format!("[{}]", year_label(admin.filter.tahun)),
            theme::selected_style(),
        ),
        Span::styled(" (y/Y)", theme::dim_style()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_banner(f: &mut Frame, area: Rect, admin: &AdminView) {
    let Some(banner) = &admin.banner else {
        return;
    };
    let style = match banner.level {
        BannerLevel::Success => theme::success_banner_style(),
        BannerLevel::Error => theme::error_banner_style(),
    };
    f.render_widget(
        Paragraph::new(format!(" {} ", banner.message)).style(style),
        area,
    );
}

fn render_table(f: &mut Frame, area: Rect, admin: &AdminView) {
    let header = Row::new(
        ["ID", "Tahun", "Kategori", "Subkategori", "Jumlah"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = admin
        .visible
        .iter()
        .enumerate()
        .skip(admin.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, record)| {
            let style = if i == admin.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let kategori_style = record
                .category()
                .map_or(theme::dim_style(), |k| {
                    Style::default().fg(theme::kategori_color(k))
                });
            Row::new(vec![
                Cell::from(record.id.to_string()),
                Cell::from(record.tahun.to_string()),
                Cell::from(Span::styled(record.kategori.clone(), kategori_style)),
                Cell::from(truncate(&record.subkategori, 40)),
                Cell::from(Span::styled(
                    format_rupiah(record.jumlah),
                    theme::amount_style(record.jumlah),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(26),
    ];
    let table = Table::new(rows, widths).header(header).block(titled_block(&format!(
        " Kelola Data ({}) ",
        admin.visible.len()
    )));
    f.render_widget(table, area);
}

fn render_add_form(f: &mut Frame, area: Rect, admin: &AdminView, active: bool) {
    let form = &admin.form;
    let popup = centered_box(52, FormField::all().len() as u16 * 2 + 4, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Tambah Data ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT))
        .style(Style::default().bg(theme::HEADER_BG));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = Vec::new();
    for field in FormField::all() {
        let focused = active && form.focus == *field;
        let value = match field {
            FormField::Kategori => format!("◀ {} ▶", form.kategori),
            _ => form.value(*field).to_string(),
        };
        let cursor = if focused && *field != FormField::Kategori {
            "│"
        } else {
            ""
        };
        let marker = if focused { "▸ " } else { "  " };
        let style = if focused {
            theme::focused_field_style()
        } else {
            theme::normal_style()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(format!("{:<12}", field.label()), theme::dim_style()),
            Span::styled(format!("{value}{cursor}"), style),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        " Tab/↑↓ kolom  ←/→ kategori  Enter simpan  Esc batal",
        Style::default()
            .fg(theme::TEXT_DIM)
            .add_modifier(Modifier::ITALIC),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

/// Popup width: the message plus padding, at least 30, never wider than the
/// terminal allows.
fn confirm_width(message: &str, area_width: u16) -> u16 {
    let max = area_width.saturating_sub(4);
    let wanted = u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(6);
    wanted.max(30).min(max)
}

fn render_delete_confirm(f: &mut Frame, area: Rect, message: &str) {
    let width = confirm_width(message, area.width);
    let popup = centered_box(width, 5, area);
    f.render_widget(Clear, popup);
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme::YELLOW),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Konfirmasi Hapus ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::RED))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(body, popup);
}
