use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::models::Kategori;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_compact, format_rupiah};
use crate::ui::views::{year_label, ViewStatus};

use super::{placeholder, titled_block, year_selector};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let home = &app.home;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Year selector
            Constraint::Length(6), // Summary cards
            Constraint::Min(8),    // Chart
        ])
        .split(area);

    f.render_widget(
        year_selector(&home.years, home.selected_year),
        chunks[0],
    );

    match &home.status {
        ViewStatus::Loading => {
            placeholder(f, chunks[1].union(chunks[2]), " Ringkasan ", "Memuat data…");
            return;
        }
        ViewStatus::Empty => {
            let msg = match home.selected_year {
                Some(y) => format!("Tidak ada data untuk tahun {y}"),
                None => "Tidak ada data".to_string(),
            };
            placeholder(f, chunks[1].union(chunks[2]), " Ringkasan ", &msg);
            return;
        }
        ViewStatus::Error(msg) => {
            placeholder(f, chunks[1].union(chunks[2]), " Ringkasan ", msg);
            return;
        }
        ViewStatus::Loaded => {}
    }

    render_summary_cards(f, chunks[1], app);
    render_totals_chart(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    for (i, (kategori, total)) in app.home.totals.entries().into_iter().enumerate() {
        render_card(
            f,
            cards[i],
            kategori.as_str(),
            total,
            theme::kategori_color(kategori),
            kategori.gloss(),
        );
    }

    let surplus = app.home.totals.surplus();
    let (label, color) = if surplus >= 0 {
        ("Surplus", theme::GREEN)
    } else {
        ("Defisit", theme::RED)
    };
    render_card(
        f,
        cards[3],
        label,
        surplus,
        color,
        &format!("{} data", app.home.record_count),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: i64,
    color: ratatui::style::Color,
    subtitle: &str,
) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_rupiah(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle.to_string(), theme::dim_style())),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(text, area);
}

fn render_totals_chart(f: &mut Frame, area: Rect, app: &App) {
    let Some(series) = app.home.chart.get() else {
        return;
    };

    // Bars cannot go below zero; the label still shows the signed amount.
    let bars: Vec<Bar> = series
        .iter()
        .map(|(kategori, total)| {
            let color = theme::kategori_color(*kategori);
            Bar::default()
                .value(u64::try_from(*total).unwrap_or(0))
                .label(Line::from(kategori.as_str()))
                .text_value(format_compact(*total))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(theme::HEADER_BG).bg(color))
        })
        .collect();

    let width = area.width.saturating_sub(2) / (Kategori::all().len() as u16 + 1);
    let chart = BarChart::default()
        .block(titled_block(&format!(
            " Total per Kategori ({}) ",
            year_label(app.home.selected_year)
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(width.clamp(6, 24))
        .bar_gap(2)
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}
