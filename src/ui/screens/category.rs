use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
    },
    Frame,
};

use crate::models::Kategori;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_compact, format_rupiah, truncate};
use crate::ui::views::{year_label, CategoryView, ViewStatus};

use super::{placeholder, titled_block, year_selector};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, kategori: Kategori) {
    let view = app.category(kategori);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Year selector
            Constraint::Length(3),      // Total
            Constraint::Min(10),        // Charts
            Constraint::Percentage(35), // Table
        ])
        .split(area);

    f.render_widget(year_selector(&view.years, view.year_filter), chunks[0]);

    let body = chunks[1].union(chunks[3]);
    let title = format!(" {} ", kategori);
    match &view.status {
        ViewStatus::Loading => return placeholder(f, body, &title, "Memuat data…"),
        ViewStatus::Empty => return placeholder(f, body, &title, "Tidak ada data"),
        ViewStatus::Error(msg) => return placeholder(f, body, &title, msg),
        ViewStatus::Loaded => {}
    }

    render_total(f, chunks[1], view);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_subcategory_chart(f, charts[0], view);
    render_trend_chart(f, charts[1], view);
    render_table(f, chunks[3], view);
}

fn render_total(f: &mut Frame, area: Rect, view: &CategoryView) {
    let color = theme::kategori_color(view.kategori);
    let line = Line::from(vec![
        Span::styled(format!(" Total {}: ", view.kategori), theme::dim_style()),
        Span::styled(
            format_rupiah(view.total),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "   {} data, tahun {}",
                view.visible.len(),
                year_label(view.year_filter)
            ),
            theme::dim_style(),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).block(titled_block(&format!(" {} ", view.kategori.gloss()))),
        area,
    );
}

fn render_subcategory_chart(f: &mut Frame, area: Rect, view: &CategoryView) {
    let Some(rows) = view.subcategories.get() else {
        return;
    };
    let color = theme::kategori_color(view.kategori);
    let label_width = (area.width / 3).max(8) as usize;

    let bars: Vec<Bar> = rows
        .iter()
        .map(|(name, total)| {
            Bar::default()
                .value(u64::try_from(*total).unwrap_or(0))
                .label(Line::from(truncate(name, label_width)))
                .text_value(format_compact(*total))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(theme::HEADER_BG).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(" Subkategori Teratas "))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);
    f.render_widget(chart, area);
}

fn render_trend_chart(f: &mut Frame, area: Rect, view: &CategoryView) {
    let Some(series) = view.trend.get() else {
        return;
    };
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(year, total)| (f64::from(*year), *total as f64))
        .collect();

    let (min_year, max_year) = match (series.first(), series.last()) {
        (Some((lo, _)), Some((hi, _))) => (*lo, *hi),
        _ => return,
    };
    // A single year still needs a non-empty axis.
    let x_bounds = if min_year == max_year {
        [f64::from(min_year) - 1.0, f64::from(max_year) + 1.0]
    } else {
        [f64::from(min_year), f64::from(max_year)]
    };
    let max_total = series.iter().map(|(_, v)| *v).max().unwrap_or(0).max(0);
    let min_total = series.iter().map(|(_, v)| *v).min().unwrap_or(0).min(0);
    let y_bounds = [min_total as f64, (max_total as f64).max(1.0)];

    let color = theme::kategori_color(view.kategori);
    let dataset = Dataset::default()
        .name(format!("{} per tahun", view.kategori))
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(titled_block(" Tren per Tahun "))
        .x_axis(
            Axis::default()
                .style(theme::dim_style())
                .bounds(x_bounds)
                .labels(vec![min_year.to_string(), max_year.to_string()]),
        )
        .y_axis(
            Axis::default()
                .style(theme::dim_style())
                .bounds(y_bounds)
                .labels(vec![format_compact(min_total), format_compact(max_total)]),
        );
    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, view: &CategoryView) {
    let header = Row::new(
        ["Tahun", "Subkategori", "Jumlah"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = view
        .visible
        .iter()
        .enumerate()
        .skip(view.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, record)| {
            let style = if i == view.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(record.tahun.to_string()),
                Cell::from(truncate(&record.subkategori, 48)),
                Cell::from(Span::styled(
                    format_rupiah(record.jumlah),
                    theme::amount_style(record.jumlah),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(26),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(&format!(" Data ({}) ", view.visible.len())));
    f.render_widget(table, area);
}
