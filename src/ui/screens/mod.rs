pub(crate) mod admin;
pub(crate) mod category;
pub(crate) mod home;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme;
use super::views::year_label;

pub(crate) fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

/// `width` x `height` rect centred in `area`.
pub(crate) fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

/// Bordered box with a single centred message, used for loading and empty states.
pub(crate) fn placeholder(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme::dim_style())),
    ])
    .centered()
    .block(titled_block(title));
    f.render_widget(msg, area);
}

/// One-line year picker: `Tahun: [Semua] 2024 2023  (y/Y)`.
pub(crate) fn year_selector(years: &[i32], selected: Option<i32>) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(" Tahun: ", theme::dim_style())];
    let options = std::iter::once(None).chain(years.iter().copied().map(Some));
    for option in options {
        let label = year_label(option);
        if option == selected {
            spans.push(Span::styled(format!("[{label}]"), theme::selected_style()));
        } else {
            spans.push(Span::styled(format!(" {label} "), theme::normal_style()));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(" (y/Y)", theme::dim_style()));
    Paragraph::new(Line::from(spans))
}
