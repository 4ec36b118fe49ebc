use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use crate::gateway::Gateway;
use crate::session::Authenticator;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};
use crate::ui::views::FormField;

const TICK_RATE: Duration = Duration::from_millis(200);

pub(crate) fn as_tui(gateway: &mut Gateway, auth: Authenticator) -> Result<()> {
    let mut app = App::new(auth, gateway.describe());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, gateway);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    gateway: &mut Gateway,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = table_rows(app.screen, content_height).max(1);
            crate::ui::render::render(f, app);
        })?;

        // The loading state is on screen; fetch before waiting for input.
        if app.needs_load {
            app.load_current(gateway);
            continue;
        }

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if app.show_help {
                    app.show_help = false;
                    continue;
                }
                match app.input_mode {
                    InputMode::Normal => handle_normal_input(key, app),
                    InputMode::Command => handle_command_input(key, app, gateway),
                    InputMode::Login => handle_login_input(key, app, gateway),
                    InputMode::Form => handle_form_input(key, app, gateway),
                    InputMode::Confirm => handle_confirm_input(key, app, gateway),
                }
            }
        }
        app.tick(Instant::now());
    }
    Ok(())
}

/// Data rows that fit in the table of `screen`, given the content height.
fn table_rows(screen: Screen, content_height: usize) -> usize {
    match screen {
        // year selector, total box and charts sit above a 35% table
        Screen::Category(_) => (content_height * 35 / 100).saturating_sub(3),
        // filter line, banner, borders, header
        Screen::Admin => content_height.saturating_sub(5),
        Screen::Home => content_height,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App) {
    if is_quit(&key) {
        app.running = false;
        return;
    }
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.switch_screen(Screen::all()[idx]);
        }
        KeyCode::Tab => app.next_screen(),
        KeyCode::BackTab => app.prev_screen(),
        KeyCode::Char('y') => app.step_year(true),
        KeyCode::Char('Y') => app.step_year(false),
        KeyCode::Char('r') => {
            app.request_reload();
            app.set_status("Refreshing…");
        }
        KeyCode::Char('c') if app.screen == Screen::Admin => {
            if app.require_admin() {
                app.admin.cycle_category_filter();
            }
        }
        KeyCode::Char('a') if app.screen == Screen::Admin => app.open_add_form(),
        KeyCode::Char('D') if app.screen == Screen::Admin => app.begin_delete(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Enter if app.screen == Screen::Admin && !app.is_authenticated() => {
            app.input_mode = InputMode::Login;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
}

fn handle_command_input(key: KeyEvent, app: &mut App, gateway: &mut Gateway) {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, gateway);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_login_input(key: KeyEvent, app: &mut App, gateway: &mut Gateway) {
    if is_quit(&key) {
        app.running = false;
        return;
    }
    match key.code {
        KeyCode::Enter => app.submit_login(gateway),
        KeyCode::Esc => app.switch_screen(Screen::Home),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.admin.login.toggle_focus();
        }
        KeyCode::Backspace => app.admin.login.pop_char(),
        KeyCode::Char(c) => app.admin.login.push_char(c),
        _ => {}
    }
}

fn handle_form_input(key: KeyEvent, app: &mut App, gateway: &mut Gateway) {
    if is_quit(&key) {
        app.running = false;
        return;
    }
    match key.code {
        KeyCode::Enter => {
            app.submit_add_form(gateway, Instant::now());
            return;
        }
        KeyCode::Esc => {
            app.admin.close_form();
            app.input_mode = InputMode::Normal;
            return;
        }
        _ => {}
    }
    let form = &mut app.admin.form;
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left if form.focus == FormField::Kategori => form.cycle_kategori(false),
        KeyCode::Right if form.focus == FormField::Kategori => form.cycle_kategori(true),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, gateway: &mut Gateway) {
    let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
    app.resolve_confirm(gateway, confirmed, Instant::now());
}

// ── Cursor movement ──────────────────────────────────────────

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Category(k) => {
            let view = app.category_mut(k);
            let len = view.visible.len();
            scroll_down(&mut view.index, &mut view.scroll, len, page);
        }
        Screen::Admin => {
            let admin = &mut app.admin;
            let len = admin.visible.len();
            scroll_down(&mut admin.index, &mut admin.scroll, len, page);
        }
        Screen::Home => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Category(k) => {
            let view = app.category_mut(k);
            scroll_up(&mut view.index, &mut view.scroll);
        }
        Screen::Admin => scroll_up(&mut app.admin.index, &mut app.admin.scroll),
        Screen::Home => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Category(k) => {
            let view = app.category_mut(k);
            scroll_to_top(&mut view.index, &mut view.scroll);
        }
        Screen::Admin => scroll_to_top(&mut app.admin.index, &mut app.admin.scroll),
        Screen::Home => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Category(k) => {
            let view = app.category_mut(k);
            let len = view.visible.len();
            scroll_to_bottom(&mut view.index, &mut view.scroll, len, page);
        }
        Screen::Admin => {
            let admin = &mut app.admin;
            let len = admin.visible.len();
            scroll_to_bottom(&mut admin.index, &mut admin.scroll, len, page);
        }
        Screen::Home => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Kategori;

    #[test]
    fn test_table_rows_per_screen() {
        assert_eq!(table_rows(Screen::Home, 40), 40);
        assert_eq!(table_rows(Screen::Admin, 40), 35);
        assert_eq!(table_rows(Screen::Category(Kategori::Pendapatan), 40), 11);
        assert_eq!(table_rows(Screen::Admin, 2), 0);
    }
}
