pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Mode, Screen};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Home => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);

    match state.mode {
        Mode::List => screens::fails::render(frame, layout[1], state),
        Mode::Add | Mode::Edit => screens::form::render(frame, layout[1], state),
    }

    render_bottom_bar(frame, layout[2], state, &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .session
        .as_ref()
        .map(|session| session.name.as_str())
        .unwrap_or("-");
    let filter = state
        .filter
        .and_then(|index| state.users.get(index))
        .map(|user| user.name.as_str())
        .unwrap_or("All");

    let line = Line::from(vec![
        Span::styled("User", Style::default().fg(theme.dim)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Filter", Style::default().fg(theme.dim)),
        Span::raw(format!(": {filter}  ")),
        Span::styled(state.base_url.as_str(), Style::default().fg(theme.dim)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints: &[(&str, &str)] = match state.mode {
        Mode::List => &[
            ("a", "add"),
            ("e", "edit"),
            ("d", "delete"),
            ("f", "filter"),
            ("r", "refresh"),
            ("o", "logout"),
            ("q", "quit"),
        ],
        Mode::Add | Mode::Edit => &[("Tab", "next"), ("Enter", "save"), ("Esc", "cancel")],
    };

    let mut parts = Vec::new();
    for (index, (key, label)) in hints.iter().enumerate() {
        if index > 0 {
            parts.push(Span::raw("  "));
        }
        parts.push(Span::styled(*key, Style::default().fg(theme.accent)));
        parts.push(Span::raw(format!(" {label}")));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
