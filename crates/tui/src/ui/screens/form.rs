use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::{
    app::{AppState, FormField},
    ui::Theme,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let title = if state.form.editing.is_some() {
        " edit fail "
    } else {
        " new fail "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Name
            Constraint::Length(2), // Description
            Constraint::Length(2), // Author
            Constraint::Length(1), // Message
        ])
        .margin(1)
        .split(inner);

    render_input(
        frame,
        rows[0],
        "name",
        &state.form.name,
        state.form.focus == FormField::Name,
        &theme,
    );
    render_input(
        frame,
        rows[1],
        "description",
        &state.form.description,
        state.form.focus == FormField::Description,
        &theme,
    );
    render_input(
        frame,
        rows[2],
        "author (optional)",
        &state.form.author,
        state.form.focus == FormField::Author,
        &theme,
    );

    if let Some(message) = &state.form.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            )),
            rows[3],
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            label.to_string(),
            Style::default().fg(theme.dim),
        )),
        rows[0],
    );

    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!("{value}{cursor}"), style)),
        rows[1],
    );
}
