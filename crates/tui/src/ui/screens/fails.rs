use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{app::AppState, ui::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    let items: Vec<ListItem> = state
        .fails
        .items
        .iter()
        .map(|fail| {
            let creator = fail.created_by_name.as_deref().unwrap_or("?");
            ListItem::new(Line::from(vec![
                Span::styled(fail.name.clone(), Style::default().fg(theme.text)),
                Span::styled(
                    format!("  by {} ({})", fail.author, creator),
                    Style::default().fg(theme.dim),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" coding fails ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if !state.fails.items.is_empty() {
        list_state.select(Some(state.fails.selected));
    }
    frame.render_stateful_widget(list, layout[0], &mut list_state);

    render_detail(frame, layout[1], state, &theme);
}

fn render_detail(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .title(" description ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    let text = if let Some(error) = &state.fails.error {
        Span::styled(error.as_str(), Style::default().fg(theme.error))
    } else if let Some(fail) = state.fails.items.get(state.fails.selected) {
        Span::styled(fail.description.as_str(), Style::default().fg(theme.text))
    } else {
        Span::styled("No coding fails yet.", Style::default().fg(theme.dim))
    };

    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
        area,
    );
}
