use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let items: Vec<ListItem> = app
        .guides
        .items
        .iter()
        .map(|g| ListItem::new(format!("{} {}", g.icon, g.name)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Categorías ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.guides.selected);
    f.render_stateful_widget(list, chunks[0], &mut state);

    draw_tips(f, app, chunks[1]);
}

fn draw_tips(f: &mut Frame, app: &App, area: Rect) {
    let Some(category) = app.guides.selected_item() else {
        return;
    };

    let mut text = vec![
        Line::from(Span::styled(
            category.description,
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];
    for tip in category.tips {
        text.push(Line::from(Span::styled(
            tip.title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        text.push(Line::from(tip.content));
        for example in tip.examples {
            text.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(Color::Green)),
                Span::raw(*example),
            ]));
        }
        text.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Guía para Padres · {} ", category.name))
        .title_style(Style::default().fg(Color::Magenta));

    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
