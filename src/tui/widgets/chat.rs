use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::ChatRole;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(area);

    draw_subjects(f, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(columns[1]);

    draw_messages(f, app, rows[0]);
    draw_input(f, app, rows[1]);
}

fn draw_subjects(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .subjects
        .items
        .iter()
        .map(|s| {
            let style = if s.id == app.chat.subject() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", s.icon)),
                Span::styled(s.name, style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Materias ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.subjects.selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_messages(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tutor ")
        .title_style(Style::default().fg(Color::Magenta));

    let messages = app.chat.messages();
    if messages.is_empty() {
        let hint = Paragraph::new("Elige una materia y pulsa i para escribir tu pregunta.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let mut text = Vec::new();
    for message in messages {
        let (who, color) = match message.role {
            ChatRole::User => (app.session.display_name(), Color::Cyan),
            ChatRole::Assistant => ("Tutor", Color::Green),
        };
        text.push(Line::from(Span::styled(
            format!("{}:", who),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        text.extend(message.content.lines().map(|l| Line::from(l.to_string())));
        text.push(Line::from(""));
    }
    if app.is_thinking() {
        text.push(Line::from(Span::styled(
            "Tutor está pensando...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the newest lines in view.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = text.len().saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, style) = if app.input_mode {
        (" Escribe (Enter para enviar) ", Style::default().fg(Color::Yellow))
    } else {
        (" Pulsa i para escribir ", Style::default().fg(Color::DarkGray))
    };

    let mut spans = vec![Span::raw(app.chat_input.as_str())];
    if app.input_mode {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style),
    );
    f.render_widget(input, area);
}
