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
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = app
        .games
        .items
        .iter()
        .map(|game| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", game.icon)),
                Span::styled(game.name, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {}", game.duration),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Juegos ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.games.selected);
    f.render_stateful_widget(list, chunks[0], &mut state);

    draw_detail(f, app, chunks[1]);
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Detalles ")
        .title_style(Style::default().fg(Color::Yellow));

    let Some(game) = app.games.selected_item() else {
        f.render_widget(Paragraph::new("No hay juegos.").block(block), area);
        return;
    };

    let mut text = vec![
        Line::from(Span::styled(
            format!("{} {}", game.icon, game.name),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(game.description),
        Line::from(""),
        Line::from(vec![
            Span::styled("Habilidades: ", Style::default().fg(Color::Gray)),
            Span::styled(game.skills.join(", "), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Duración: ", Style::default().fg(Color::Gray)),
            Span::raw(game.duration),
        ]),
    ];

    if app.game_open {
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Para jugar: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("aprende play {}", game.kind.as_str()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
