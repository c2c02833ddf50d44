use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::{App, View};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let p = &app.report.progress;
    let welcome = vec![
        Line::from(Span::styled(
            format!("¡Hola, {}! 👋", app.session.display_name()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Aprende jugando: juegos para la atención, un tutor para tus preguntas"),
        Line::from("y una guía con consejos para la familia."),
        Line::from(vec![
            Span::styled("Nivel ", Style::default().fg(Color::Gray)),
            Span::styled(p.level.to_string(), Style::default().fg(Color::Cyan)),
            Span::styled("  ·  Puntos ", Style::default().fg(Color::Gray)),
            Span::styled(p.total_score.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Inicio ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(
        Paragraph::new(welcome).block(block).wrap(Wrap { trim: true }),
        chunks[0],
    );

    let links: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, view)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<20}", view.title()), Style::default().fg(Color::White)),
                Span::styled(view.path(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ¿A dónde vamos? ")
        .title_style(Style::default().fg(Color::Magenta));
    f.render_widget(Paragraph::new(links).block(block), chunks[1]);
}
