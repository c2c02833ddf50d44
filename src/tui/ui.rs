use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{chat, games, guide, home, progress};
use super::{App, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = View::ALL.iter().map(View::title).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Aprende · {} ", app.session.display_name())),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Home => home::draw(f, app, area),
        View::Games => games::draw(f, app, area),
        View::Chat => chat::draw(f, app, area),
        View::Progress => progress::draw(f, app, area),
        View::Guide => guide::draw(f, app, area),
    }
}

fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    match &app.status {
        Some(status) => spans.push(Span::styled(
            format!("{}  ", status),
            Style::default().fg(Color::Yellow),
        )),
        None if !app.input_mode => spans.push(Span::styled(
            format!("💬 {}  ", app.view.hint()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
        )),
        None => {}
    }

    if app.input_mode {
        spans.extend(vec![
            key("<CR>"),
            Span::raw(" Enviar  "),
            key("<Esc>"),
            Span::raw(" Salir de escritura"),
        ]);
    } else {
        spans.extend(vec![key("h/l"), Span::raw(" Secciones  ")]);

        match app.view {
            View::Home => spans.extend(vec![key("1-5"), Span::raw(" Ir a  ")]),
            View::Games => spans.extend(vec![
                key("j/k"),
                Span::raw(" Mover  "),
                key("<CR>"),
                Span::raw(" Detalles  "),
            ]),
            View::Chat => spans.extend(vec![
                key("j/k"),
                Span::raw(" Materia  "),
                key("<CR>"),
                Span::raw(" Elegir  "),
                key("i"),
                Span::raw(" Escribir  "),
            ]),
            View::Progress => spans.extend(vec![key("^r"), Span::raw(" Actualizar  ")]),
            View::Guide => spans.extend(vec![key("j/k"), Span::raw(" Categoría  ")]),
        }

        spans.extend(vec![key("q"), Span::raw(" Salir")]);
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}
