use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats + level
            Constraint::Min(0),    // Achievements + activity
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_stats(f, app, top_chunks[0]);
    draw_level(f, app, top_chunks[1]);
    draw_achievements(f, app, bottom_chunks[0]);
    draw_recent_activity(f, app, bottom_chunks[1]);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let report = &app.report;
    let p = &report.progress;

    let text = vec![
        stat_line("Puntos", p.total_score.to_string(), Color::Yellow),
        stat_line("Nivel", format!("{} ({})", p.level, p.level_label()), Color::Cyan),
        stat_line("Juegos", p.games_completed.to_string(), Color::Green),
        stat_line("Preguntas", p.questions_answered.to_string(), Color::Magenta),
        stat_line(
            "Logros",
            format!("{}/{}", report.unlocked_count(), report.achievements.len()),
            Color::White,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Progreso de {} ", report.display_name))
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_level(f: &mut Frame, app: &App, area: Rect) {
    let report = &app.report;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Nivel {} ", report.progress.level))
                .title_style(Style::default().fg(Color::Yellow)),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .percent(report.level_percent())
        .label(format!(
            "{} puntos para el nivel {}",
            report.points_to_next_level,
            report.progress.level + 1
        ));

    f.render_widget(gauge, area);
}

fn draw_achievements(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .report
        .achievements
        .iter()
        .map(|state| {
            let a = &state.achievement;
            let (icon, style) = if state.unlocked {
                (a.icon, Style::default().fg(Color::Yellow))
            } else {
                ("🔒", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", icon)),
                Span::styled(format!("{:<12}", a.name), style.add_modifier(Modifier::BOLD)),
                Span::styled(a.description, style),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Logros ")
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(List::new(items).block(block), area);
}

fn draw_recent_activity(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Actividad Reciente ")
        .title_style(Style::default().fg(Color::Magenta));

    if app.report.recent_activity.is_empty() {
        let paragraph = Paragraph::new("Todavía no hay actividad. ¡Juega o pregunta algo!")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .report
        .recent_activity
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", format_date(&record.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!("{} ", record.activity_type.icon())),
                Span::styled(
                    format!("{:<24}", truncate(&record.activity_name, 22)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("+{}", record.points_earned),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn format_date(date_str: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        dt.format("%d/%m").to_string()
    } else {
        date_str.chars().take(10).collect()
    }
}
