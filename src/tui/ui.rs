//! Frame rendering.
//!
//! Layout, top to bottom:
//! - Header: OS, kernel, uptime, process counts
//! - Gauges: CPU and memory utilization with threshold colors
//! - Process table: PID, USER, CPU%, MEM, TIME, COMMAND
//! - Footer: key help

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Row, Table},
    Frame,
};

use super::app::App;
use crate::format;
use crate::registry::RankBy;

/// Threshold color for a utilization percentage.
fn threshold_color(percent: f32) -> Color {
    match percent {
        p if p >= 90.0 => Color::Red,
        p if p >= 70.0 => Color::Yellow,
        p if p >= 50.0 => Color::Cyan,
        _ => Color::Green,
    }
}

/// Clamp a percentage into the range the gauge widget accepts.
fn safe_percent(value: f32) -> u16 {
    if value.is_nan() || value < 0.0 {
        0
    } else if value > 100.0 {
        100
    } else {
        value as u16
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_gauges(f, app, chunks[1]);
    draw_process_table(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "pmon",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " — {} · {}",
            app.operating_system(),
            app.kernel()
        )),
    ]);
    let facts = Line::from(Span::raw(format!(
        "up {} · {} processes · {} running",
        format::elapsed_hms(app.uptime_seconds),
        app.total_processes,
        app.running_processes,
    )));
    f.render_widget(Paragraph::new(vec![title, facts]), area);
}

fn draw_gauges(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let cpu = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("CPU"))
        .gauge_style(Style::default().fg(threshold_color(app.cpu_percent)))
        .percent(safe_percent(app.cpu_percent))
        .label(format!("{:.1}%", app.cpu_percent));
    f.render_widget(cpu, halves[0]);

    let memory = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Memory"))
        .gauge_style(Style::default().fg(threshold_color(app.memory_percent)))
        .percent(safe_percent(app.memory_percent))
        .label(format!("{:.1}%", app.memory_percent));
    f.render_widget(memory, halves[1]);
}

fn draw_process_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["PID", "USER", "CPU%", "MEM", "TIME", "COMMAND"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let visible = area.height.saturating_sub(3) as usize;
    let rows = app.rows.iter().skip(app.scroll).take(visible).map(|p| {
        let cpu_percent = p.utilization() * 100.0;
        Row::new(vec![
            p.pid().to_string(),
            p.user().to_string(),
            format!("{cpu_percent:.1}"),
            format::kb_auto_unit(p.resident_kb()),
            format::elapsed_hms(p.uptime_seconds()),
            p.command().to_string(),
        ])
        .style(Style::default().fg(threshold_color(cpu_percent)))
    });

    let rank_label = match app.ranking() {
        RankBy::Cpu => "by cpu",
        RankBy::Memory => "by mem",
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Processes ({rank_label})")),
    )
    .column_spacing(1);
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        format!(
            "q quit · c rank by cpu · m rank by mem · ↑/↓ scroll · {} tracked",
            app.rows.len()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(help, area);
}
