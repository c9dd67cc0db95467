//! Terminal User Interface for the process monitor.
//!
//! An interactive dashboard built on ratatui: CPU and memory gauges, a
//! system facts line, and the ranked process table. Refreshes run on the
//! UI thread between input polls, so no two refresh cycles ever overlap.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, prelude::Backend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use crate::registry::RankBy;

mod app;
mod ui;

pub use app::App;

/// Run the dashboard until the user quits.
pub fn run(interval: Duration) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new()?;
    let res = run_app(&mut terminal, &mut app, interval);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    // First sample is a cumulative warm-up; take it before drawing so the
    // next tick already shows instantaneous rates.
    app.refresh();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') => app.set_ranking(RankBy::Cpu),
                        KeyCode::Char('m') => app.set_ranking(RankBy::Memory),
                        KeyCode::Up => app.scroll_up(),
                        KeyCode::Down => app.scroll_down(),
                        KeyCode::Home => app.scroll_to_top(),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= interval {
            app.refresh();
            last_tick = Instant::now();
        }
    }
}
