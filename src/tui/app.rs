//! Application state for the dashboard.

use log::warn;

use crate::process::Process;
use crate::registry::RankBy;
use crate::source::procfs::ProcSource;
use crate::system::System;

/// Snapshot of everything one frame renders, refreshed once per tick.
pub struct App {
    system: System<ProcSource>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub uptime_seconds: u64,
    pub total_processes: u64,
    pub running_processes: u64,
    pub rows: Vec<Process>,
    pub scroll: usize,
}

impl App {
    pub fn new() -> crate::Result<Self> {
        let system = System::new(ProcSource::new())?;
        Ok(Self {
            system,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            uptime_seconds: 0,
            total_processes: 0,
            running_processes: 0,
            rows: Vec::new(),
            scroll: 0,
        })
    }

    /// Run one refresh cycle. A source failure suspends this refresh and
    /// keeps the previous frame's data; it never tears down the loop.
    pub fn refresh(&mut self) {
        if let Err(err) = self.try_refresh() {
            warn!("refresh suspended: {err}");
        }
    }

    fn try_refresh(&mut self) -> crate::Result<()> {
        self.cpu_percent = self.system.cpu_utilization()? * 100.0;
        self.memory_percent = self.system.memory_utilization()? * 100.0;
        self.uptime_seconds = self.system.uptime()?;
        self.total_processes = self.system.total_processes()?;
        self.running_processes = self.system.running_processes()?;
        self.rows = self.system.processes()?.to_vec();
        self.scroll = self.scroll.min(self.rows.len().saturating_sub(1));
        Ok(())
    }

    pub fn kernel(&self) -> &str {
        self.system.kernel()
    }

    pub fn operating_system(&self) -> &str {
        self.system.operating_system()
    }

    pub fn ranking(&self) -> RankBy {
        self.system.ranking()
    }

    /// Re-rank the current rows immediately so the keypress is visible
    /// before the next tick; no counters are touched until then.
    pub fn set_ranking(&mut self, rank: RankBy) {
        self.system.set_ranking(rank);
        self.rows.sort_by(|a, b| rank.order(a, b));
        self.scroll = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll + 1 < self.rows.len() {
            self.scroll += 1;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }
}
