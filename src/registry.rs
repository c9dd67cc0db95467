//! Process set reconciliation and ranking.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;

use crate::process::Process;
use crate::source::{Pid, ProcessProbe, Ticks};

/// Ranking key for the presentation order.
///
/// An explicit, swappable key rather than an ordering baked into the
/// entity type, so a caller can re-rank (CPU, memory) without touching
/// [`Process`]. All sorts are stable: rows with equal keys keep their
/// prior relative order across refreshes instead of jittering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    /// CPU utilization, descending.
    #[default]
    Cpu,
    /// Resident set size, descending.
    Memory,
}

impl RankBy {
    /// Comparison applied by the registry's stable sort, public so a
    /// presentation layer can re-rank an existing row set between
    /// refreshes.
    pub fn order(self, a: &Process, b: &Process) -> Ordering {
        match self {
            RankBy::Cpu => b
                .utilization()
                .partial_cmp(&a.utilization())
                .unwrap_or(Ordering::Equal),
            RankBy::Memory => b.resident_kb().cmp(&a.resident_kb()),
        }
    }
}

/// Owns every tracked [`Process`] and keeps that set consistent with the
/// live pid list across refresh cycles.
///
/// The registry is the exclusive owner of its entities; they are only ever
/// mutated inside [`ProcessRegistry::refresh`], which runs to completion
/// before its result is consumed.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: Vec<Process>,
    rank: RankBy,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the ranking policy applied by the next refresh.
    pub fn set_ranking(&mut self, rank: RankBy) {
        self.rank = rank;
    }

    pub fn ranking(&self) -> RankBy {
        self.rank
    }

    /// Reconcile the owned set against `live`, update every entity's
    /// utilization, and return the entities ranked for presentation.
    ///
    /// - Pids in `live` without an entity get one, with a fresh estimator
    ///   and zero previous counters. A reused pid is an unrelated new
    ///   process as far as the registry is concerned.
    /// - Entities whose pid is absent from `live` are dropped; afterwards
    ///   the owned pid set is always a subset of `live`.
    /// - A probe error for one pid leaves that entity's values unchanged
    ///   for the cycle; it never fails the refresh.
    pub fn refresh(
        &mut self,
        live: &[Pid],
        probe: &dyn ProcessProbe,
        reference_ticks: Ticks,
    ) -> &[Process] {
        let mut owned: HashSet<Pid> = self.processes.iter().map(Process::pid).collect();
        let before = self.processes.len();

        for &pid in live {
            if owned.insert(pid) {
                self.processes.push(Process::new(pid, probe));
            }
        }
        let added = self.processes.len() - before;

        let live_set: HashSet<Pid> = live.iter().copied().collect();
        let with_new = self.processes.len();
        self.processes.retain(|p| live_set.contains(&p.pid()));
        let dropped = with_new - self.processes.len();

        if added > 0 || dropped > 0 {
            debug!(
                "reconciled process set: {added} added, {dropped} dropped, {} tracked",
                self.processes.len()
            );
        }

        for process in &mut self.processes {
            if let Ok(active) = probe.process_active_ticks(process.pid()) {
                process.update_utilization(active, reference_ticks);
            }
            process.refresh_description(probe);
        }

        let rank = self.rank;
        self.processes.sort_by(|a, b| rank.order(a, b));
        &self.processes
    }

    /// Entities in their last ranked order, without refreshing.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
