//! Top-level query surface combining system-wide and per-process metrics.

use crate::error::Result;
use crate::process::Process;
use crate::rate::RateEstimator;
use crate::registry::{ProcessRegistry, RankBy};
use crate::source::CounterSource;

/// System aggregate: one system-wide CPU [`RateEstimator`], one
/// [`ProcessRegistry`], the memory snapshot, and the identification
/// strings captured at startup.
///
/// Generic over the injected [`CounterSource`] so the whole aggregate runs
/// against synthetic counters in tests. Every sampling operation takes
/// `&mut self`; overlapping refreshes on one instance cannot compile, and
/// the estimators' previous-value state is only ever updated by a cycle
/// that ran to completion.
pub struct System<S: CounterSource> {
    source: S,
    cpu: RateEstimator,
    registry: ProcessRegistry,
    kernel: String,
    operating_system: String,
}

impl<S: CounterSource> System<S> {
    /// Capture kernel and OS identification once. Failure here is fatal:
    /// these values are never re-queried, so a source that cannot provide
    /// them at startup is unusable.
    pub fn new(source: S) -> Result<Self> {
        let kernel = source.kernel_version()?;
        let operating_system = source.os_pretty_name()?;
        Ok(Self {
            source,
            cpu: RateEstimator::new(),
            registry: ProcessRegistry::new(),
            kernel,
            operating_system,
        })
    }

    /// System-wide CPU utilization over the interval since the previous
    /// call. The first call yields a cumulative warm-up value.
    pub fn cpu_utilization(&mut self) -> Result<f32> {
        let ticks = self.source.system_ticks()?;
        Ok(self.cpu.update(ticks.active, ticks.total))
    }

    /// Fraction of non-reclaimable memory in use:
    /// `1 - free / (total - buffers)`. A degenerate source reporting a
    /// zero denominator yields `0.0`, never NaN or infinity.
    pub fn memory_utilization(&self) -> Result<f32> {
        let memory = self.source.memory_totals()?;
        let usable_kb = memory.total_kb.saturating_sub(memory.buffers_kb);
        if usable_kb == 0 {
            return Ok(0.0);
        }
        let utilization = 1.0 - memory.free_kb as f32 / usable_kb as f32;
        Ok(utilization.clamp(0.0, 1.0))
    }

    /// Refresh the process registry against the current live pid list and
    /// return the tracked processes in ranked order.
    ///
    /// This is the single heavy operation of the aggregate and runs on
    /// every UI tick. Per-process read failures are absorbed by the
    /// registry; only a wholesale enumeration failure propagates.
    pub fn processes(&mut self) -> Result<&[Process]> {
        let live = self.source.process_identifiers()?;
        let reference_ticks = self.source.elapsed_seconds()? * self.source.ticks_per_second();
        Ok(self.registry.refresh(&live, &self.source, reference_ticks))
    }

    /// System uptime in seconds.
    pub fn uptime(&self) -> Result<u64> {
        self.source.elapsed_seconds()
    }

    /// Number of processes created since boot.
    pub fn total_processes(&self) -> Result<u64> {
        self.source.total_processes()
    }

    /// Number of processes currently running.
    pub fn running_processes(&self) -> Result<u64> {
        self.source.running_processes()
    }

    /// Kernel release, captured at construction.
    pub fn kernel(&self) -> &str {
        &self.kernel
    }

    /// Operating system name, captured at construction.
    pub fn operating_system(&self) -> &str {
        &self.operating_system
    }

    /// Swap the ranking applied by the next [`System::processes`] call.
    pub fn set_ranking(&mut self, rank: RankBy) {
        self.registry.set_ranking(rank);
    }

    pub fn ranking(&self) -> RankBy {
        self.registry.ranking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};
    use crate::source::{MemoryTotals, Pid, ProcessProbe, SystemTicks, Ticks};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Scriptable counter source; tests mutate its cells between
    /// refreshes to simulate counter advancement.
    struct FakeSource {
        pids: RefCell<Vec<Pid>>,
        ticks: RefCell<HashMap<Pid, Ticks>>,
        system: Cell<SystemTicks>,
        memory: Cell<MemoryTotals>,
        elapsed: Cell<u64>,
        kernel: RefCell<String>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                pids: RefCell::new(Vec::new()),
                ticks: RefCell::new(HashMap::new()),
                system: Cell::new(SystemTicks {
                    active: 0,
                    total: 0,
                }),
                memory: Cell::new(MemoryTotals {
                    total_kb: 1000,
                    free_kb: 200,
                    buffers_kb: 100,
                }),
                elapsed: Cell::new(0),
                kernel: RefCell::new("6.8.0-test".to_string()),
            }
        }

        fn set_processes(&self, pids: &[Pid], ticks: &[(Pid, Ticks)]) {
            *self.pids.borrow_mut() = pids.to_vec();
            *self.ticks.borrow_mut() = ticks.iter().copied().collect();
        }
    }

    impl ProcessProbe for FakeSource {
        fn process_active_ticks(&self, pid: Pid) -> Result<Ticks> {
            self.ticks
                .borrow()
                .get(&pid)
                .copied()
                .ok_or(MonitorError::ProcessGone(pid))
        }
        fn process_command(&self, pid: Pid) -> Result<String> {
            Ok(format!("cmd-{pid}"))
        }
        fn process_owner(&self, _pid: Pid) -> Result<String> {
            Ok("tester".to_string())
        }
        fn process_resident_kb(&self, _pid: Pid) -> Result<u64> {
            Ok(0)
        }
        fn process_uptime_seconds(&self, _pid: Pid) -> Result<u64> {
            Ok(0)
        }
    }

    impl CounterSource for FakeSource {
        fn process_identifiers(&self) -> Result<Vec<Pid>> {
            Ok(self.pids.borrow().clone())
        }
        fn system_ticks(&self) -> Result<SystemTicks> {
            Ok(self.system.get())
        }
        fn memory_totals(&self) -> Result<MemoryTotals> {
            Ok(self.memory.get())
        }
        fn elapsed_seconds(&self) -> Result<u64> {
            Ok(self.elapsed.get())
        }
        fn ticks_per_second(&self) -> Ticks {
            1
        }
        fn total_processes(&self) -> Result<u64> {
            Ok(31)
        }
        fn running_processes(&self) -> Result<u64> {
            Ok(3)
        }
        fn kernel_version(&self) -> Result<String> {
            Ok(self.kernel.borrow().clone())
        }
        fn os_pretty_name(&self) -> Result<String> {
            Ok("Test Linux".to_string())
        }
    }

    fn utilization_of(processes: &[Process], pid: Pid) -> f32 {
        processes
            .iter()
            .find(|p| p.pid() == pid)
            .unwrap()
            .utilization()
    }

    #[test]
    fn test_memory_utilization() {
        // total=1000, free=200, buffers=100 -> 1 - 200/900
        let system = System::new(FakeSource::new()).unwrap();
        let utilization = system.memory_utilization().unwrap();
        assert!((utilization - (1.0 - 200.0 / 900.0)).abs() < 1e-6);
    }

    #[test]
    fn test_memory_utilization_degenerate_denominator() {
        let source = FakeSource::new();
        source.memory.set(MemoryTotals {
            total_kb: 100,
            free_kb: 50,
            buffers_kb: 100,
        });
        let system = System::new(source).unwrap();
        assert_eq!(system.memory_utilization().unwrap(), 0.0);
    }

    #[test]
    fn test_cpu_utilization_across_cycles() {
        let source = FakeSource::new();
        source.system.set(SystemTicks {
            active: 100,
            total: 1000,
        });
        let mut system = System::new(source).unwrap();
        assert!((system.cpu_utilization().unwrap() - 0.1).abs() < 1e-6);

        system.source.system.set(SystemTicks {
            active: 300,
            total: 2000,
        });
        assert!((system.cpu_utilization().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_end_to_end_two_refresh_cycles() {
        let source = FakeSource::new();
        source.set_processes(&[10, 20], &[(10, 100), (20, 50)]);
        source.elapsed.set(1000);
        let mut system = System::new(source).unwrap();

        // First refresh: warm-up values against the implicit zero baseline.
        let processes = system.processes().unwrap();
        assert_eq!(processes.len(), 2);
        assert!((utilization_of(processes, 10) - 0.1).abs() < 1e-6);
        assert!((utilization_of(processes, 20) - 0.05).abs() < 1e-6);

        system
            .source
            .set_processes(&[10, 20], &[(10, 150), (20, 70)]);
        system.source.elapsed.set(1100);

        // Second refresh: true instantaneous rates.
        let processes = system.processes().unwrap();
        assert!((utilization_of(processes, 10) - 0.5).abs() < 1e-6);
        assert!((utilization_of(processes, 20) - 0.2).abs() < 1e-6);
        // Ranked descending by utilization.
        assert_eq!(processes[0].pid(), 10);
    }

    #[test]
    fn test_identification_is_cached_at_construction() {
        let source = FakeSource::new();
        let system = System::new(source).unwrap();
        assert_eq!(system.kernel(), "6.8.0-test");
        assert_eq!(system.operating_system(), "Test Linux");

        // The source changing later must not be observable.
        *system.source.kernel.borrow_mut() = "7.0.0-other".to_string();
        assert_eq!(system.kernel(), "6.8.0-test");
    }

    #[test]
    fn test_pass_through_reads() {
        let source = FakeSource::new();
        source.elapsed.set(769125);
        let system = System::new(source).unwrap();
        assert_eq!(system.uptime().unwrap(), 769125);
        assert_eq!(system.total_processes().unwrap(), 31);
        assert_eq!(system.running_processes().unwrap(), 3);
    }

    #[test]
    fn test_ranking_is_forwarded() {
        let mut system = System::new(FakeSource::new()).unwrap();
        assert_eq!(system.ranking(), RankBy::Cpu);
        system.set_ranking(RankBy::Memory);
        assert_eq!(system.ranking(), RankBy::Memory);
    }
}
