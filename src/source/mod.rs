//! Counter source abstraction.
//!
//! The refresh algorithms never touch the filesystem themselves; they read
//! through the traits below, so the registry and estimators are testable
//! with synthetic counters and any backing that satisfies these contracts
//! is acceptable. [`procfs::ProcSource`] is the real Linux implementation.
//!
//! A reading is valid only in comparison with a later reading of the same
//! counter for the same subject.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(target_os = "linux")]
pub mod procfs;

/// Process identifier as reported by the operating system. Stable for the
/// lifetime of the process, but the OS may reuse it after exit.
pub type Pid = u32;

/// A monotonic, non-negative counter reading.
pub type Ticks = u64;

/// System-wide CPU tick counters sampled at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTicks {
    /// Ticks spent doing work, across every non-idle time category.
    pub active: Ticks,
    /// All ticks including idle: the elapsed-time reference.
    pub total: Ticks,
}

/// Memory counters in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTotals {
    pub total_kb: u64,
    pub free_kb: u64,
    /// Reclaimable buffer memory, excluded from the "used" calculation.
    pub buffers_kb: u64,
}

/// Per-process reads. This narrower seam is all the process registry
/// needs, which keeps its tests down to a handful of stub methods.
pub trait ProcessProbe {
    /// Cumulative CPU ticks consumed by the process, children included.
    ///
    /// Fails with [`crate::MonitorError::ProcessGone`] once the pid is no
    /// longer valid.
    fn process_active_ticks(&self, pid: Pid) -> Result<Ticks>;

    /// Command line that launched the process.
    fn process_command(&self, pid: Pid) -> Result<String>;

    /// Name of the user owning the process.
    fn process_owner(&self, pid: Pid) -> Result<String>;

    /// Resident set size in kilobytes.
    fn process_resident_kb(&self, pid: Pid) -> Result<u64>;

    /// Seconds since the process started.
    fn process_uptime_seconds(&self, pid: Pid) -> Result<u64>;
}

/// Point-in-time readings of system-wide monotonic counters and
/// enumerable system facts.
pub trait CounterSource: ProcessProbe {
    /// Identifiers of every live process, in enumeration order.
    ///
    /// Fails with [`crate::MonitorError::SourceUnavailable`] if the
    /// enumeration cannot be performed at all.
    fn process_identifiers(&self) -> Result<Vec<Pid>>;

    /// System-wide active and total CPU ticks.
    fn system_ticks(&self) -> Result<SystemTicks>;

    /// Total, free, and buffer memory.
    fn memory_totals(&self) -> Result<MemoryTotals>;

    /// System uptime in seconds.
    fn elapsed_seconds(&self) -> Result<u64>;

    /// Clock ticks per second of elapsed time; scales `elapsed_seconds`
    /// into the per-process reference counter.
    fn ticks_per_second(&self) -> Ticks;

    /// Number of processes created since boot.
    fn total_processes(&self) -> Result<u64>;

    /// Number of processes currently in the running state.
    fn running_processes(&self) -> Result<u64>;

    /// Kernel release string.
    fn kernel_version(&self) -> Result<String>;

    /// Human-readable operating system name.
    fn os_pretty_name(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_ticks_serialization() {
        let ticks = SystemTicks {
            active: 50_459_705,
            total: 463_331_907,
        };
        let json = serde_json::to_string(&ticks).unwrap();
        let back: SystemTicks = serde_json::from_str(&json).unwrap();
        assert_eq!(ticks, back);
    }

    #[test]
    fn test_memory_totals_serialization() {
        let mem = MemoryTotals {
            total_kb: 16_384_000,
            free_kb: 4_096_000,
            buffers_kb: 512_000,
        };
        let json = serde_json::to_string(&mem).unwrap();
        assert!(json.contains("buffers_kb"));
        let back: MemoryTotals = serde_json::from_str(&json).unwrap();
        assert_eq!(mem, back);
    }
}
