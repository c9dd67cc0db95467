//! # proc-monitor
//!
//! Core library behind `pmon`, a `top`-style live process and system
//! monitor. The hard part is not the display loop but deriving rate-based
//! metrics (per-process and system-wide CPU utilization) from cumulative,
//! monotonically increasing counters sampled at irregular intervals, while
//! keeping the tracked process set consistent across refresh cycles.
//!
//! The crate is split along that line:
//!
//! - [`rate::RateEstimator`] turns two time-ordered counter readings into a
//!   utilization fraction.
//! - [`registry::ProcessRegistry`] owns the tracked [`process::Process`]
//!   entities, reconciles them against the live pid list each cycle, and
//!   produces the ranked view.
//! - [`system::System`] composes the system-wide estimator, the memory
//!   snapshot, and the registry into one queryable object.
//! - [`source::CounterSource`] abstracts the raw readings so the algorithms
//!   are testable with synthetic counters; [`source::procfs::ProcSource`]
//!   is the real Linux `/proc` implementation.
//!
//! Refreshes are strictly serialized: every sampling operation takes
//! `&mut self`, so two refresh cycles on the same [`system::System`] cannot
//! overlap and no estimator ever observes a half-updated previous value.
//!
//! # Examples
//!
//! ```no_run
//! use pmonlib::{ProcSource, System};
//!
//! # fn main() -> pmonlib::Result<()> {
//! let mut system = System::new(ProcSource::new())?;
//! println!("{} / {}", system.operating_system(), system.kernel());
//!
//! // Second and later refreshes yield instantaneous rates; the first is a
//! // cumulative warm-up sample.
//! let cpu = system.cpu_utilization()?;
//! println!("cpu: {:.1}%", cpu * 100.0);
//! for process in system.processes()?.iter().take(10) {
//!     println!("{:>7} {:>5.1}% {}", process.pid(), process.utilization() * 100.0, process.command());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod format;
pub mod process;
pub mod rate;
pub mod registry;
pub mod source;
pub mod system;

#[cfg(all(feature = "cli", target_os = "linux"))]
pub mod tui;

pub use error::{MonitorError, Result};
pub use process::Process;
pub use rate::RateEstimator;
pub use registry::{ProcessRegistry, RankBy};
pub use source::{CounterSource, MemoryTotals, Pid, ProcessProbe, SystemTicks, Ticks};
pub use system::System;

#[cfg(target_os = "linux")]
pub use source::procfs::ProcSource;
