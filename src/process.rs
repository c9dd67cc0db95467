//! A single tracked process.

use serde::Serialize;

use crate::rate::RateEstimator;
use crate::source::{Pid, ProcessProbe, Ticks};

/// One tracked process: its identity plus the metrics derived for it
/// during the most recent refresh cycle.
///
/// Entities are created and owned exclusively by the
/// [`crate::ProcessRegistry`]; nothing else holds a reference to one. An
/// entity created for a reused pid starts a fresh counter history and has
/// no relation to any prior process with the same pid.
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    pid: Pid,
    #[serde(skip)]
    estimator: RateEstimator,
    /// CPU utilization fraction in `[0, 1]` from the last refresh.
    utilization: f32,
    command: String,
    user: String,
    resident_kb: u64,
    uptime_seconds: u64,
}

impl Process {
    /// A new entity starts with a fresh estimator and zero previous
    /// counters. The command line is captured once here; the process
    /// image does not change over its lifetime.
    pub(crate) fn new(pid: Pid, probe: &dyn ProcessProbe) -> Self {
        Self {
            pid,
            estimator: RateEstimator::new(),
            utilization: 0.0,
            command: probe.process_command(pid).unwrap_or_default(),
            user: String::new(),
            resident_kb: 0,
            uptime_seconds: 0,
        }
    }

    /// Drive the rate estimator with this cycle's counter readings.
    pub(crate) fn update_utilization(&mut self, active_ticks: Ticks, reference_ticks: Ticks) {
        self.utilization = self.estimator.update(active_ticks, reference_ticks);
    }

    /// Refresh the descriptive fields consumed by presentation. A failed
    /// read keeps the last known value: the process most likely exited
    /// mid-cycle and will be dropped at the next reconciliation.
    pub(crate) fn refresh_description(&mut self, probe: &dyn ProcessProbe) {
        if let Ok(user) = probe.process_owner(self.pid) {
            self.user = user;
        }
        if let Ok(resident_kb) = probe.process_resident_kb(self.pid) {
            self.resident_kb = resident_kb;
        }
        if let Ok(uptime) = probe.process_uptime_seconds(self.pid) {
            self.uptime_seconds = uptime;
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// CPU utilization fraction from the last refresh cycle.
    pub fn utilization(&self) -> f32 {
        self.utilization
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Resident set size in kilobytes.
    pub fn resident_kb(&self) -> u64 {
        self.resident_kb
    }

    /// Seconds since the process started.
    pub fn uptime_seconds(&self) -> u64 {
        self.uptime_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};

    struct StubProbe;

    impl ProcessProbe for StubProbe {
        fn process_active_ticks(&self, _pid: Pid) -> Result<Ticks> {
            Ok(0)
        }
        fn process_command(&self, pid: Pid) -> Result<String> {
            Ok(format!("/usr/bin/stub-{pid}"))
        }
        fn process_owner(&self, _pid: Pid) -> Result<String> {
            Ok("tester".to_string())
        }
        fn process_resident_kb(&self, _pid: Pid) -> Result<u64> {
            Ok(2048)
        }
        fn process_uptime_seconds(&self, _pid: Pid) -> Result<u64> {
            Ok(90)
        }
    }

    struct GoneProbe;

    impl ProcessProbe for GoneProbe {
        fn process_active_ticks(&self, pid: Pid) -> Result<Ticks> {
            Err(MonitorError::ProcessGone(pid))
        }
        fn process_command(&self, pid: Pid) -> Result<String> {
            Err(MonitorError::ProcessGone(pid))
        }
        fn process_owner(&self, pid: Pid) -> Result<String> {
            Err(MonitorError::ProcessGone(pid))
        }
        fn process_resident_kb(&self, pid: Pid) -> Result<u64> {
            Err(MonitorError::ProcessGone(pid))
        }
        fn process_uptime_seconds(&self, pid: Pid) -> Result<u64> {
            Err(MonitorError::ProcessGone(pid))
        }
    }

    #[test]
    fn test_new_entity_captures_command_and_zero_metrics() {
        let process = Process::new(7, &StubProbe);
        assert_eq!(process.pid(), 7);
        assert_eq!(process.command(), "/usr/bin/stub-7");
        assert_eq!(process.utilization(), 0.0);
        assert_eq!(process.resident_kb(), 0);
    }

    #[test]
    fn test_refresh_description_fills_fields() {
        let mut process = Process::new(7, &StubProbe);
        process.refresh_description(&StubProbe);
        assert_eq!(process.user(), "tester");
        assert_eq!(process.resident_kb(), 2048);
        assert_eq!(process.uptime_seconds(), 90);
    }

    #[test]
    fn test_refresh_description_keeps_last_value_when_gone() {
        let mut process = Process::new(7, &StubProbe);
        process.refresh_description(&StubProbe);
        process.refresh_description(&GoneProbe);
        assert_eq!(process.user(), "tester");
        assert_eq!(process.resident_kb(), 2048);
    }

    #[test]
    fn test_serializes_without_estimator_state() {
        let mut process = Process::new(7, &StubProbe);
        process.update_utilization(50, 100);
        let json = serde_json::to_string(&process).unwrap();
        assert!(json.contains("\"pid\":7"));
        assert!(json.contains("utilization"));
        assert!(!json.contains("estimator"));
    }
}
