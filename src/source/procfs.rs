// SPDX-License-Identifier: AGPL-3.0-or-later
//! Linux counter source backed by the `/proc` filesystem.
//!
//! Files read:
//!
//! - `/proc` — pid enumeration (numeric directory names)
//! - `/proc/stat` — aggregate `cpu` line, `processes`, `procs_running`
//! - `/proc/meminfo` — `MemTotal`, `MemFree`, `Buffers`
//! - `/proc/uptime`, `/proc/version`, `/etc/os-release`
//! - `/proc/[pid]/stat`, `/proc/[pid]/cmdline`, `/proc/[pid]/comm`,
//!   `/proc/[pid]/status`, `/etc/passwd`
//!
//! Text parsing is factored into `&str` functions so it can be exercised
//! against captured file contents without a live `/proc`. A malformed
//! field is treated as absent (zero) with a logged warning; it never fails
//! a refresh.

use std::fs;

use log::warn;

use super::{CounterSource, MemoryTotals, Pid, ProcessProbe, SystemTicks, Ticks};
use crate::error::{MonitorError, Result};

/// Counter source reading the Linux `/proc` filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcSource;

impl ProcSource {
    pub fn new() -> Self {
        Self
    }

    /// Read a system-scoped file; failure means the source is unavailable.
    fn read_system(path: &str) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|err| MonitorError::SourceUnavailable(format!("{path}: {err}")))
    }

    /// Read a process-scoped file; failure means the process exited
    /// between enumeration and this read.
    fn read_process(pid: Pid, file: &str) -> Result<String> {
        fs::read_to_string(format!("/proc/{pid}/{file}"))
            .map_err(|_| MonitorError::ProcessGone(pid))
    }
}

impl ProcessProbe for ProcSource {
    fn process_active_ticks(&self, pid: Pid) -> Result<Ticks> {
        let stat = Self::read_process(pid, "stat")?;
        Ok(parse_process_active_ticks(&stat).unwrap_or_else(|| {
            warn!("malformed /proc/{pid}/stat, counting zero active ticks");
            0
        }))
    }

    fn process_command(&self, pid: Pid) -> Result<String> {
        let cmdline = Self::read_process(pid, "cmdline")?;
        let command = parse_cmdline(&cmdline);
        if !command.is_empty() {
            return Ok(command);
        }
        // Kernel threads have an empty cmdline; show the bracketed comm
        // name the way top does.
        let comm = Self::read_process(pid, "comm")?;
        Ok(format!("[{}]", comm.trim()))
    }

    fn process_owner(&self, pid: Pid) -> Result<String> {
        let status = Self::read_process(pid, "status")?;
        let Some(uid) = parse_status_uid(&status) else {
            warn!("malformed /proc/{pid}/status, no Uid line");
            return Ok(String::new());
        };
        match fs::read_to_string("/etc/passwd") {
            Ok(passwd) => Ok(parse_passwd_user(&passwd, uid).unwrap_or_else(|| uid.to_string())),
            Err(_) => Ok(uid.to_string()),
        }
    }

    fn process_resident_kb(&self, pid: Pid) -> Result<u64> {
        let status = Self::read_process(pid, "status")?;
        Ok(parse_status_vmrss_kb(&status).unwrap_or(0))
    }

    fn process_uptime_seconds(&self, pid: Pid) -> Result<u64> {
        let stat = Self::read_process(pid, "stat")?;
        let Some(start_ticks) = parse_process_start_ticks(&stat) else {
            warn!("malformed /proc/{pid}/stat, no start time");
            return Ok(0);
        };
        let elapsed = self.elapsed_seconds()?;
        Ok(elapsed.saturating_sub(start_ticks / self.ticks_per_second()))
    }
}

impl CounterSource for ProcSource {
    fn process_identifiers(&self) -> Result<Vec<Pid>> {
        let entries = fs::read_dir("/proc")
            .map_err(|err| MonitorError::SourceUnavailable(format!("/proc: {err}")))?;
        let mut pids = Vec::new();
        for entry in entries.flatten() {
            if let Ok(pid) = entry.file_name().to_string_lossy().parse::<Pid>() {
                pids.push(pid);
            }
        }
        Ok(pids)
    }

    fn system_ticks(&self) -> Result<SystemTicks> {
        let stat = Self::read_system("/proc/stat")?;
        Ok(parse_cpu_line(&stat).unwrap_or_else(|| {
            warn!("malformed /proc/stat, no aggregate cpu line");
            SystemTicks {
                active: 0,
                total: 0,
            }
        }))
    }

    fn memory_totals(&self) -> Result<MemoryTotals> {
        let meminfo = Self::read_system("/proc/meminfo")?;
        Ok(parse_meminfo(&meminfo))
    }

    fn elapsed_seconds(&self) -> Result<u64> {
        let uptime = Self::read_system("/proc/uptime")?;
        Ok(parse_uptime(&uptime).unwrap_or_else(|| {
            warn!("malformed /proc/uptime");
            0
        }))
    }

    fn ticks_per_second(&self) -> Ticks {
        // SAFETY: sysconf has no memory-safety preconditions.
        let clk_tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if clk_tck > 0 {
            clk_tck as Ticks
        } else {
            100
        }
    }

    fn total_processes(&self) -> Result<u64> {
        let stat = Self::read_system("/proc/stat")?;
        Ok(parse_stat_counter(&stat, "processes").unwrap_or(0))
    }

    fn running_processes(&self) -> Result<u64> {
        let stat = Self::read_system("/proc/stat")?;
        Ok(parse_stat_counter(&stat, "procs_running").unwrap_or(0))
    }

    fn kernel_version(&self) -> Result<String> {
        let version = Self::read_system("/proc/version")?;
        parse_kernel_version(&version).ok_or_else(|| {
            MonitorError::MalformedReading("/proc/version: missing release field".to_string())
        })
    }

    fn os_pretty_name(&self) -> Result<String> {
        let release = Self::read_system("/etc/os-release")?;
        parse_os_pretty_name(&release).ok_or_else(|| {
            MonitorError::MalformedReading("/etc/os-release: no PRETTY_NAME".to_string())
        })
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`:
///
/// `cpu  user nice system idle iowait irq softirq steal guest guest_nice`
///
/// Active is everything but idle and iowait; total is the sum of all
/// categories. Trailing fields missing on old kernels count as zero.
fn parse_cpu_line(stat: &str) -> Option<SystemTicks> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<Ticks> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().unwrap_or(0))
        .collect();
    if fields.len() < 4 {
        return None;
    }
    let total: Ticks = fields.iter().sum();
    let idle: Ticks = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(SystemTicks {
        active: total - idle,
        total,
    })
}

/// Look up a `key value` counter line in `/proc/stat` (e.g. `processes`,
/// `procs_running`).
fn parse_stat_counter(stat: &str, key: &str) -> Option<u64> {
    stat.lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.trim().parse().ok())
}

/// `MemTotal` / `MemFree` / `Buffers` from `/proc/meminfo`. Values are
/// already in kB; a missing or malformed field reads as zero.
fn parse_meminfo(meminfo: &str) -> MemoryTotals {
    let mut totals = MemoryTotals {
        total_kb: 0,
        free_kb: 0,
        buffers_kb: 0,
    };
    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let value = value.parse().unwrap_or(0);
        match key {
            "MemTotal:" => totals.total_kb = value,
            "MemFree:" => totals.free_kb = value,
            "Buffers:" => totals.buffers_kb = value,
            _ => {}
        }
    }
    totals
}

/// First field of `/proc/uptime`, truncated to whole seconds.
fn parse_uptime(uptime: &str) -> Option<u64> {
    let seconds: f64 = uptime.split_whitespace().next()?.parse().ok()?;
    Some(seconds as u64)
}

/// Release field of `/proc/version`:
/// `Linux version 6.8.0-51-generic (buildd@lcy02) ...`
fn parse_kernel_version(version: &str) -> Option<String> {
    version.split_whitespace().nth(2).map(str::to_string)
}

/// `PRETTY_NAME` value of `/etc/os-release`, quotes stripped.
fn parse_os_pretty_name(release: &str) -> Option<String> {
    release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
}

/// Split `/proc/[pid]/stat` into the fields after the `(comm)` part.
///
/// The comm field may itself contain spaces and parentheses, so the split
/// point is the last `)` in the line.
fn stat_fields_after_comm(stat: &str) -> Option<Vec<&str>> {
    let end = stat.rfind(')')?;
    Some(stat.get(end + 1..)?.split_whitespace().collect())
}

// Field indices after comm, per proc(5).
const STAT_UTIME: usize = 11;
const STAT_CSTIME: usize = 14;
const STAT_STARTTIME: usize = 19;

/// Cumulative CPU ticks of a process: utime + stime + cutime + cstime.
fn parse_process_active_ticks(stat: &str) -> Option<Ticks> {
    let fields = stat_fields_after_comm(stat)?;
    let ticks = fields.get(STAT_UTIME..=STAT_CSTIME)?;
    Some(ticks.iter().map(|f| f.parse::<Ticks>().unwrap_or(0)).sum())
}

/// Boot-relative start time of a process, in clock ticks.
fn parse_process_start_ticks(stat: &str) -> Option<Ticks> {
    stat_fields_after_comm(stat)?
        .get(STAT_STARTTIME)?
        .parse()
        .ok()
}

/// NUL-separated argv from `/proc/[pid]/cmdline`, joined with spaces.
fn parse_cmdline(cmdline: &str) -> String {
    cmdline
        .split('\0')
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Real uid from the `Uid:` line of `/proc/[pid]/status`.
fn parse_status_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
}

/// `VmRSS` in kB from `/proc/[pid]/status`. Absent for kernel threads.
fn parse_status_vmrss_kb(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

/// Resolve a uid to a login name via `/etc/passwd` content.
fn parse_passwd_user(passwd: &str, uid: u32) -> Option<String> {
    passwd.lines().find_map(|line| {
        let mut parts = line.split(':');
        let name = parts.next()?;
        let line_uid: u32 = parts.nth(1)?.parse().ok()?;
        (line_uid == uid).then(|| name.to_string())
    })
}
