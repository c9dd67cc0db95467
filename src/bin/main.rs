//! CLI for the process monitor (pmon).

use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pmon")]
#[command(about = "Live process and system monitor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Refresh interval in seconds
    #[arg(short, long, default_value = "1.0", global = true)]
    interval: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive terminal dashboard (default)
    Tui,
    /// Print one refresh and exit
    Snapshot {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Number of processes to print
        #[arg(short, long, default_value = "15")]
        count: usize,
    },
}

#[cfg(target_os = "linux")]
fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let interval = Duration::from_secs_f64(cli.interval.max(0.1));

    let result = match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => pmonlib::tui::run(interval),
        Commands::Snapshot { format, count } => snapshot(&format, count, interval),
    };

    if let Err(err) = result {
        eprintln!("pmon: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("pmon: unsupported platform, the /proc counter source requires Linux");
    std::process::exit(1);
}

#[cfg(target_os = "linux")]
#[derive(serde::Serialize)]
struct Snapshot<'a> {
    operating_system: &'a str,
    kernel: &'a str,
    uptime_seconds: u64,
    cpu_utilization: f32,
    memory_utilization: f32,
    total_processes: u64,
    running_processes: u64,
    processes: &'a [pmonlib::Process],
}

#[cfg(target_os = "linux")]
fn snapshot(
    format: &str,
    count: usize,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    use pmonlib::{ProcSource, System};

    let mut system = System::new(ProcSource::new())?;

    // Discard the cumulative warm-up sample, then measure one interval.
    system.cpu_utilization()?;
    system.processes()?;
    thread::sleep(interval);

    let cpu = system.cpu_utilization()?;
    let memory = system.memory_utilization()?;
    let uptime = system.uptime()?;
    let total = system.total_processes()?;
    let running = system.running_processes()?;
    let processes = system.processes()?.to_vec();
    let top = &processes[..count.min(processes.len())];

    let snapshot = Snapshot {
        operating_system: system.operating_system(),
        kernel: system.kernel(),
        uptime_seconds: uptime,
        cpu_utilization: cpu,
        memory_utilization: memory,
        total_processes: total,
        running_processes: running,
        processes: top,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_text(&snapshot);
    Ok(())
}

#[cfg(target_os = "linux")]
fn print_text(snapshot: &Snapshot<'_>) {
    use colored::Colorize;
    use pmonlib::format;

    println!(
        "{} — {} · {}",
        "pmon".bold().cyan(),
        snapshot.operating_system,
        snapshot.kernel
    );
    println!(
        "up {} · cpu {:.1}% · mem {:.1}% · {} processes ({} running)",
        format::elapsed_hms(snapshot.uptime_seconds),
        snapshot.cpu_utilization * 100.0,
        snapshot.memory_utilization * 100.0,
        snapshot.total_processes,
        snapshot.running_processes,
    );
    println!();
    println!(
        "{}",
        format!(
            "{:>7} {:<10} {:>6} {:>8} {:>9} COMMAND",
            "PID", "USER", "CPU%", "MEM", "TIME"
        )
        .bold()
    );
    for process in snapshot.processes {
        println!(
            "{:>7} {:<10} {:>6.1} {:>8} {:>9} {}",
            process.pid(),
            process.user(),
            process.utilization() * 100.0,
            format::kb_auto_unit(process.resident_kb()),
            format::elapsed_hms(process.uptime_seconds()),
            process.command(),
        );
    }
}
