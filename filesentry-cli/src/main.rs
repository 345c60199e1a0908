use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Sender};
use daemonize::Daemonize;
use filesentry::{
    run_supervisor, ControlEvent, RescanPolicy, ScanConfig, ScanError, ScanMode, ScanSignals,
    SingleWalker, WorkerPool,
};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::iterator::Signals;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scan daemon reporting file names that contain literal patterns.
///
/// Runs detached by default and is controlled with signals: SIGUSR1 starts
/// (or accelerates) scanning, SIGUSR2 aborts the traversals in flight, and
/// SIGTERM/SIGINT shut the daemon down.
#[derive(Parser, Debug)]
#[command(name = "filesentry", version, about)]
struct Cli {
    /// Literal substrings matched against file base names, in priority order
    #[arg(value_name = "PATTERN", required = true)]
    patterns: Vec<String>,

    /// Widen log output with non-match and permission-denied diagnostics
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Seconds between scan cycles in single mode
    #[arg(short = 't', long = "interval", value_name = "SECONDS", default_value_t = 30)]
    interval: u64,

    /// Root of the subtree to scan
    #[arg(short = 'r', long, value_name = "PATH", default_value = "/")]
    root: PathBuf,

    /// Concurrency strategy: one walker for all patterns, or one worker each
    #[arg(short = 'm', long, value_name = "MODE", default_value_t = ScanMode::Single)]
    mode: ScanMode,

    /// Worker-pool behavior after a completed traversal
    #[arg(long, value_name = "POLICY", default_value_t = RescanPolicy::Continuous)]
    rescan: RescanPolicy,

    /// Maximum traversal depth; deeper subtrees are skipped
    #[arg(long, value_name = "N", default_value_t = 128)]
    max_depth: usize,

    /// Stay attached to the terminal instead of daemonizing
    #[arg(short = 'f', long)]
    foreground: bool,

    /// Append log output to this file once detached
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Builds the CLI-side config for merging; file values win wherever the
    /// user left a flag at its default.
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            patterns: self.patterns.clone(),
            root_path: self.root.clone(),
            interval_secs: self.interval,
            mode: self.mode,
            rescan: self.rescan,
            max_depth: self.max_depth,
            verbose: self.verbose,
            log_level: if self.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            },
            log_file: self.log_file.clone(),
            ..ScanConfig::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("filesentry: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ScanConfig::load_from(cli.config.as_deref())
        .context("loading configuration")?
        .merge_with_cli(cli.scan_config());
    config.validate()?;

    if !cli.foreground {
        if config.log_file.is_none() {
            eprintln!("filesentry: no --log-file given; log output will be discarded after detaching");
        }
        daemonize()?;
    }

    init_logging(&config)?;
    info!("Daemon active");

    let signals = Arc::new(ScanSignals::new());
    let (events_tx, events_rx) = unbounded();
    spawn_signal_watcher(events_tx)?;

    let supervisor_signals = Arc::clone(&signals);
    let supervisor = thread::Builder::new()
        .name("supervisor".to_string())
        .spawn(move || run_supervisor(events_rx, &supervisor_signals))
        .context("spawning supervisor thread")?;

    match config.mode {
        ScanMode::Single => SingleWalker::new(config, Arc::clone(&signals))?.run(),
        ScanMode::Pool => WorkerPool::new(config, Arc::clone(&signals))?.run(),
    }

    supervisor
        .join()
        .map_err(|_| anyhow!("supervisor thread panicked"))?;
    Ok(())
}

/// Detaches from the terminal: fork, new session, working directory pinned
/// to `/`, permissive umask, standard streams redirected away. Any failure
/// here is fatal and happens before scanning starts.
fn daemonize() -> Result<(), ScanError> {
    Daemonize::new()
        .working_directory("/")
        .umask(0o000)
        .start()
        .map_err(|err| ScanError::daemonize(err.to_string()))
}

fn init_logging(config: &ScanConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_writer(Arc::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Installs the signal watcher thread. Signals are delivered on an ordinary
/// thread and only ever forwarded as tagged events; all state transitions
/// and logging happen on the supervisor side of the channel.
fn spawn_signal_watcher(events: Sender<ControlEvent>) -> Result<()> {
    let mut signals =
        Signals::new([SIGUSR1, SIGUSR2, SIGTERM, SIGINT]).context("installing signal handlers")?;

    thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                let event = match signal {
                    SIGUSR1 => ControlEvent::StartScan,
                    SIGUSR2 => ControlEvent::StopScan,
                    _ => ControlEvent::Shutdown,
                };
                if events.send(event).is_err() || event == ControlEvent::Shutdown {
                    return;
                }
            }
        })
        .context("spawning signal watcher")?;
    Ok(())
}
