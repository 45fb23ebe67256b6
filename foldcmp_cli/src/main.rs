use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use foldcmp_common::{ensure_config, load_config, load_config_from, AppConfig, ComparisonOutcome};
use foldcmp_core::{AsyncFolderComparator, FolderComparator};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::cell::Cell;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_SAME: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_DIFFERENT: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "foldcmp")]
#[command(author = "foldcmp Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Check whether two folder trees hold the same files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two folder trees and report same, different or cancelled
    Scan {
        /// Left folder path
        left: PathBuf,

        /// Right folder path
        right: PathBuf,

        /// File extensions to ignore (can be specified multiple times)
        #[arg(short = 'x', long = "ignore-ext")]
        ignore_ext: Vec<String>,

        /// Do not apply the ignored extensions from the configuration
        #[arg(long)]
        no_default_ignores: bool,

        /// Hash files on every check instead of memoizing checksums
        #[arg(long)]
        no_cache: bool,

        /// Configuration file to use instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the configuration file location and its effective contents
    Config {
        /// Write the default configuration if none exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let code = match cli.command {
        Commands::Scan {
            left,
            right,
            ignore_ext,
            no_default_ignores,
            no_cache,
            config,
            json,
        } => match run_scan(
            &left,
            &right,
            ignore_ext,
            no_default_ignores,
            no_cache,
            config.as_deref(),
            json,
        ) {
            Ok(outcome) => exit_code(outcome),
            Err(e) => {
                error!("Scan failed: {:#}", e);
                eprintln!("error: {:#}", e);
                EXIT_ERROR
            }
        },
        Commands::Config { init } => match run_config(init) {
            Ok(()) => EXIT_SAME,
            Err(e) => {
                error!("Config failed: {:#}", e);
                eprintln!("error: {:#}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(code);
}

fn run_scan(
    left: &Path,
    right: &Path,
    ignore_ext: Vec<String>,
    no_default_ignores: bool,
    no_cache: bool,
    config_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<ComparisonOutcome> {
    // Validate paths
    if !left.exists() {
        bail!("Left path does not exist: {}", left.display());
    }
    if !right.exists() {
        bail!("Right path does not exist: {}", right.display());
    }

    if let Some(path) = config_path {
        if !path.exists() {
            bail!("Config file does not exist: {}", path.display());
        }
    }

    let loaded = match config_path {
        Some(path) => load_config_from(path),
        None => load_config(false),
    }
    .context("Failed to load configuration")?;
    let config = effective_config(loaded.config, ignore_ext, no_default_ignores, no_cache);

    info!("Comparing:");
    info!("  Left:  {}", left.display());
    info!("  Right: {}", right.display());
    info!("  Ignored extensions: {:?}", config.ignored_extensions);

    let comparator = FolderComparator::from_config(&config);
    let mut shim = AsyncFolderComparator::new(comparator)?;
    let interrupted = install_interrupt_flag()?;

    let spinner = if !json && std::io::stderr().is_terminal() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Scanning...");
        Some(spinner)
    } else {
        None
    };

    let result = Rc::new(Cell::new(None));
    let slot = result.clone();
    shim.compare_async(left, right, move |outcome| slot.set(Some(outcome)));

    let mut cancel_requested = false;
    while shim.pending() > 0 {
        if !cancel_requested && interrupted.load(Ordering::SeqCst) {
            info!("Interrupt received, cancelling comparison");
            shim.cancel();
            cancel_requested = true;
            if let Some(spinner) = &spinner {
                spinner.set_message("Cancelling...");
            }
        }
        shim.wait_and_dispatch_timeout(TICK);
        if let Some(spinner) = &spinner {
            spinner.tick();
        }
    }
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let outcome = result
        .get()
        .ok_or_else(|| anyhow!("Comparison finished without an outcome"))?;

    if json {
        let report = JsonReport::new(left, right, outcome);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", outcome);
    }

    Ok(outcome)
}

fn run_config(init: bool) -> anyhow::Result<()> {
    let loaded = if init {
        ensure_config(false)
    } else {
        load_config(false)
    }
    .context("Failed to load configuration")?;

    let rendered = toml::to_string_pretty(&loaded.config).context("Failed to render configuration")?;
    let note = if loaded.exists || init { "" } else { " (not created, showing defaults)" };
    println!("# {}{}", loaded.path.display(), note);
    print!("{}", rendered);
    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn effective_config(
    mut config: AppConfig,
    ignore_ext: Vec<String>,
    no_default_ignores: bool,
    no_cache: bool,
) -> AppConfig {
    if no_default_ignores {
        config.ignored_extensions.clear();
    }
    config.ignored_extensions.extend(ignore_ext);
    if no_cache {
        config.use_checksum_cache = false;
    }
    config
}

fn exit_code(outcome: ComparisonOutcome) -> i32 {
    match outcome {
        ComparisonOutcome::Finished { is_equal: true } => EXIT_SAME,
        ComparisonOutcome::Finished { is_equal: false } => EXIT_DIFFERENT,
        ComparisonOutcome::Cancelled => EXIT_CANCELLED,
    }
}

#[cfg(unix)]
fn install_interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))
            .context("Failed to install signal handler")?;
    }
    Ok(flag)
}

#[cfg(not(unix))]
fn install_interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}

#[derive(Serialize)]
struct JsonReport {
    left: String,
    right: String,
    outcome: String,
    is_equal: Option<bool>,
}

impl JsonReport {
    fn new(left: &Path, right: &Path, outcome: ComparisonOutcome) -> Self {
        let is_equal = match outcome {
            ComparisonOutcome::Finished { is_equal } => Some(is_equal),
            ComparisonOutcome::Cancelled => None,
        };
        Self {
            left: left.to_string_lossy().to_string(),
            right: right.to_string_lossy().to_string(),
            outcome: outcome.to_string(),
            is_equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ComparisonOutcome::Finished { is_equal: true }), 0);
        assert_eq!(exit_code(ComparisonOutcome::Finished { is_equal: false }), 2);
        assert_eq!(exit_code(ComparisonOutcome::Cancelled), 130);
    }

    #[test]
    fn test_effective_config_extends_ignores() {
        let config = effective_config(AppConfig::default(), vec!["tmp".to_string()], false, false);
        assert_eq!(
            config.ignored_extensions,
            vec!["DS_Store".to_string(), "tmp".to_string()]
        );
        assert!(config.use_checksum_cache);
    }

    #[test]
    fn test_effective_config_drops_default_ignores() {
        let config = effective_config(AppConfig::default(), vec!["log".to_string()], true, true);
        assert_eq!(config.ignored_extensions, vec!["log".to_string()]);
        assert!(!config.use_checksum_cache);
    }

    #[test]
    fn test_json_report_finished() {
        let report = JsonReport::new(
            Path::new("/left"),
            Path::new("/right"),
            ComparisonOutcome::Finished { is_equal: false },
        );
        assert_eq!(report.left, "/left");
        assert_eq!(report.right, "/right");
        assert_eq!(report.outcome, "different");
        assert_eq!(report.is_equal, Some(false));
    }

    #[test]
    fn test_json_report_cancelled_has_no_verdict() {
        let report = JsonReport::new(Path::new("a"), Path::new("b"), ComparisonOutcome::Cancelled);
        assert_eq!(report.outcome, "cancelled");
        assert_eq!(report.is_equal, None);

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["is_equal"].is_null());
    }
}
