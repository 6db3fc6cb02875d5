//! fatwheel - main entry point

use anyhow::Context;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use fatwheel::app::App;
use fatwheel::cli::{Cli, Commands, install_policy};
use fatwheel::config::Settings;
use fatwheel::console::ConsoleReporter;
use fatwheel::process_guard::{self, ProcessGuard};
use fatwheel::sanity;
use fatwheel::types::InstallPolicy;
use fatwheel::workflow::{
    Availability, PackageIndex, PairOutcome, PypiIndex, ScratchDir, Workflow,
    is_valid_package_name, plan_pairs,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

enum LogTarget {
    /// The TUI owns the terminal, so diagnostics go to a file
    File(PathBuf),
    Stderr,
}

/// Initialize tracing. `RUST_LOG` overrides the default `info` level.
fn init_logger(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init(),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_writer(std::io::sink)
                        .init();
                }
            }
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("fatwheel: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = Settings::resolve(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings.make_absolute()?;

    let tui = matches!(cli.command, None | Some(Commands::Tui));
    init_logger(if tui {
        LogTarget::File(settings.log_file_path())
    } else {
        LogTarget::Stderr
    });
    info!(version = env!("CARGO_PKG_VERSION"), "fatwheel starting up");

    // Child tools are terminated on SIGINT/SIGTERM/SIGHUP.
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    debug!(?settings, "settings resolved");

    if cli.command == Some(Commands::Config) {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(ExitCode::SUCCESS);
    }

    settings.validate().context("Invalid settings")?;

    if cli.needs_preflight() && !cli.skip_preflight {
        let report = sanity::verify_environment(&settings);
        if !report.is_ok() {
            warn!(?report, "pre-flight check failed");
            sanity::print_report(&report, &settings);
            return Ok(ExitCode::FAILURE);
        }
    }

    match cli.command {
        None | Some(Commands::Tui) => {
            run_tui(settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Run {
            package,
            install,
            no_install,
        }) => run_headless(settings, &package, install_policy(install, no_install)),
        Some(Commands::Check { package }) => check_package(&settings, &package),
        Some(Commands::Pair { dir }) => print_pairing(&dir),
        Some(Commands::Config) => Ok(ExitCode::SUCCESS),
    }
}

/// Run the TUI
fn run_tui(settings: Settings) -> anyhow::Result<()> {
    debug!("Initializing terminal for TUI mode");

    enable_raw_mode().context("Failed to enable raw mode")?;
    if let Err(e) = crossterm::execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let result = match Terminal::new(CrosstermBackend::new(stdout())) {
        Ok(mut terminal) => {
            let mut app = App::new(settings);
            let result = app.run(&mut terminal);
            let _ = terminal.show_cursor();
            result.map_err(anyhow::Error::from)
        }
        Err(e) => Err(anyhow::Error::from(e).context("Failed to create terminal")),
    };

    // Always restore the terminal, even if the app failed
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);

    result
}

fn run_headless(
    settings: Settings,
    package: &str,
    policy: InstallPolicy,
) -> anyhow::Result<ExitCode> {
    info!(package, ?policy, "Running headless workflow");

    let workflow = Workflow::with_system_tools(settings)?;
    let _process_guard = ProcessGuard::new();
    let mut reporter = ConsoleReporter::new(policy);
    let summary = workflow.run(package, &mut reporter);

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn check_package(settings: &Settings, package: &str) -> anyhow::Result<ExitCode> {
    let package = package.trim();
    if !is_valid_package_name(package) {
        eprintln!("'{}' is not a valid package name.", package);
        return Ok(ExitCode::FAILURE);
    }

    let index = PypiIndex::new(settings.index_url.clone())?;
    match index.check(package)? {
        Availability::Available => {
            println!("{} is available on the package index.", package);
            Ok(ExitCode::SUCCESS)
        }
        Availability::Missing { status } => {
            println!(
                "{} is not available on the package index (HTTP {}).",
                package, status
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_pairing(dir: &Path) -> anyhow::Result<ExitCode> {
    let wheels = ScratchDir::new(dir)
        .wheel_files()
        .with_context(|| format!("Failed to list wheels in {}", dir.display()))?;
    let plan = plan_pairs(&wheels)?;

    for entry in &plan.entries {
        match entry {
            PairOutcome::Pair(pair) => {
                println!("{}", pair.base);
                println!("  {}", pair.first);
                println!("  {}", pair.second);
            }
            PairOutcome::Unmatched { base } => {
                println!("{}", base);
                println!("  (no matching wheel for the other architecture)");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
