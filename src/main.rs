//! lamco-input-capture - libinput device monitor
//!
//! Entry point for the monitor binary. Starts the capture backend against the
//! configured device directory, runs the reference dispatcher on the main
//! thread, and logs every delivered event.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use lamco_input_capture::backend::{BackendSettings, Dispatcher, LibinputBackend};
use lamco_input_capture::config::Config;
use lamco_input_capture::input::{ClampPolicy, FixedScreen, InputRootId, Size};

/// Command-line arguments for lamco-input-capture
#[derive(Parser, Debug)]
#[command(name = "lamco-input-capture")]
#[command(version, about = "Capture touch and pointer input through libinput", long_about = None)]
pub struct Args {
    /// Configuration file path (default: per-user config if present)
    #[arg(short, long, env = "LAMCO_INPUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device directory to scan
    #[arg(long, env = "LAMCO_INPUT_DEVICE_DIR")]
    pub device_dir: Option<PathBuf>,

    /// Device node name prefix
    #[arg(long, env = "LAMCO_INPUT_DEVICE_PREFIX")]
    pub device_prefix: Option<String>,

    /// Poll timeout in milliseconds
    #[arg(long)]
    pub poll_timeout_ms: Option<u16>,

    /// Minimum milliseconds between relative pointer moves (0 disables)
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Reproduce the legacy relative-motion clamp
    #[arg(long)]
    pub legacy_clamp: bool,

    /// Screen size in scaled pixels, WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080", value_parser = parse_screen_size)]
    pub screen: Size,

    /// Input root id events are delivered to
    #[arg(long, default_value = "1")]
    pub root: u64,

    /// Seconds between statistics log lines
    #[arg(long, default_value = "10")]
    pub stats_interval: u64,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_screen_size(value: &str) -> std::result::Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width: {}", e))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height: {}", e))?;
    if width == 0 || height == 0 {
        return Err("screen size must be non-zero".to_string());
    }
    Ok(Size::new(width as f64, height as f64))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load_or_default(args.config.as_deref())?.with_overrides(
        args.device_dir.clone(),
        args.device_prefix.clone(),
        args.poll_timeout_ms,
        args.throttle_ms,
    );
    if args.legacy_clamp {
        config.pointer.clamp_policy = ClampPolicy::Legacy;
    }
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }
    if let Some(file) = &args.log_file {
        config.logging.file = Some(file.clone());
    }
    config.validate()?;

    // Initialize logging
    let _log_guard = init_logging(&config, args.verbose)?;

    info!("════════════════════════════════════════════════════════");
    info!("  lamco-input-capture v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}", env!("BUILD_DATE"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");
    debug!("Config: {:?}", config);

    let dispatcher = Arc::new(Dispatcher::new());
    let backend = LibinputBackend::start(BackendSettings::from(&config), dispatcher.clone())
        .with_context(|| {
            format!(
                "Failed to start input capture on {}",
                config.devices.directory.display()
            )
        })?;

    backend.initialize(Arc::new(FixedScreen(args.screen)), |event| {
        info!(
            kind = ?event.event_type,
            x = event.position.x,
            y = event.position.y,
            t_ms = event.timestamp_ms,
            touch = ?event.touch_id,
            "input"
        );
    });
    backend.set_input_root(Some(InputRootId(args.root)));

    info!(
        "Monitoring input on {} (screen {}x{}, root {})",
        config.devices.directory.display(),
        args.screen.width,
        args.screen.height,
        args.root
    );

    let interval = Duration::from_secs(args.stats_interval.max(1));
    loop {
        dispatcher.run_for(interval);
        info!("Stats: {}", backend.stats());

        if !backend.is_running() {
            warn!("Input poller is no longer running");
            anyhow::bail!("Input poller exited");
        }
    }
}

fn init_logging(config: &Config, verbose: u8) -> Result<Option<WorkerGuard>> {
    let log_level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lamco_input_capture={level},warn",
            level = log_level
        ))
    });

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        "compact" => tracing_subscriber::fmt::layer().compact().boxed(),
        _ => tracing_subscriber::fmt::layer().pretty().boxed(),
    });

    // If log file is specified, write to both stdout and file
    let guard = match &config.logging.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = match config.logging.format.as_str() {
                "json" => tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .boxed(),
                _ => tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
            };
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(path) = &config.logging.file {
        info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
