// # edgeoned - EdgeOne IP range daemon
//
// This is a THIN integration layer. All refresh, fallback and parsing logic
// lives in edgeone-core and the source crates.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering the prefix sources
// 4. Provisioning the refresher and logging its events until a signal
//
// ## Configuration
//
// - `EDGEONE_ZONE_ID`, `EDGEONE_SECRET_ID`, `EDGEONE_SECRET_KEY`: privileged
//   credentials (all three required to use the TEO API)
// - `EDGEONE_VERSION`: `v4`, `v6`, or unset for both
// - `EDGEONE_AREA`: `global`, `mainland-china`, `overseas`, or unset for all
// - `EDGEONE_INTERVAL_SECS`: refresh interval (0 or unset = one hour)
// - `EDGEONE_TIMEOUT_SECS`: per-fetch timeout (0 or unset = none)
// - `EDGEONE_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export EDGEONE_ZONE_ID=zone-2o0i7nd1yj1o
// export EDGEONE_SECRET_ID=AKID...
// export EDGEONE_SECRET_KEY=...
// export EDGEONE_INTERVAL_SECS=900
//
// edgeoned
// ```

use anyhow::{Context, Result};
use edgeone_core::{CancellationToken, EdgeOneIpRange, RefreshEvent, SourceConfig, SourceRegistry};
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Upper bound on waiting for the refresher to stop
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum EdgeOneExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<EdgeOneExitCode> for ExitCode {
    fn from(code: EdgeOneExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    source: SourceConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let secs = |key: &str| -> Result<u64> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => value
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, value)),
                _ => Ok(0),
            }
        };

        let source = SourceConfig::new()
            .with_credentials(
                var("EDGEONE_ZONE_ID"),
                var("EDGEONE_SECRET_ID"),
                var("EDGEONE_SECRET_KEY"),
            )
            .with_version(var("EDGEONE_VERSION"))
            .with_area(var("EDGEONE_AREA"))
            .with_interval_secs(secs("EDGEONE_INTERVAL_SECS")?)
            .with_timeout_secs(secs("EDGEONE_TIMEOUT_SECS")?);

        let log_level = lookup("EDGEONE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "EDGEONE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                log_level
            ),
        };

        source.validate()?;

        Ok(Self { source, log_level })
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return EdgeOneExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return EdgeOneExitCode::ConfigError.into();
    }

    info!("Starting edgeoned daemon");
    debug!("Configuration loaded: {:?}", config.source);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return EdgeOneExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => EdgeOneExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                if e.downcast_ref::<edgeone_core::Error>()
                    .is_some_and(edgeone_core::Error::is_config_error)
                {
                    EdgeOneExitCode::ConfigError
                } else {
                    EdgeOneExitCode::RuntimeError
                }
            }
        }
    })
    .into()
}

/// Run the daemon until SIGTERM or SIGINT
async fn run_daemon(config: Config) -> Result<()> {
    let registry = SourceRegistry::new();

    info!("Registering public EdgeOne source");
    edgeone_source_public::register(&registry);

    #[cfg(feature = "teo")]
    {
        info!("Registering TEO origin ACL source");
        edgeone_source_teo::register(&registry);
    }

    let cancel = CancellationToken::new();
    let (range, events) = EdgeOneIpRange::provision(config.source, &registry, cancel.clone())?;

    let logger = tokio::spawn(log_events(events));

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    cancel.cancel();
    tokio::time::timeout(SHUTDOWN_TIMEOUT, range.shutdown())
        .await
        .map_err(|_| anyhow::anyhow!("Refresher did not stop within {:?}", SHUTDOWN_TIMEOUT))??;

    // The channel closes once the refresher is gone
    drop(range);
    if let Err(e) = logger.await {
        warn!("Event logger ended abnormally: {}", e);
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Log refresh events until the channel closes
async fn log_events(mut events: mpsc::Receiver<RefreshEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            RefreshEvent::Started { mode } => info!("Refresher started in {:?} mode", mode),
            RefreshEvent::Published {
                source,
                count,
                generation,
            } => info!(
                "EdgeOne ranges updated: {} prefixes from {} source (generation {})",
                count, source, generation
            ),
            RefreshEvent::FetchFailed { source, error } => {
                warn!("EdgeOne ranges not updated ({} source): {}", source, error)
            }
            RefreshEvent::Downgraded { error } => {
                warn!("Privileged source disabled for this run: {}", error)
            }
            RefreshEvent::Stopped => info!("Refresher stopped"),
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
