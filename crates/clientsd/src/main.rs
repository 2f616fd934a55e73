// # clientsd - Persistent Client Registry Daemon
//
// A thin integration layer: all registry logic lives in clients-core.
//
// The clientsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Serving the HTTP API around one shared registry
// 4. Shutting down cleanly on SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `CLIENTSD_BIND`: Listen address (default `127.0.0.1:3000`)
// - `CLIENTSD_MAX_BODY_BYTES`: Largest accepted request body (default 65536)
// - `CLIENTSD_SUPPORTED_TAGS`: Comma-separated tag list (default: built-in list)
// - `CLIENTSD_LOG_LEVEL`: trace, debug, info, warn or error (default info)
// - `CLIENTSD_SHUTDOWN_TIMEOUT_SECS`: Grace period for in-flight requests (default 10)
//
// ## Example
//
// ```bash
// export CLIENTSD_BIND=0.0.0.0:3000
// export CLIENTSD_LOG_LEVEL=debug
//
// clientsd
// ```

use anyhow::{Context, Result};
use clients_core::{ClientRegistry, ServiceConfig, http};
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ClientsdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ClientsdExitCode> for ExitCode {
    fn from(code: ClientsdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    service: ServiceConfig,
    log_level: String,
    shutdown_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let mut service = ServiceConfig::new();

        if let Ok(bind) = env::var("CLIENTSD_BIND") {
            service.http.bind_addr = bind
                .parse()
                .with_context(|| format!("CLIENTSD_BIND '{}' is not a socket address", bind))?;
        }

        if let Ok(max) = env::var("CLIENTSD_MAX_BODY_BYTES") {
            service.http.max_body_bytes = max
                .parse()
                .with_context(|| format!("CLIENTSD_MAX_BODY_BYTES '{}' is not a number", max))?;
        }

        if let Ok(tags) = env::var("CLIENTSD_SUPPORTED_TAGS") {
            service.registry.supported_tags = tags
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        let shutdown_timeout_secs: u64 = match env::var("CLIENTSD_SHUTDOWN_TIMEOUT_SECS") {
            Ok(secs) => secs.parse().with_context(|| {
                format!("CLIENTSD_SHUTDOWN_TIMEOUT_SECS '{}' is not a number", secs)
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            service,
            log_level: env::var("CLIENTSD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.service.validate()?;

        if !(1..=300).contains(&self.shutdown_timeout.as_secs()) {
            anyhow::bail!(
                "CLIENTSD_SHUTDOWN_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.shutdown_timeout.as_secs()
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CLIENTSD_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ClientsdExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return ClientsdExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ClientsdExitCode::ConfigError.into();
    }

    info!("Starting clientsd daemon");
    info!(
        "Configuration loaded: {} supported tag(s)",
        config.service.registry.supported_tags.len()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ClientsdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            ClientsdExitCode::RuntimeError
        } else {
            ClientsdExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: Config) -> Result<()> {
    let registry = ClientRegistry::new(&config.service.registry);
    let app = http::router(registry, &config.service.http);

    let listener = TcpListener::bind(config.service.http.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.service.http.bind_addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);
    info!("Draining in-flight requests");
    let _ = stop_tx.send(());

    match tokio::time::timeout(config.shutdown_timeout, server).await {
        Ok(Ok(Ok(()))) => {
            info!("Shutdown complete");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(anyhow::anyhow!("HTTP server error: {}", e)),
        Ok(Err(e)) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
        Err(_) => Err(anyhow::anyhow!(
            "Shutdown timeout after {:?}",
            config.shutdown_timeout
        )),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// The name of the signal received.
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
