//! Logging configuration and initialization
//!
//! Structured logging with tracing: compact console output for operators,
//! JSON lines for log aggregation, and an optional append-only log file.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, Layer, Registry};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "DIRECTOR_BRIDGE_LOG";
/// Environment variable selecting the log format (`json` or anything else)
pub const LOG_FORMAT_ENV: &str = "DIRECTOR_BRIDGE_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Enable file logging (default: false)
    pub file_enabled: bool,
    /// Path for the log file (default: `director-bridge.log` in the working directory)
    pub file_path: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Default log level filter (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Log file path, falling back to the working directory
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("director-bridge.log"))
    }

    /// JSON output if the environment asks for it, otherwise the config value
    fn use_json(&self, env_format: Option<&str>) -> bool {
        env_format
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(self.json_format)
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logging system with the given configuration
///
/// Returns a guard that must be kept alive for the duration of the program
/// so buffered file output is flushed.
///
/// # Environment Variables
///
/// - `DIRECTOR_BRIDGE_LOG`: log filter (e.g. "debug", "info,director_bridge::master=debug")
/// - `DIRECTOR_BRIDGE_LOG_FORMAT`: set to "json" for JSON console output
///
/// Falls back to `RUST_LOG`, then to `LogConfig::default_level`.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let use_json = config.use_json(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut file_guard: Option<WorkerGuard> = None;

    if config.file_enabled {
        let log_path = config.resolved_file_path();
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Long-running service: keep earlier runs' output
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        file_guard = Some(guard);

        layers.push(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .boxed(),
        );
    }

    if config.console_enabled {
        let console: BoxedLayer = if use_json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(false)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .boxed()
        };
        layers.push(console);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    tracing::info!(
        target: "director_bridge",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(file_guard)
}

// Re-export WorkerGuard so callers can store it
pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;
