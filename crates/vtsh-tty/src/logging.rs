#![forbid(unsafe_code)]

//! Subscriber setup.
//!
//! The terminal belongs to the line editor, so logs never go to stdout or
//! stderr. They are written to the file named by `VTSH_LOG`; without it
//! logging stays off. `RUST_LOG` sets the filter (default `info`) and
//! `VTSH_LOG_FORMAT=json` switches to JSON lines.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "VTSH_LOG";
const ENV_LOG_FORMAT: &str = "VTSH_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Where and how to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Log file.
    pub path: PathBuf,
    /// Line format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings from a custom environment lookup. `None` when logging is off.
    pub fn from_env_with<F>(get_env: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = get_env(ENV_LOG).filter(|p| !p.trim().is_empty())?;
        let format = match get_env(ENV_LOG_FORMAT) {
            Some(value) if value.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        Some(Self {
            path: PathBuf::from(path),
            format,
        })
    }
}

/// Install the global subscriber from the process environment.
///
/// Returns whether logging was enabled.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init_from_env() -> io::Result<bool> {
    let Some(settings) = LogSettings::from_env_with(|key| std::env::var(key).ok()) else {
        return Ok(false);
    };
    init(&settings)?;
    Ok(true)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init(settings: &LogSettings) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file));
    let result = match settings.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(io::Error::other)
}
