#![forbid(unsafe_code)]

//! Shell configuration with environment overrides.
//!
//! # Environment Variables
//!
//! | Variable | Meaning |
//! |---|---|
//! | `VTSH_QUEUE_CAPACITY` | Byte queue capacity; power of two |
//! | `VTSH_ESCAPE_TIMEOUT_MS` | Idle time before a pending escape is flushed |
//! | `VTSH_POLL_INTERVAL_MS` | Sleep of the processing loop when idle |
//! | `VTSH_PROMPT` | Prompt text |
//! | `VTSH_SHELL` | Program used to run submitted lines |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::byte_queue::validate_capacity;
use crate::decoder::{DEFAULT_ESCAPE_TIMEOUT, DecoderConfig, MAX_SEQUENCE_LEN};
use crate::error::ConfigError;

const ENV_QUEUE_CAPACITY: &str = "VTSH_QUEUE_CAPACITY";
const ENV_ESCAPE_TIMEOUT_MS: &str = "VTSH_ESCAPE_TIMEOUT_MS";
const ENV_POLL_INTERVAL_MS: &str = "VTSH_POLL_INTERVAL_MS";
const ENV_PROMPT: &str = "VTSH_PROMPT";
const ENV_SHELL: &str = "VTSH_SHELL";

/// Default byte queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Default idle sleep of the processing loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Default prompt.
pub const DEFAULT_PROMPT: &str = "$ ";

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";

/// Runtime settings for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Byte queue capacity. Must be a non-zero power of two.
    pub queue_capacity: usize,
    /// Idle time after which a pending escape sequence is emitted literally.
    pub escape_timeout: Duration,
    /// Sleep of the processing thread when the queue is empty.
    pub poll_interval: Duration,
    /// Prompt printed before each line.
    pub prompt: String,
    /// Program used to run submitted lines.
    pub shell_program: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            prompt: DEFAULT_PROMPT.to_owned(),
            shell_program: DEFAULT_SHELL.to_owned(),
        }
    }
}

impl ShellConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from a custom environment lookup (for tests).
    pub fn from_env_with<F>(get_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = get_env(ENV_QUEUE_CAPACITY) {
            let capacity: usize = parse_number(ENV_QUEUE_CAPACITY, &value)?;
            validate_capacity(capacity)
                .map_err(|err| ConfigError::new(ENV_QUEUE_CAPACITY, &value, err.to_string()))?;
            config.queue_capacity = capacity;
        }
        if let Some(value) = get_env(ENV_ESCAPE_TIMEOUT_MS) {
            let ms: u64 = parse_number(ENV_ESCAPE_TIMEOUT_MS, &value)?;
            config.escape_timeout = Duration::from_millis(ms);
        }
        if let Some(value) = get_env(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = parse_number(ENV_POLL_INTERVAL_MS, &value)?;
            if ms == 0 {
                return Err(ConfigError::new(
                    ENV_POLL_INTERVAL_MS,
                    &value,
                    "must be at least 1",
                ));
            }
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(value) = get_env(ENV_PROMPT) {
            config.prompt = value;
        }
        if let Some(value) = get_env(ENV_SHELL) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::new(ENV_SHELL, &value, "must not be empty"));
            }
            config.shell_program = trimmed.to_owned();
        }

        Ok(config)
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the escape timeout.
    #[must_use]
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Set the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the shell program.
    #[must_use]
    pub fn with_shell_program(mut self, program: impl Into<String>) -> Self {
        self.shell_program = program.into();
        self
    }

    /// Decoder settings derived from this configuration.
    #[must_use]
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            escape_timeout: self.escape_timeout,
            max_sequence_len: MAX_SEQUENCE_LEN,
        }
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| ConfigError::new(key, value, err.to_string()))
}
