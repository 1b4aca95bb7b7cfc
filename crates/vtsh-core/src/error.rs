#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Only configuration mistakes are errors. A full queue is reported as a
//! short write count, and malformed or incomplete escape sequences are
//! resolved by the decoder itself, so neither has a variant here.

use std::fmt;

/// Byte queue construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Capacity was zero.
    ZeroCapacity,
    /// Capacity was not a power of two, so `index & (capacity - 1)` would
    /// not address every slot.
    CapacityNotPowerOfTwo {
        /// The rejected capacity.
        capacity: usize,
    },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "queue capacity must be non-zero"),
            Self::CapacityNotPowerOfTwo { capacity } => {
                write!(f, "queue capacity {capacity} is not a power of two")
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// An environment override that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable name.
    pub key: &'static str,
    /// The raw value that was rejected.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            key,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl From<QueueError> for std::io::Error {
    fn from(err: QueueError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_error_display() {
        assert_eq!(
            QueueError::CapacityNotPowerOfTwo { capacity: 1000 }.to_string(),
            "queue capacity 1000 is not a power of two"
        );
        assert_eq!(
            QueueError::ZeroCapacity.to_string(),
            "queue capacity must be non-zero"
        );
    }

    #[test]
    fn config_error_display_quotes_value() {
        let err = ConfigError::new("VTSH_ESCAPE_TIMEOUT_MS", "soon", "expected milliseconds");
        assert_eq!(
            err.to_string(),
            "invalid VTSH_ESCAPE_TIMEOUT_MS=\"soon\": expected milliseconds"
        );
    }

    #[test]
    fn converts_into_io_error() {
        let io: std::io::Error = QueueError::ZeroCapacity.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
    }
}
