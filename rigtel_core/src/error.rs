use crate::channel::Channel;
use thiserror::Error;

/// Why a raw line was rejected. Rejections are per-line diagnostics;
/// acquisition continues uninterrupted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected 6 comma-separated fields, got {got}")]
    FieldCount { got: usize },
    #[error("{channel} field {value:?} is not numeric")]
    NotNumeric { channel: Channel, value: String },
    #[error("{channel} reading {value} outside valid range {min}..={max}")]
    OutOfRange {
        channel: Channel,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Acquisition-side failures. None of these ever reach a buffer reader.
#[derive(Debug, Error, Clone)]
pub enum AcquisitionError {
    /// No device found or open failed; triggers fallback to synthetic data.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
    /// I/O hiccup on an open transport; the loop backs off and retries.
    #[error("transient read error: {0}")]
    TransientRead(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
