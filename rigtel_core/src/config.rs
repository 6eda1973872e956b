//! Runtime configuration for the acquisition engine.
//!
//! These are the structs `Monitor` and `Acquisition` actually run with. They
//! are separate from the TOML-deserialized schema in `rigtel_config`; the
//! bridges live in `conversions`.

/// Pacing of the acquisition loop.
#[derive(Debug, Clone)]
pub struct AcquisitionCfg {
    /// Idle interval while the transport has no pending data (ms).
    pub poll_ms: u64,
    /// Per-line read timeout once data is pending (ms).
    pub read_timeout_ms: u64,
    /// Backoff after a transient read error (ms).
    pub backoff_ms: u64,
    /// Interval between synthetic readings when simulating (ms).
    pub tick_ms: u64,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            poll_ms: 100,
            read_timeout_ms: 200,
            backoff_ms: 1_000,
            tick_ms: 1_000,
        }
    }
}
