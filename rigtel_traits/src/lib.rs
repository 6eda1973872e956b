pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// A line-oriented telemetry source.
///
/// Implementations wrap a real serial device or a stand-in used when no
/// device is present. The acquisition loop is the only caller; it polls
/// `has_data` without blocking and only then pays for a `read_line`.
pub trait Transport {
    /// Non-blocking check for pending input. `true` means a subsequent
    /// `read_line` is expected to return promptly.
    fn has_data(&mut self) -> bool;

    /// Read one newline-terminated line, waiting at most `timeout`.
    /// The returned text may be partial or garbled; callers must validate.
    fn read_line(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Release the underlying device handle. Must be idempotent.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
