//! The consumer-facing facade over buffer + acquisition.
//!
//! A `Monitor` owns the telemetry buffer and (while running) the acquisition
//! thread. Consumers call `latest_point` / `recent_points` concurrently with
//! acquisition; they never see acquisition-side failures.

use std::sync::Arc;

use rigtel_traits::{Clock, MonotonicClock, Transport};

use crate::acquisition::{Acquisition, AcquisitionStats, DiagnosticEvent, Provenance, Source};
use crate::buffer::TelemetryBuffer;
use crate::channel::{CalibrationTable, Channel};
use crate::config::AcquisitionCfg;
use crate::error::{AcquisitionError, BuildError, Result};
use crate::parser::{LineParser, SequenceAssigner};
use crate::reading::Reading;
use crate::synth::SyntheticGenerator;

/// Callback that attempts to open the real transport. Invoked inside
/// `start()`; an `Err` selects the synthetic fallback instead.
pub type TransportOpener =
    Box<dyn Fn() -> std::result::Result<Box<dyn Transport + Send>, AcquisitionError> + Send>;

pub struct Monitor {
    buffer: Arc<TelemetryBuffer>,
    table: CalibrationTable,
    cfg: AcquisitionCfg,
    opener: Option<TransportOpener>,
    synth_seed: Option<u64>,
    clock: Arc<dyn Clock + Send + Sync>,
    acquisition: Option<Acquisition>,
    /// Highest sequence handed out across runs, so a restart continues
    /// numbering instead of violating the buffer's ordering invariant.
    issued: u64,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("capacity", &self.buffer.capacity())
            .field("running", &self.is_running())
            .field("provenance", &self.provenance())
            .finish()
    }
}

impl Monitor {
    /// Start building a Monitor.
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    /// Begin acquisition. Attempts the transport opener (when one is
    /// configured) and falls back to synthetic generation if it fails or is
    /// absent. Idempotent while already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            tracing::debug!("acquisition already running; start is a no-op");
            return Ok(());
        }
        // A previously-stopped handle may still be held; fold its counters in.
        self.reap();

        let source = match &self.opener {
            Some(open) => match open() {
                Ok(transport) => Source::Serial(transport),
                Err(e) => {
                    tracing::warn!(error = %e, "transport unavailable, falling back to synthetic data");
                    Source::Synthetic(self.make_generator())
                }
            },
            None => {
                tracing::info!("no transport configured, streaming synthetic data");
                Source::Synthetic(self.make_generator())
            }
        };

        let parser = LineParser::new(self.table.clone());
        let seq = SequenceAssigner::starting_at(self.issued + 1);
        self.acquisition = Some(Acquisition::spawn(
            source,
            parser,
            seq,
            Arc::clone(&self.buffer),
            self.cfg.clone(),
            Arc::clone(&self.clock),
        ));
        Ok(())
    }

    /// Halt acquisition and release the transport. The producer observes the
    /// stop flag within one pacing interval; the transport is closed only
    /// after its thread has fully stopped. No-op when not running.
    pub fn stop(&mut self) {
        if let Some(acquisition) = self.acquisition.take() {
            let stats = acquisition.stop();
            self.issued = self.issued.max(stats.last_sequence);
            tracing::info!(
                accepted = stats.accepted,
                rejected = stats.rejected,
                "acquisition stopped"
            );
        }
    }

    /// Most recent reading, or `None` if nothing has ever been accepted.
    pub fn latest_point(&self) -> Option<Reading> {
        self.buffer.latest()
    }

    /// Up to `n` most recent readings, oldest-first.
    pub fn recent_points(&self, n: usize) -> Vec<Reading> {
        self.buffer.recent(n)
    }

    /// Shared handle to the buffer for consumers on other threads.
    pub fn buffer_handle(&self) -> Arc<TelemetryBuffer> {
        Arc::clone(&self.buffer)
    }

    pub fn is_running(&self) -> bool {
        self.acquisition
            .as_ref()
            .is_some_and(Acquisition::is_running)
    }

    /// Provenance of the current run, if one is active.
    pub fn provenance(&self) -> Option<Provenance> {
        self.acquisition.as_ref().map(Acquisition::provenance)
    }

    /// Counters of the current run, if one is active.
    pub fn stats(&self) -> Option<AcquisitionStats> {
        self.acquisition.as_ref().map(Acquisition::stats)
    }

    /// Drain pending diagnostic events from the current run.
    pub fn drain_diagnostics(&self) -> Vec<DiagnosticEvent> {
        self.acquisition
            .as_ref()
            .map(Acquisition::drain_diagnostics)
            .unwrap_or_default()
    }

    fn make_generator(&self) -> SyntheticGenerator {
        match self.synth_seed {
            Some(seed) => SyntheticGenerator::seeded(seed),
            None => SyntheticGenerator::new(),
        }
    }

    /// Fold a finished (but not yet stopped) run's sequence state into
    /// `issued` so the next run continues numbering.
    fn reap(&mut self) {
        if let Some(acquisition) = self.acquisition.take() {
            let stats = acquisition.stop();
            self.issued = self.issued.max(stats.last_sequence);
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builder for `Monitor`. All fields are validated on `build()`.
pub struct MonitorBuilder {
    capacity: usize,
    table: Option<CalibrationTable>,
    cfg: Option<AcquisitionCfg>,
    opener: Option<TransportOpener>,
    synth_seed: Option<u64>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            table: None,
            cfg: None,
            opener: None,
            synth_seed: None,
            clock: None,
        }
    }
}

impl MonitorBuilder {
    /// Buffer capacity (number of retained readings).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_calibration(mut self, table: CalibrationTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_acquisition(mut self, cfg: AcquisitionCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Provide the transport opener invoked at `start()`. Without one the
    /// monitor always streams synthetic data.
    pub fn with_transport_opener<F>(mut self, opener: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Transport + Send>, AcquisitionError>
            + Send
            + 'static,
    {
        self.opener = Some(Box::new(opener));
        self
    }

    /// Seed the synthetic generator for reproducible fallback runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.synth_seed = Some(seed);
        self
    }

    /// Provide a custom clock implementation; defaults to MonotonicClock.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and build the Monitor.
    pub fn build(self) -> Result<Monitor> {
        let MonitorBuilder {
            capacity,
            table,
            cfg,
            opener,
            synth_seed,
            clock,
        } = self;

        if capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "buffer capacity must be >= 1",
            )));
        }
        let cfg = cfg.unwrap_or_default();
        if cfg.poll_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "poll_ms must be >= 1",
            )));
        }
        if cfg.read_timeout_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "read_timeout_ms must be >= 1",
            )));
        }
        if cfg.backoff_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "backoff_ms must be >= 1",
            )));
        }
        if cfg.tick_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "tick_ms must be >= 1",
            )));
        }

        let table = table.unwrap_or_default();
        for channel in Channel::ALL {
            let spec = table.spec(channel);
            if !spec.scale.is_finite() || spec.scale == 0.0 {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "calibration scale must be finite and non-zero",
                )));
            }
            if !spec.offset.is_finite() {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "calibration offset must be finite",
                )));
            }
            if spec.min > spec.max {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "calibration range min exceeds max",
                )));
            }
        }

        let clock: Arc<dyn Clock + Send + Sync> = match clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(Monitor {
            buffer: Arc::new(TelemetryBuffer::new(capacity)),
            table,
            cfg,
            opener,
            synth_seed,
            clock,
            acquisition: None,
            issued: 0,
        })
    }
}
