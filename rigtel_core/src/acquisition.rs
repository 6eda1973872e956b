//! Background acquisition: the single producer thread.
//!
//! Spawns a thread that owns the telemetry source (a real transport or the
//! synthetic generator), feeds accepted readings into the shared buffer, and
//! publishes counters plus a bounded stream of diagnostic events. The stop
//! flag is checked at the top of every iteration and before every sleep, and
//! the thread is joined on `stop`/drop, preventing thread leaks.
//!
//! Safety: each `Acquisition` owns exactly one thread; the transport handle
//! is released only after that thread has exited its loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use crossbeam_channel as xch;
use rigtel_traits::{Clock, Transport};

use crate::buffer::TelemetryBuffer;
use crate::config::AcquisitionCfg;
use crate::error::ParseError;
use crate::parser::{LineParser, SequenceAssigner};
use crate::reading::Reading;
use crate::synth::SyntheticGenerator;

/// Where readings come from. Selected once, at start time; the loop never
/// switches source mid-run.
pub enum Source {
    /// Poll-and-parse a line-oriented transport.
    Serial(Box<dyn Transport + Send>),
    /// Generate readings in-process, bypassing line parsing.
    Synthetic(SyntheticGenerator),
}

/// Data provenance visible to consumers: interface is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Serial,
    Synthetic,
}

/// Out-of-band diagnostics from the producer. Delivery is lossy by design:
/// the channel is bounded and the producer never blocks on it.
#[derive(Debug, Clone)]
pub enum DiagnosticEvent {
    LineRejected { error: ParseError, line: String },
    TransientReadError { detail: String },
}

/// Snapshot of the producer's monotonically increasing counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcquisitionStats {
    pub lines_read: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub transient_errors: u64,
    /// Sequence number of the most recently accepted reading (0 if none).
    pub last_sequence: u64,
}

#[derive(Debug, Default)]
struct Counters {
    lines_read: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    transient_errors: AtomicU64,
    last_sequence: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> AcquisitionStats {
        AcquisitionStats {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transient_errors: self.transient_errors.load(Ordering::Relaxed),
            last_sequence: self.last_sequence.load(Ordering::Relaxed),
        }
    }
}

/// Capacity of the diagnostic event channel; overflow drops events, never
/// stalls acquisition.
const EVENT_CHANNEL_BOUND: usize = 64;

/// Handle to the running producer thread.
pub struct Acquisition {
    /// Shutdown flag for prompt response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
    events: xch::Receiver<DiagnosticEvent>,
    counters: Arc<Counters>,
    provenance: Provenance,
}

impl Acquisition {
    /// Spawn the producer thread over the given source.
    ///
    /// The thread owns the source, the parser and the sequence assigner; the
    /// buffer is shared. `cfg` controls pacing: `poll_ms` idle between
    /// polls with no data, `backoff_ms` after a transient read error,
    /// `tick_ms` between synthetic readings.
    pub fn spawn<C: Clock + Send + Sync + 'static>(
        source: Source,
        parser: LineParser,
        mut seq: SequenceAssigner,
        buffer: Arc<TelemetryBuffer>,
        cfg: AcquisitionCfg,
        clock: C,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();
        let counters = Arc::new(Counters::default());
        let counters_shared = counters.clone();
        let (tx, rx) = xch::bounded(EVENT_CHANNEL_BOUND);
        let provenance = match source {
            Source::Serial(_) => Provenance::Serial,
            Source::Synthetic(_) => Provenance::Synthetic,
        };

        let join_handle = std::thread::spawn(move || {
            match source {
                Source::Serial(transport) => run_serial(
                    transport,
                    &parser,
                    &mut seq,
                    &buffer,
                    &cfg,
                    &clock,
                    &shutdown_flag,
                    &counters_shared,
                    &tx,
                ),
                Source::Synthetic(generator) => run_synthetic(
                    generator,
                    &mut seq,
                    &buffer,
                    &cfg,
                    &clock,
                    &shutdown_flag,
                    &counters_shared,
                ),
            }
            tracing::trace!("acquisition thread exiting cleanly");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
            events: rx,
            counters,
            provenance,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.counters.snapshot()
    }

    /// Drain any pending diagnostic events without blocking.
    pub fn drain_diagnostics(&self) -> Vec<DiagnosticEvent> {
        self.events.try_iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cooperative stop: set the flag, join the thread, return the final
    /// counters. The join is bounded by one pacing interval because the loop
    /// re-checks the flag around every sleep.
    pub fn stop(mut self) -> AcquisitionStats {
        self.signal_and_join();
        self.counters.snapshot()
    }

    fn signal_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("acquisition thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're possibly in Drop)
                    tracing::warn!(?e, "acquisition thread panicked during shutdown");
                }
            }
        }
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        self.signal_and_join();
    }
}

#[allow(clippy::too_many_arguments)]
fn run_serial<C: Clock>(
    mut transport: Box<dyn Transport + Send>,
    parser: &LineParser,
    seq: &mut SequenceAssigner,
    buffer: &TelemetryBuffer,
    cfg: &AcquisitionCfg,
    clock: &C,
    shutdown: &AtomicBool,
    counters: &Counters,
    events: &xch::Sender<DiagnosticEvent>,
) {
    let poll = Duration::from_millis(cfg.poll_ms);
    let read_timeout = Duration::from_millis(cfg.read_timeout_ms);
    let backoff = Duration::from_millis(cfg.backoff_ms);

    loop {
        // Immediate shutdown check (lock-free atomic)
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("acquisition thread received shutdown signal");
            break;
        }

        if !transport.has_data() {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            clock.sleep(poll);
            continue;
        }

        match transport.read_line(read_timeout) {
            Ok(line) => {
                counters.lines_read.fetch_add(1, Ordering::Relaxed);
                match parser.parse(&line, seq) {
                    Ok(reading) => {
                        counters.last_sequence.store(reading.sequence, Ordering::Relaxed);
                        counters.accepted.fetch_add(1, Ordering::Relaxed);
                        tracing::trace!(
                            sequence = reading.sequence,
                            power = reading.power,
                            rpm = reading.rotational_speed,
                            "reading accepted"
                        );
                        buffer.push(reading);
                    }
                    Err(error) => {
                        counters.rejected.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(error = %error, line = %line.trim(), "line discarded");
                        let _ = events.try_send(DiagnosticEvent::LineRejected {
                            error,
                            line: line.trim().to_string(),
                        });
                    }
                }
            }
            Err(e) => {
                // Transient by contract: log, back off, retry. Never fatal.
                counters.transient_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "transient read error, backing off");
                let _ = events.try_send(DiagnosticEvent::TransientReadError {
                    detail: e.to_string(),
                });
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(backoff);
            }
        }
    }

    // Release the device only after the loop has exited, so no reader can
    // race against a half-closed transport.
    if let Err(e) = transport.close() {
        tracing::warn!(error = %e, "transport close failed");
    }
}

fn run_synthetic<C: Clock>(
    mut generator: SyntheticGenerator,
    seq: &mut SequenceAssigner,
    buffer: &TelemetryBuffer,
    cfg: &AcquisitionCfg,
    clock: &C,
    shutdown: &AtomicBool,
    counters: &Counters,
) {
    let tick = Duration::from_millis(cfg.tick_ms);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("synthetic acquisition received shutdown signal");
            break;
        }

        let values = generator.next_values();
        let reading = Reading::from_values(seq.next(), values, Some(SystemTime::now()));
        counters.last_sequence.store(reading.sequence, Ordering::Relaxed);
        counters.accepted.fetch_add(1, Ordering::Relaxed);
        buffer.push(reading);

        // Check shutdown before sleep to avoid unnecessary delay
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        clock.sleep(tick);
    }
}
