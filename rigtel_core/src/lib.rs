#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core telemetry acquisition engine (transport-agnostic).
//!
//! This crate turns raw comma-separated lines from a six-channel rig sensor
//! head into validated, calibrated, sequence-stamped readings and keeps the
//! most recent of them in a bounded, thread-safe buffer. All transport
//! interactions go through `rigtel_traits::Transport`.
//!
//! ## Architecture
//!
//! - **Channels**: the six physical quantities and their calibration table
//!   (`channel` module)
//! - **Parsing**: raw line → `Reading` with per-channel calibration and range
//!   validation (`parser` module)
//! - **Buffering**: fixed-capacity, overwrite-oldest, single-writer /
//!   multi-reader ring (`buffer` module)
//! - **Acquisition**: the one background producer thread that owns the
//!   transport or the synthetic generator (`acquisition` module)
//! - **Facade**: `Monitor` exposes `start` / `stop` / `latest_point` /
//!   `recent_points` to consumers (`monitor` module)
//!
//! Consumers never see acquisition-side failures; they only observe data
//! (possibly stale or absent) through the buffer accessors.

pub mod acquisition;
pub mod buffer;
pub mod channel;
pub mod config;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod monitor;
pub mod parser;
pub mod reading;
pub mod synth;
pub mod util;

pub use acquisition::{Acquisition, AcquisitionStats, DiagnosticEvent, Provenance, Source};
pub use buffer::TelemetryBuffer;
pub use channel::{CalibrationTable, Channel, ChannelSpec};
pub use config::AcquisitionCfg;
pub use error::{AcquisitionError, BuildError, ParseError};
pub use monitor::{Monitor, MonitorBuilder, TransportOpener};
pub use parser::{LineParser, SequenceAssigner};
pub use reading::Reading;
pub use synth::SyntheticGenerator;
