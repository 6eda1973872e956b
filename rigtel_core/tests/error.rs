use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rigtel_core::acquisition::{Acquisition, Source};
use rigtel_core::error::BuildError;
use rigtel_core::{
    AcquisitionCfg, CalibrationTable, Channel, ChannelSpec, LineParser, Monitor, ParseError,
    SequenceAssigner, TelemetryBuffer,
};
use rigtel_traits::{MonotonicClock, Transport};

/// A transport that claims data but always fails the read — exercises the
/// transient-error backoff path.
struct FlakyTransport;

impl Transport for FlakyTransport {
    fn has_data(&mut self) -> bool {
        true
    }
    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        Err("device hiccup".into())
    }
    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[test]
fn transient_read_errors_are_absorbed_not_fatal() {
    let buffer = Arc::new(TelemetryBuffer::new(8));
    let acquisition = Acquisition::spawn(
        Source::Serial(Box::new(FlakyTransport)),
        LineParser::new(CalibrationTable::factory()),
        SequenceAssigner::new(),
        Arc::clone(&buffer),
        AcquisitionCfg {
            poll_ms: 5,
            read_timeout_ms: 10,
            backoff_ms: 5,
            tick_ms: 5,
        },
        MonotonicClock::new(),
    );

    std::thread::sleep(Duration::from_millis(60));
    assert!(acquisition.is_running(), "transient errors must not kill the loop");

    let stats = acquisition.stop();
    assert!(stats.transient_errors >= 2, "expected retries, got {stats:?}");
    assert_eq!(stats.accepted, 0);
    // Readers only ever see an absence of data, never an error.
    assert!(buffer.latest().is_none());
    assert!(buffer.recent(5).is_empty());
}

#[test]
fn parse_errors_render_with_context() {
    assert_eq!(
        ParseError::FieldCount { got: 4 }.to_string(),
        "expected 6 comma-separated fields, got 4"
    );
    assert_eq!(
        ParseError::NotNumeric {
            channel: Channel::Torque,
            value: "x7".to_string(),
        }
        .to_string(),
        "Torque field \"x7\" is not numeric"
    );
    let msg = ParseError::OutOfRange {
        channel: Channel::Power,
        value: 2000.0,
        min: 0.0,
        max: 1830.0,
    }
    .to_string();
    assert!(msg.contains("Power"));
    assert!(msg.contains("2000"));
    assert!(msg.contains("0..=1830"));
}

#[test]
fn builder_rejects_bad_calibration_with_typed_error() {
    let table = CalibrationTable::with_overrides([(
        Channel::Sound,
        ChannelSpec {
            scale: 0.0,
            offset: 0.0,
            min: 0.0,
            max: 50.0,
        },
    )]);
    let err = Monitor::builder()
        .with_calibration(table)
        .build()
        .expect_err("zero scale should be rejected");

    let be = err
        .downcast_ref::<BuildError>()
        .expect("expected BuildError inside Report");
    match be {
        BuildError::InvalidConfig(msg) => {
            assert!(msg.contains("scale"), "unexpected message: {msg}")
        }
    }
}

#[test]
fn builder_rejects_inverted_range() {
    let table = CalibrationTable::with_overrides([(
        Channel::Voltage,
        ChannelSpec {
            scale: 1.0,
            offset: 0.0,
            min: 30.0,
            max: 0.0,
        },
    )]);
    let err = Monitor::builder()
        .with_calibration(table)
        .build()
        .expect_err("min > max should be rejected");
    assert!(format!("{err}").contains("min exceeds max"));
}

#[test]
fn builder_rejects_zero_intervals() {
    for cfg in [
        AcquisitionCfg { poll_ms: 0, ..AcquisitionCfg::default() },
        AcquisitionCfg { read_timeout_ms: 0, ..AcquisitionCfg::default() },
        AcquisitionCfg { backoff_ms: 0, ..AcquisitionCfg::default() },
        AcquisitionCfg { tick_ms: 0, ..AcquisitionCfg::default() },
    ] {
        let err = Monitor::builder()
            .with_acquisition(cfg)
            .build()
            .expect_err("zero interval should be rejected");
        assert!(err.downcast_ref::<BuildError>().is_some());
    }
}
