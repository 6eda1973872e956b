//! Quick Start Example
//!
//! Demonstrates the full acquisition pipeline without hardware: a scripted
//! transport stands in for the serial device, and the monitor exposes the
//! same accessors a dashboard would poll.
//!
//! Run with `cargo run -p rigtel_core --example quick_start`.

use std::time::Duration;

use rigtel_core::mocks::ScriptedTransport;
use rigtel_core::{AcquisitionCfg, CalibrationTable, Channel, ChannelSpec, Monitor};
use rigtel_traits::Transport;

fn main() -> Result<(), eyre::Report> {
    // This bench runs a 240 V supply and a fast spindle, so raise those two
    // ranges over factory before parsing.
    let table = CalibrationTable::with_overrides([
        (
            Channel::Voltage,
            ChannelSpec { scale: 1.0, offset: 0.0, min: 0.0, max: 300.0 },
        ),
        (
            Channel::RotationalSpeed,
            ChannelSpec { scale: 1.0, offset: 0.0, min: 0.0, max: 20_000.0 },
        ),
    ]);

    let script = [
        "426.5,240.2,46.3,272.1,12500,0.53",
        "427.9,240.0,46.1,271.4,12480,0.54",
        "garbled,line,from,a,noisy,wire",
        "429.2,239.7,45.8,270.9,12460,0.52",
    ];

    let mut monitor = Monitor::builder()
        .with_capacity(100)
        .with_calibration(table)
        .with_acquisition(AcquisitionCfg {
            poll_ms: 10,
            read_timeout_ms: 50,
            backoff_ms: 100,
            tick_ms: 100,
        })
        .with_transport_opener(move || {
            Ok(Box::new(ScriptedTransport::new(script)) as Box<dyn Transport + Send>)
        })
        .build()?;

    monitor.start()?;
    std::thread::sleep(Duration::from_millis(200));

    if let Some(latest) = monitor.latest_point() {
        println!(
            "latest: #{} power={:.2} W rpm={:.2}",
            latest.sequence, latest.power, latest.rotational_speed
        );
    }

    println!("recent readings, oldest first:");
    for reading in monitor.recent_points(10) {
        println!(
            "  #{} {:.2},{:.2},{:.2},{:.2},{:.2},{:.3}",
            reading.sequence,
            reading.power,
            reading.voltage,
            reading.sound,
            reading.torque,
            reading.rotational_speed,
            reading.vibration
        );
    }

    monitor.stop();
    Ok(())
}
