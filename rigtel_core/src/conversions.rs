//! Bridges from `rigtel_config` schema types to `rigtel_core` runtime types.
//!
//! These eliminate field-by-field mapping in the CLI and are the one place
//! where string channel names become `Channel` values.

use crate::channel::{CalibrationTable, Channel, ChannelSpec};
use crate::config::AcquisitionCfg;
use crate::error::{BuildError, Result};

impl AcquisitionCfg {
    /// Combine the transport and simulation sections into loop pacing.
    pub fn from_config(cfg: &rigtel_config::Config) -> Self {
        Self {
            poll_ms: cfg.transport.poll_ms,
            read_timeout_ms: cfg.transport.read_timeout_ms,
            backoff_ms: cfg.transport.backoff_ms,
            tick_ms: cfg.simulation.tick_ms,
        }
    }
}

/// Build the calibration table from TOML overrides plus optional CSV rows.
/// CSV rows (bench-produced) win over TOML (hand-maintained), per channel.
pub fn calibration_table(
    cfg: &rigtel_config::CalibrationCfg,
    csv_rows: Option<&[rigtel_config::CalibrationRow]>,
) -> Result<CalibrationTable> {
    let mut table = CalibrationTable::factory();

    for (name, ov) in cfg.entries() {
        let channel: Channel = name
            .parse()
            // Unreachable for the fixed schema fields; guards future edits.
            .map_err(|_| BuildError::InvalidConfig("unknown calibration channel"))?;
        let mut spec = *table.spec(channel);
        if let Some(scale) = ov.scale {
            spec.scale = scale;
        }
        if let Some(offset) = ov.offset {
            spec.offset = offset;
        }
        if let Some(min) = ov.min {
            spec.min = min;
        }
        if let Some(max) = ov.max {
            spec.max = max;
        }
        table.set(channel, spec);
    }

    if let Some(rows) = csv_rows {
        for row in rows {
            let channel: Channel = row
                .channel
                .parse()
                .map_err(|_| BuildError::InvalidConfig("unknown calibration channel"))?;
            table.set(
                channel,
                ChannelSpec {
                    scale: row.scale,
                    offset: row.offset,
                    min: row.min,
                    max: row.max,
                },
            );
        }
    }

    Ok(table)
}
