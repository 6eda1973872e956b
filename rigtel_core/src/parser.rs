//! Wire-line parsing: one CSV line in, one validated `Reading` out.
//!
//! The wire format is ASCII, one reading per line, six comma-separated
//! decimal fields in the fixed order
//! `Power,Voltage,Sound,Torque,RotationalSpeed,Vibration`, newline
//! terminated, no header.

use std::time::SystemTime;

use crate::channel::{CalibrationTable, Channel};
use crate::error::ParseError;
use crate::reading::Reading;

/// Hands out sequence numbers: strictly increasing, starting at 1.
///
/// Single-owner by design; the acquisition loop is the only caller, so no
/// synchronization is needed. A rejected line must not consume a number,
/// which is why the parser only draws from the assigner after every check
/// has passed.
#[derive(Debug, Clone)]
pub struct SequenceAssigner {
    next: u64,
}

impl SequenceAssigner {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Resume numbering from `next` (used when acquisition restarts against
    /// a buffer that already holds readings).
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// The number the next accepted reading will get.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }
}

impl Default for SequenceAssigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses raw transport lines against a calibration table.
///
/// The parser itself is stateless; sequence state lives in the
/// `SequenceAssigner` the caller passes in, so the no-consumption-on-reject
/// rule is visible at the call site.
#[derive(Debug, Clone)]
pub struct LineParser {
    table: CalibrationTable,
}

impl LineParser {
    pub fn new(table: CalibrationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Parse one raw line into a `Reading`.
    ///
    /// Steps: split on commas (exactly six fields), parse each field as a
    /// finite float, calibrate (`raw * scale + offset`), validate critical
    /// channels against their range, round to channel precision, stamp with
    /// the next sequence number.
    pub fn parse(&self, raw: &str, seq: &mut SequenceAssigner) -> Result<Reading, ParseError> {
        self.parse_at(raw, seq, Some(SystemTime::now()))
    }

    /// `parse` with an explicit capture timestamp (or none, for tests that
    /// compare whole readings).
    pub fn parse_at(
        &self,
        raw: &str,
        seq: &mut SequenceAssigner,
        captured_at: Option<SystemTime>,
    ) -> Result<Reading, ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ParseError::FieldCount { got: 0 });
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != Channel::COUNT {
            return Err(ParseError::FieldCount { got: fields.len() });
        }

        let mut values = [0f64; Channel::COUNT];
        for channel in Channel::ALL {
            let field = fields[channel.index()].trim();
            let raw_value: f64 = field.parse().map_err(|_| ParseError::NotNumeric {
                channel,
                value: field.to_string(),
            })?;
            // "NaN"/"inf" satisfy f64::from_str but are garbage on this wire.
            if !raw_value.is_finite() {
                return Err(ParseError::NotNumeric {
                    channel,
                    value: field.to_string(),
                });
            }

            let spec = self.table.spec(channel);
            let value = spec.calibrate(raw_value);
            if !spec.contains(value) {
                if channel.is_critical() {
                    return Err(ParseError::OutOfRange {
                        channel,
                        value,
                        min: spec.min,
                        max: spec.max,
                    });
                }
                // Non-critical channels are recorded even when implausible.
                tracing::debug!(channel = %channel, value, "non-critical channel outside range");
            }
            values[channel.index()] = value;
        }

        Ok(Reading::from_values(seq.next(), values, captured_at))
    }
}
