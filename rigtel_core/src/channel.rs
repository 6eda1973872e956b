//! The six telemetry channels and their calibration table.
//!
//! Channels are a closed set: the wire protocol carries exactly these six
//! fields in this order, so "unknown channel" is unrepresentable by
//! construction rather than a runtime error.

use std::fmt;
use std::str::FromStr;

/// One physical quantity reported by the rig, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Power,
    Voltage,
    Sound,
    Torque,
    RotationalSpeed,
    Vibration,
}

impl Channel {
    /// All channels in wire order (the order fields appear on a line).
    pub const ALL: [Channel; 6] = [
        Channel::Power,
        Channel::Voltage,
        Channel::Sound,
        Channel::Torque,
        Channel::RotationalSpeed,
        Channel::Vibration,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this channel's field on a wire line.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Power => "Power",
            Channel::Voltage => "Voltage",
            Channel::Sound => "Sound",
            Channel::Torque => "Torque",
            Channel::RotationalSpeed => "RotationalSpeed",
            Channel::Vibration => "Vibration",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Power => "W",
            Channel::Voltage => "V",
            Channel::Sound => "dB",
            Channel::Torque => "Nm",
            Channel::RotationalSpeed => "rpm",
            Channel::Vibration => "Hz",
        }
    }

    /// Decimal places readings are rounded to. Vibration keeps an extra
    /// digit; its full-scale range is two orders of magnitude smaller than
    /// every other channel's.
    #[inline]
    pub fn decimals(self) -> u32 {
        match self {
            Channel::Vibration => 3,
            _ => 2,
        }
    }

    /// Whether an out-of-range value on this channel invalidates the whole
    /// reading. Sound, Torque and Vibration are recorded even when
    /// implausible, matching the device protocol.
    #[inline]
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            Channel::Power | Channel::Voltage | Channel::RotationalSpeed
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" => Ok(Channel::Power),
            "voltage" => Ok(Channel::Voltage),
            "sound" => Ok(Channel::Sound),
            "torque" => Ok(Channel::Torque),
            "rotational_speed" | "rotationalspeed" | "rpm" => Ok(Channel::RotationalSpeed),
            "vibration" | "vibrations" => Ok(Channel::Vibration),
            _ => Err(UnknownChannel(s.to_string())),
        }
    }
}

/// A channel name that is not one of the six defined channels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel name: {0}")]
pub struct UnknownChannel(pub String);

/// Per-channel calibration and inclusive valid range.
///
/// Calibration is the linear transform `raw * scale + offset`, applied before
/// range validation. Immutable once the table is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub scale: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
}

impl ChannelSpec {
    /// Factory spec: identity calibration and the documented sensor range.
    pub fn factory(channel: Channel) -> Self {
        let (min, max) = match channel {
            Channel::Power => (0.0, 1830.0),
            Channel::Voltage => (0.0, 30.0),
            Channel::Sound => (0.0, 50.0),
            Channel::Torque => (0.0, 13.0),
            Channel::RotationalSpeed => (0.0, 6000.0),
            Channel::Vibration => (0.0, 10.0),
        };
        Self {
            scale: 1.0,
            offset: 0.0,
            min,
            max,
        }
    }

    /// Apply the linear calibration to a raw field value.
    #[inline]
    pub fn calibrate(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    /// Inclusive range check on a calibrated value.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Calibration table covering exactly the six channels. Pure lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    specs: [ChannelSpec; Channel::COUNT],
}

impl CalibrationTable {
    /// Identity calibration with factory ranges for every channel.
    pub fn factory() -> Self {
        Self {
            specs: Channel::ALL.map(ChannelSpec::factory),
        }
    }

    /// Factory table with the given channels replaced wholesale.
    pub fn with_overrides(overrides: impl IntoIterator<Item = (Channel, ChannelSpec)>) -> Self {
        let mut table = Self::factory();
        for (channel, spec) in overrides {
            table.specs[channel.index()] = spec;
        }
        table
    }

    #[inline]
    pub fn spec(&self, channel: Channel) -> &ChannelSpec {
        &self.specs[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, spec: ChannelSpec) {
        self.specs[channel.index()] = spec;
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::factory()
    }
}
