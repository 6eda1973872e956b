//! One validated, calibrated, sequence-stamped telemetry sample.

use std::time::SystemTime;

use crate::channel::Channel;
use crate::util::round_to;

/// A single accepted six-channel sample.
///
/// Constructed only by the line parser (on successful validation) or the
/// synthetic generator path; never mutated afterwards. Values are already
/// calibrated and rounded to channel precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Unique, strictly increasing, starts at 1.
    pub sequence: u64,
    pub power: f64,
    pub voltage: f64,
    pub sound: f64,
    pub torque: f64,
    pub rotational_speed: f64,
    pub vibration: f64,
    /// Wall-clock capture time, when known.
    pub captured_at: Option<SystemTime>,
}

impl Reading {
    /// Build a reading from calibrated values in wire order, rounding each
    /// to its channel precision.
    pub fn from_values(
        sequence: u64,
        values: [f64; Channel::COUNT],
        captured_at: Option<SystemTime>,
    ) -> Self {
        let mut rounded = [0f64; Channel::COUNT];
        for channel in Channel::ALL {
            rounded[channel.index()] = round_to(values[channel.index()], channel.decimals());
        }
        Self {
            sequence,
            power: rounded[Channel::Power.index()],
            voltage: rounded[Channel::Voltage.index()],
            sound: rounded[Channel::Sound.index()],
            torque: rounded[Channel::Torque.index()],
            rotational_speed: rounded[Channel::RotationalSpeed.index()],
            vibration: rounded[Channel::Vibration.index()],
            captured_at,
        }
    }

    /// Value of a single channel.
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Power => self.power,
            Channel::Voltage => self.voltage,
            Channel::Sound => self.sound,
            Channel::Torque => self.torque,
            Channel::RotationalSpeed => self.rotational_speed,
            Channel::Vibration => self.vibration,
        }
    }
}
