#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration parsing for the rig telemetry system.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The calibration CSV loader enforces exact headers and validates every
//!   row before any override is applied.
use serde::Deserialize;

/// Channel names accepted in calibration overrides (TOML tables and CSV rows).
/// `rpm` is the wire-protocol shorthand for `rotational_speed`.
pub const CHANNEL_NAMES: &[&str] = &[
    "power",
    "voltage",
    "sound",
    "torque",
    "rotational_speed",
    "rpm",
    "vibration",
];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransportCfg {
    /// Explicit serial port (e.g. "/dev/ttyUSB0"). Omit to auto-detect.
    pub port: Option<String>,
    /// Line speed in baud.
    pub baud: u32,
    /// Idle interval while no data is pending (ms).
    pub poll_ms: u64,
    /// Per-line read timeout once data is pending (ms).
    pub read_timeout_ms: u64,
    /// Backoff after a transient read error (ms).
    pub backoff_ms: u64,
}

impl Default for TransportCfg {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            poll_ms: 100,
            read_timeout_ms: 200,
            backoff_ms: 1_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BufferCfg {
    /// Fixed capacity of the telemetry ring; oldest entries are evicted.
    pub capacity: usize,
}

impl Default for BufferCfg {
    fn default() -> Self {
        Self { capacity: 1_000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Interval between synthetic readings (ms).
    pub tick_ms: u64,
    /// Optional RNG seed for reproducible synthetic runs.
    pub seed: Option<u64>,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Partial per-channel calibration override. Unset fields keep factory values.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct ChannelOverride {
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CalibrationCfg {
    pub power: Option<ChannelOverride>,
    pub voltage: Option<ChannelOverride>,
    pub sound: Option<ChannelOverride>,
    pub torque: Option<ChannelOverride>,
    #[serde(alias = "rpm")]
    pub rotational_speed: Option<ChannelOverride>,
    pub vibration: Option<ChannelOverride>,
}

impl CalibrationCfg {
    /// Iterate the overrides that are present, paired with their channel name.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, ChannelOverride)> {
        [
            ("power", self.power),
            ("voltage", self.voltage),
            ("sound", self.sound),
            ("torque", self.torque),
            ("rotational_speed", self.rotational_speed),
            ("vibration", self.vibration),
        ]
        .into_iter()
        .filter_map(|(name, ov)| ov.map(|ov| (name, ov)))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub transport: TransportCfg,
    pub buffer: BufferCfg,
    pub simulation: SimulationCfg,
    pub logging: Logging,
    pub calibration: CalibrationCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Transport
        if self.transport.baud == 0 {
            eyre::bail!("transport.baud must be > 0");
        }
        if self.transport.poll_ms == 0 {
            eyre::bail!("transport.poll_ms must be >= 1");
        }
        if self.transport.read_timeout_ms == 0 {
            eyre::bail!("transport.read_timeout_ms must be >= 1");
        }
        if self.transport.backoff_ms == 0 {
            eyre::bail!("transport.backoff_ms must be >= 1");
        }
        if let Some(port) = &self.transport.port
            && port.trim().is_empty()
        {
            eyre::bail!("transport.port must not be blank (omit it to auto-detect)");
        }

        // Buffer
        if self.buffer.capacity == 0 {
            eyre::bail!("buffer.capacity must be >= 1");
        }
        if self.buffer.capacity > 1_000_000 {
            eyre::bail!("buffer.capacity is unreasonably large (>1e6)");
        }

        // Simulation
        if self.simulation.tick_ms == 0 {
            eyre::bail!("simulation.tick_ms must be >= 1");
        }

        // Calibration overrides
        for (name, ov) in self.calibration.entries() {
            validate_override(name, &ov)?;
        }

        Ok(())
    }
}

fn validate_override(name: &str, ov: &ChannelOverride) -> eyre::Result<()> {
    if let Some(scale) = ov.scale {
        if !scale.is_finite() {
            eyre::bail!("calibration.{name}.scale must be finite");
        }
        if scale == 0.0 {
            eyre::bail!("calibration.{name}.scale must be non-zero");
        }
    }
    if let Some(offset) = ov.offset
        && !offset.is_finite()
    {
        eyre::bail!("calibration.{name}.offset must be finite");
    }
    for (field, bound) in [("min", ov.min), ("max", ov.max)] {
        if let Some(b) = bound
            && !b.is_finite()
        {
            eyre::bail!("calibration.{name}.{field} must be finite");
        }
    }
    if let (Some(min), Some(max)) = (ov.min, ov.max)
        && min > max
    {
        eyre::bail!("calibration.{name}: min ({min}) exceeds max ({max})");
    }
    Ok(())
}

/// Calibration CSV schema.
///
/// Expected headers:
/// channel,scale,offset,min,max
///
/// Example:
/// channel,scale,offset,min,max
/// power,1.02,-3.5,0,1830
/// rpm,1.0,0.0,0,20000
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationRow {
    pub channel: String,
    pub scale: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
}

impl CalibrationRow {
    fn validate(&self) -> eyre::Result<()> {
        let name = self.channel.trim().to_ascii_lowercase();
        if !CHANNEL_NAMES.contains(&name.as_str()) {
            eyre::bail!(
                "unknown channel '{}' (expected one of: {})",
                self.channel,
                CHANNEL_NAMES.join(", ")
            );
        }
        if !self.scale.is_finite() || self.scale == 0.0 {
            eyre::bail!("channel '{}': scale must be finite and non-zero", name);
        }
        if !self.offset.is_finite() {
            eyre::bail!("channel '{}': offset must be finite", name);
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            eyre::bail!("channel '{}': min/max must be finite", name);
        }
        if self.min > self.max {
            eyre::bail!(
                "channel '{}': min ({}) exceeds max ({})",
                name,
                self.min,
                self.max
            );
        }
        Ok(())
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<Vec<CalibrationRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["channel", "scale", "offset", "min", "max"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'channel,scale,offset,min,max', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    let mut seen = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        let row_no = idx + 2; // 1-based, after the header line
        match rec {
            Ok(row) => {
                row.validate()
                    .map_err(|e| eyre::eyre!("invalid CSV row {}: {}", row_no, e))?;
                let name = canonical_channel_name(&row.channel);
                if seen.contains(&name) {
                    eyre::bail!("invalid CSV row {}: duplicate channel '{}'", row_no, name);
                }
                seen.push(name);
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", row_no, e);
            }
        }
    }

    Ok(rows)
}

/// Normalize a channel name: lowercase, `rpm` folded into `rotational_speed`.
pub fn canonical_channel_name(raw: &str) -> String {
    let name = raw.trim().to_ascii_lowercase();
    if name == "rpm" {
        "rotational_speed".to_string()
    } else {
        name
    }
}
