//! Transport implementations for the rig telemetry system.
//!
//! `SerialLineTransport` speaks to the real device over a serial port;
//! `SimulatedTransport` is the no-op stand-in that satisfies the transport
//! contract when acquisition runs on in-process synthetic data instead.

pub mod discovery;
pub mod error;

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use rigtel_traits::Transport;
use serialport::SerialPort;

use crate::error::HwError;

/// How long a single driver-level read may block before we re-check the
/// caller's deadline.
const READ_SLICE: Duration = Duration::from_millis(20);

/// Line-oriented transport over a serial device.
///
/// Bytes are accumulated into an internal buffer; `read_line` hands out one
/// newline-terminated chunk at a time. Garbled or partial text is passed
/// through unmodified (lossy UTF-8), validation is the parser's job.
pub struct SerialLineTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
    rx_buf: Vec<u8>,
}

impl std::fmt::Debug for SerialLineTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLineTransport")
            .field("port_name", &self.port_name)
            .field("rx_buf_len", &self.rx_buf.len())
            .finish_non_exhaustive()
    }
}

impl SerialLineTransport {
    /// Open `port_name` at `baud`. The driver-level timeout is kept short;
    /// `read_line` enforces the caller's deadline itself.
    pub fn open(port_name: &str, baud: u32) -> Result<Self, HwError> {
        let port = serialport::new(port_name, baud)
            .timeout(READ_SLICE)
            .open()
            .map_err(|e| HwError::Open {
                port: port_name.to_string(),
                detail: e.to_string(),
            })?;
        tracing::info!(port = port_name, baud, "serial transport opened");
        Ok(Self {
            port,
            port_name: port_name.to_string(),
            rx_buf: Vec::with_capacity(256),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn buffered_line_end(&self) -> Option<usize> {
        self.rx_buf.iter().position(|&b| b == b'\n')
    }

    fn take_line(&mut self, end: usize) -> String {
        let line: Vec<u8> = self.rx_buf.drain(..=end).collect();
        String::from_utf8_lossy(&line).into_owned()
    }
}

impl Transport for SerialLineTransport {
    fn has_data(&mut self) -> bool {
        if self.buffered_line_end().is_some() {
            return true;
        }
        self.port.bytes_to_read().map(|n| n > 0).unwrap_or(false)
    }

    fn read_line(
        &mut self,
        timeout: Duration,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];

        loop {
            if let Some(end) = self.buffered_line_end() {
                return Ok(self.take_line(end));
            }
            if Instant::now() >= deadline {
                return Err(Box::new(HwError::Timeout));
            }
            match self.port.read(&mut chunk) {
                Ok(0) => {}
                Ok(n) => self.rx_buf.extend_from_slice(&chunk[..n]),
                // Driver timeout just means "nothing yet in this slice".
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(Box::new(HwError::Io(e))),
            }
        }
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Dropping the handle releases the device; flush what we can first.
        if let Err(e) = self.port.flush() {
            tracing::debug!(port = %self.port_name, error = %e, "flush on close failed");
        }
        Ok(())
    }
}

/// No-op transport for simulated runs. It satisfies the transport contract
/// but the acquisition loop never polls it; readings are generated
/// in-process instead.
#[derive(Debug, Default)]
pub struct SimulatedTransport;

impl Transport for SimulatedTransport {
    fn has_data(&mut self) -> bool {
        false
    }

    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other(
            "simulated transport supplies no lines",
        )))
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Open the configured port, or auto-detect one when `port` is `None`.
///
/// Auto-detection prefers recognized USB bridge descriptors and falls back
/// to the first enumerated port; an empty enumeration is `HwError::NoPorts`.
pub fn open_auto(port: Option<&str>, baud: u32) -> Result<SerialLineTransport, HwError> {
    if let Some(name) = port {
        return SerialLineTransport::open(name, baud);
    }

    let candidates = discovery::list_ports()?;
    let Some(candidate) = discovery::pick_port(&candidates) else {
        return Err(HwError::NoPorts);
    };
    tracing::info!(
        port = %candidate.name,
        descriptor = candidate.descriptor.as_deref().unwrap_or("<none>"),
        recognized = candidate.is_recognized(),
        "auto-detected serial port"
    );
    SerialLineTransport::open(&candidate.name, baud)
}
