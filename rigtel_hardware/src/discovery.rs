//! Serial device discovery.
//!
//! Best-effort heuristic over enumerated port descriptors: prefer a port
//! whose USB product or manufacturer string contains a recognized bridge
//! identifier, fall back to the first enumerated port, report none when the
//! enumeration is empty.

use serialport::SerialPortType;

use crate::error::HwError;

/// Descriptor substrings that identify the rig's USB-serial bridge.
const KNOWN_DESCRIPTORS: &[&str] = &["Arduino", "CH340", "USB"];

/// One enumerated serial port with whatever descriptor text the OS exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub name: String,
    pub descriptor: Option<String>,
}

impl PortCandidate {
    pub fn is_recognized(&self) -> bool {
        self.descriptor
            .as_deref()
            .is_some_and(descriptor_is_recognized)
    }
}

pub fn descriptor_is_recognized(descriptor: &str) -> bool {
    KNOWN_DESCRIPTORS.iter().any(|k| descriptor.contains(k))
}

/// Enumerate serial ports visible to the OS.
pub fn list_ports() -> Result<Vec<PortCandidate>, HwError> {
    let ports = serialport::available_ports().map_err(|e| HwError::Enumerate(e.to_string()))?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let descriptor = match p.port_type {
                SerialPortType::UsbPort(info) => info.product.or(info.manufacturer),
                SerialPortType::PciPort | SerialPortType::BluetoothPort => None,
                SerialPortType::Unknown => None,
            };
            PortCandidate {
                name: p.port_name,
                descriptor,
            }
        })
        .collect())
}

/// Pick the port auto-detection would open: first recognized descriptor,
/// else the first port, else none.
pub fn pick_port(candidates: &[PortCandidate]) -> Option<&PortCandidate> {
    candidates
        .iter()
        .find(|c| c.is_recognized())
        .or_else(|| candidates.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, descriptor: Option<&str>) -> PortCandidate {
        PortCandidate {
            name: name.to_string(),
            descriptor: descriptor.map(str::to_string),
        }
    }

    #[test]
    fn recognizes_known_bridge_descriptors() {
        assert!(descriptor_is_recognized("Arduino Uno"));
        assert!(descriptor_is_recognized("CH340 serial converter"));
        assert!(descriptor_is_recognized("USB2.0-Serial"));
        assert!(!descriptor_is_recognized("Bluetooth modem"));
    }

    #[test]
    fn prefers_recognized_descriptor_over_first_port() {
        let candidates = vec![
            candidate("/dev/ttyS0", None),
            candidate("/dev/ttyACM0", Some("Arduino Uno")),
        ];
        let picked = pick_port(&candidates).unwrap();
        assert_eq!(picked.name, "/dev/ttyACM0");
    }

    #[test]
    fn falls_back_to_first_port() {
        let candidates = vec![
            candidate("/dev/ttyS0", Some("legacy UART")),
            candidate("/dev/ttyS1", None),
        ];
        let picked = pick_port(&candidates).unwrap();
        assert_eq!(picked.name, "/dev/ttyS0");
    }

    #[test]
    fn empty_enumeration_yields_none() {
        assert!(pick_port(&[]).is_none());
    }
}
