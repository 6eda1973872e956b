//! Human-readable error descriptions and structured JSON error formatting.

use rigtel_core::error::BuildError;
use rigtel_hardware::error::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or calibration CSV.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::NoPorts => {
                "What happened: No serial ports were found.\nLikely causes: The rig is not plugged in, or the USB bridge driver is missing.\nHow to fix: Connect the device and check `rigtel ports`; use --simulate to run without hardware.".to_string()
            }
            HwError::Open { port, detail } => format!(
                "What happened: Could not open serial port {port} ({detail}).\nLikely causes: Another process holds the port, or the current user lacks permission.\nHow to fix: Close competing software, check group membership (e.g. dialout), or pass --port to pick a different device."
            ),
            HwError::Enumerate(detail) => format!(
                "What happened: Serial port enumeration failed ({detail}).\nLikely causes: Platform serial stack unavailable.\nHow to fix: Re-run with --simulate, or check the OS serial subsystem."
            ),
            HwError::Timeout => {
                "What happened: The device stopped sending data.\nLikely causes: Wrong baud rate or a wiring fault.\nHow to fix: Verify transport.baud in the config matches the device firmware.".to_string()
            }
            HwError::Io(e) => format!(
                "What happened: Serial I/O failed ({e}).\nLikely causes: Device unplugged mid-run.\nHow to fix: Reconnect and restart acquisition."
            ),
        };
    }

    // Calibration CSV header special-case (may sit below a context layer)
    let msg = err.to_string();
    if err
        .chain()
        .any(|c| c.to_string().contains("calibration CSV must have headers"))
    {
        return "Invalid headers in calibration CSV. Expected 'channel,scale,offset,min,max'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for config/build problems, 3 for transport problems,
/// 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<HwError>().is_some() {
        return 3;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if err.downcast_ref::<BuildError>().is_some() {
        "Config"
    } else if err.downcast_ref::<HwError>().is_some() {
        "Transport"
    } else {
        "Error"
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
