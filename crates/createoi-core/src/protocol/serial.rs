//! Serial port handling
//!
//! Provides low-level serial port access for the Create's OI link.

use serialport::SerialPort;
use std::time::Duration;

use super::{BaudRate, ProtocolError, DEFAULT_WRITE_TIMEOUT_MS};

/// Open a serial port at `baud` with the OI's 8N1 framing
pub fn open_port(
    name: &str,
    baud: BaudRate,
    write_timeout_ms: Option<u64>,
) -> Result<Box<dyn SerialPort>, ProtocolError> {
    let timeout = write_timeout_ms.unwrap_or(DEFAULT_WRITE_TIMEOUT_MS);

    let mut port = serialport::new(name, baud.bits_per_second())
        .timeout(Duration::from_millis(timeout))
        .open()
        .map_err(|e| ProtocolError::SerialError(format!("{}: {}", name, e)))?;

    configure_port(port.as_mut())?;
    Ok(port)
}

/// Configure a serial port for OI communication
pub fn configure_port(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    // 8 data bits, no parity, 1 stop bit, no flow control
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_parity(serialport::Parity::None)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    Ok(())
}
