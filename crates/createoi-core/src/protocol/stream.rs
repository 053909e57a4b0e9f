//! Transport abstraction
//!
//! The sender loop only needs a byte sink it can write to and close, plus a
//! way to open a fresh one on the same port at a new baud rate.

use serialport::SerialPort;
use std::io::{self, Write};

use super::serial::open_port;
use super::{BaudRate, ProtocolError};

/// An ordered, reliable byte sink
pub trait Transport: Send {
    /// Write all of `data`
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the underlying device
    fn close(&mut self) -> io::Result<()>;
}

/// Opens transports by port name and baud rate
pub trait TransportOpener: Send {
    /// Open `port` at `baud`
    fn open(&mut self, port: &str, baud: BaudRate) -> Result<Box<dyn Transport>, ProtocolError>;
}

/// Serial port wrapper implementing Transport
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Wrap an already configured port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match self.port.as_mut() {
            Some(port) => port.write_all(data),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "serial port already closed",
            )),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the handle closes the device.
        self.port.take();
        Ok(())
    }
}

/// Opens [`SerialTransport`]s through the `serialport` crate
#[derive(Debug, Clone, Default)]
pub struct SerialOpener {
    write_timeout_ms: Option<u64>,
}

impl SerialOpener {
    /// Opener using `write_timeout_ms`, or the default timeout if `None`
    pub fn new(write_timeout_ms: Option<u64>) -> Self {
        Self { write_timeout_ms }
    }
}

impl TransportOpener for SerialOpener {
    fn open(&mut self, port: &str, baud: BaudRate) -> Result<Box<dyn Transport>, ProtocolError> {
        let serial = open_port(port, baud, self.write_timeout_ms)?;
        Ok(Box::new(SerialTransport::new(serial)))
    }
}
