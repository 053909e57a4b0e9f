//! Connection management
//!
//! Opens the serial link to the Create and hands commands to its sender loop.
//! After open, the connection never touches the transport: all I/O happens
//! on the sender thread.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use super::sender::{Sender, SenderSettings};
use super::{
    BaudRate, Command, ProtocolError, SerialOpener, Sleeper, ThreadSleeper, TransportOpener,
    BYTE_DELAY_US, DEFAULT_BAUD_RATE, SETTLE_DELAY_MS,
};

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Serial port name
    pub port_name: String,
    /// Baud rate the Create is currently using
    pub baud_rate: u32,
    /// Delay before each paced byte, in microseconds
    pub byte_delay_us: u64,
    /// Delay after reopening at a new rate, in milliseconds
    pub settle_delay_ms: u64,
    /// Serial write timeout in milliseconds (port default if unset)
    pub write_timeout_ms: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            byte_delay_us: BYTE_DELAY_US,
            settle_delay_ms: SETTLE_DELAY_MS,
            write_timeout_ms: None,
        }
    }
}

impl ConnectionConfig {
    /// Defaults for everything but the port and starting rate
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            ..Self::default()
        }
    }

    fn sender_settings(&self) -> SenderSettings {
        SenderSettings {
            port_name: self.port_name.clone(),
            byte_delay: Duration::from_micros(self.byte_delay_us),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

/// An open OI link with its background sender
///
/// Commands are written in exactly the order they are sent, across any
/// number of producer threads sharing `&Connection`.
pub struct Connection {
    port_name: String,
    initial_baud: BaudRate,
    queue: Option<UnboundedSender<Command>>,
    sender: Option<JoinHandle<()>>,
}

impl Connection {
    /// Open `port` at `initial_baud`
    ///
    /// The Create must already be using `initial_baud`; switch rates later
    /// with [`Command::baud`].
    pub fn open(port: &str, initial_baud: u32) -> Result<Self, ProtocolError> {
        Self::with_config(ConnectionConfig::new(port, initial_baud))
    }

    /// Open a serial connection from a full configuration
    pub fn with_config(config: ConnectionConfig) -> Result<Self, ProtocolError> {
        let opener = SerialOpener::new(config.write_timeout_ms);
        Self::open_with(config, Box::new(opener), Box::new(ThreadSleeper))
    }

    /// Open a connection over any transport
    pub fn open_with(
        config: ConnectionConfig,
        mut opener: Box<dyn TransportOpener>,
        sleeper: Box<dyn Sleeper>,
    ) -> Result<Self, ProtocolError> {
        let baud = BaudRate::try_from(config.baud_rate)?;
        let transport = opener.open(&config.port_name, baud)?;
        info!(port = %config.port_name, baud = %baud, "connection opened");

        let (tx, rx) = mpsc::unbounded_channel();
        let sender = Sender::new(transport, opener, sleeper, baud, config.sender_settings());
        let handle = std::thread::Builder::new()
            .name("createoi-sender".to_string())
            .spawn(move || sender.run(rx))?;

        Ok(Self {
            port_name: config.port_name,
            initial_baud: baud,
            queue: Some(tx),
            sender: Some(handle),
        })
    }

    /// Port this connection was opened on
    pub fn port(&self) -> &str {
        &self.port_name
    }

    /// Rate the connection was opened at
    pub fn initial_baud(&self) -> BaudRate {
        self.initial_baud
    }

    /// Whether [`Connection::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.queue.is_none()
    }

    /// Queue a single command for transmission
    pub fn send(&self, command: Command) -> Result<(), ProtocolError> {
        let queue = self.queue.as_ref().ok_or(ProtocolError::Closed)?;
        debug!(opcode = ?command.opcode(), "queueing command");
        queue.send(command).map_err(|_| ProtocolError::Closed)
    }

    /// Queue a sequence of commands, preserving their order
    pub fn send_many<I>(&self, commands: I) -> Result<(), ProtocolError>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.send(command)?;
        }
        Ok(())
    }

    /// Stop accepting commands; queued commands are still written
    pub fn close(&mut self) {
        if self.queue.take().is_some() {
            debug!(port = %self.port_name, "dispatch queue closed");
        }
    }

    /// Close and wait for the sender to drain and release the port
    pub fn join(mut self) -> Result<(), ProtocolError> {
        self.close();
        match self.sender.take() {
            Some(handle) => handle
                .join()
                .map_err(|panic| ProtocolError::SenderAborted(panic_message(panic.as_ref()))),
            None => Ok(()),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "sender panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.baud_rate, 57600);
        assert_eq!(config.byte_delay_us, 200);
        assert_eq!(config.settle_delay_ms, 100);
        assert!(config.write_timeout_ms.is_none());
    }

    #[test]
    fn test_sender_settings() {
        let settings = ConnectionConfig::new("/dev/ttyUSB0", 115200).sender_settings();
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.byte_delay, Duration::from_micros(200));
        assert_eq!(settings.settle_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "sender panicked");
    }

    #[test]
    fn test_open_rejects_unsupported_baud() {
        match Connection::open("/dev/ttyUSB0", 470) {
            Err(ProtocolError::InvalidCommand(e)) => {
                assert_eq!(e.to_string(), "Unsupported baud rate: 470")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("470 baud should be rejected"),
        }
    }
}
