//! Open Interface Protocol
//!
//! Implements the iRobot Create Open Interface serial protocol: a single
//! opcode byte followed by a fixed or count-prefixed payload.
//!
//! Commands are queued on a [`Connection`] and written by one background
//! sender, which owns the serial port for the lifetime of the connection.

mod baud;
pub mod command_builder;
pub mod commands;
mod connection;
mod error;
pub mod sender;
pub mod serial;
pub mod stream;

pub use baud::BaudRate;
pub use command_builder::PayloadBuilder;
pub use commands::{Command, Demo, Note, Opcode, ResponseTimeout};
pub use connection::{Connection, ConnectionConfig};
pub use error::{CommandError, ProtocolError};
pub use sender::{Sleeper, ThreadSleeper};
pub use stream::{SerialOpener, Transport, TransportOpener};

/// Default baud rate of the Create's OI after power-on
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Baud rate at which bytes must be written one at a time
pub const PACED_BAUD_RATE: u32 = 115200;

/// Delay before each byte written at the paced baud rate, in microseconds
pub const BYTE_DELAY_US: u64 = 200;

/// Delay after reopening the port at a new baud rate, in milliseconds
pub const SETTLE_DELAY_MS: u64 = 100;

/// Default serial write timeout in milliseconds
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1000;
