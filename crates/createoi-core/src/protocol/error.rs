//! Protocol errors

use thiserror::Error;

/// Errors raised while constructing a command
///
/// A command that fails validation is never queued or transmitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A numeric parameter fell outside its inclusive range
    #[error("{field} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// Parameter name
        field: &'static str,
        /// Value given
        value: i32,
        /// Lowest accepted value
        min: i32,
        /// Highest accepted value
        max: i32,
    },

    /// Not one of the twelve OI baud rates
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// No demo with this number
    #[error("Invalid demo number: {0}")]
    InvalidDemo(u8),

    /// Note count outside 1..=16
    #[error("Song must have between 1 and 16 notes, got {0}")]
    SongLength(usize),
}

impl CommandError {
    /// Check that `value` lies in `[min, max]`
    pub(crate) fn check_range(
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    ) -> Result<(), CommandError> {
        if value < min || value > max {
            return Err(CommandError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during connection setup and dispatch
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// The dispatch queue no longer accepts commands
    #[error("Connection closed")]
    Closed,

    /// The sender loop stopped abnormally (e.g. a failed reopen)
    #[error("Sender aborted: {0}")]
    SenderAborted(String),

    /// A command or configuration value failed validation
    #[error(transparent)]
    InvalidCommand(#[from] CommandError),

    /// The sender thread could not be spawned
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
