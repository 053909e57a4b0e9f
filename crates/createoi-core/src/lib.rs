//! # createoi Core Library
//!
//! Core functionality for driving an iRobot Create over its Open Interface.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Validated construction of Open Interface (OI) commands
//! - Big-endian wire encoding of every command payload
//! - A serial connection with a single background sender that keeps
//!   commands in enqueue order, paces bytes at 115200 baud, and reopens
//!   the port when the baud rate changes
//!
//! ## Example
//!
//! ```rust,ignore
//! use createoi_core::protocol::{Command, Connection};
//!
//! let conn = Connection::open("/dev/ttyUSB0", 57600)?;
//! conn.send_many([Command::start(), Command::full()])?;
//! conn.send(Command::drive(200, 500)?)?;
//! conn.join()?;
//! ```

pub mod protocol;
pub mod sequence;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::protocol::{
        BaudRate, Command, CommandError, Connection, ConnectionConfig, Demo, Note, Opcode,
        ProtocolError,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
