//! Payload Builder
//!
//! Assembles OI command payloads field by field.
//!
//! Field kinds:
//! - u8  : single raw byte
//! - i16 : 16-bit two's-complement value (big-endian, high byte first)
//! - u16 : 16-bit unsigned value (big-endian, high byte first)
//!
//! The OI protocol is big-endian for every multi-byte field.

use byteorder::{BigEndian, ByteOrder};

/// Build a command payload from typed fields
#[derive(Debug, Default, Clone)]
pub struct PayloadBuilder {
    bytes: Vec<u8>,
}

impl PayloadBuilder {
    /// Start an empty payload
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Pre-size the payload for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append a single byte
    pub fn u8(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    /// Append a signed 16-bit field, high byte first
    pub fn i16(mut self, value: i16) -> Self {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, value);
        self.bytes.extend_from_slice(&buf);
        self
    }

    /// Append an unsigned 16-bit field, high byte first
    pub fn u16(mut self, value: u16) -> Self {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.bytes.extend_from_slice(&buf);
        self
    }

    /// Append raw bytes verbatim
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    /// Finish and return the payload bytes
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build the wire form of a command: opcode byte followed by its payload
pub fn frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(opcode);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_big_endian() {
        let payload = PayloadBuilder::new().i16(500).i16(-2000).build();
        assert_eq!(
            payload,
            vec![
                0x01, 0xF4, // 500
                0xF8, 0x30, // -2000
            ]
        );
    }

    #[test]
    fn test_u16_special_radius() {
        let payload = PayloadBuilder::new().u16(0x8000).u16(0xFFFF).build();
        assert_eq!(payload, vec![0x80, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_mixed_fields() {
        let payload = PayloadBuilder::with_capacity(4)
            .u8(3)
            .u8(2)
            .bytes(&[60, 32])
            .build();
        assert_eq!(payload, vec![3, 2, 60, 32]);
    }

    #[test]
    fn test_frame() {
        assert_eq!(frame(128, &[]), vec![128]);
        assert_eq!(frame(141, &[4]), vec![141, 4]);
    }

    #[test]
    fn test_empty_payload() {
        assert!(PayloadBuilder::new().build().is_empty());
    }
}
