//! Supported OI baud rates

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CommandError, PACED_BAUD_RATE};

/// One of the twelve baud rates the Create's OI can switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    /// 300 baud (code 0)
    B300,
    /// 600 baud (code 1)
    B600,
    /// 1200 baud (code 2)
    B1200,
    /// 2400 baud (code 3)
    B2400,
    /// 4800 baud (code 4)
    B4800,
    /// 9600 baud (code 5)
    B9600,
    /// 14400 baud (code 6)
    B14400,
    /// 19200 baud (code 7)
    B19200,
    /// 28800 baud (code 8)
    B28800,
    /// 38400 baud (code 9)
    B38400,
    /// 57600 baud (code 10), the power-on default
    B57600,
    /// 115200 baud (code 11), written byte by byte
    B115200,
}

impl BaudRate {
    /// All supported rates, ordered by their protocol code
    pub const ALL: [BaudRate; 12] = [
        BaudRate::B300,
        BaudRate::B600,
        BaudRate::B1200,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B14400,
        BaudRate::B19200,
        BaudRate::B28800,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// Rate in bits per second
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B300 => 300,
            BaudRate::B600 => 600,
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B14400 => 14400,
            BaudRate::B19200 => 19200,
            BaudRate::B28800 => 28800,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }

    /// Code byte sent in the Baud command payload
    pub fn code(self) -> u8 {
        match self {
            BaudRate::B300 => 0,
            BaudRate::B600 => 1,
            BaudRate::B1200 => 2,
            BaudRate::B2400 => 3,
            BaudRate::B4800 => 4,
            BaudRate::B9600 => 5,
            BaudRate::B14400 => 6,
            BaudRate::B19200 => 7,
            BaudRate::B28800 => 8,
            BaudRate::B38400 => 9,
            BaudRate::B57600 => 10,
            BaudRate::B115200 => 11,
        }
    }

    /// Whether writes at this rate must be paced byte by byte
    pub fn is_paced(self) -> bool {
        self.bits_per_second() == PACED_BAUD_RATE
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = CommandError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|b| b.bits_per_second() == rate)
            .ok_or(CommandError::UnsupportedBaudRate(rate))
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.bits_per_second()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_table_order() {
        for (i, rate) in BaudRate::ALL.iter().enumerate() {
            assert_eq!(rate.code() as usize, i);
        }
    }

    #[test]
    fn test_try_from() {
        assert_eq!(BaudRate::try_from(57600), Ok(BaudRate::B57600));
        assert_eq!(BaudRate::try_from(115200), Ok(BaudRate::B115200));
        assert_eq!(
            BaudRate::try_from(470),
            Err(CommandError::UnsupportedBaudRate(470))
        );
        assert!(BaudRate::try_from(0).is_err());
        assert!(BaudRate::try_from(230400).is_err());
    }

    #[test]
    fn test_only_highest_rate_is_paced() {
        let paced: Vec<BaudRate> = BaudRate::ALL.into_iter().filter(|b| b.is_paced()).collect();
        assert_eq!(paced, vec![BaudRate::B115200]);
    }

    #[test]
    fn test_display() {
        assert_eq!(BaudRate::B19200.to_string(), "19200");
    }
}
