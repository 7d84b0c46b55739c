//! Link parameters: baud rates and the delays the display firmware needs.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// Baud rates the display firmware can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    #[default]
    B115200,
}

impl BaudRate {
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = LinkError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|baud| baud.as_u32() == value)
            .ok_or(LinkError::UnsupportedBaud(value))
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        baud.as_u32()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl FromStr for BaudRate {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| LinkError::InvalidBaud(s.to_string()))?;
        BaudRate::try_from(value)
    }
}

/// Delays around each exchange with the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Wait after opening the port; the board resets when the port opens
    pub settle: Duration,
    /// Wait after the clear that starts a transmission
    pub clear_settle: Duration,
    /// Wait between writing a command and reading its response
    pub command_delay: Duration,
    /// Wait before the second read when the first one came back empty
    pub retry_delay: Duration,
    /// Wait between two shapes of a transmission
    pub item_delay: Duration,
    /// Read timeout of the port
    pub read_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            clear_settle: Duration::from_millis(500),
            command_delay: Duration::from_millis(100),
            retry_delay: Duration::from_millis(100),
            item_delay: Duration::from_millis(200),
            read_timeout: Duration::from_secs(1),
        }
    }
}

impl LinkConfig {
    /// No delays at all, for ports that answer synchronously
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            clear_settle: Duration::ZERO,
            command_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            item_delay: Duration::ZERO,
            read_timeout: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_baud_is_115200() {
        assert_eq!(BaudRate::default().as_u32(), 115200);
        assert_eq!(BaudRate::ALL[4], BaudRate::default());
    }

    #[test]
    fn parses_supported_rates_only() {
        assert_eq!("9600".parse::<BaudRate>().unwrap(), BaudRate::B9600);
        assert!(matches!(
            "14400".parse::<BaudRate>(),
            Err(LinkError::UnsupportedBaud(14400))
        ));
        assert!(matches!(
            "fast".parse::<BaudRate>(),
            Err(LinkError::InvalidBaud(input)) if input == "fast"
        ));
        assert!(matches!("".parse::<BaudRate>(), Err(LinkError::InvalidBaud(_))));
        assert_eq!(
            "0".parse::<BaudRate>().unwrap_err().to_string(),
            "unsupported baud rate 0"
        );
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&BaudRate::B57600).unwrap(), "57600");
        assert_eq!(serde_json::from_str::<BaudRate>("38400").unwrap(), BaudRate::B38400);
        assert!(serde_json::from_str::<BaudRate>("1200").is_err());
    }

    #[test]
    fn default_timing() {
        let config = LinkConfig::default();
        assert_eq!(config.settle, Duration::from_secs(2));
        assert_eq!(config.clear_settle, Duration::from_millis(500));
        assert_eq!(config.item_delay, Duration::from_millis(200));
        assert_eq!(config.read_timeout, Duration::from_secs(1));
    }
}
