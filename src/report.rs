//! Battery input report decoding
//!
//! The dongle multiplexes several input reports on one interface. Only the
//! battery report is of interest; its layout is:
//!
//! - byte[0] = report ID (0x03)
//! - byte[1..3] = unused
//! - byte[3] = charging status (0x01 = discharging, 0x03 = charging)
//! - byte[4] = battery level (0-100)
//!
//! Anything else (other report IDs, short reads) is not an error, it just
//! isn't a battery report.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Charging status byte values
pub mod status {
    pub const DISCHARGING: u8 = 0x01;
    pub const CHARGING: u8 = 0x03;
}

/// Fixed byte layout of the battery report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLayout {
    /// Expected report ID (first byte)
    pub report_id: u8,
    /// Minimum report length, report ID included
    pub report_length: usize,
    /// Offset of the charging status byte
    pub status_offset: usize,
    /// Offset of the battery level byte
    pub level_offset: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            report_id: 0x03,
            report_length: 5,
            status_offset: 3,
            level_offset: 4,
        }
    }
}

/// Charging state as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargingState {
    Discharging,
    Charging,
    /// Unrecognised status byte, kept for display
    Unknown(u8),
}

impl ChargingState {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            status::DISCHARGING => Self::Discharging,
            status::CHARGING => Self::Charging,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ChargingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discharging => f.write_str("Discharging"),
            Self::Charging => f.write_str("Charging"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02x})"),
        }
    }
}

/// One decoded battery report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    /// Battery level, nominally 0-100 but passed through unchecked
    pub level: u8,
    pub charging: ChargingState,
}

impl BatteryReading {
    pub fn new(level: u8, charging: ChargingState) -> Self {
        Self { level, charging }
    }
}

impl fmt::Display for BatteryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status: {} | Battery: {}%", self.charging, self.level)
    }
}

impl ReportLayout {
    /// Decode a raw input report, or `None` if it isn't a battery report
    pub fn decode(&self, raw: &[u8]) -> Option<BatteryReading> {
        if raw.first() != Some(&self.report_id) || raw.len() < self.report_length {
            return None;
        }

        let status = *raw.get(self.status_offset)?;
        let level = *raw.get(self.level_offset)?;

        Some(BatteryReading {
            level,
            charging: ChargingState::from_byte(status),
        })
    }
}

/// Decode with the default dongle layout
pub fn decode(raw: &[u8]) -> Option<BatteryReading> {
    ReportLayout::default().decode(raw)
}

/// Errors from parsing a hex report typed on the command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexReportError {
    #[error("'{0}' is not a hex byte string")]
    InvalidDigit(String),

    #[error("'{0}' has an odd number of hex digits")]
    OddLength(String),
}

/// Parse a report given as hex bytes (`03 00 00 01 57`, `0x03,0x00`, `0300000157`)
pub fn parse_hex_report(input: &[String]) -> Result<Vec<u8>, HexReportError> {
    let mut bytes = Vec::new();
    let tokens = input
        .iter()
        .flat_map(|s| s.split([' ', ',', ':']))
        .filter(|s| !s.is_empty());

    for token in tokens {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HexReportError::InvalidDigit(token.to_string()));
        }
        if digits.len() % 2 != 0 {
            return Err(HexReportError::OddLength(token.to_string()));
        }

        // Unseparated hex strings are read two digits at a time
        for pair in digits.as_bytes().chunks(2) {
            bytes.push((hex_value(pair[0]) << 4) | hex_value(pair[1]));
        }
    }
    Ok(bytes)
}

/// Value of an ASCII hex digit already checked with `is_ascii_hexdigit`
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
