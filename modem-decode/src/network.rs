//! Network registration and signal quality

use crate::fields::{extract_fields, field, parse_int};
use crate::{ModemResult, INVALID_VALUE};
use serde::Serialize;
use std::fmt;

/// Registration state (`<stat>`) of `+CREG`/`+CEREG`
pub fn registration_status(stat: u32) -> &'static str {
    match stat {
        0 => "Not registered, not searching",
        1 => "Registered, home network",
        2 => "Not registered, searching",
        3 => "Registration denied",
        4 => "Unknown",
        5 => "Registered, roaming",
        _ => INVALID_VALUE,
    }
}

/// Decoded `+CSQ: <rssi>,<ber>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalQuality {
    pub rssi: u8,
    pub ber: u8,
}

impl SignalQuality {
    /// rssi/ber value meaning "not known or not detectable"
    pub const NOT_DETECTABLE: u8 = 99;

    /// Decode from a `AT+CSQ` response
    pub fn from_response(response: &str) -> ModemResult<Self> {
        let fields = extract_fields(response, "+CSQ:")?;
        Ok(Self {
            rssi: parse_int(field(&fields, 0)?)?,
            ber: parse_int(field(&fields, 1)?)?,
        })
    }

    /// Received signal strength in dBm, if known
    ///
    /// 0 is -113 dBm or less, 31 is -51 dBm or greater, 2 dB per step.
    pub fn dbm(&self) -> Option<i32> {
        match self.rssi {
            0..=31 => Some(-113 + 2 * self.rssi as i32),
            _ => None,
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dbm() {
            Some(dbm) => write!(f, "rssi {} ({} dBm), ber {}", self.rssi, dbm, self.ber),
            None => write!(f, "rssi {} (not detectable), ber {}", self.rssi, self.ber),
        }
    }
}
