//! Power saving mode timer decoding
//!
//! PSM timers travel as 8-bit strings (`"01100000"`): the top three bits
//! select a unit and the low five bits are the multiplier. The unit tables
//! below only cover the encodings modems actually report; every other
//! pattern decodes to [`INVALID_VALUE`](crate::INVALID_VALUE).

use crate::INVALID_VALUE;
use serde::Serialize;
use std::fmt;

/// Unit bits of a timer byte
pub const TIMER_UNIT_MASK: u8 = 0b1110_0000;
/// Multiplier bits of a timer byte
pub const TIMER_VALUE_MASK: u8 = 0b0001_1111;

/// Unit bits of a timer byte, left in place
pub fn timer_units(value: u8) -> u8 {
    value & TIMER_UNIT_MASK
}

/// Multiplier of a timer byte
pub fn timer_value(value: u8) -> u8 {
    value & TIMER_VALUE_MASK
}

/// Tracking area update (T3412 extended) unit
pub fn tau_units(units: u8) -> &'static str {
    match units {
        0b0000_0000 => "10 min",
        0b0010_0000 => "1 hr",
        0b0100_0000 => "10 hrs",
        0b0110_0000 => "2 sec",
        0b1000_0000 => "30 secs",
        0b1100_0000 => "1 min",
        0b1110_0000 => "invalid",
        _ => INVALID_VALUE,
    }
}

/// Active Time (T3324) unit
pub fn active_time_units(units: u8) -> &'static str {
    match units {
        0b0000_0000 => "2 sec",
        0b0010_0000 => "1 min",
        0b0100_0000 => "decihour (6 min)",
        0b1110_0000 => "deactivated",
        _ => INVALID_VALUE,
    }
}

/// PSM feature mode reported by `+QPSMCFG`
pub fn psm_mode(mode: u32) -> &'static str {
    match mode {
        0b0001 => "PSM without network coordination",
        0b0010 => "Rel 12 PSM without context retention",
        0b0100 => "Rel 12 PSM with context retention",
        0b1000 => "PSM in between eDRX cycles",
        _ => INVALID_VALUE,
    }
}

/// Which timer a byte belongs to; selects the unit table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerKind {
    Tau,
    ActiveTime,
}

/// A decoded PSM timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsmTimer {
    pub kind: TimerKind,
    pub raw: u8,
    pub units: &'static str,
    pub value: u8,
}

impl PsmTimer {
    pub fn decode(kind: TimerKind, raw: u8) -> Self {
        let units = match kind {
            TimerKind::Tau => tau_units(timer_units(raw)),
            TimerKind::ActiveTime => active_time_units(timer_units(raw)),
        };
        Self {
            kind,
            raw,
            units,
            value: timer_value(raw),
        }
    }

    pub fn tau(raw: u8) -> Self {
        Self::decode(TimerKind::Tau, raw)
    }

    pub fn active_time(raw: u8) -> Self {
        Self::decode(TimerKind::ActiveTime, raw)
    }

    /// Whether the unit bits matched a defined encoding
    pub fn is_valid(&self) -> bool {
        self.units != INVALID_VALUE
    }
}

impl fmt::Display for PsmTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} ({:08b})", self.value, self.units, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_and_value_are_independent() {
        for b in 0..=u8::MAX {
            assert_eq!(timer_value(b), b & 0x1F);
            assert_eq!(timer_units(b), b & 0xE0);
            assert_eq!(timer_units(b) | timer_value(b), b);
            assert_eq!(timer_value(timer_units(b)), 0);
        }
    }

    #[test]
    fn test_tau_table() {
        assert_eq!(tau_units(0b0000_0000), "10 min");
        assert_eq!(tau_units(0b0010_0000), "1 hr");
        assert_eq!(tau_units(0b0100_0000), "10 hrs");
        assert_eq!(tau_units(0b0110_0000), "2 sec");
        assert_eq!(tau_units(0b1000_0000), "30 secs");
        assert_eq!(tau_units(0b1010_0000), INVALID_VALUE);
        assert_eq!(tau_units(0b1100_0000), "1 min");
        assert_eq!(tau_units(0b1110_0000), "invalid");
        // magnitude bits are not a unit
        assert_eq!(tau_units(0b0000_0001), INVALID_VALUE);
    }

    #[test]
    fn test_active_time_table() {
        assert_eq!(active_time_units(0b0000_0000), "2 sec");
        assert_eq!(active_time_units(0b0010_0000), "1 min");
        assert_eq!(active_time_units(0b0100_0000), "decihour (6 min)");
        assert_eq!(active_time_units(0b1110_0000), "deactivated");
        for undefined in [0b0110_0000, 0b1000_0000, 0b1010_0000, 0b1100_0000] {
            assert_eq!(active_time_units(undefined), INVALID_VALUE);
        }
    }

    #[test]
    fn test_psm_mode() {
        assert_eq!(psm_mode(4), "Rel 12 PSM with context retention");
        assert_eq!(psm_mode(8), "PSM in between eDRX cycles");
        assert_eq!(psm_mode(3), INVALID_VALUE);
    }

    #[test]
    fn test_psm_timer_decode() {
        let tau = PsmTimer::tau(0b1010_0001);
        assert_eq!(tau.units, INVALID_VALUE);
        assert_eq!(tau.value, 1);
        assert!(!tau.is_valid());

        let active = PsmTimer::active_time(0b0001_1111);
        assert_eq!(active.units, "2 sec");
        assert_eq!(active.value, 31);
        assert_eq!(active.to_string(), "31 x 2 sec (00011111)");
    }

    #[test]
    fn test_psm_timer_serializes() {
        let json = serde_json::to_value(PsmTimer::tau(0b0110_0000)).unwrap();
        assert_eq!(json["units"], "2 sec");
        assert_eq!(json["kind"], "Tau");
        assert_eq!(json["value"], 0);
    }
}
