//! eDRX parameter decoding

use crate::INVALID_VALUE;
use serde::Serialize;
use std::fmt;

/// eDRX cycle lengths, indexed by the 4-bit requested/network value
const EDRX_CYCLE: [&str; 16] = [
    "5.12 sec",
    "10.24 sec",
    "20.48 sec",
    "40.96 sec",
    "61.44 sec",
    "81.92 sec",
    "102.4 sec",
    "122.88 sec",
    "143.36 sec",
    "163.84 sec",
    "327.68 sec (5.5 min)",
    "655.36 sec (10.9 min)",
    "1310.72 sec (21 min)",
    "2621.44 sec (43 min)",
    "5242.88 sec (87 min)",
    "10485.88 sec (174 min)",
];

/// Paging time window lengths, indexed by the 4-bit paging time value
const PAGING_TIME: [&str; 16] = [
    "1.28 sec",
    "2.56 sec",
    "3.84 sec",
    "5.12 sec",
    "6.4 sec",
    "7.68 sec",
    "8.96 sec",
    "10.24 sec",
    "11.52 sec",
    "12.8 sec",
    "14.08 sec",
    "15.36 sec",
    "16.64 sec",
    "17.92 sec",
    "19.20 sec",
    "20.48 sec",
];

/// eDRX cycle length for a 4-bit value
pub fn edrx_cycle_duration(bits: u8) -> &'static str {
    EDRX_CYCLE.get(bits as usize).copied().unwrap_or(INVALID_VALUE)
}

/// Paging time window for a 4-bit value
pub fn paging_time_duration(bits: u8) -> &'static str {
    PAGING_TIME.get(bits as usize).copied().unwrap_or(INVALID_VALUE)
}

/// Access technology type (`<AcT>`) used by the eDRX commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessTechnology {
    /// 0: access technology not using eDRX
    NotUsing,
    Gsm,
    Utran,
    LteCatM1,
    LteCatNb1,
    Unknown(u32),
}

impl AccessTechnology {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => AccessTechnology::NotUsing,
            2 => AccessTechnology::Gsm,
            3 => AccessTechnology::Utran,
            4 => AccessTechnology::LteCatM1,
            5 => AccessTechnology::LteCatNb1,
            other => AccessTechnology::Unknown(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccessTechnology::NotUsing => "None",
            AccessTechnology::Gsm => "GSM",
            AccessTechnology::Utran => "UTRAN",
            AccessTechnology::LteCatM1 => "LTE CAT M1",
            AccessTechnology::LteCatNb1 => "LTE CAT NB1",
            AccessTechnology::Unknown(_) => INVALID_VALUE,
        }
    }

    /// Code 0 means no eDRX parameters follow
    pub fn uses_edrx(&self) -> bool {
        !matches!(self, AccessTechnology::NotUsing)
    }
}

impl fmt::Display for AccessTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for an access technology code
pub fn access_technology(code: u32) -> &'static str {
    AccessTechnology::from_code(code).label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_total_over_four_bits() {
        for p in 0..=0b1111u8 {
            assert_ne!(edrx_cycle_duration(p), INVALID_VALUE);
            assert_ne!(paging_time_duration(p), INVALID_VALUE);
        }
        assert_eq!(edrx_cycle_duration(16), INVALID_VALUE);
        assert_eq!(paging_time_duration(0xFF), INVALID_VALUE);
    }

    #[test]
    fn test_table_labels() {
        assert_eq!(edrx_cycle_duration(0b0000), "5.12 sec");
        assert_eq!(edrx_cycle_duration(0b1001), "163.84 sec");
        assert_eq!(edrx_cycle_duration(0b1111), "10485.88 sec (174 min)");
        assert_eq!(paging_time_duration(0b0000), "1.28 sec");
        assert_eq!(paging_time_duration(0b0101), "7.68 sec");
        assert_eq!(paging_time_duration(0b1110), "19.20 sec");
    }

    #[test]
    fn test_access_technology() {
        assert_eq!(access_technology(4), "LTE CAT M1");
        assert_eq!(access_technology(5), "LTE CAT NB1");
        assert_eq!(access_technology(2), "GSM");
        assert_eq!(access_technology(0), "None");
        assert_eq!(access_technology(1), INVALID_VALUE);
        assert_eq!(access_technology(99), "Invalid value");
        assert!(!AccessTechnology::from_code(0).uses_edrx());
        assert!(AccessTechnology::from_code(4).uses_edrx());
        assert_eq!(AccessTechnology::LteCatNb1.to_string(), "LTE CAT NB1");
    }
}
