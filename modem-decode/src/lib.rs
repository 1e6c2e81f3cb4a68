//! Response decoding for AT replies
//!
//! Everything in this crate is a pure function of the captured text, so
//! decoding the same reply twice always gives the same values.
//!
//! - [`fields`]: locate a response prefix and split its values
//! - [`psm`]: power saving mode timer bytes (TAU, Active Time) and PSM modes
//! - [`edrx`]: access technology, eDRX cycle and paging time tables
//! - [`network`]: registration state and signal quality

pub mod edrx;
pub mod fields;
pub mod network;
pub mod psm;

pub use edrx::{access_technology, edrx_cycle_duration, paging_time_duration, AccessTechnology};
pub use fields::{extract_fields, field, parse_bits, parse_int, strip_final_ok, unquote};
pub use modem_core::{ModemError, ModemResult};
pub use network::{registration_status, SignalQuality};
pub use psm::{
    active_time_units, psm_mode, tau_units, timer_units, timer_value, PsmTimer, TimerKind,
};

/// Label returned for bit patterns a table does not define
pub const INVALID_VALUE: &str = "Invalid value";
