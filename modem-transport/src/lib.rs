//! Transport layer module for the AT modem session engine
//!
//! This crate provides the byte-level transport used by a modem session: a
//! serial port implementation and an in-memory scripted device.

pub mod memory;
pub mod serial;
pub mod stream;

pub use memory::{MemoryTransport, ScriptedReply};
pub use modem_core::{ModemError, ModemResult};
pub use serial::{SerialSettings, SerialTransport};
pub use stream::{poll_for_data, ModemTransport, DEFAULT_POLL_INTERVAL};
