//! Core types for the AT modem session engine
//!
//! This crate provides the error taxonomy shared by the transport, session,
//! decoder and client layers.

pub mod error;

pub use error::{ModemError, ModemResult};
