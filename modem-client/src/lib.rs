//! Client operations for Quectel cellular modems
//!
//! This crate provides the operator-level procedures (packet session setup,
//! TCP/HTTP, ping, DNS, PSM and eDRX configuration, interactive passthrough)
//! as sequences of session commands, plus typed reports decoded from the
//! replies.

pub mod client;
pub mod config;
pub mod report;

pub use client::{http_request, ModemClient};
pub use config::{ClientConfig, EdrxSettings, PsmSettings};
pub use modem_core::{ModemError, ModemResult};
pub use report::{EdrxReport, ModemStatus, NetworkPsm, PsmConfig, PsmReport, RequestedPsm};
