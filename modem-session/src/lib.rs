//! Session layer for the AT modem engine
//!
//! A [`Session`] owns one open transport and runs one [`Command`] at a time:
//! it writes the command line, waits for the first byte of the reply within a
//! bounded arrival budget, and drains the reply according to the configured
//! [`CompletionStrategy`]. Replies that arrive asynchronously are collected
//! with [`Session::wait_for_urc`].
//!
//! Neither step is an error when the device stays silent: the result is an
//! empty [`Response`].

pub mod command;
pub mod config;
pub mod reader;
pub mod session;

pub use command::{Command, Response};
pub use config::{CompletionStrategy, ReaderConfig, SessionConfig};
pub use modem_core::{ModemError, ModemResult};
pub use reader::read_response;
pub use session::Session;
