//! Modem session: one open transport, one command in flight

use crate::command::{Command, Response};
use crate::config::SessionConfig;
use crate::reader::{decode_text, read_response};
use crate::ModemResult;
use log::{debug, info};
use modem_transport::{ModemTransport, SerialSettings, SerialTransport};
use std::time::Duration;

/// An open AT session
///
/// Every operation takes `&mut self`, so a session can only ever have one
/// command outstanding and every response belongs to the last command sent.
#[derive(Debug)]
pub struct Session<T: ModemTransport> {
    transport: T,
    config: SessionConfig,
}

impl Session<SerialTransport> {
    /// Open the serial device with the default session configuration
    ///
    /// # Errors
    ///
    /// Returns `ModemError::Connection` if the port cannot be opened.
    pub fn open(settings: SerialSettings) -> ModemResult<Self> {
        Self::open_with_config(settings, SessionConfig::default())
    }

    pub fn open_with_config(settings: SerialSettings, config: SessionConfig) -> ModemResult<Self> {
        Ok(Self::new(SerialTransport::open(settings)?, config))
    }
}

impl<T: ModemTransport> Session<T> {
    /// Wrap an already open transport
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send one command and collect its reply
    ///
    /// # Flow
    /// 1. Write the command line followed by CR-LF
    /// 2. Sleep the command's settle delay, if any
    /// 3. Read the reply (see [`read_response`])
    /// 4. With a payload: settle, write the payload, settle again
    ///
    /// The reply is neither validated nor retried. A silent device gives an
    /// empty response.
    ///
    /// # Error Handling
    /// - Returns `ModemError::Io` if a write or read on the transport fails
    pub async fn execute(&mut self, command: &Command) -> ModemResult<Response> {
        info!(">> {}", command.line());
        self.transport.write_all(&command.encode()).await?;

        if !command.pre_delay().is_zero() {
            tokio::time::sleep(command.pre_delay()).await;
        }

        let budget = command
            .max_wait()
            .unwrap_or(self.config.reader.arrival_budget);
        let bytes = read_response(&mut self.transport, &self.config.reader, budget).await?;
        let response = Response::new(decode_text(bytes));

        if let Some(payload) = command.payload() {
            info!("More data: {}", String::from_utf8_lossy(payload));
            tokio::time::sleep(self.config.payload_settle).await;
            self.transport.write_all(payload).await?;
            tokio::time::sleep(self.config.payload_settle).await;
        }

        info!("<< {}", response.text().trim());
        Ok(response)
    }

    /// Send a plain command line
    pub async fn send(&mut self, line: &str) -> ModemResult<Response> {
        self.execute(&Command::new(line)?).await
    }

    /// Send a command line, settling `delay` before reading
    pub async fn send_with_delay(&mut self, line: &str, delay: Duration) -> ModemResult<Response> {
        self.execute(&Command::new(line)?.with_delay(delay)).await
    }

    /// Send a command line followed by a raw payload
    pub async fn send_with_payload(
        &mut self,
        line: &str,
        payload: impl Into<bytes::Bytes>,
    ) -> ModemResult<Response> {
        self.execute(&Command::new(line)?.with_payload(payload)).await
    }

    /// Collect an unsolicited result code for up to `max`
    ///
    /// Used after commands whose result arrives asynchronously. Nothing
    /// arriving is not an error; the response is empty.
    pub async fn wait_for_urc(&mut self, max: Duration) -> ModemResult<Response> {
        debug!("Waiting up to {:?} for URC", max);
        let bytes = read_response(&mut self.transport, &self.config.reader, max).await?;
        let response = Response::new(decode_text(bytes));
        if response.is_empty() {
            info!("No URC within {:?}", max);
        } else {
            info!("<< {}", response.text().trim());
        }
        Ok(response)
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Release the transport; safe to call more than once
    pub async fn close(&mut self) -> ModemResult<()> {
        self.transport.close().await
    }
}
