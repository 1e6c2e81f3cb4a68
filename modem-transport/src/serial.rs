//! Serial port transport implementation

use crate::stream::ModemTransport;
use crate::{ModemError, ModemResult};
use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialStream};

/// Size of a single read from the serial stream
const READ_CHUNK: usize = 256;

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

impl Deref for DebugSerialStream {
    type Target = SerialStream;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DebugSerialStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Serial port transport settings
///
/// Modems in this family talk 9600 baud, 8 data bits, no parity, one stop
/// bit, and the base read timeout is one second.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Duration,
}

impl SerialSettings {
    /// Default baud rate of the modem AT port
    pub const DEFAULT_BAUD_RATE: u32 = 9600;
    /// Default base read timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Create new serial settings with 8N1 framing
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self::with_timeout(port_name, baud_rate, Self::DEFAULT_TIMEOUT)
    }

    /// Create serial settings with timeout
    pub fn with_timeout(port_name: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
            timeout,
        }
    }
}

/// Serial port transport
///
/// Bytes pulled off the port while waiting for readiness are kept in a
/// lookahead buffer and handed out first by [`ModemTransport::read`].
#[derive(Debug)]
pub struct SerialTransport {
    stream: Option<DebugSerialStream>,
    settings: SerialSettings,
    lookahead: BytesMut,
    closed: bool,
}

impl SerialTransport {
    /// Open the serial device described by `settings`
    ///
    /// # Errors
    ///
    /// Returns `ModemError::Connection` if the device path does not exist or
    /// cannot be opened and configured.
    pub fn open(settings: SerialSettings) -> ModemResult<Self> {
        let builder = tokio_serial::new(&settings.port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(settings.flow_control)
            .timeout(settings.timeout);

        let stream = SerialStream::open(&builder).map_err(|e| {
            ModemError::Connection(format!(
                "Failed to open serial port {}: {}",
                settings.port_name, e
            ))
        })?;

        log::info!(
            "Serial port {} is now open ({} baud, 8N1)",
            settings.port_name,
            settings.baud_rate
        );

        Ok(Self::from_stream(stream, settings))
    }

    /// Wrap an already opened stream
    pub(crate) fn from_stream(stream: SerialStream, settings: SerialSettings) -> Self {
        Self {
            stream: Some(DebugSerialStream(stream)),
            settings,
            lookahead: BytesMut::with_capacity(READ_CHUNK),
            closed: false,
        }
    }

    /// Open a port with the default 9600 8N1 settings
    pub fn open_simple(port_name: impl Into<String>) -> ModemResult<Self> {
        Self::open(SerialSettings::new(port_name, SerialSettings::DEFAULT_BAUD_RATE))
    }

    /// Settings this transport was opened with
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn stream_mut(&mut self) -> ModemResult<&mut DebugSerialStream> {
        self.stream.as_mut().ok_or_else(ModemError::not_connected)
    }

    fn pending_on_port(&mut self) -> ModemResult<usize> {
        let stream = self.stream_mut()?;
        stream
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| ModemError::Io(std::io::Error::other(e.to_string())))
    }
}

#[async_trait]
impl ModemTransport for SerialTransport {
    async fn write(&mut self, buf: &[u8]) -> ModemResult<usize> {
        let stream = self.stream_mut()?;
        stream.write(buf).await.map_err(ModemError::Io)
    }

    async fn write_all(&mut self, buf: &[u8]) -> ModemResult<()> {
        let stream = self.stream_mut()?;
        stream.write_all(buf).await?;
        stream.flush().await?;
        Ok(())
    }

    fn bytes_available(&mut self) -> ModemResult<usize> {
        Ok(self.lookahead.len() + self.pending_on_port()?)
    }

    async fn read(&mut self, buf: &mut [u8]) -> ModemResult<usize> {
        if !self.lookahead.is_empty() {
            let n = buf.len().min(self.lookahead.len());
            buf[..n].copy_from_slice(&self.lookahead[..n]);
            self.lookahead.advance(n);
            return Ok(n);
        }
        if buf.is_empty() || self.pending_on_port()? == 0 {
            return Ok(0);
        }

        let stream = self.stream_mut()?;
        match stream.read(buf).await {
            Ok(n) => Ok(n),
            Err(e) => {
                self.closed = true;
                Err(ModemError::Io(e))
            }
        }
    }

    async fn wait_for_data(&mut self, budget: Duration) -> ModemResult<bool> {
        if self.bytes_available()? > 0 {
            return Ok(true);
        }

        let mut chunk = [0u8; READ_CHUNK];
        let stream = self.stream_mut()?;
        match tokio::time::timeout(budget, stream.read(&mut chunk)).await {
            Err(_) => Ok(false),
            Ok(Ok(0)) => {
                self.closed = true;
                Err(ModemError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Serial port reached end of stream",
                )))
            }
            Ok(Ok(n)) => {
                self.lookahead.extend_from_slice(&chunk[..n]);
                Ok(true)
            }
            Ok(Err(e)) => {
                self.closed = true;
                Err(ModemError::Io(e))
            }
        }
    }

    async fn flush(&mut self) -> ModemResult<()> {
        let stream = self.stream_mut()?;
        stream.flush().await.map_err(ModemError::Io)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> ModemResult<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
            log::info!("Serial port {} closed", self.settings.port_name);
        }
        self.lookahead.clear();
        self.closed = true;
        Ok(())
    }
}
