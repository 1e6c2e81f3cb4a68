//! Byte transport trait for the modem session

use crate::{ModemError, ModemResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Poll granularity for transports that cannot signal readiness
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Byte-level access to an open modem connection
///
/// A transport is owned by exactly one session. All reads are non-blocking
/// except [`ModemTransport::wait_for_data`], which is the only place a caller
/// is suspended waiting for the device.
#[async_trait]
pub trait ModemTransport: Send {
    /// Write data to the transport
    ///
    /// # Returns
    ///
    /// Number of bytes written
    async fn write(&mut self, buf: &[u8]) -> ModemResult<usize>;

    /// Write all data to the transport
    async fn write_all(&mut self, buf: &[u8]) -> ModemResult<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..]).await?;
            if n == 0 {
                return Err(ModemError::Io(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "Failed to write all data",
                )));
            }
            written += n;
        }
        Ok(())
    }

    /// Number of bytes that can be read right now without waiting
    fn bytes_available(&mut self) -> ModemResult<usize>;

    /// Read bytes that are already available
    ///
    /// # Returns
    ///
    /// Number of bytes read, 0 when nothing is pending
    async fn read(&mut self, buf: &mut [u8]) -> ModemResult<usize>;

    /// Read a single available byte
    ///
    /// Callers check [`ModemTransport::bytes_available`] first.
    async fn read_byte(&mut self) -> ModemResult<u8> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte).await? {
            0 => Err(ModemError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No byte available",
            ))),
            _ => Ok(byte[0]),
        }
    }

    /// Wait until at least one byte is readable or `budget` elapses
    ///
    /// Returns `false` when the budget ran out with nothing to read. The
    /// default implementation polls [`ModemTransport::bytes_available`] every
    /// [`DEFAULT_POLL_INTERVAL`].
    async fn wait_for_data(&mut self, budget: Duration) -> ModemResult<bool> {
        poll_for_data(self, budget, DEFAULT_POLL_INTERVAL).await
    }

    /// Flush any buffered data
    async fn flush(&mut self) -> ModemResult<()> {
        Ok(())
    }

    /// Check if the transport is closed
    fn is_closed(&self) -> bool;

    /// Close the transport; closing twice is a no-op
    async fn close(&mut self) -> ModemResult<()>;
}

/// Sleep-and-poll wait used by transports without readiness notification
pub async fn poll_for_data<T>(
    transport: &mut T,
    budget: Duration,
    interval: Duration,
) -> ModemResult<bool>
where
    T: ModemTransport + ?Sized,
{
    let deadline = Instant::now() + budget;
    loop {
        if transport.bytes_available()? > 0 {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
