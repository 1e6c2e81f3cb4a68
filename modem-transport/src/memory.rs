//! In-memory scripted modem
//!
//! `MemoryTransport` plays the device side of a conversation: every write
//! consumes the next [`ScriptedReply`] and schedules its chunks relative to
//! the moment of the write. Timing follows `tokio::time`, so a paused test
//! clock drives it deterministically.

use crate::stream::ModemTransport;
use crate::{ModemError, ModemResult};
use async_trait::async_trait;
use bytes::{Buf, Bytes, BytesMut};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Device reply to one write: a list of `(delay, bytes)` chunks
#[derive(Debug, Clone, Default)]
pub struct ScriptedReply {
    chunks: Vec<(Duration, Bytes)>,
}

impl ScriptedReply {
    /// A reply that never produces any byte
    pub fn silent() -> Self {
        Self::default()
    }

    /// A reply delivered in one burst right after the write
    pub fn immediate(data: impl AsRef<[u8]>) -> Self {
        Self::silent().chunk(Duration::ZERO, data)
    }

    /// A reply delivered in one burst `after` the write
    pub fn delayed(after: Duration, data: impl AsRef<[u8]>) -> Self {
        Self::silent().chunk(after, data)
    }

    /// Add a chunk arriving `after` the write
    pub fn chunk(mut self, after: Duration, data: impl AsRef<[u8]>) -> Self {
        self.chunks.push((after, Bytes::copy_from_slice(data.as_ref())));
        self
    }
}

/// Scripted in-memory transport
#[derive(Debug, Default)]
pub struct MemoryTransport {
    replies: VecDeque<ScriptedReply>,
    scheduled: Vec<(Instant, Bytes)>,
    rx: BytesMut,
    writes: Vec<Bytes>,
    closed: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transport with a queue of replies
    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        let mut transport = Self::new();
        transport.replies.extend(replies);
        transport
    }

    /// Queue the reply for the next write that has none yet
    pub fn push_reply(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    /// Schedule unsolicited bytes `after` now, independent of any write
    pub fn inject(&mut self, after: Duration, data: impl AsRef<[u8]>) {
        self.schedule(Instant::now() + after, Bytes::copy_from_slice(data.as_ref()));
    }

    /// Every write in order, as raw bytes
    pub fn writes(&self) -> &[Bytes] {
        &self.writes
    }

    /// Every write in order, lossily decoded
    pub fn written_text(&self) -> Vec<String> {
        self.writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Replies still waiting for a write
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    fn schedule(&mut self, due: Instant, data: Bytes) {
        let at = self.scheduled.partition_point(|(t, _)| *t <= due);
        self.scheduled.insert(at, (due, data));
    }

    fn deliver_due(&mut self) {
        let now = Instant::now();
        let due = self.scheduled.partition_point(|(t, _)| *t <= now);
        for (_, data) in self.scheduled.drain(..due) {
            self.rx.extend_from_slice(&data);
        }
    }

    fn ensure_open(&self) -> ModemResult<()> {
        if self.closed {
            return Err(ModemError::not_connected());
        }
        Ok(())
    }
}

#[async_trait]
impl ModemTransport for MemoryTransport {
    async fn write(&mut self, buf: &[u8]) -> ModemResult<usize> {
        self.ensure_open()?;
        let now = Instant::now();
        self.writes.push(Bytes::copy_from_slice(buf));
        if let Some(reply) = self.replies.pop_front() {
            for (after, data) in reply.chunks {
                self.schedule(now + after, data);
            }
        }
        Ok(buf.len())
    }

    fn bytes_available(&mut self) -> ModemResult<usize> {
        self.ensure_open()?;
        self.deliver_due();
        Ok(self.rx.len())
    }

    async fn read(&mut self, buf: &mut [u8]) -> ModemResult<usize> {
        self.ensure_open()?;
        self.deliver_due();
        let n = buf.len().min(self.rx.len());
        buf[..n].copy_from_slice(&self.rx[..n]);
        self.rx.advance(n);
        Ok(n)
    }

    async fn wait_for_data(&mut self, budget: Duration) -> ModemResult<bool> {
        if self.bytes_available()? > 0 {
            return Ok(true);
        }
        let deadline = Instant::now() + budget;
        let next_due = self.scheduled.first().map(|(due, _)| *due);
        match next_due {
            Some(due) if due <= deadline => {
                tokio::time::sleep_until(due).await;
                self.deliver_due();
                Ok(true)
            }
            _ => {
                tokio::time::sleep_until(deadline).await;
                Ok(false)
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> ModemResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reply_is_scheduled_relative_to_write() {
        let mut transport = MemoryTransport::with_replies([ScriptedReply::delayed(
            Duration::from_millis(300),
            "OK\r\n",
        )]);
        transport.write_all(b"AT\r\n").await.unwrap();
        assert_eq!(transport.bytes_available().unwrap(), 0);

        assert!(transport.wait_for_data(Duration::from_secs(1)).await.unwrap());
        assert_eq!(transport.bytes_available().unwrap(), 4);
        assert_eq!(transport.read_byte().await.unwrap(), b'O');
        assert_eq!(transport.bytes_available().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_when_reply_is_late() {
        let mut transport = MemoryTransport::with_replies([ScriptedReply::delayed(
            Duration::from_secs(3),
            "OK\r\n",
        )]);
        transport.write_all(b"AT\r\n").await.unwrap();

        let start = Instant::now();
        assert!(!transport.wait_for_data(Duration::from_secs(1)).await.unwrap());
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(transport.wait_for_data(Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_bytes_and_writes_are_recorded() {
        let mut transport = MemoryTransport::new();
        transport.inject(Duration::from_millis(100), "+QPSMTIMER: 1\r\n");
        transport.write_all(b"AT+CSQ\r\n").await.unwrap();
        transport.write_all(b"payload").await.unwrap();

        assert_eq!(transport.written_text(), vec!["AT+CSQ\r\n", "payload"]);
        assert!(transport.wait_for_data(Duration::from_millis(200)).await.unwrap());

        let mut buf = [0u8; 64];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+QPSMTIMER: 1\r\n");
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut transport = MemoryTransport::new();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
        assert!(transport.is_closed());
        assert!(transport.write_all(b"AT\r\n").await.is_err());
    }
}
