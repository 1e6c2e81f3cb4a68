//! Response reader
//!
//! AT replies carry no framing the engine can rely on without a full grammar,
//! so completion is decided by timing alone:
//!
//! 1. wait for the first byte, bounded by a budget;
//! 2. drain everything that is available;
//! 3. depending on [`CompletionStrategy`], stop, or keep draining until the
//!    line has been quiet for a while (bounded by the drain cap).
//!
//! A budget that elapses with nothing received yields an empty reply.

use crate::config::{CompletionStrategy, ReaderConfig};
use crate::ModemResult;
use bytes::BytesMut;
use log::{debug, warn};
use modem_transport::{poll_for_data, ModemTransport};
use std::time::Duration;
use tokio::time::Instant;

/// Largest single read while draining
const DRAIN_CHUNK: usize = 512;

#[derive(Debug, Clone, Copy)]
enum ReadState {
    AwaitingArrival { budget: Duration },
    Draining { started: Instant },
    Done,
}

/// Read one reply from `transport`
///
/// `budget` bounds the wait for the first byte; the drain phase is governed
/// by `config`. Returns the raw bytes, empty if nothing arrived.
pub async fn read_response<T>(
    transport: &mut T,
    config: &ReaderConfig,
    budget: Duration,
) -> ModemResult<Vec<u8>>
where
    T: ModemTransport + ?Sized,
{
    let mut buf = BytesMut::new();
    let mut state = ReadState::AwaitingArrival { budget };

    loop {
        state = match state {
            ReadState::AwaitingArrival { budget } => {
                if wait_for_data(transport, config, budget).await? {
                    ReadState::Draining {
                        started: Instant::now(),
                    }
                } else {
                    debug!("No bytes within {:?}", budget);
                    ReadState::Done
                }
            }
            ReadState::Draining { started } => {
                let n = drain_available(transport, &mut buf).await?;
                debug!("Drained {} bytes ({} total)", n, buf.len());
                match config.completion {
                    CompletionStrategy::DrainOnce => ReadState::Done,
                    CompletionStrategy::QuietPeriod(quiet) => {
                        let remaining = config.drain_cap.saturating_sub(started.elapsed());
                        if remaining.is_zero() {
                            warn!(
                                "Reply still streaming after {:?}, returning {} bytes",
                                config.drain_cap,
                                buf.len()
                            );
                            ReadState::Done
                        } else if wait_for_data(transport, config, quiet.min(remaining)).await? {
                            ReadState::Draining { started }
                        } else {
                            ReadState::Done
                        }
                    }
                }
            }
            ReadState::Done => break,
        };
    }

    Ok(buf.to_vec())
}

/// Decode a reply as UTF-8, replacing invalid sequences
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("Reply is not valid UTF-8: {}", e.utf8_error());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

async fn wait_for_data<T>(
    transport: &mut T,
    config: &ReaderConfig,
    budget: Duration,
) -> ModemResult<bool>
where
    T: ModemTransport + ?Sized,
{
    match config.poll_interval {
        Some(interval) => poll_for_data(transport, budget, interval).await,
        None => transport.wait_for_data(budget).await,
    }
}

async fn drain_available<T>(transport: &mut T, buf: &mut BytesMut) -> ModemResult<usize>
where
    T: ModemTransport + ?Sized,
{
    let mut chunk = [0u8; DRAIN_CHUNK];
    let mut total = 0;
    loop {
        let available = transport.bytes_available()?;
        if available == 0 {
            break;
        }
        let n = transport.read(&mut chunk[..available.min(DRAIN_CHUNK)]).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modem_transport::{MemoryTransport, ScriptedReply};

    fn fragmented() -> MemoryTransport {
        MemoryTransport::with_replies([ScriptedReply::immediate("+CSQ: 20,99\r\n")
            .chunk(Duration::from_millis(60), "\r\nOK\r\n")])
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_collects_fragments() {
        let mut transport = fragmented();
        transport.write_all(b"AT+CSQ\r\n").await.unwrap();
        let config = ReaderConfig::default();
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert_eq!(bytes, b"+CSQ: 20,99\r\n\r\nOK\r\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_once_stops_after_first_burst() {
        let mut transport = fragmented();
        transport.write_all(b"AT+CSQ\r\n").await.unwrap();
        let config = ReaderConfig::default().with_completion(CompletionStrategy::DrainOnce);
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert_eq!(bytes, b"+CSQ: 20,99\r\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_ends_on_long_gap() {
        let mut transport = MemoryTransport::with_replies([ScriptedReply::immediate("OK\r\n")
            .chunk(Duration::from_millis(500), "+QIURC: \"closed\",0\r\n")]);
        transport.write_all(b"AT\r\n").await.unwrap();
        let config = ReaderConfig::default();
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert_eq!(bytes, b"OK\r\n");
        assert!(transport.bytes_available().unwrap() == 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_cap_bounds_a_streaming_reply() {
        let mut reply = ScriptedReply::silent();
        for i in 0..100 {
            reply = reply.chunk(Duration::from_millis(50 * i), "x");
        }
        let mut transport = MemoryTransport::with_replies([reply]);
        transport.write_all(b"AT+QIRD=0,1500\r\n").await.unwrap();

        let config = ReaderConfig::default().with_drain_cap(Duration::from_secs(1));
        let start = Instant::now();
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert!(start.elapsed() <= Duration::from_millis(1100));
        assert!(bytes.len() < 100);
        assert!(bytes.len() >= 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_yields_empty_reply() {
        let mut transport = MemoryTransport::with_replies([ScriptedReply::silent()]);
        transport.write_all(b"AT\r\n").await.unwrap();
        let config = ReaderConfig::default();
        let start = Instant::now();
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert!(bytes.is_empty());
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_interval_mode() {
        let mut transport = MemoryTransport::with_replies([ScriptedReply::delayed(
            Duration::from_millis(120),
            "OK\r\n",
        )]);
        transport.write_all(b"AT\r\n").await.unwrap();
        let config = ReaderConfig::default()
            .with_poll_interval(Duration::from_millis(50))
            .with_completion(CompletionStrategy::DrainOnce);
        let start = Instant::now();
        let bytes = read_response(&mut transport, &config, config.arrival_budget)
            .await
            .unwrap();
        assert_eq!(bytes, b"OK\r\n");
        // observed on the third poll tick
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_decode_text_replaces_invalid_utf8() {
        assert_eq!(decode_text(b"OK\r\n".to_vec()), "OK\r\n");
        assert_eq!(decode_text(vec![b'O', 0xFF, b'K']), "O\u{FFFD}K");
    }
}
