//! Outbound commands and inbound responses

use crate::{ModemError, ModemResult};
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

/// AT line terminator appended to every command
pub const LINE_TERMINATOR: &str = "\r\n";

/// One outbound AT command
///
/// The line never contains a line break; the terminator is added on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    line: String,
    payload: Option<Bytes>,
    pre_delay: Duration,
    max_wait: Option<Duration>,
}

impl Command {
    /// Create a command from a single AT line
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidCommand` if the line contains CR or LF.
    pub fn new(line: impl Into<String>) -> ModemResult<Self> {
        let line = line.into();
        if line.contains(['\r', '\n']) {
            return Err(ModemError::InvalidCommand(format!(
                "command contains a line break: {:?}",
                line
            )));
        }
        Ok(Self {
            line,
            payload: None,
            pre_delay: Duration::ZERO,
            max_wait: None,
        })
    }

    /// Raw bytes written after the send prompt (socket sends)
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Settle time between the write and the start of the arrival wait
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.pre_delay = delay;
        self
    }

    /// Override the session's arrival budget for this command
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn pre_delay(&self) -> Duration {
        self.pre_delay
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    /// Bytes put on the wire for the command line
    pub fn encode(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.line.len() + LINE_TERMINATOR.len());
        wire.extend_from_slice(self.line.as_bytes());
        wire.extend_from_slice(LINE_TERMINATOR.as_bytes());
        wire
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Raw text read back for one command (or one URC wait)
///
/// An empty response means nothing arrived within the budget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    text: String,
}

impl Response {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }

    /// Non-empty lines of the response, without line endings
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    /// A final `OK` result code is present
    pub fn is_ok(&self) -> bool {
        self.lines().any(|l| l == "OK")
    }

    /// A final error result code is present
    pub fn is_error(&self) -> bool {
        self.lines().any(|l| {
            l == "ERROR" || l.starts_with("+CME ERROR:") || l.starts_with("+CMS ERROR:")
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Response {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<String> for Response {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_encode() {
        let cmd = Command::new("AT+CPSMS?").unwrap();
        assert_eq!(cmd.encode(), b"AT+CPSMS?\r\n");
        assert_eq!(cmd.pre_delay(), Duration::ZERO);
        assert!(cmd.payload().is_none());
    }

    #[test]
    fn test_command_rejects_line_breaks() {
        assert!(matches!(
            Command::new("AT\r\nATI"),
            Err(ModemError::InvalidCommand(_))
        ));
        assert!(Command::new("AT\n").is_err());
    }

    #[test]
    fn test_command_builder() {
        let cmd = Command::new("AT+QISEND=0,5")
            .unwrap()
            .with_payload(&b"hello"[..])
            .with_delay(Duration::from_secs(1))
            .with_max_wait(Duration::from_secs(3));
        assert_eq!(cmd.payload().map(|p| &p[..]), Some(&b"hello"[..]));
        assert_eq!(cmd.pre_delay(), Duration::from_secs(1));
        assert_eq!(cmd.max_wait(), Some(Duration::from_secs(3)));
        assert_eq!(cmd.to_string(), "AT+QISEND=0,5");
    }

    #[test]
    fn test_response_result_codes() {
        let ok = Response::new("+CSQ: 20,99\r\n\r\nOK\r\n");
        assert!(ok.is_ok());
        assert!(!ok.is_error());
        assert_eq!(ok.lines().collect::<Vec<_>>(), vec!["+CSQ: 20,99", "OK"]);

        assert!(Response::new("\r\nERROR\r\n").is_error());
        assert!(Response::new("+CME ERROR: 10\r\n").is_error());

        let empty = Response::empty();
        assert!(empty.is_empty());
        assert!(!empty.is_ok());
        assert!(!empty.is_error());
    }
}
