use thiserror::Error;

/// Main error type for modem operations
///
/// An arrival or URC wait that elapses without any byte is not an error: it
/// yields an empty response instead.
#[derive(Error, Debug)]
pub enum ModemError {
    /// The serial device could not be opened or configured.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Read or write failure on an open transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device replied, but not in the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl ModemError {
    /// Shorthand for a decode failure
    pub fn decode(msg: impl Into<String>) -> Self {
        ModemError::Decode(msg.into())
    }

    /// Transport used after `close()` or before it was opened
    pub fn not_connected() -> Self {
        ModemError::Io(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "Serial transport not connected",
        ))
    }

    /// Whether this is a decode failure (the session is still usable)
    pub fn is_decode(&self) -> bool {
        matches!(self, ModemError::Decode(_))
    }

    /// Whether this error comes from the transport and should abort the operation
    pub fn is_transport(&self) -> bool {
        matches!(self, ModemError::Connection(_) | ModemError::Io(_))
    }
}

/// Result type alias for modem operations
pub type ModemResult<T> = Result<T, ModemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ModemError::decode("prefix missing").is_decode());
        assert!(!ModemError::decode("prefix missing").is_transport());
        assert!(ModemError::not_connected().is_transport());
        assert!(ModemError::Connection("no such device".into()).is_transport());
        assert!(!ModemError::InvalidCommand("AT\r\n".into()).is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = ModemError::decode("prefix '+CPSMS:' not found");
        assert_eq!(err.to_string(), "Decode error: prefix '+CPSMS:' not found");
        let err: ModemError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert_eq!(err.to_string(), "I/O error: gone");
    }
}
