use thiserror::Error;

/// Result type for Altitude operations
pub type Result<T> = std::result::Result<T, AltitudeError>;

/// Errors that can occur when talking to a Trinnov Altitude
#[derive(Error, Debug)]
pub enum AltitudeError {
    /// A command or receive was attempted without an open session
    #[error("Not connected")]
    NotConnected,

    /// The TCP connection attempt did not complete in time
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// The TCP connection attempt failed (DNS, refused, unreachable, ...)
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),

    /// A write or close did not complete in time
    #[error("Operation timeout")]
    Timeout,

    /// The MAC address could not be parsed
    #[error("Malformed MAC address: {0}")]
    MalformedMacAddress(String),

    /// The MAC address does not belong to a known Altitude vendor prefix
    #[error("MAC address {0} has an unsupported OUI")]
    InvalidMacAddressOui(String),

    /// No source with the given name has been announced by the device
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// A command argument cannot be sent as a single protocol line
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A message receiver fell behind the broadcast stream
    #[error("Receiver lagged by {0} messages")]
    Lagged(u64),

    /// Configuration could not be deserialized
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_connected() {
        assert_eq!(AltitudeError::NotConnected.to_string(), "Not connected");
    }

    #[test]
    fn display_invalid_oui() {
        let e = AltitudeError::InvalidMacAddressOui("aa:bb:cc:00:11:22".into());
        assert_eq!(
            e.to_string(),
            "MAC address aa:bb:cc:00:11:22 has an unsupported OUI"
        );
    }

    #[test]
    fn display_invalid_parameter() {
        let e = AltitudeError::InvalidParameter("non-finite dB value NaN".into());
        assert_eq!(e.to_string(), "Invalid parameter: non-finite dB value NaN");
    }

    #[test]
    fn connection_failed_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e = AltitudeError::ConnectionFailed(io);
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "Connection failed: refused");
    }
}
