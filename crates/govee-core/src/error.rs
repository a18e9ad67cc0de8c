//! Error types for govee-core.
//!
//! # Propagation policy
//!
//! | Error | Retried? | Notes |
//! |-------|----------|-------|
//! | [`Error::Frame`] | Never | Programming-contract violation, fails fast |
//! | [`Error::DeviceUnreachable`] | Never (already final) | No scanner, not advertising, or connect retries exhausted |
//! | [`Error::WriteFailed`] | Never | A retried write could duplicate a physical effect |
//! | [`Error::Bluetooth`] | By the connect layer | Transient link failures |
//! | [`Error::ConnectionFailed`] | By the connect layer | Device busy or out of range |
//! | [`Error::Timeout`] | By the connect layer | |
//!
//! Callers that want to repeat a whole logical command after
//! [`Error::WriteFailed`] must do so themselves.

use std::time::Duration;

use thiserror::Error;

use govee_types::FrameError;

/// Errors that can occur when driving a Govee light.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Frame could not be encoded.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The device could not be reached.
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(UnreachableReason),

    /// The transport rejected a write on an established connection.
    #[error("Write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Connection attempt failed.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// The device address that failed to connect.
        device_id: Option<String>,
        /// Description of the failure.
        reason: String,
    },

    /// Control characteristic not present on the device.
    #[error("Characteristic not found: {uuid} (searched in {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a device could not be reached.
///
/// `NoScanner` and `NotAdvertising` are reported separately so users can
/// tell a missing adapter from a device that is off or out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnreachableReason {
    /// No Bluetooth adapter is available to scan with.
    NoScanner,
    /// A scanner is present but the address was not seen.
    NotAdvertising { address: String },
    /// The device was found but every connection attempt failed.
    RetriesExhausted { attempts: u32, last_error: String },
}

impl std::fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoScanner => write!(
                f,
                "no Bluetooth scanner available; enable a Bluetooth adapter or proxy"
            ),
            Self::NotAdvertising { address } => {
                write!(f, "could not find Govee device with address {}", address)
            }
            Self::RetriesExhausted {
                attempts,
                last_error,
            } => write!(
                f,
                "connection failed after {} attempt(s): {}",
                attempts, last_error
            ),
        }
    }
}

impl Error {
    /// Create a not-advertising error for an address.
    pub fn not_advertising(address: impl Into<String>) -> Self {
        Self::DeviceUnreachable(UnreachableReason::NotAdvertising {
            address: address.into(),
        })
    }

    /// Create a no-scanner error.
    pub fn no_scanner() -> Self {
        Self::DeviceUnreachable(UnreachableReason::NoScanner)
    }

    /// Create a write failure for a characteristic.
    pub fn write_failed(uuid: impl ToString, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            uuid: uuid.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a connection failure.
    pub fn connection_failed(device_id: Option<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            device_id,
            reason: reason.into(),
        }
    }

    /// The unreachable reason, if this is a [`Error::DeviceUnreachable`].
    pub fn unreachable_reason(&self) -> Option<&UnreachableReason> {
        match self {
            Self::DeviceUnreachable(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type alias using govee-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_advertising("A4:C1:38:00:11:22");
        assert!(err.to_string().contains("A4:C1:38:00:11:22"));

        let err = Error::no_scanner();
        assert!(err.to_string().contains("no Bluetooth scanner"));

        let err = Error::write_failed(govee_types::uuids::CONTROL_CHARACTERISTIC, "disconnected");
        assert!(err.to_string().contains("00010203-0405-0607-0809-0a0b0c0d2b11"));
        assert!(err.to_string().contains("disconnected"));

        let err = Error::timeout("connect", Duration::from_secs(10));
        assert!(err.to_string().contains("connect"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_retries_exhausted_display() {
        let err = Error::DeviceUnreachable(UnreachableReason::RetriesExhausted {
            attempts: 4,
            last_error: "link lost".to_string(),
        });
        assert!(err.to_string().contains("4 attempt(s)"));
        assert!(err.to_string().contains("link lost"));
    }

    #[test]
    fn test_frame_error_conversion() {
        let err: Error = FrameError::InvalidPayload { len: 20, max: 17 }.into();
        assert!(matches!(
            err,
            Error::Frame(FrameError::InvalidPayload { len: 20, .. })
        ));
    }

    #[test]
    fn test_unreachable_reason_accessor() {
        assert_eq!(
            Error::no_scanner().unreachable_reason(),
            Some(&UnreachableReason::NoScanner)
        );
        assert!(Error::invalid_config("x").unreachable_reason().is_none());
    }

    #[test]
    fn test_btleplug_error_conversion() {
        fn _assert_from_impl<T: From<btleplug::Error>>() {}
        _assert_from_impl::<Error>();
    }
}
