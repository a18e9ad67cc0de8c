//! Error types for frame encoding and decoding in govee-types.

use thiserror::Error;

/// Errors that can occur when building or parsing Govee command frames.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in govee-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// Payload does not fit in a single frame.
    #[error("Invalid payload: {len} bytes exceeds the {max}-byte frame capacity")]
    InvalidPayload {
        /// Length of the rejected payload.
        len: usize,
        /// Maximum payload length.
        max: usize,
    },

    /// Opcode is not representable in 8 bits, or is not a known command.
    #[error("Invalid command opcode: 0x{0:X}")]
    InvalidCommand(u16),

    /// Raw frame has the wrong length.
    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required frame length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// Raw frame does not start with the command preamble.
    #[error("Invalid frame preamble: 0x{0:02X}")]
    InvalidPreamble(u8),

    /// Trailing checksum does not match the frame body.
    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over bytes 0..19.
        expected: u8,
        /// Checksum carried in byte 19.
        actual: u8,
    },

    /// Color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Result type alias using govee-types' FrameError type.
pub type FrameResult<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::InvalidPayload { len: 18, max: 17 };
        assert!(err.to_string().contains("18 bytes"));
        assert!(err.to_string().contains("17-byte"));

        let err = FrameError::InvalidCommand(0x1FF);
        assert_eq!(err.to_string(), "Invalid command opcode: 0x1FF");

        let err = FrameError::ChecksumMismatch {
            expected: 0x33,
            actual: 0x00,
        };
        assert!(err.to_string().contains("0x33"));
    }
}
