//! Fixed-size command frames.
//!
//! Every write to a Govee light is a 20-byte frame:
//!
//! | Index | Content |
//! |-------|---------|
//! | 0 | Preamble `0x33` |
//! | 1 | Command opcode |
//! | 2..19 | Payload (up to 17 bytes), zero padded |
//! | 19 | XOR of bytes 0..19 |

use core::fmt;

use crate::error::{FrameError, FrameResult};
use crate::model::ModelRegistry;
use crate::types::{Command, DeviceModel, Rgb};

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 20;

/// First byte of every command frame.
pub const PREAMBLE: u8 = 0x33;

/// Largest payload that fits between the opcode and the checksum.
pub const MAX_PAYLOAD_LEN: usize = FRAME_LEN - 3;

/// A validated 20-byte command frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Build a frame from an opcode and payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidPayload`] if the payload is longer than
    /// [`MAX_PAYLOAD_LEN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_types::Frame;
    ///
    /// let frame = Frame::new(0x01, &[0x01]).unwrap();
    /// assert_eq!(frame.as_bytes()[0], 0x33);
    /// assert_eq!(frame.checksum(), 0x33);
    /// ```
    pub fn new(opcode: u8, payload: &[u8]) -> FrameResult<Self> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::InvalidPayload {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        Ok(Self::assemble(opcode, payload))
    }

    /// Lay out a frame. `payload` must already be within capacity.
    fn assemble(opcode: u8, payload: &[u8]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = PREAMBLE;
        bytes[1] = opcode;
        bytes[2..2 + payload.len()].copy_from_slice(payload);
        bytes[FRAME_LEN - 1] = xor_checksum(&bytes[..FRAME_LEN - 1]);
        Self(bytes)
    }

    /// Build a frame for a typed command.
    pub fn for_command(command: Command, payload: &[u8]) -> FrameResult<Self> {
        Self::new(command.opcode(), payload)
    }

    /// Build a frame from an untyped opcode.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidCommand`] if the opcode does not fit in a
    /// byte, and [`FrameError::InvalidPayload`] if the payload is too long.
    pub fn with_raw_opcode(opcode: u16, payload: &[u8]) -> FrameResult<Self> {
        let opcode = u8::try_from(opcode).map_err(|_| FrameError::InvalidCommand(opcode))?;
        Self::new(opcode, payload)
    }

    /// Parse and validate a frame received as raw bytes.
    ///
    /// # Errors
    ///
    /// Rejects input that is not exactly 20 bytes, does not start with the
    /// preamble, or carries a wrong checksum.
    pub fn from_bytes(data: &[u8]) -> FrameResult<Self> {
        let bytes: [u8; FRAME_LEN] = data.try_into().map_err(|_| FrameError::InvalidLength {
            expected: FRAME_LEN,
            actual: data.len(),
        })?;

        if bytes[0] != PREAMBLE {
            return Err(FrameError::InvalidPreamble(bytes[0]));
        }

        let expected = xor_checksum(&bytes[..FRAME_LEN - 1]);
        let actual = bytes[FRAME_LEN - 1];
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn opcode(&self) -> u8 {
        self.0[1]
    }

    /// The typed command, if the opcode is a known one.
    pub fn command(&self) -> FrameResult<Command> {
        Command::from_opcode(self.opcode())
    }

    /// Bytes 2..19: the payload followed by its zero padding.
    ///
    /// The frame does not record the payload length, so trailing zeros of the
    /// payload itself are indistinguishable from padding.
    pub fn payload_area(&self) -> &[u8] {
        &self.0[2..FRAME_LEN - 1]
    }

    pub fn checksum(&self) -> u8 {
        self.0[FRAME_LEN - 1]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// XOR-reduce a byte slice.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

/// Encode a power command.
pub fn encode_power(on: bool) -> Frame {
    Frame::assemble(Command::Power.opcode(), &[u8::from(on)])
}

/// Encode a brightness command using the built-in model registry.
///
/// `brightness` is on the 0-255 scale; models with a different native
/// range rescale it.
pub fn encode_brightness(model: &DeviceModel, brightness: u8) -> FrameResult<Frame> {
    ModelRegistry::builtin().encode_brightness(model, brightness)
}

/// Encode a color command using the built-in model registry.
pub fn encode_color(model: &DeviceModel, red: u8, green: u8, blue: u8) -> FrameResult<Frame> {
    ModelRegistry::builtin().encode_color(model, Rgb::new(red, green, blue))
}


/// Property-based tests for the frame codec.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any payload within capacity yields a 20-byte frame whose last
        /// byte is the XOR of the rest.
        #[test]
        fn frame_is_fixed_length_with_valid_checksum(
            opcode: u8,
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_LEN),
        ) {
            let frame = Frame::new(opcode, &payload).unwrap();
            let bytes = frame.as_bytes();
            prop_assert_eq!(bytes.len(), FRAME_LEN);
            prop_assert_eq!(bytes[19], xor_checksum(&bytes[..19]));
            prop_assert_eq!(&frame.payload_area()[..payload.len()], &payload[..]);
            prop_assert!(frame.payload_area()[payload.len()..].iter().all(|&b| b == 0));
            prop_assert_eq!(Frame::from_bytes(bytes), Ok(frame));
        }

        /// Oversized payloads are always rejected.
        #[test]
        fn oversized_payload_rejected(
            opcode: u8,
            payload in proptest::collection::vec(any::<u8>(), (MAX_PAYLOAD_LEN + 1)..64),
        ) {
            let is_invalid_payload = matches!(
                Frame::new(opcode, &payload),
                Err(FrameError::InvalidPayload { .. })
            );
            prop_assert!(is_invalid_payload);
        }

        /// Decoding arbitrary bytes never panics.
        #[test]
        fn from_bytes_never_panics(data: Vec<u8>) {
            let _ = Frame::from_bytes(&data);
        }

        /// Every brightness and model pair encodes.
        #[test]
        fn brightness_always_encodes(brightness: u8, id in "H[0-9]{4}") {
            let frame = encode_brightness(&DeviceModel::new(id), brightness).unwrap();
            prop_assert_eq!(frame.opcode(), Command::Brightness.opcode());
        }
    }
}
