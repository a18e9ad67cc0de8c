//! Platform-agnostic types for Govee Bluetooth LE lights.
//!
//! This crate provides the command frame codec and shared value types used
//! by the BLE layer (govee-core) and any other transport.
//!
//! # Features
//!
//! - 20-byte command frames with XOR checksum
//! - Per-model payload encoders behind a [`ModelRegistry`]
//! - UUID of the control characteristic
//! - Error types for frame encoding and decoding
//!
//! # Example
//!
//! ```
//! use govee_types::{DeviceModel, encode_color, encode_power};
//!
//! let on = encode_power(true);
//! assert_eq!(on.as_bytes().len(), 20);
//!
//! let red = encode_color(&DeviceModel::new("H6127"), 255, 0, 0).unwrap();
//! assert_eq!(&red.payload_area()[..4], &[0x02, 255, 0, 0]);
//! ```

pub mod error;
pub mod frame;
pub mod model;
pub mod types;
pub mod uuid;

pub use error::{FrameError, FrameResult};
pub use frame::{
    FRAME_LEN, Frame, MAX_PAYLOAD_LEN, PREAMBLE, encode_brightness, encode_color, encode_power,
    xor_checksum,
};
pub use model::{BrightnessEncoder, ColorEncoder, ModelProfile, ModelRegistry};
pub use types::{Command, DeviceModel, LedMode, LightState, Rgb};
pub use uuid as uuids;
