//! Bluetooth UUIDs for Govee lights.
//!
//! Govee RGB lights expose a single vendor characteristic that accepts
//! 20-byte command frames.

use uuid::{Uuid, uuid};

/// Control characteristic accepting one command frame per write
/// (write-without-response).
pub const CONTROL_CHARACTERISTIC: Uuid = uuid!("00010203-0405-0607-0809-0a0b0c0d2b11");
