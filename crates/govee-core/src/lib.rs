//! Core BLE library for Govee RGB lights.
//!
//! This crate drives Govee Bluetooth Low Energy lights such as the H6053 and
//! H6127 strips: it resolves a light by address, keeps a session with it,
//! and writes 20-byte command frames built by [`govee_types`].
//!
//! # Features
//!
//! - **Device discovery**: Scan for nearby Govee lights via BLE
//! - **Sessions**: Power, brightness and color commands with an optimistic
//!   state mirror
//! - **Connection retry**: Bounded exponential backoff on connect; writes are
//!   never repeated
//! - **Connection policy**: Keep the link between commands or reconnect per
//!   command
//! - **Mock transport**: Exercise sessions without hardware
//!
//! # Platform Differences
//!
//! - **macOS**: CoreBluetooth hides MAC addresses, so lights are identified
//!   by a peripheral UUID. Use the `identifier` reported by a scan.
//! - **Linux/Windows**: Lights are identified by their Bluetooth MAC address
//!   (e.g., `A4:C1:38:0A:0B:0C`).
//!
//! # Quick Start
//!
//! ```no_run
//! use govee_core::{BleTransport, SessionOptions, TurnOn, open_session, scan};
//! use govee_types::Rgb;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let devices = scan::scan_for_devices().await?;
//!     println!("Found {} lights", devices.len());
//!
//!     let mut light = open_session(
//!         BleTransport::default(),
//!         "A4:C1:38:0A:0B:0C",
//!         "H6127",
//!         SessionOptions::default(),
//!     )
//!     .await?;
//!
//!     light
//!         .turn_on(TurnOn::new().brightness(200).color(Rgb::new(255, 80, 0)))
//!         .await?;
//!
//!     govee_core::close_session(light).await?;
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod error;
pub mod mock;
pub mod retry;
pub mod scan;
pub mod session;
pub mod traits;
pub mod util;

// Core exports
pub use ble::{BleHandle, BleLink, BleTransport, ConnectionConfig};
pub use error::{Error, Result, UnreachableReason};
pub use mock::{MockHandle, MockLink, MockTransport};
pub use retry::{RetryConfig, is_retryable, with_retry};
pub use scan::{DiscoveredDevice, ScanOptions};
pub use session::{
    ConnectionPolicy, Session, SessionOptions, TurnOn, close_session, open_session,
};
pub use traits::{Link, Transport};
pub use util::{create_identifier, format_peripheral_id, normalize_address, unique_id};

// Re-export from govee-types
pub use govee_types::uuid as uuids;
pub use govee_types::{Command, DeviceModel, Frame, LightState, ModelRegistry, Rgb};
