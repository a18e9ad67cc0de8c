//! Trait abstractions for the BLE collaborators a session depends on.
//!
//! A [`Transport`] bundles two collaborators: discovery (address to
//! connectable handle) and connection establishment (handle to [`Link`]).
//! [`crate::ble::BleTransport`] implements them over btleplug and
//! [`crate::mock::MockTransport`] implements them in memory for tests.

use async_trait::async_trait;

use govee_types::Frame;

use crate::error::Result;

/// An established GATT connection to one light.
#[async_trait]
pub trait Link: Send + Sync {
    /// Write one frame to the control characteristic without waiting for an
    /// acknowledgement.
    ///
    /// Fails with [`crate::Error::WriteFailed`] if the transport rejects the
    /// write.
    async fn write_frame(&self, frame: &Frame) -> Result<()>;

    /// Whether the link still reports as connected.
    async fn is_connected(&self) -> bool;

    /// Close the link.
    async fn disconnect(&self) -> Result<()>;
}

/// Discovery and connection collaborators for a session.
///
/// # Example
///
/// ```ignore
/// use govee_core::{Transport, Result};
///
/// async fn reachable<T: Transport>(transport: &T, address: &str) -> Result<bool> {
///     let handle = transport.discover(address).await?;
///     let link = transport.establish(&handle).await?;
///     link.disconnect().await?;
///     Ok(true)
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connectable device handle returned by discovery.
    type Handle: Send + Sync;
    /// Connection produced from a handle.
    type Link: Link;

    /// Resolve an address to a connectable handle.
    ///
    /// Must report [`crate::UnreachableReason::NoScanner`] when no scanner is
    /// available and [`crate::UnreachableReason::NotAdvertising`] when the
    /// address is not seen.
    async fn discover(&self, address: &str) -> Result<Self::Handle>;

    /// Make a single connection attempt. Retrying is the caller's job.
    async fn establish(&self, handle: &Self::Handle) -> Result<Self::Link>;
}
