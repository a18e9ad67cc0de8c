//! btleplug-backed transport.
//!
//! [`BleTransport`] resolves addresses with [`crate::scan`] and opens GATT
//! connections; [`BleLink`] writes frames to the control characteristic.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use govee_types::Frame;
use govee_types::uuids::CONTROL_CHARACTERISTIC;

use crate::error::{Error, Result};
use crate::scan::{ScanOptions, find_device_with_options};
use crate::traits::{Link, Transport};
use crate::util::format_peripheral_id;

/// Default timeout for establishing a BLE connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a single frame write.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeouts for BLE connection and write operations.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use govee_core::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .connection_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Timeout for establishing a BLE connection.
    pub connection_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for one frame write.
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a new connection config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// A peripheral resolved by discovery.
pub struct BleHandle {
    /// Kept alive for as long as the peripheral is in use.
    #[allow(dead_code)]
    adapter: Adapter,
    peripheral: Peripheral,
    address: String,
}

impl std::fmt::Debug for BleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleHandle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Transport over the system Bluetooth stack.
#[derive(Debug, Clone, Default)]
pub struct BleTransport {
    scan: ScanOptions,
    config: ConnectionConfig,
}

impl BleTransport {
    pub fn new(scan: ScanOptions, config: ConnectionConfig) -> Self {
        Self { scan, config }
    }

    pub fn scan_options(&self) -> &ScanOptions {
        &self.scan
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for BleTransport {
    type Handle = BleHandle;
    type Link = BleLink;

    #[tracing::instrument(level = "debug", skip(self))]
    async fn discover(&self, address: &str) -> Result<BleHandle> {
        let (adapter, peripheral) = find_device_with_options(address, self.scan.clone()).await?;
        Ok(BleHandle {
            adapter,
            peripheral,
            address: address.to_string(),
        })
    }

    #[tracing::instrument(level = "info", skip_all, fields(address = %handle.address))]
    async fn establish(&self, handle: &BleHandle) -> Result<BleLink> {
        let peripheral = handle.peripheral.clone();
        let config = &self.config;

        if !peripheral.is_connected().await.unwrap_or(false) {
            info!("Connecting to device...");
            timeout(config.connection_timeout, peripheral.connect())
                .await
                .map_err(|_| Error::timeout("connect to device", config.connection_timeout))?
                .map_err(|e| Error::connection_failed(Some(handle.address.clone()), e.to_string()))?;
        }

        timeout(config.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", config.discovery_timeout))??;

        let services = peripheral.services();
        let characteristic = services
            .iter()
            .flat_map(|service| service.characteristics.iter())
            .find(|c| c.uuid == CONTROL_CHARACTERISTIC)
            .cloned();

        let Some(characteristic) = characteristic else {
            // Leave the link closed rather than holding a useless connection
            if let Err(e) = peripheral.disconnect().await {
                debug!("Disconnect after failed lookup: {}", e);
            }
            return Err(Error::characteristic_not_found(
                CONTROL_CHARACTERISTIC.to_string(),
                services.len(),
            ));
        };

        info!(
            "Connected to {} ({})",
            handle.address,
            format_peripheral_id(&peripheral.id())
        );

        Ok(BleLink {
            peripheral,
            characteristic,
            write_timeout: config.write_timeout,
        })
    }
}

/// An open GATT connection with the control characteristic resolved.
pub struct BleLink {
    peripheral: Peripheral,
    characteristic: Characteristic,
    write_timeout: Duration,
}

impl std::fmt::Debug for BleLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleLink")
            .field("characteristic", &self.characteristic.uuid)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Link for BleLink {
    async fn write_frame(&self, frame: &Frame) -> Result<()> {
        debug!("Writing frame {}", frame);
        match timeout(
            self.write_timeout,
            self.peripheral.write(
                &self.characteristic,
                frame.as_bytes(),
                WriteType::WithoutResponse,
            ),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::write_failed(self.characteristic.uuid, e.to_string())),
            Err(_) => Err(Error::write_failed(
                self.characteristic.uuid,
                format!("timed out after {:?}", self.write_timeout),
            )),
        }
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        if let Err(e) = self.peripheral.disconnect().await {
            warn!("Disconnect failed: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}
