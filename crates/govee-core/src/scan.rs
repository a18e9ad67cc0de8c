//! Device discovery and scanning.
//!
//! This module finds Govee lights over Bluetooth Low Energy and resolves
//! configured addresses to connectable peripherals.

use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::util::{addresses_match, create_identifier, format_peripheral_id};
use govee_types::DeviceModel;

/// Advertised name prefixes used by Govee firmware.
const GOVEE_NAME_PREFIXES: &[&str] = &["ihoment_", "govee_", "gbk_", "minger_"];

/// Information about a discovered light.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    /// The advertised name (e.g., "ihoment_H6127_A1B2").
    pub name: Option<String>,
    /// The peripheral ID for connecting.
    #[serde(skip)]
    pub id: PeripheralId,
    /// The BLE address as a string (may be zeros on macOS, use `identifier`).
    pub address: String,
    /// A connection identifier (peripheral ID on macOS, address elsewhere).
    pub identifier: String,
    /// RSSI signal strength.
    pub rssi: Option<i16>,
    /// Model guessed from the advertised name.
    pub model: Option<DeviceModel>,
    /// Whether the name looks like a Govee light.
    pub is_govee: bool,
}

/// Options for scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How long to scan for devices.
    pub duration: Duration,
    /// Only return devices that appear to be Govee lights.
    pub filter_govee_only: bool,
    /// Scan attempts when looking for one specific address.
    pub find_attempts: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            filter_govee_only: true,
            find_attempts: 3,
        }
    }
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set scan duration in seconds.
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }

    /// Set whether to filter for Govee devices only.
    pub fn filter_govee_only(mut self, filter: bool) -> Self {
        self.filter_govee_only = filter;
        self
    }

    /// Scan for all BLE devices, not just Govee.
    pub fn all_devices(self) -> Self {
        self.filter_govee_only(false)
    }

    /// Set the number of scan attempts used by [`find_device_with_options`].
    pub fn find_attempts(mut self, attempts: u32) -> Self {
        self.find_attempts = attempts.max(1);
        self
    }
}

/// Get the first available Bluetooth adapter.
///
/// # Errors
///
/// Returns [`crate::UnreachableReason::NoScanner`] when the system has no
/// adapter or the Bluetooth stack cannot be reached.
pub async fn get_adapter() -> Result<Adapter> {
    let adapters = match Manager::new().await {
        Ok(manager) => manager.adapters().await,
        Err(e) => Err(e),
    };
    first_adapter(adapters)
}

/// Pick the first adapter from an enumeration result.
fn first_adapter<A>(adapters: std::result::Result<Vec<A>, btleplug::Error>) -> Result<A> {
    adapters
        .map_err(scanner_unavailable)?
        .into_iter()
        .next()
        .ok_or_else(Error::no_scanner)
}

/// The stack refused to enumerate or scan, so no scanner is usable.
fn scanner_unavailable(error: btleplug::Error) -> Error {
    debug!("Bluetooth scanner unavailable: {}", error);
    Error::no_scanner()
}

/// Scan for Govee lights in range with default options.
///
/// An empty list means nothing was found and is not an error.
pub async fn scan_for_devices() -> Result<Vec<DiscoveredDevice>> {
    scan_with_options(ScanOptions::default()).await
}

/// Scan for devices with custom options.
pub async fn scan_with_options(options: ScanOptions) -> Result<Vec<DiscoveredDevice>> {
    let adapter = get_adapter().await?;
    scan_with_adapter(&adapter, options).await
}

/// Scan for devices using a specific adapter.
pub async fn scan_with_adapter(
    adapter: &Adapter,
    options: ScanOptions,
) -> Result<Vec<DiscoveredDevice>> {
    info!(
        "Starting BLE scan for {} seconds...",
        options.duration.as_secs()
    );

    adapter.start_scan(ScanFilter::default()).await?;
    sleep(options.duration).await;
    adapter.stop_scan().await?;

    let peripherals = adapter.peripherals().await?;
    let mut discovered = Vec::new();

    for peripheral in peripherals {
        match process_peripheral(&peripheral, options.filter_govee_only).await {
            Ok(Some(device)) => {
                debug!("Found device: {:?}", device.name);
                discovered.push(device);
            }
            Ok(None) => {}
            Err(e) => {
                debug!("Error processing peripheral: {}", e);
            }
        }
    }

    info!("Scan complete. Found {} device(s)", discovered.len());
    Ok(discovered)
}

async fn process_peripheral(
    peripheral: &Peripheral,
    filter_govee_only: bool,
) -> Result<Option<DiscoveredDevice>> {
    let Some(properties) = peripheral.properties().await? else {
        return Ok(None);
    };

    let is_govee = is_govee_device(&properties);
    if filter_govee_only && !is_govee {
        return Ok(None);
    }

    let id = peripheral.id();
    let address = properties.address.to_string();
    let name = properties.local_name.clone();
    let model = name.as_deref().and_then(DeviceModel::from_name);
    let identifier = create_identifier(&address, &id);

    Ok(Some(DiscoveredDevice {
        name,
        id,
        address,
        identifier,
        rssi: properties.rssi,
        model,
        is_govee,
    }))
}

fn is_govee_device(properties: &PeripheralProperties) -> bool {
    properties
        .local_name
        .as_deref()
        .is_some_and(is_govee_name)
}

/// Check whether an advertised name looks like a Govee light.
pub fn is_govee_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    GOVEE_NAME_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Find a peripheral by address with custom options.
///
/// Known peripherals are checked first so a device seen by an earlier scan
/// connects without waiting. Otherwise up to `find_attempts` scans run with
/// growing durations, since advertisements are easily missed.
///
/// # Errors
///
/// - [`crate::UnreachableReason::NoScanner`] when there is no usable adapter
/// - [`crate::UnreachableReason::NotAdvertising`] when every scan misses
///   the address
pub async fn find_device_with_options(
    address: &str,
    options: ScanOptions,
) -> Result<(Adapter, Peripheral)> {
    let adapter = get_adapter().await?;

    if let Some(peripheral) = find_peripheral_by_address(&adapter, address).await? {
        info!("Found {} among known peripherals", address);
        return Ok((adapter, peripheral));
    }

    let attempts = options.find_attempts.max(1);
    let base_duration = (options.duration / 2).max(Duration::from_secs(2));

    for attempt in 1..=attempts {
        let scan_duration = base_duration * attempt;
        info!(
            "Scan attempt {}/{} ({}s) for {}",
            attempt,
            attempts,
            scan_duration.as_secs(),
            address
        );

        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(scanner_unavailable)?;
        sleep(scan_duration).await;
        adapter.stop_scan().await?;

        if let Some(peripheral) = find_peripheral_by_address(&adapter, address).await? {
            info!("Found {} on attempt {}", address, attempt);
            return Ok((adapter, peripheral));
        }
    }

    warn!("{} not seen after {} scan(s)", address, attempts);
    Err(Error::not_advertising(address))
}

async fn find_peripheral_by_address(adapter: &Adapter, address: &str) -> Result<Option<Peripheral>> {
    for peripheral in adapter.peripherals().await? {
        let Ok(Some(props)) = peripheral.properties().await else {
            continue;
        };

        let peripheral_address = props.address.to_string();
        if peripheral_address != "00:00:00:00:00:00" && addresses_match(&peripheral_address, address)
        {
            debug!("Matched by address: {}", peripheral_address);
            return Ok(Some(peripheral));
        }

        // macOS only exposes a peripheral UUID
        let peripheral_id = format_peripheral_id(&peripheral.id());
        if peripheral_id.eq_ignore_ascii_case(address) {
            debug!("Matched by peripheral ID: {}", peripheral_id);
            return Ok(Some(peripheral));
        }
    }

    Ok(None)
}
