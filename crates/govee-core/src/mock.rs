//! In-memory transport for testing.
//!
//! [`MockTransport`] implements [`Transport`] without BLE hardware. Clones
//! share state, so a test can keep one handle for inspection while a
//! [`crate::Session`] owns another.
//!
//! # Features
//!
//! - **Discovery outcomes**: no scanner, or a set of advertising addresses
//! - **Failure injection**: transient connect failures, one-shot or
//!   persistent write rejections
//! - **Latency simulation**: delay connects and writes
//! - **Observation**: discover/connect/disconnect counters and a log of
//!   every written frame

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use govee_types::Frame;
use govee_types::uuids::CONTROL_CHARACTERISTIC;

use crate::error::{Error, Result};
use crate::traits::{Link, Transport};
use crate::util::unique_id;

#[derive(Debug, Default)]
struct MockState {
    no_scanner: AtomicBool,
    advertising: RwLock<HashSet<String>>,
    remaining_connect_failures: AtomicU32,
    connect_always_fails: AtomicBool,
    remaining_write_failures: AtomicU32,
    /// Writes left until one is rejected; zero when disarmed.
    write_failure_countdown: AtomicU32,
    write_always_fails: AtomicBool,
    connect_latency_ms: AtomicU64,
    write_latency_ms: AtomicU64,
    discover_count: AtomicU32,
    connect_count: AtomicU32,
    disconnect_count: AtomicU32,
    /// Bumped to invalidate every open link.
    generation: AtomicU64,
    written: Mutex<Vec<Frame>>,
}

/// A mock transport for testing.
///
/// # Example
///
/// ```
/// use govee_core::{MockTransport, Transport, Link};
/// use govee_types::encode_power;
///
/// #[tokio::main]
/// async fn main() {
///     let transport = MockTransport::new().with_device("A4:C1:38:00:11:22");
///     let handle = transport.discover("A4:C1:38:00:11:22").await.unwrap();
///     let link = transport.establish(&handle).await.unwrap();
///     link.write_frame(&encode_power(true)).await.unwrap();
///     assert_eq!(transport.written_frames().await.len(), 1);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    /// Create a transport with a scanner and no advertising devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an advertising device.
    #[must_use]
    pub fn with_device(self, address: &str) -> Self {
        if let Ok(mut advertising) = self.state.advertising.try_write() {
            advertising.insert(unique_id(address).to_uppercase());
        }
        self
    }

    /// Simulate a host without a Bluetooth adapter.
    #[must_use]
    pub fn without_scanner(self) -> Self {
        self.set_no_scanner(true);
        self
    }

    /// Toggle the "no scanner" condition.
    pub fn set_no_scanner(&self, no_scanner: bool) {
        self.state.no_scanner.store(no_scanner, Ordering::Relaxed);
    }

    /// Start or stop advertising an address.
    pub async fn set_advertising(&self, address: &str, advertising: bool) {
        let key = unique_id(address).to_uppercase();
        let mut set = self.state.advertising.write().await;
        if advertising {
            set.insert(key);
        } else {
            set.remove(&key);
        }
    }

    /// Fail the next `count` connection attempts, then succeed.
    pub fn set_transient_connect_failures(&self, count: u32) {
        self.state
            .remaining_connect_failures
            .store(count, Ordering::Relaxed);
    }

    /// Fail every connection attempt.
    pub fn set_connect_always_fails(&self, fail: bool) {
        self.state.connect_always_fails.store(fail, Ordering::Relaxed);
    }

    /// Reject the next `count` writes, then accept.
    pub fn set_transient_write_failures(&self, count: u32) {
        self.state
            .remaining_write_failures
            .store(count, Ordering::Relaxed);
    }

    /// Accept `n - 1` writes, then reject the next one.
    pub fn fail_nth_write(&self, n: u32) {
        self.state
            .write_failure_countdown
            .store(n, Ordering::Relaxed);
    }

    /// Reject every write.
    pub fn set_write_always_fails(&self, fail: bool) {
        self.state.write_always_fails.store(fail, Ordering::Relaxed);
    }

    /// Delay each connection attempt.
    pub fn set_connect_latency(&self, latency: Duration) {
        self.state
            .connect_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Delay each write.
    pub fn set_write_latency(&self, latency: Duration) {
        self.state
            .write_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Drop every open link, as if the device went out of range.
    pub fn drop_links(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of `discover` calls.
    pub fn discover_count(&self) -> u32 {
        self.state.discover_count.load(Ordering::Relaxed)
    }

    /// Number of `establish` calls, including failed ones.
    pub fn connect_count(&self) -> u32 {
        self.state.connect_count.load(Ordering::Relaxed)
    }

    /// Number of explicit link disconnects.
    pub fn disconnect_count(&self) -> u32 {
        self.state.disconnect_count.load(Ordering::Relaxed)
    }

    /// Frames accepted by any link, in write order.
    pub async fn written_frames(&self) -> Vec<Frame> {
        self.state.written.lock().await.clone()
    }
}

/// Handle produced by [`MockTransport::discover`].
#[derive(Debug, Clone)]
pub struct MockHandle {
    address: String,
}

impl MockHandle {
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Handle = MockHandle;
    type Link = MockLink;

    async fn discover(&self, address: &str) -> Result<MockHandle> {
        self.state.discover_count.fetch_add(1, Ordering::Relaxed);

        if self.state.no_scanner.load(Ordering::Relaxed) {
            return Err(Error::no_scanner());
        }

        let key = unique_id(address).to_uppercase();
        if !self.state.advertising.read().await.contains(&key) {
            return Err(Error::not_advertising(address));
        }

        Ok(MockHandle {
            address: address.to_string(),
        })
    }

    async fn establish(&self, handle: &MockHandle) -> Result<MockLink> {
        self.state.connect_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.state.connect_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if take_one(&self.state.remaining_connect_failures)
            || self.state.connect_always_fails.load(Ordering::Relaxed)
        {
            return Err(Error::connection_failed(
                Some(handle.address.clone()),
                "mock connection refused",
            ));
        }

        Ok(MockLink {
            state: Arc::clone(&self.state),
            generation: self.state.generation.load(Ordering::SeqCst),
            closed: AtomicBool::new(false),
        })
    }
}

/// Link produced by [`MockTransport::establish`].
#[derive(Debug)]
pub struct MockLink {
    state: Arc<MockState>,
    generation: u64,
    closed: AtomicBool,
}

#[async_trait]
impl Link for MockLink {
    async fn write_frame(&self, frame: &Frame) -> Result<()> {
        let latency = self.state.write_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if !self.is_connected().await {
            return Err(Error::write_failed(CONTROL_CHARACTERISTIC, "not connected"));
        }

        let countdown_hit = self
            .state
            .write_failure_countdown
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok_and(|previous| previous == 1);

        if countdown_hit
            || take_one(&self.state.remaining_write_failures)
            || self.state.write_always_fails.load(Ordering::Relaxed)
        {
            // A rejected write leaves the link unusable
            self.closed.store(true, Ordering::Relaxed);
            return Err(Error::write_failed(
                CONTROL_CHARACTERISTIC,
                "mock write rejected",
            ));
        }

        self.state.written.lock().await.push(*frame);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Relaxed)
            && self.generation == self.state.generation.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::Relaxed) {
            self.state.disconnect_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Decrement a failure budget, reporting whether one was consumed.
fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
        .is_ok()
}
