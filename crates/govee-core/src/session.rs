//! Device sessions.
//!
//! A [`Session`] is one logical connection to one light. It owns the cached
//! discovery handle and an optional link, reconnecting on demand and writing
//! one frame per command.
//!
//! Commands take `&mut self`, so commands on one session never interleave.
//! Separate sessions share nothing and can be driven concurrently.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use govee_types::{DeviceModel, Frame, LightState, ModelRegistry, Rgb, encode_power};

use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};
use crate::traits::{Link, Transport};
use crate::util::{normalize_address, unique_id};

/// What happens to the link after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionPolicy {
    /// Keep the link open for the next command.
    #[default]
    Reuse,
    /// Disconnect after every command.
    PerCommand,
}

impl fmt::Display for ConnectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => f.write_str("reuse"),
            Self::PerCommand => f.write_str("per-command"),
        }
    }
}

impl FromStr for ConnectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reuse" => Ok(Self::Reuse),
            "per-command" | "per_command" => Ok(Self::PerCommand),
            other => Err(Error::invalid_config(format!(
                "unknown connection policy '{}', expected 'reuse' or 'per-command'",
                other
            ))),
        }
    }
}

/// Options for a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Retry budget for connection establishment.
    pub retry: RetryConfig,
    /// Link reuse policy.
    pub policy: ConnectionPolicy,
    /// Custom model registry. `None` uses [`ModelRegistry::builtin`].
    pub registry: Option<Arc<ModelRegistry>>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ConnectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom model registry, e.g. one with extra models registered.
    #[must_use]
    pub fn registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }
}

/// Parameters for [`Session::turn_on`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOn {
    pub brightness: Option<u8>,
    pub color: Option<Rgb>,
}

impl TurnOn {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// A session with one Govee light.
///
/// # Example
///
/// ```
/// use govee_core::{MockTransport, SessionOptions, TurnOn, open_session, close_session};
/// use govee_types::Rgb;
///
/// #[tokio::main]
/// async fn main() -> govee_core::Result<()> {
///     let transport = MockTransport::new().with_device("A4:C1:38:00:11:22");
///     let mut session =
///         open_session(transport, "a4:c1:38:00:11:22", "H6127", SessionOptions::default()).await?;
///
///     session.turn_on(TurnOn::new().brightness(128).color(Rgb::new(255, 0, 0))).await?;
///     assert_eq!(session.state().brightness, Some(128));
///
///     close_session(session).await
/// }
/// ```
pub struct Session<T: Transport> {
    transport: T,
    address: String,
    model: DeviceModel,
    options: SessionOptions,
    handle: Option<T::Handle>,
    link: Option<T::Link>,
    state: LightState,
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("model", &self.model)
            .field("policy", &self.options.policy)
            .field("has_link", &self.link.is_some())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Open a session, resolving the device up front.
///
/// The address is normalized to upper case. Discovery runs eagerly so a
/// missing scanner or a silent device is reported here rather than on the
/// first command. No connection is made yet.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] for an empty address or unusable retry settings
/// - [`Error::DeviceUnreachable`] with `NoScanner` or `NotAdvertising`
#[tracing::instrument(level = "info", skip(transport, model, options))]
pub async fn open_session<T: Transport>(
    transport: T,
    address: &str,
    model: impl Into<DeviceModel>,
    options: SessionOptions,
) -> Result<Session<T>> {
    let address = normalize_address(address)?;
    options.retry.validate()?;
    let model = model.into();

    let handle = transport.discover(&address).await?;
    info!("Opened session for {} ({})", address, model);

    Ok(Session {
        transport,
        address,
        model,
        options,
        handle: Some(handle),
        link: None,
        state: LightState::default(),
    })
}

/// Close a session, disconnecting any held link.
pub async fn close_session<T: Transport>(session: Session<T>) -> Result<()> {
    session.close().await
}

impl<T: Transport> Session<T> {
    /// Normalized device address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Stable identifier: the address without separators.
    pub fn unique_id(&self) -> String {
        unique_id(&self.address)
    }

    /// The optimistic state mirror. Fields are `None` until a command for
    /// them has succeeded.
    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether a live link is held.
    pub async fn is_connected(&self) -> bool {
        match &self.link {
            Some(link) => link.is_connected().await,
            None => false,
        }
    }

    fn registry(&self) -> &ModelRegistry {
        match &self.options.registry {
            Some(registry) => registry,
            None => ModelRegistry::builtin(),
        }
    }

    /// Make sure a live link is held.
    ///
    /// A live link is kept as is. Otherwise the device is discovered (if no
    /// handle is cached) and a link is established with the configured retry
    /// budget. Discovery failures are returned without retrying.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceUnreachable`] with `NoScanner`, `NotAdvertising` or
    /// `RetriesExhausted`, or a non-retryable connect error.
    #[tracing::instrument(level = "info", skip_all, fields(address = %self.address))]
    pub async fn connect(&mut self) -> Result<()> {
        if let Some(link) = &self.link {
            if link.is_connected().await {
                debug!("Reusing live link");
                return Ok(());
            }
            debug!("Cached link is stale");
            self.link = None;
        }

        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.transport.discover(&self.address).await?,
        };

        let transport = &self.transport;
        let handle_ref = &handle;
        let result = with_retry(&self.options.retry, "connect", || {
            transport.establish(handle_ref)
        })
        .await;

        match result {
            Ok(link) => {
                info!("Connected");
                self.handle = Some(handle);
                self.link = Some(link);
                Ok(())
            }
            Err(e) => {
                // Rediscover next time, the peripheral may have changed
                warn!("Connect failed: {}", e);
                Err(e)
            }
        }
    }

    /// Write one frame to the control characteristic.
    ///
    /// Acquires a link first (see [`Session::connect`]). A rejected write is
    /// never retried: the link is discarded and [`Error::WriteFailed`] is
    /// returned, so the next call reconnects. Under
    /// [`ConnectionPolicy::PerCommand`] the link is closed after a successful
    /// write.
    #[tracing::instrument(level = "debug", skip_all, fields(address = %self.address, opcode = frame.opcode()))]
    pub async fn send(&mut self, frame: &Frame) -> Result<()> {
        self.connect().await?;

        let Some(link) = self.link.as_ref() else {
            return Err(Error::connection_failed(
                Some(self.address.clone()),
                "no link after connect",
            ));
        };

        match link.write_frame(frame).await {
            Ok(()) => {
                debug!("Wrote {}", frame);
                if self.options.policy == ConnectionPolicy::PerCommand {
                    self.release_link().await;
                }
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, dropping link: {}", e);
                self.release_link().await;
                Err(e)
            }
        }
    }

    async fn release_link(&mut self) {
        if let Some(link) = self.link.take()
            && let Err(e) = link.disconnect().await
        {
            debug!("Disconnect failed: {}", e);
        }
    }

    /// Power on, then optionally set brightness and color.
    ///
    /// Each step is one write, in that order. The first failure aborts the
    /// rest; earlier steps are not rolled back and stay mirrored.
    pub async fn turn_on(&mut self, request: TurnOn) -> Result<()> {
        self.send(&encode_power(true)).await?;
        self.state.is_on = Some(true);

        if let Some(brightness) = request.brightness {
            self.set_brightness(brightness).await?;
        }

        if let Some(color) = request.color {
            self.set_color(color).await?;
        }

        Ok(())
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.send(&encode_power(false)).await?;
        self.state.is_on = Some(false);
        Ok(())
    }

    /// Set brightness without sending a power frame.
    pub async fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        let frame = self.registry().encode_brightness(&self.model, brightness)?;
        self.send(&frame).await?;
        self.state.brightness = Some(brightness);
        Ok(())
    }

    /// Set color without sending a power frame.
    pub async fn set_color(&mut self, color: Rgb) -> Result<()> {
        let frame = self.registry().encode_color(&self.model, color)?;
        self.send(&frame).await?;
        self.state.rgb = Some(color);
        Ok(())
    }

    /// Disconnect and consume the session.
    pub async fn close(mut self) -> Result<()> {
        if let Some(link) = self.link.take() {
            info!("Closing session for {}", self.address);
            link.disconnect().await?;
        }
        Ok(())
    }
}
