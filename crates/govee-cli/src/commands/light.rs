//! Power, brightness and color commands.
//!
//! Every target gets its own session; targets are driven concurrently.

use std::time::Duration;

use anyhow::{Result, bail};
use futures::future::join_all;
use govee_core::{
    BleTransport, ConnectionConfig, LightState, ScanOptions, SessionOptions, Transport, TurnOn,
    UnreachableReason, close_session, open_session,
};
use govee_types::Rgb;
use tracing::debug;

use crate::config::Target;
use crate::format::{LightOutcome, format_outcomes_json, format_outcomes_text};
use crate::util::{require_targets, write_output};

/// What to do to each light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAction {
    On(TurnOn),
    Off,
    Brightness(u8),
    Color(Rgb),
}

/// Resolved inputs for [`cmd_light`].
#[derive(Debug, Clone)]
pub struct LightArgs {
    pub targets: Vec<Target>,
    pub timeout: Duration,
    pub options: SessionOptions,
}

pub async fn cmd_light(
    action: LightAction,
    args: LightArgs,
    json: bool,
    quiet: bool,
) -> Result<()> {
    require_targets(&args.targets)?;

    let transport = BleTransport::new(
        ScanOptions::default().duration(args.timeout),
        ConnectionConfig::default().connection_timeout(args.timeout),
    );

    if !quiet && !json && args.targets.len() > 1 {
        eprintln!("Sending to {} lights...", args.targets.len());
    }

    let outcomes = drive_lights(&transport, &args.targets, action, &args.options).await;

    let content = if json {
        format_outcomes_json(&outcomes)?
    } else if quiet {
        String::new()
    } else {
        format_outcomes_text(&outcomes)
    };
    write_output(&content)?;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        bail!("Failed to control {} of {} light(s)", failed, outcomes.len());
    }
    Ok(())
}

/// Apply an action to every target concurrently, one session each.
pub async fn drive_lights<T>(
    transport: &T,
    targets: &[Target],
    action: LightAction,
    options: &SessionOptions,
) -> Vec<LightOutcome>
where
    T: Transport + Clone,
{
    let futures = targets.iter().map(|target| {
        let transport = transport.clone();
        let options = options.clone();
        async move {
            let result = apply(transport, target, action, options)
                .await
                .map_err(|e| describe_error(&e));
            LightOutcome {
                target: target.clone(),
                result,
            }
        }
    });

    join_all(futures).await
}

async fn apply<T: Transport>(
    transport: T,
    target: &Target,
    action: LightAction,
    options: SessionOptions,
) -> govee_core::Result<LightState> {
    let mut session =
        open_session(transport, &target.address, target.model.as_str(), options).await?;

    let result = match action {
        LightAction::On(request) => session.turn_on(request).await,
        LightAction::Off => session.turn_off().await,
        LightAction::Brightness(level) => session.set_brightness(level).await,
        LightAction::Color(rgb) => session.set_color(rgb).await,
    };

    let state = session.state();
    if let Err(e) = close_session(session).await {
        debug!("Close failed for {}: {}", target.address, e);
    }

    result.map(|()| state)
}

/// Error text with a hint for the common reachability problems.
fn describe_error(error: &govee_core::Error) -> String {
    let hint = match error.unreachable_reason() {
        Some(UnreachableReason::NoScanner) => Some("is Bluetooth enabled?"),
        Some(UnreachableReason::NotAdvertising { .. }) => {
            Some("is the light powered and in range? run 'govee scan' to check")
        }
        Some(UnreachableReason::RetriesExhausted { .. }) => {
            Some("the light may be connected to another host")
        }
        _ => None,
    };

    match hint {
        Some(hint) => format!("{} ({})", error, hint),
        None => error.to_string(),
    }
}
