//! Hardware integration tests for govee-core
//!
//! These tests require actual BLE hardware and should be run with:
//! ```text
//! cargo test --package govee-core --test hardware_tests -- --ignored --nocapture
//! ```
//!
//! Configure the light via environment variables:
//! - `GOVEE_DEVICE`: address (or macOS peripheral UUID) of the light
//! - `GOVEE_MODEL`: model id, defaults to `H6127`
//!
//! Example:
//! ```text
//! GOVEE_DEVICE="A4:C1:38:0A:0B:0C" GOVEE_MODEL=H6053 cargo test --package govee-core --test hardware_tests -- --ignored --nocapture
//! ```

use std::env;
use std::time::Duration;

use govee_core::scan::{ScanOptions, scan_with_options};
use govee_core::{
    BleTransport, ConnectionPolicy, Rgb, SessionOptions, TurnOn, close_session, open_session,
};
use tokio::time::timeout;

/// Default timeout for BLE operations
const BLE_TIMEOUT: Duration = Duration::from_secs(60);

fn get_device() -> Option<String> {
    env::var("GOVEE_DEVICE").ok().filter(|s| !s.is_empty())
}

fn get_model() -> String {
    env::var("GOVEE_MODEL").unwrap_or_else(|_| "H6127".to_string())
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_scan_discovers_lights() {
    let options = ScanOptions::default().duration_secs(10);

    match timeout(Duration::from_secs(30), scan_with_options(options)).await {
        Ok(Ok(devices)) => {
            println!("Scan discovered {} light(s):", devices.len());
            for device in &devices {
                println!(
                    "  - {} ({}) model={:?}",
                    device.name.as_deref().unwrap_or("Unknown"),
                    device.identifier,
                    device.model
                );
                assert!(device.is_govee);
            }
        }
        Ok(Err(e)) => panic!("Scan failed: {}", e),
        Err(_) => panic!("Scan timed out"),
    }
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_power_cycle() {
    let Some(address) = get_device() else {
        println!("GOVEE_DEVICE not set, skipping");
        return;
    };

    let run = async {
        let mut session = open_session(
            BleTransport::default(),
            &address,
            get_model(),
            SessionOptions::default(),
        )
        .await?;

        session.turn_on(TurnOn::new()).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        session.turn_off().await?;
        assert_eq!(session.state().is_on, Some(false));

        close_session(session).await
    };

    timeout(BLE_TIMEOUT, run)
        .await
        .expect("power cycle timed out")
        .expect("power cycle failed");
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_color_sweep_per_command() {
    let Some(address) = get_device() else {
        println!("GOVEE_DEVICE not set, skipping");
        return;
    };

    let run = async {
        let options = SessionOptions::new().policy(ConnectionPolicy::PerCommand);
        let mut session =
            open_session(BleTransport::default(), &address, get_model(), options).await?;

        session
            .turn_on(TurnOn::new().brightness(128).color(Rgb::new(255, 0, 0)))
            .await?;
        for color in [Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)] {
            tokio::time::sleep(Duration::from_millis(500)).await;
            session.set_color(color).await?;
        }
        assert!(!session.is_connected().await);

        close_session(session).await
    };

    timeout(BLE_TIMEOUT, run)
        .await
        .expect("color sweep timed out")
        .expect("color sweep failed");
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_unknown_address_not_advertising() {
    let transport = BleTransport::new(
        ScanOptions::default().duration_secs(2).find_attempts(1),
        Default::default(),
    );

    let result = timeout(
        BLE_TIMEOUT,
        open_session(transport, "00:11:22:33:44:55", "H6127", SessionOptions::default()),
    )
    .await
    .expect("discovery timed out");

    let err = result.expect_err("a made-up address should not be found");
    println!("Got expected error: {}", err);
    assert!(err.unreachable_reason().is_some());
}
