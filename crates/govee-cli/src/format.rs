//! Output formatting for scan results and light states.

use std::collections::HashMap;

use anyhow::Result;
use govee_core::{DiscoveredDevice, LightState};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::config::{AliasEntry, Target};

/// Render scan results as a table, with an alias column when any light has one.
pub fn format_scan_text(
    devices: &[DiscoveredDevice],
    aliases: &HashMap<String, AliasEntry>,
) -> String {
    if devices.is_empty() {
        return "No Govee lights found.\n".to_string();
    }

    let alias_for = |device: &DiscoveredDevice| {
        aliases
            .iter()
            .find(|(_, entry)| entry.address.eq_ignore_ascii_case(&device.identifier))
            .map(|(name, _)| name.clone())
    };
    let show_aliases = devices.iter().any(|d| alias_for(d).is_some());

    let mut builder = Builder::default();
    let mut header = vec!["Name", "Identifier", "Model", "RSSI"];
    if show_aliases {
        header.push("Alias");
    }
    builder.push_record(header);

    for device in devices {
        let mut row = vec![
            device.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            device.identifier.clone(),
            device
                .model
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            device
                .rssi
                .map(|r| format!("{} dBm", r))
                .unwrap_or_else(|| "-".to_string()),
        ];
        if show_aliases {
            row.push(alias_for(device).unwrap_or_default());
        }
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\nFound {} light(s)\n", table, devices.len())
}

/// Render scan results as JSON.
pub fn format_scan_json(devices: &[DiscoveredDevice]) -> Result<String> {
    #[derive(Serialize)]
    struct ScanResult<'a> {
        count: usize,
        devices: &'a [DiscoveredDevice],
    }

    let result = ScanResult {
        count: devices.len(),
        devices,
    };
    Ok(serde_json::to_string_pretty(&result)? + "\n")
}

/// Outcome of a command on one light.
#[derive(Debug)]
pub struct LightOutcome {
    pub target: Target,
    pub result: Result<LightState, String>,
}

/// One line per light, e.g. `desk (A4:C1:38:00:00:01): on, brightness 200`.
pub fn format_outcomes_text(outcomes: &[LightOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let name = if outcome.target.label == outcome.target.address {
            outcome.target.address.clone()
        } else {
            format!("{} ({})", outcome.target.label, outcome.target.address)
        };
        match &outcome.result {
            Ok(state) => out.push_str(&format!("{}: {}\n", name, describe_state(state))),
            Err(e) => out.push_str(&format!("{}: FAILED - {}\n", name, e)),
        }
    }
    out
}

/// Render outcomes as JSON.
pub fn format_outcomes_json(outcomes: &[LightOutcome]) -> Result<String> {
    #[derive(Serialize)]
    struct OutcomeJson<'a> {
        device: &'a str,
        address: &'a str,
        model: &'a str,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<&'a LightState>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a str>,
    }

    let items: Vec<OutcomeJson<'_>> = outcomes
        .iter()
        .map(|o| OutcomeJson {
            device: &o.target.label,
            address: &o.target.address,
            model: &o.target.model,
            ok: o.result.is_ok(),
            state: o.result.as_ref().ok(),
            error: o.result.as_ref().err().map(String::as_str),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)? + "\n")
}

fn describe_state(state: &LightState) -> String {
    let mut parts = Vec::new();
    match state.is_on {
        Some(true) => parts.push("on".to_string()),
        Some(false) => parts.push("off".to_string()),
        None => {}
    }
    if let Some(brightness) = state.brightness {
        parts.push(format!("brightness {}", brightness));
    }
    if let Some(rgb) = state.rgb {
        parts.push(format!("color {}", rgb));
    }
    if parts.is_empty() {
        "ok".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govee_types::Rgb;

    fn target(label: &str, address: &str) -> Target {
        Target {
            label: label.to_string(),
            address: address.to_string(),
            model: "H6127".to_string(),
        }
    }

    #[test]
    fn test_format_scan_text_empty() {
        assert_eq!(
            format_scan_text(&[], &HashMap::new()),
            "No Govee lights found.\n"
        );
    }

    #[test]
    fn test_format_scan_json_empty() {
        let json = format_scan_json(&[]).unwrap();
        assert!(json.contains("\"count\": 0"));
        assert!(json.contains("\"devices\": []"));
    }

    #[test]
    fn test_format_outcomes_text() {
        let outcomes = vec![
            LightOutcome {
                target: target("desk", "A4:C1:38:00:00:01"),
                result: Ok(LightState {
                    is_on: Some(true),
                    brightness: Some(200),
                    rgb: Some(Rgb::new(255, 0, 0)),
                }),
            },
            LightOutcome {
                target: target("A4:C1:38:00:00:02", "A4:C1:38:00:00:02"),
                result: Err("Device unreachable".to_string()),
            },
        ];

        let text = format_outcomes_text(&outcomes);
        assert!(text.contains("desk (A4:C1:38:00:00:01): on, brightness 200, color #FF0000"));
        assert!(text.contains("A4:C1:38:00:00:02: FAILED - Device unreachable"));
    }

    #[test]
    fn test_format_outcomes_json() {
        let outcomes = vec![LightOutcome {
            target: target("desk", "A4:C1:38:00:00:01"),
            result: Ok(LightState {
                is_on: Some(false),
                ..Default::default()
            }),
        }];

        let json = format_outcomes_json(&outcomes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["ok"], true);
        assert_eq!(value[0]["state"]["is_on"], false);
        assert!(value[0].get("error").is_none());
    }
}
