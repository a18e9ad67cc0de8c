//! Scan command implementation.

use anyhow::{Context, Result};
use govee_core::{ScanOptions, scan};

use crate::config::Config;
use crate::format::{format_scan_json, format_scan_text};
use crate::util::write_output;

pub async fn cmd_scan(
    timeout: u64,
    all: bool,
    json: bool,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    if !quiet && !json {
        eprintln!("Scanning for {}s...", timeout);
    }

    let options = ScanOptions::default()
        .duration_secs(timeout)
        .filter_govee_only(!all);

    let devices = scan::scan_with_options(options)
        .await
        .context("Failed to scan for devices")?;

    let content = if json {
        format_scan_json(&devices)?
    } else {
        format_scan_text(&devices, &config.aliases)
    };

    write_output(&content)
}
