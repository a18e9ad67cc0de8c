//! Utility functions for CLI operations.

use std::io::{self, Write};

use anyhow::{Result, bail};

use crate::config::Target;

/// Fail with a helpful message when no light was specified anywhere.
pub fn require_targets(targets: &[Target]) -> Result<()> {
    if targets.is_empty() {
        bail!(
            "No device specified. Use --device <ADDRESS|ALIAS>, set GOVEE_DEVICE, \
             or run 'govee config set device <ADDRESS>'.\n\
             Run 'govee scan' to find nearby lights."
        );
    }
    Ok(())
}

/// Write output to stdout
pub fn write_output(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Check if a string looks like a device address (MAC or UUID).
pub fn looks_like_address(s: &str) -> bool {
    let mac_pattern = govee_core::util::is_mac_address(s);

    // UUID pattern: contains mostly hex and dashes, 32+ chars
    let uuid_pattern = s.len() >= 32 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-');

    mac_pattern || uuid_pattern
}
