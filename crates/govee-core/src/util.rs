//! Utility functions for govee-core.

use btleplug::platform::PeripheralId;

use crate::error::{Error, Result};

/// Normalize a device address for lookups.
///
/// MAC addresses are upper-cased with `:` separators (`a4-c1-38-...` becomes
/// `A4:C1:38:...`). Anything else, such as a macOS peripheral UUID, is only
/// trimmed and upper-cased.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for an empty address.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_config("device address is empty"));
    }

    if is_mac_address(trimmed) {
        Ok(trimmed.replace('-', ":").to_uppercase())
    } else {
        Ok(trimmed.to_uppercase())
    }
}

/// Check for a six-octet MAC address separated by `:` or `-`.
pub fn is_mac_address(s: &str) -> bool {
    let octets: Vec<&str> = s.split([':', '-']).collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Stable identifier for a light: its address without separators.
pub fn unique_id(address: &str) -> String {
    address.replace([':', '-'], "")
}

/// Compare two addresses ignoring case and separators.
pub fn addresses_match(a: &str, b: &str) -> bool {
    unique_id(a).eq_ignore_ascii_case(&unique_id(b))
}

/// Format a peripheral ID as a string.
///
/// On macOS, peripheral IDs are UUIDs. On other platforms they wrap the MAC
/// address.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Create an identifier string from an address and peripheral ID.
///
/// On macOS where addresses are 00:00:00:00:00:00, uses the peripheral ID.
pub fn create_identifier(address: &str, peripheral_id: &PeripheralId) -> String {
    if address == "00:00:00:00:00:00" {
        format_peripheral_id(peripheral_id)
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mac() {
        assert_eq!(
            normalize_address(" a4:c1:38:0a:0b:0c ").unwrap(),
            "A4:C1:38:0A:0B:0C"
        );
        assert_eq!(
            normalize_address("a4-c1-38-0a-0b-0c").unwrap(),
            "A4:C1:38:0A:0B:0C"
        );
    }

    #[test]
    fn test_normalize_uuid_passthrough() {
        assert_eq!(
            normalize_address("6f1c0d2e-aaaa-bbbb-cccc-0123456789ab").unwrap(),
            "6F1C0D2E-AAAA-BBBB-CCCC-0123456789AB"
        );
    }

    #[test]
    fn test_normalize_empty_rejected() {
        assert!(matches!(
            normalize_address("   "),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_is_mac_address() {
        assert!(is_mac_address("AA:BB:CC:DD:EE:FF"));
        assert!(is_mac_address("aa-bb-cc-dd-ee-ff"));
        assert!(!is_mac_address("AA:BB:CC"));
        assert!(!is_mac_address("living-room"));
        assert!(!is_mac_address("GG:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_unique_id_strips_separators() {
        assert_eq!(unique_id("A4:C1:38:0A:0B:0C"), "A4C1380A0B0C");
    }

    #[test]
    fn test_addresses_match() {
        assert!(addresses_match("a4:c1:38:0a:0b:0c", "A4C1380A0B0C"));
        assert!(!addresses_match("a4:c1:38:0a:0b:0c", "A4:C1:38:0A:0B:0D"));
    }
}
