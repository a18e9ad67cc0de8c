//! Configuration file management.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use govee_core::{ConnectionPolicy, DeviceModel};
use serde::{Deserialize, Serialize};

/// Model used when neither flag, alias nor config names one. Unknown ids use
/// passthrough payloads.
pub const FALLBACK_MODEL: &str = "GENERIC";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default device address or alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Default model id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Connection timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Connection retries before giving up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    /// Keep or drop the link between commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ConnectionPolicy>,

    /// Device aliases (friendly name -> light)
    #[serde(default)]
    pub aliases: HashMap<String, AliasEntry>,
}

/// A named light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A fully resolved light to drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// What the user typed (alias or address).
    pub label: String,
    pub address: String,
    pub model: String,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("govee")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from a specific file, or return default if it is missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the lights to drive.
///
/// Devices come from the `--device` flag (or `GOVEE_DEVICE`), falling back to
/// the configured default. Each entry may be an alias. The model is taken
/// from `--model` (or `GOVEE_MODEL`), then the alias, then the config, then
/// [`FALLBACK_MODEL`].
pub fn resolve_targets(devices: &[String], model: Option<&str>, config: &Config) -> Vec<Target> {
    let requested: Vec<String> = if devices.is_empty() {
        config.device.iter().cloned().collect()
    } else {
        devices.to_vec()
    };

    requested
        .into_iter()
        .map(|label| {
            let alias = config.aliases.get(&label);
            let address = alias
                .map(|a| a.address.clone())
                .unwrap_or_else(|| label.clone());
            let model = model
                .map(str::to_string)
                .or_else(|| alias.and_then(|a| a.model.clone()))
                .or_else(|| config.model.clone())
                .map(|m| DeviceModel::new(m).to_string())
                .unwrap_or_else(|| FALLBACK_MODEL.to_string());
            Target {
                label,
                address,
                model,
            }
        })
        .collect()
}

/// Resolve timeout: use provided value, fall back to config, then default
pub fn resolve_timeout(cmd_timeout: Option<u64>, config: &Config, default: u64) -> u64 {
    cmd_timeout.or(config.timeout).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_alias() -> Config {
        let mut aliases = HashMap::new();
        aliases.insert(
            "desk".to_string(),
            AliasEntry {
                address: "A4:C1:38:00:00:01".to_string(),
                model: Some("H6053".to_string()),
            },
        );
        aliases.insert(
            "shelf".to_string(),
            AliasEntry {
                address: "A4:C1:38:00:00:02".to_string(),
                model: None,
            },
        );
        Config {
            model: Some("H6127".to_string()),
            aliases,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_targets_alias_model() {
        let config = config_with_alias();
        let targets = resolve_targets(&["desk".to_string()], None, &config);
        assert_eq!(
            targets,
            vec![Target {
                label: "desk".to_string(),
                address: "A4:C1:38:00:00:01".to_string(),
                model: "H6053".to_string(),
            }]
        );
    }

    #[test]
    fn test_resolve_targets_flag_model_wins() {
        let config = config_with_alias();
        let targets = resolve_targets(&["desk".to_string()], Some("H6160"), &config);
        assert_eq!(targets[0].model, "H6160");
    }

    #[test]
    fn test_resolve_targets_config_model_fallback() {
        let config = config_with_alias();
        let targets = resolve_targets(
            &["shelf".to_string(), "A4:C1:38:00:00:09".to_string()],
            None,
            &config,
        );
        assert_eq!(targets[0].address, "A4:C1:38:00:00:02");
        assert_eq!(targets[0].model, "H6127");
        assert_eq!(targets[1].address, "A4:C1:38:00:00:09");
        assert_eq!(targets[1].model, "H6127");
    }

    #[test]
    fn test_resolve_targets_default_device() {
        let config = Config {
            device: Some("A4:C1:38:00:00:03".to_string()),
            ..Default::default()
        };
        let targets = resolve_targets(&[], None, &config);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].address, "A4:C1:38:00:00:03");
        assert_eq!(targets[0].model, FALLBACK_MODEL);
    }

    #[test]
    fn test_resolve_targets_none() {
        assert!(resolve_targets(&[], None, &Config::default()).is_empty());
    }

    #[test]
    fn test_resolve_timeout() {
        let config = Config {
            timeout: Some(60),
            ..Default::default()
        };
        assert_eq!(resolve_timeout(Some(45), &config, 15), 45);
        assert_eq!(resolve_timeout(None, &config, 15), 60);
        assert_eq!(resolve_timeout(None, &Config::default(), 15), 15);
    }

    #[test]
    fn test_resolve_timeout_explicit_default_overrides_config() {
        let config = Config {
            timeout: Some(60),
            ..Default::default()
        };
        assert_eq!(resolve_timeout(Some(15), &config, 15), 15);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            policy: Some(ConnectionPolicy::PerCommand),
            retries: Some(5),
            ..config_with_alias()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("policy = \"per-command\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
