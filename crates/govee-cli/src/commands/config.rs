//! Config command implementation.

use anyhow::{Context, Result};
use govee_core::ConnectionPolicy;
use govee_types::DeviceModel;

use crate::cli::{ConfigAction, ConfigKey};
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, quiet: bool) -> Result<()> {
    let path = Config::path();

    match action {
        ConfigAction::Show => {
            let config = Config::load();
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            if content.trim().is_empty() {
                if !quiet {
                    println!("(empty configuration)");
                }
            } else {
                print!("{}", content);
            }
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            if path.exists() {
                if !quiet {
                    println!("Config already exists at {}", path.display());
                }
            } else {
                Config::default().save()?;
                if !quiet {
                    println!("Created config at {}", path.display());
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            set_key(&mut config, key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {:?} = {}", key, value);
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            unset_key(&mut config, key);
            config.save()?;
            if !quiet {
                println!("Unset {:?}", key);
            }
        }
    }

    Ok(())
}

/// Validate and store a configuration value.
pub fn set_key(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::Device => config.device = Some(value.trim().to_string()),
        ConfigKey::Model => config.model = Some(DeviceModel::new(value).to_string()),
        ConfigKey::Timeout => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("Invalid timeout '{}', expected seconds", value))?;
            config.timeout = Some(secs);
        }
        ConfigKey::Retries => {
            let retries: u32 = value
                .parse()
                .with_context(|| format!("Invalid retry count '{}'", value))?;
            config.retries = Some(retries);
        }
        ConfigKey::Policy => {
            let policy: ConnectionPolicy = value.parse()?;
            config.policy = Some(policy);
        }
    }
    Ok(())
}

/// Remove a configuration value.
pub fn unset_key(config: &mut Config, key: ConfigKey) {
    match key {
        ConfigKey::Device => config.device = None,
        ConfigKey::Model => config.model = None,
        ConfigKey::Timeout => config.timeout = None,
        ConfigKey::Retries => config.retries = None,
        ConfigKey::Policy => config.policy = None,
    }
}
