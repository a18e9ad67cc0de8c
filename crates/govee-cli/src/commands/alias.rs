//! Alias command implementation.
//!
//! Manages friendly names that map to a light's address and, optionally, its
//! model.

use anyhow::{Result, bail};
use govee_types::DeviceModel;
use tabled::{builder::Builder, settings::Style};

use crate::config::{AliasEntry, Config};
use crate::util::looks_like_address;

/// Alias subcommand actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    /// List all aliases
    List,
    /// Set an alias
    Set {
        name: String,
        address: String,
        model: Option<String>,
    },
    /// Remove an alias
    Remove { name: String },
}

pub fn cmd_alias(action: AliasAction, quiet: bool) -> Result<()> {
    let mut config = Config::load();
    if let Some(message) = apply_alias(&mut config, action)? {
        config.save()?;
        if !quiet {
            println!("{}", message);
        }
    } else if !quiet {
        println!("{}", format_alias_table(&config));
    }
    Ok(())
}

/// Apply an alias action to a config.
///
/// Returns a confirmation message when the config changed and needs saving,
/// or `None` for read-only actions.
pub fn apply_alias(config: &mut Config, action: AliasAction) -> Result<Option<String>> {
    match action {
        AliasAction::List => Ok(None),
        AliasAction::Set {
            name,
            address,
            model,
        } => {
            if looks_like_address(&name) {
                bail!(
                    "Alias name '{}' looks like a device address. \
                     Use a friendly name instead (e.g., 'desk', 'tv-strip').",
                    name
                );
            }

            let address = govee_core::normalize_address(&address)?;
            let model = model.map(|m| DeviceModel::new(m).to_string());
            let was_update = config.aliases.contains_key(&name);
            config.aliases.insert(
                name.clone(),
                AliasEntry {
                    address: address.clone(),
                    model,
                },
            );

            let verb = if was_update { "Updated" } else { "Added" };
            Ok(Some(format!("{} alias '{}' -> {}", verb, name, address)))
        }
        AliasAction::Remove { name } => {
            if config.aliases.remove(&name).is_none() {
                bail!("Alias '{}' not found", name);
            }
            Ok(Some(format!("Removed alias '{}'", name)))
        }
    }
}

fn format_alias_table(config: &Config) -> String {
    if config.aliases.is_empty() {
        return "No aliases configured.\n\n\
                Add an alias with: govee alias set <name> <address> [--model <model>]"
            .to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["Alias", "Device Address", "Model"]);

    let mut aliases: Vec<_> = config.aliases.iter().collect();
    aliases.sort_by_key(|(name, _)| name.as_str());
    for (name, entry) in aliases {
        builder.push_record([
            name.as_str(),
            entry.address.as_str(),
            entry.model.as_deref().unwrap_or("-"),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
