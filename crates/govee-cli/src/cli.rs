//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use govee_types::Rgb;

/// Device targeting arguments shared by the light commands
#[derive(Debug, Clone, Args)]
pub struct DeviceArgs {
    /// Device address(es) or alias(es) - can be specified multiple times, or comma-separated
    #[arg(short, long, value_delimiter = ',', env = "GOVEE_DEVICE")]
    pub device: Vec<String>,

    /// Model id (e.g. H6053, H6127); overrides alias and config
    #[arg(short, long, env = "GOVEE_MODEL")]
    pub model: Option<String>,

    /// Connection timeout in seconds (per device) [default: config or 15]
    #[arg(short = 'T', long)]
    pub timeout: Option<u64>,
}

#[derive(Parser)]
#[command(name = "govee")]
#[command(author, version, about = "CLI for Govee Bluetooth RGB lights", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for nearby Govee lights
    Scan {
        /// Scan timeout in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Include BLE devices that do not look like Govee lights
        #[arg(short, long)]
        all: bool,
    },

    /// Turn lights on, optionally setting brightness and color
    On {
        #[command(flatten)]
        device: DeviceArgs,

        /// Brightness (0-255)
        #[arg(short, long)]
        brightness: Option<u8>,

        /// Color as #RRGGBB, RRGGBB or r,g,b
        #[arg(short, long, value_parser = parse_color)]
        color: Option<Rgb>,
    },

    /// Turn lights off
    Off {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Set brightness without changing power
    Brightness {
        /// Brightness (0-255)
        level: u8,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Set color without changing power
    Color {
        /// Color as #RRGGBB, RRGGBB or r,g,b
        #[arg(value_parser = parse_color)]
        color: Rgb,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Manage device aliases (friendly names)
    Alias {
        #[command(subcommand)]
        action: AliasSubcommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Alias subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum AliasSubcommand {
    /// List all device aliases
    List,

    /// Set a device alias
    Set {
        /// Friendly name for the light (e.g., "desk", "tv-strip")
        name: String,

        /// Device address (MAC address or UUID)
        address: String,

        /// Model id for this light
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Remove a device alias
    #[command(alias = "rm")]
    Remove {
        /// Alias name to remove
        name: String,
    },
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Default device address or alias
    Device,
    /// Default model id
    Model,
    /// Default connection timeout in seconds
    Timeout,
    /// Connection retries before giving up
    Retries,
    /// Connection policy (reuse, per-command)
    Policy,
}

/// Configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}

/// Parse a color argument
fn parse_color(s: &str) -> Result<Rgb, String> {
    s.parse::<Rgb>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_on_with_options() {
        let cli = Cli::try_parse_from([
            "govee",
            "on",
            "--device",
            "desk,AA:BB:CC:DD:EE:FF",
            "--brightness",
            "200",
            "--color",
            "#ff8000",
        ])
        .unwrap();

        match cli.command {
            Commands::On {
                device,
                brightness,
                color,
            } => {
                assert_eq!(device.device, vec!["desk", "AA:BB:CC:DD:EE:FF"]);
                assert_eq!(brightness, Some(200));
                assert_eq!(color, Some(Rgb::new(255, 128, 0)));
                assert_eq!(device.timeout, None);
            }
            _ => panic!("expected on command"),
        }
    }

    #[test]
    fn test_explicit_timeout_is_kept() {
        let cli = Cli::try_parse_from(["govee", "off", "-T", "15"]).unwrap();
        match cli.command {
            Commands::Off { device } => assert_eq!(device.timeout, Some(15)),
            _ => panic!("expected off command"),
        }
    }

    #[test]
    fn test_brightness_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["govee", "brightness", "256"]).is_err());
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(Cli::try_parse_from(["govee", "color", "not-a-color"]).is_err());
    }

    #[test]
    fn test_global_json_after_subcommand() {
        let cli = Cli::try_parse_from(["govee", "scan", "--json", "--all"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Scan { all: true, .. }));
    }

    #[test]
    fn test_alias_set_with_model() {
        let cli = Cli::try_parse_from([
            "govee", "alias", "set", "desk", "AA:BB:CC:DD:EE:FF", "--model", "h6053",
        ])
        .unwrap();
        match cli.command {
            Commands::Alias {
                action: AliasSubcommand::Set { name, model, .. },
            } => {
                assert_eq!(name, "desk");
                assert_eq!(model.as_deref(), Some("h6053"));
            }
            _ => panic!("expected alias set"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
