use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use govee_cli::cli::{AliasSubcommand, Cli, Commands, DeviceArgs};
use govee_cli::commands::{
    AliasAction, LightAction, LightArgs, cmd_alias, cmd_config, cmd_light, cmd_scan,
};
use govee_cli::config::{Config, resolve_targets, resolve_timeout};
use govee_core::{RetryConfig, SessionOptions, TurnOn};
use tracing_subscriber::EnvFilter;

/// Connection timeout in seconds when neither flag nor config sets one.
const DEFAULT_TIMEOUT: u64 = 15;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "govee", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let (json, quiet) = (cli.json, cli.quiet);

    match cli.command {
        Commands::Scan { timeout, all } => cmd_scan(timeout, all, json, quiet, &config).await,
        Commands::On {
            device,
            brightness,
            color,
        } => {
            let request = TurnOn {
                brightness,
                color,
            };
            let args = light_args(&device, &config);
            cmd_light(LightAction::On(request), args, json, quiet).await
        }
        Commands::Off { device } => {
            cmd_light(LightAction::Off, light_args(&device, &config), json, quiet).await
        }
        Commands::Brightness { level, device } => {
            let args = light_args(&device, &config);
            cmd_light(LightAction::Brightness(level), args, json, quiet).await
        }
        Commands::Color { color, device } => {
            let args = light_args(&device, &config);
            cmd_light(LightAction::Color(color), args, json, quiet).await
        }
        Commands::Alias { action } => {
            let action = match action {
                AliasSubcommand::List => AliasAction::List,
                AliasSubcommand::Set {
                    name,
                    address,
                    model,
                } => AliasAction::Set {
                    name,
                    address,
                    model,
                },
                AliasSubcommand::Remove { name } => AliasAction::Remove { name },
            };
            cmd_alias(action, quiet)
        }
        Commands::Config { action } => cmd_config(action, quiet),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Resolve targets and session options from flags and config.
fn light_args(device: &DeviceArgs, config: &Config) -> LightArgs {
    let targets = resolve_targets(&device.device, device.model.as_deref(), config);
    let timeout = resolve_timeout(device.timeout, config, DEFAULT_TIMEOUT);

    let mut retry = RetryConfig::for_connect();
    if let Some(retries) = config.retries {
        retry = retry.max_retries(retries);
    }

    LightArgs {
        targets,
        timeout: Duration::from_secs(timeout),
        options: SessionOptions::new()
            .retry(retry)
            .policy(config.policy.unwrap_or_default()),
    }
}
