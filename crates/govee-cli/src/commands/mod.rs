//! Command implementations for the CLI.

mod alias;
mod config;
mod light;
mod scan;

pub use alias::{AliasAction, cmd_alias};
pub use config::cmd_config;
pub use light::{LightAction, LightArgs, cmd_light};
pub use scan::cmd_scan;
