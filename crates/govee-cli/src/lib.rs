//! Command-line interface for Govee Bluetooth RGB lights.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Scan for nearby Govee lights |
//! | `on` | Turn lights on, optionally with brightness and color |
//! | `off` | Turn lights off |
//! | `brightness` | Set brightness (0-255) |
//! | `color` | Set color |
//! | `alias` | Manage friendly names for lights |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/govee/config.toml` (or platform
//! equivalent):
//!
//! - `device`: Default device address or alias
//! - `model`: Default model id
//! - `timeout`: Connection timeout in seconds
//! - `retries`: Connection retries
//! - `policy`: `reuse` or `per-command`
//! - `[aliases.<name>]`: `address` and optional `model`
//!
//! # Environment Variables
//!
//! - `GOVEE_DEVICE`: Device address(es) or alias(es), comma-separated
//! - `GOVEE_MODEL`: Model id
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! govee scan
//! govee alias set desk A4:C1:38:0A:0B:0C --model H6053
//! govee on --device desk --brightness 200 --color "#FF8000"
//! govee off --device desk,A4:C1:38:0A:0B:0D
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod util;

// Re-export core dependencies for convenience
pub use govee_core;
pub use govee_types;
