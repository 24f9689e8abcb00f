//! Configuration file parsing for boxdesk
//!
//! Supports `.boxdesk/config.toml` - connection, sync timing, terminal and
//! storage settings.

pub mod settings;
pub mod types;

pub use settings::{config_path, load_settings, save_settings};
pub use types::*;
