//! Command handler modules for rsy-cli.
//!
//! Shared utilities used by multiple command paths live here.

pub mod ads;
pub mod log;
pub mod trace;

use anyhow::Result;
use rsy_config::{AppConfig, LoadedConfig, UnusedKeyPolicy};
use tracing::info;

/// Load layered config (empty list → defaults) and warn on unused keys.
pub fn load_config(paths: &[String]) -> Result<(LoadedConfig, AppConfig)> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = rsy_config::load_layered_yaml(&path_refs)?;
    rsy_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    let cfg = loaded.app_config()?;
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");
    Ok((loaded, cfg))
}
