//! Config parsing and catalog/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{CatalogConfig, CheckConfig, LogConfig, PostureguardConfigV1};
pub use presets::{DEFAULT_WORKERS, builtin_catalogs};
pub use resolve::{Overrides, ResolvedConfig};

use anyhow::Context;

/// Parse `postureguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<PostureguardConfigV1> {
    let cfg: PostureguardConfigV1 = toml::from_str(input).context("parse postureguard.toml")?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (built-in catalogs + config + overrides).
pub fn resolve_config(
    cfg: PostureguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
