use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `postureguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostureguardConfigV1 {
    /// Optional schema string for tooling (`postureguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Report every classified principal instead of admins only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all_principals: Option<bool>,

    /// Size of the per-target worker pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Stop issuing new per-target work after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Map of check_id -> config.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,

    /// Catalog overrides. Each list, when present, replaces the built-in list.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged_roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_subcategories: Option<Vec<String>>,

    /// DKIM selectors looked up on every mail domain, e.g. `selector1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dkim_selectors: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogConfig {
    /// Event log name, e.g. `Security`.
    pub name: String,
    /// Recommended minimum maximum-size, in MiB.
    pub min_size_mb: u64,
}
