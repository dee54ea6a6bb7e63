use crate::model::{LogConfig, PostureguardConfigV1};
use crate::presets::{DEFAULT_WORKERS, builtin_catalogs};
use anyhow::Context;
use postureguard_domain::catalog::LogSpec;
use postureguard_domain::policy::EffectiveConfig;
use std::time::Duration;

/// Command-line values; each one wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub include_all_principals: Option<bool>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    pub workers: usize,
    pub timeout: Option<Duration>,
}

pub fn resolve_config(
    cfg: PostureguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let mut effective = EffectiveConfig {
        include_all_principals: overrides
            .include_all_principals
            .or(cfg.include_all_principals)
            .unwrap_or(false),
        catalogs: builtin_catalogs(),
        checks: EffectiveConfig::all_checks(),
    };

    // per-check overrides
    for (check_id, cc) in cfg.checks.iter() {
        let Some(entry) = effective.checks.get_mut(check_id) else {
            anyhow::bail!(
                "unknown check id: {check_id} (expected one of {})",
                known_checks().join(", ")
            );
        };
        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
    }

    // catalogs: whole-list replacement
    if let Some(roles) = cfg.catalog.privileged_roles {
        validate_names("catalog.privileged_roles", &roles)?;
        effective.catalogs.privileged_roles = roles;
    }
    if let Some(logs) = cfg.catalog.logs {
        effective.catalogs.logs = logs
            .iter()
            .map(log_spec)
            .collect::<anyhow::Result<Vec<_>>>()
            .context("invalid catalog.logs")?;
    }
    if let Some(subcategories) = cfg.catalog.audit_subcategories {
        validate_names("catalog.audit_subcategories", &subcategories)?;
        effective.catalogs.audit_subcategories = subcategories;
    }
    if let Some(selectors) = cfg.catalog.dkim_selectors {
        validate_names("catalog.dkim_selectors", &selectors)?;
        effective.catalogs.dkim_selectors = selectors
            .iter()
            .map(|s| s.trim().to_ascii_lowercase())
            .collect();
    }

    let workers = overrides
        .workers
        .or(cfg.workers)
        .unwrap_or(DEFAULT_WORKERS);
    if workers == 0 {
        anyhow::bail!("workers must be at least 1");
    }

    let timeout = match overrides.timeout_secs.or(cfg.timeout_secs) {
        Some(0) => anyhow::bail!("timeout_secs must be at least 1"),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    Ok(ResolvedConfig {
        effective,
        workers,
        timeout,
    })
}

fn known_checks() -> Vec<String> {
    EffectiveConfig::all_checks().into_keys().collect()
}

fn validate_names(field: &str, names: &[String]) -> anyhow::Result<()> {
    for (i, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            anyhow::bail!("{field}[{i}] must not be empty");
        }
    }
    Ok(())
}

fn log_spec(cfg: &LogConfig) -> anyhow::Result<LogSpec> {
    if cfg.name.trim().is_empty() {
        anyhow::bail!("log name must not be empty");
    }
    if cfg.min_size_mb == 0 {
        anyhow::bail!("min_size_mb for log {} must be at least 1", cfg.name);
    }
    LogSpec::new(cfg.name.trim(), cfg.min_size_mb).with_context(|| {
        format!(
            "min_size_mb for log {} is too large ({} MB)",
            cfg.name, cfg.min_size_mb
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;
    use postureguard_types::ids;

    #[test]
    fn defaults_use_builtin_catalogs() {
        let resolved = resolve_config(PostureguardConfigV1::default(), Overrides::default())
            .expect("resolve");
        let catalogs = &resolved.effective.catalogs;
        assert!(
            catalogs
                .privileged_roles
                .contains(&"Reports Reader".to_string())
        );
        let security = catalogs
            .logs
            .iter()
            .find(|l| l.name == "Security")
            .expect("security log");
        assert_eq!(security.min_size_mb(), 512);
        assert_eq!(resolved.workers, DEFAULT_WORKERS);
        assert_eq!(resolved.timeout, None);
        assert!(!resolved.effective.include_all_principals);
        assert!(resolved.effective.check_enabled(ids::CHECK_HOST_AUDIT_POLICY));
        assert!(resolved.effective.check_enabled(ids::CHECK_DOMAIN_DMARC));
        assert!(catalogs.dkim_selectors.is_empty());
    }

    #[test]
    fn dkim_selectors_are_trimmed_and_lowercased() {
        let cfg = parse_config_toml("[catalog]\ndkim_selectors = [\" Selector1 \", \"google\"]\n")
            .expect("parse");
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(
            resolved.effective.catalogs.dkim_selectors,
            vec!["selector1", "google"]
        );

        let blank = parse_config_toml("[catalog]\ndkim_selectors = [\"\"]\n").expect("parse");
        let err = resolve_config(blank, Overrides::default()).expect_err("blank selector");
        assert!(err.to_string().contains("catalog.dkim_selectors[0]"));
    }

    #[test]
    fn catalog_override_replaces_whole_list() {
        let cfg = parse_config_toml(
            r#"
            include_all_principals = true

            [catalog]
            privileged_roles = ["Global Reader"]
            logs = [{ name = "Security", min_size_mb = 1024 }]

            [checks."host.audit_policy"]
            enabled = false
            "#,
        )
        .expect("parse");
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
        let e = &resolved.effective;
        assert!(e.include_all_principals);
        assert_eq!(e.catalogs.privileged_roles, vec!["Global Reader"]);
        assert_eq!(e.catalogs.logs, vec![LogSpec::new("Security", 1024).expect("spec")]);
        assert!(!e.check_enabled(ids::CHECK_HOST_AUDIT_POLICY));
        assert!(!e.catalogs.audit_subcategories.is_empty());
    }

    #[test]
    fn overrides_win_over_config() {
        let cfg = PostureguardConfigV1 {
            include_all_principals: Some(false),
            workers: Some(2),
            timeout_secs: Some(30),
            ..PostureguardConfigV1::default()
        };
        let resolved = resolve_config(
            cfg,
            Overrides {
                include_all_principals: Some(true),
                workers: Some(4),
                timeout_secs: Some(5),
            },
        )
        .expect("resolve");
        assert!(resolved.effective.include_all_principals);
        assert_eq!(resolved.workers, 4);
        assert_eq!(resolved.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_workers = PostureguardConfigV1 {
            workers: Some(0),
            ..PostureguardConfigV1::default()
        };
        assert!(resolve_config(zero_workers, Overrides::default()).is_err());

        let unknown = parse_config_toml("[checks.\"deps.no_wildcards\"]\nenabled = true\n")
            .expect("parse");
        let err = resolve_config(unknown, Overrides::default()).expect_err("unknown check");
        assert!(err.to_string().contains("unknown check id"));

        let empty_role = parse_config_toml("[catalog]\nprivileged_roles = [\" \"]\n")
            .expect("parse");
        assert!(resolve_config(empty_role, Overrides::default()).is_err());

        let zero_size =
            parse_config_toml("[catalog]\nlogs = [{ name = \"System\", min_size_mb = 0 }]\n")
                .expect("parse");
        let err = resolve_config(zero_size, Overrides::default()).expect_err("zero size");
        assert!(format!("{err:#}").contains("min_size_mb"));
    }

    #[test]
    fn oversized_log_minimum_is_an_error() {
        let cfg = parse_config_toml(
            "[catalog]\nlogs = [{ name = \"Security\", min_size_mb = 9000000000000000000 }]\n",
        )
        .expect("parse");
        let err = resolve_config(cfg, Overrides::default()).expect_err("overflow");
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid catalog.logs"));
        assert!(msg.contains("too large"));
    }

    #[test]
    fn malformed_toml_reports_context() {
        let err = parse_config_toml("workers = \"many\"").expect_err("type error");
        assert!(err.to_string().contains("postureguard.toml"));
    }
}
