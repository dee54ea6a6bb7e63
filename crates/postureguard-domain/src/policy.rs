use crate::catalog::Catalogs;
use postureguard_types::ids;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckPolicy {
    pub enabled: bool,
}

impl CheckPolicy {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    /// Report every classified principal instead of admins only.
    pub include_all_principals: bool,
    pub catalogs: Catalogs,
    pub checks: BTreeMap<String, CheckPolicy>,
}

impl EffectiveConfig {
    /// Checks missing from the map are enabled.
    pub fn check_enabled(&self, check_id: &str) -> bool {
        self.checks.get(check_id).is_none_or(|p| p.enabled)
    }

    pub fn all_checks() -> BTreeMap<String, CheckPolicy> {
        [
            ids::CHECK_MAIL_INBOX_RULES,
            ids::CHECK_IDENTITY_ADMIN_MFA,
            ids::CHECK_HOST_EVENT_LOGS,
            ids::CHECK_HOST_AUDIT_POLICY,
            ids::CHECK_DOMAIN_SPF,
            ids::CHECK_DOMAIN_DMARC,
            ids::CHECK_DOMAIN_DKIM,
        ]
        .into_iter()
        .map(|id| (id.to_string(), CheckPolicy::enabled()))
        .collect()
    }
}
