use super::risk::RiskAccumulator;
use super::utils::finding;
use crate::model::{PrincipalFacts, RawFact};
use crate::normalize::{Normalized, normalize_principal};
use postureguard_types::{
    Category, Finding, FindingDetail, IdentityDetail, MfaStatus, Severity, ids,
};
use std::collections::BTreeMap;

/// Principal -> privileged roles held, built once from the role catalog and then
/// shared read-only by every principal evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleIndex {
    by_principal: BTreeMap<String, Vec<String>>,
}

impl RoleIndex {
    /// Only roles named in `catalog` count. Role names and principal ids compare
    /// case-insensitively; a principal's roles keep catalog order.
    pub fn build(catalog: &[String], memberships: &BTreeMap<String, Vec<String>>) -> Self {
        let mut by_principal: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for role in catalog {
            let members = memberships
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(role))
                .flat_map(|(_, members)| members);
            for member in members {
                let key = member.trim().to_ascii_lowercase();
                if key.is_empty() {
                    continue;
                }
                let roles = by_principal.entry(key).or_default();
                if !roles.contains(role) {
                    roles.push(role.clone());
                }
            }
        }
        Self { by_principal }
    }

    pub fn roles_of(&self, principal_id: &str) -> &[String] {
        self.by_principal
            .get(&principal_id.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn admin_count(&self) -> usize {
        self.by_principal.len()
    }
}

/// Only the first requirement record reaches this point; see the normalizer.
pub fn resolve_mfa_status(principal: &PrincipalFacts) -> MfaStatus {
    let state = principal
        .mfa_requirement_state
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if state.eq_ignore_ascii_case("Enforced") {
        MfaStatus::Enforced
    } else if state.eq_ignore_ascii_case("Enabled") {
        MfaStatus::Enabled
    } else if principal.mfa_methods_registered > 0 {
        MfaStatus::MethodsPresent
    } else {
        MfaStatus::Disabled
    }
}

pub fn classify_principal(principal: &PrincipalFacts, roles: &RoleIndex) -> Finding {
    let held = roles.roles_of(&principal.principal_id).to_vec();
    let is_admin = !held.is_empty();
    let mfa_status = resolve_mfa_status(principal);

    let (severity, code, reason) = match (is_admin, mfa_status.is_disabled()) {
        (true, true) => (Severity::High, ids::CODE_ADMIN_WITHOUT_MFA, "Admin without MFA"),
        (true, false) => (Severity::Medium, ids::CODE_ADMIN_WITH_MFA, "Admin with MFA"),
        (false, true) => (
            Severity::Info,
            ids::CODE_NON_ADMIN_WITHOUT_MFA,
            "Non-admin without MFA",
        ),
        (false, false) => (Severity::Info, ids::CODE_NON_ADMIN_WITH_MFA, "Non-admin with MFA"),
    };

    let mut risk = RiskAccumulator::new(Severity::Info);
    risk.raise(severity, reason);
    if principal.blocked {
        risk.note("Account blocked");
    }

    let item = principal
        .display_name
        .clone()
        .unwrap_or_else(|| principal.principal_id.clone());

    let detail = IdentityDetail {
        principal_id: principal.principal_id.clone(),
        display_name: principal.display_name.clone(),
        is_admin,
        roles: held,
        mfa_status,
        is_licensed: principal.is_licensed,
        blocked: principal.blocked,
        last_sync: principal.last_sync,
        sign_in_allowed: !principal.blocked,
    };

    finding(
        Category::Identity,
        ids::CHECK_IDENTITY_ADMIN_MFA,
        code,
        principal.principal_id.clone(),
        item,
        risk.finish(),
        FindingDetail::Identity(detail),
    )
}

/// Reporting filter, applied after every principal has been classified.
pub fn is_reported(finding: &Finding, include_all: bool) -> bool {
    include_all || matches!(&finding.detail, FindingDetail::Identity(d) if d.is_admin)
}

/// Normalize one raw principal record, then classify it against the role index.
pub fn evaluate_principal(fact: &RawFact, roles: &RoleIndex) -> Normalized<Finding> {
    let normalized = normalize_principal(fact);
    Normalized {
        value: classify_principal(&normalized.value, roles),
        warnings: normalized.warnings,
    }
}
