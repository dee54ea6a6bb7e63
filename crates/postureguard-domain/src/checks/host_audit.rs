use super::audit_state::parse_audit_state;
use super::risk::RiskAccumulator;
use super::utils::finding;
use crate::catalog::{Catalogs, LogSpec, MIB};
use crate::model::{AuditPolicyFacts, HostFacts, LogFacts, LogMode};
use crate::policy::EffectiveConfig;
use postureguard_types::{
    AuditItemKind, Category, Finding, FindingDetail, HostAuditDetail, Severity, ids,
};

/// Target key of the capability finding raised when the audit tool cannot run.
pub const AUDIT_CAPABILITY_TARGET: &str = "capability:audit_policy";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostAuditOutcome {
    pub findings: Vec<Finding>,
    /// Checks that could not be evaluated on this host.
    pub degraded: Vec<String>,
}

pub fn classify_host(host: &HostFacts, cfg: &EffectiveConfig) -> HostAuditOutcome {
    let mut outcome = HostAuditOutcome::default();

    if cfg.check_enabled(ids::CHECK_HOST_EVENT_LOGS) {
        for spec in &cfg.catalogs.logs {
            let facts = host
                .logs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&spec.name))
                .map(|(_, facts)| facts);
            outcome.findings.extend(classify_log(&host.host, spec, facts));
        }
    }

    if cfg.check_enabled(ids::CHECK_HOST_AUDIT_POLICY) {
        classify_audit_policy(&host.host, &host.audit_policy, &cfg.catalogs, &mut outcome);
    }

    outcome
}

/// Enabled, Size and Mode findings for one log, or a single terminal finding when
/// the log is disabled.
pub fn classify_log(host: &str, spec: &LogSpec, facts: Option<&LogFacts>) -> Vec<Finding> {
    let target = format!("log:{}", spec.name);
    let emit = |code: &str, item: &str, severity: Severity, reason: String, raw: Option<String>| {
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(severity, reason);
        finding(
            Category::HostAudit,
            ids::CHECK_HOST_EVENT_LOGS,
            code,
            target.clone(),
            item,
            risk.finish(),
            event_log_detail(host, raw),
        )
    };

    let Some(facts) = facts else {
        return vec![emit(
            ids::CODE_LOG_METADATA_MISSING,
            "Enabled",
            Severity::Medium,
            format!("No metadata returned for log {}", spec.name),
            None,
        )];
    };

    let mut out = Vec::with_capacity(3);
    match facts.enabled {
        Some(false) => {
            return vec![emit(
                ids::CODE_LOG_DISABLED,
                "Enabled",
                Severity::High,
                "Log is disabled".to_string(),
                Some("false".to_string()),
            )];
        }
        Some(true) => out.push(emit(
            ids::CODE_LOG_ENABLED,
            "Enabled",
            Severity::Info,
            "Log is enabled".to_string(),
            Some("true".to_string()),
        )),
        None => out.push(emit(
            ids::CODE_LOG_METADATA_MISSING,
            "Enabled",
            Severity::Medium,
            "Enabled state unknown".to_string(),
            None,
        )),
    }

    let recommended = format!("Recommended ≥ {} MB", spec.min_size_mb());
    out.push(match facts.max_size_bytes {
        None => emit(
            ids::CODE_LOG_SIZE_UNKNOWN,
            "Size",
            Severity::Medium,
            format!("Maximum size unknown. {recommended}"),
            None,
        ),
        Some(bytes) if bytes < spec.min_size_bytes => emit(
            ids::CODE_LOG_SIZE_BELOW_MINIMUM,
            "Size",
            Severity::Medium,
            format!("Maximum size {} MB. {recommended}", format_mb(bytes)),
            Some(bytes.to_string()),
        ),
        Some(bytes) => emit(
            ids::CODE_LOG_SIZE_OK,
            "Size",
            Severity::Info,
            format!("Maximum size {} MB. {recommended}", format_mb(bytes)),
            Some(bytes.to_string()),
        ),
    });

    let (code, severity, reason, raw) = match &facts.mode {
        LogMode::Circular => (
            ids::CODE_LOG_MODE_CIRCULAR,
            Severity::Medium,
            "Circular: events will be overwritten when full".to_string(),
            Some("Circular".to_string()),
        ),
        LogMode::AutoBackup => (
            ids::CODE_LOG_MODE_AUTO_BACKUP,
            Severity::Info,
            "AutoBackup: log is archived when full".to_string(),
            Some("AutoBackup".to_string()),
        ),
        LogMode::Retain => (
            ids::CODE_LOG_MODE_RETAIN,
            Severity::Info,
            "Retain: events are kept; unmonitored growth stops recording when full".to_string(),
            Some("Retain".to_string()),
        ),
        LogMode::Other(raw) => (
            ids::CODE_LOG_MODE_UNKNOWN,
            Severity::Medium,
            format!("Unrecognized log mode {raw}"),
            Some(raw.clone()),
        ),
        LogMode::Missing => (
            ids::CODE_LOG_MODE_UNKNOWN,
            Severity::Medium,
            "Log mode unknown".to_string(),
            None,
        ),
    };
    out.push(emit(code, "Mode", severity, reason, raw));

    out
}

fn classify_audit_policy(
    host: &str,
    facts: &AuditPolicyFacts,
    catalogs: &Catalogs,
    outcome: &mut HostAuditOutcome,
) {
    let states = match facts {
        AuditPolicyFacts::Available(states) => states,
        AuditPolicyFacts::Unavailable { reason } => {
            let mut risk = RiskAccumulator::new(Severity::Info);
            risk.raise(
                Severity::High,
                format!("Audit policy tool unavailable: {reason}"),
            );
            risk.note("Subcategory checks skipped");
            outcome.findings.push(finding(
                Category::HostAudit,
                ids::CHECK_HOST_AUDIT_POLICY,
                ids::CODE_AUDIT_TOOL_UNAVAILABLE,
                AUDIT_CAPABILITY_TARGET,
                "Tool",
                risk.finish(),
                audit_policy_detail(host, None),
            ));
            outcome.degraded.extend(catalogs.audit_subcategories.iter().map(|name| {
                format!("{host}: subcategory:{name} not evaluated (audit policy tool unavailable)")
            }));
            return;
        }
    };

    for name in &catalogs.audit_subcategories {
        let raw = states
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, raw)| raw.as_str());

        let setting = raw.map(parse_audit_state).unwrap_or(super::AuditSetting::Unknown);
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(setting.severity(), setting.reason());
        if raw.is_none() {
            risk.note("Subcategory missing from tool output");
        }

        outcome.findings.push(finding(
            Category::HostAudit,
            ids::CHECK_HOST_AUDIT_POLICY,
            setting.code(),
            format!("subcategory:{name}"),
            name.clone(),
            risk.finish(),
            audit_policy_detail(host, raw.map(|s| s.trim().to_string())),
        ));
    }
}

fn event_log_detail(host: &str, raw_state: Option<String>) -> FindingDetail {
    FindingDetail::HostAudit(HostAuditDetail {
        host: host.to_string(),
        kind: AuditItemKind::EventLog,
        raw_state,
    })
}

fn audit_policy_detail(host: &str, raw_state: Option<String>) -> FindingDetail {
    FindingDetail::HostAudit(HostAuditDetail {
        host: host.to_string(),
        kind: AuditItemKind::AuditPolicy,
        raw_state,
    })
}

fn format_mb(bytes: u64) -> String {
    if bytes % MIB == 0 {
        (bytes / MIB).to_string()
    } else {
        format!("{:.1}", bytes as f64 / MIB as f64)
    }
}
