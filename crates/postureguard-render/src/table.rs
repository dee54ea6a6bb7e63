use postureguard_types::{AuditItemKind, Category, Finding, FindingDetail};
use time::format_description::well_known::Rfc3339;

pub const MAIL_RULE_COLUMNS: &[&str] = &[
    "Mailbox",
    "RuleName",
    "Enabled",
    "Priority",
    "Description",
    "FromAddressContains",
    "SentToContains",
    "SubjectContains",
    "BodyContains",
    "HasForward",
    "HasExternalForward",
    "ExternalRecipients",
    "DeleteMessage",
    "MoveToFolder",
    "MarkAsRead",
    "StopProcessingRules",
    "RiskLevel",
    "RiskReason",
];

pub const IDENTITY_COLUMNS: &[&str] = &[
    "PrincipalId",
    "DisplayName",
    "IsAdmin",
    "Roles",
    "MFAStatus",
    "IsLicensed",
    "Blocked",
    "LastSync",
    "SignInAllowed",
    "RiskLevel",
    "RiskReason",
];

pub const AUDIT_COLUMNS: &[&str] = &["Host", "Category", "Item", "Status", "Details"];

pub const MAIL_DOMAIN_COLUMNS: &[&str] = &[
    "Domain",
    "Check",
    "Selector",
    "Record",
    "Policy",
    "RiskLevel",
    "Assessment",
];

/// Header plus one row per finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

pub fn columns_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::MailRule => MAIL_RULE_COLUMNS,
        Category::Identity => IDENTITY_COLUMNS,
        Category::HostAudit => AUDIT_COLUMNS,
        Category::MailDomain => MAIL_DOMAIN_COLUMNS,
    }
}

/// Rows for the findings of `category`, in the given order. Other categories are ignored.
pub fn table_for(category: Category, findings: &[Finding]) -> Table {
    let rows = findings
        .iter()
        .filter(|f| f.category == category)
        .map(row)
        .collect();
    Table {
        columns: columns_for(category),
        rows,
    }
}

fn row(f: &Finding) -> Vec<String> {
    match &f.detail {
        FindingDetail::MailRule(d) => vec![
            d.mailbox.clone(),
            d.rule_name.clone(),
            flag(d.enabled),
            d.priority.map(|p| p.to_string()).unwrap_or_default(),
            d.description.clone().unwrap_or_default(),
            list(&d.from_address_contains),
            list(&d.sent_to_contains),
            list(&d.subject_contains),
            list(&d.body_contains),
            flag(d.has_forward),
            flag(d.has_external_forward),
            list(&d.external_recipients),
            flag(d.delete_message),
            d.move_to_folder.clone().unwrap_or_default(),
            flag(d.mark_as_read),
            flag(d.stop_processing_rules),
            f.status_label().to_string(),
            f.reason_text(),
        ],
        FindingDetail::Identity(d) => vec![
            d.principal_id.clone(),
            d.display_name.clone().unwrap_or_default(),
            flag(d.is_admin),
            list(&d.roles),
            d.mfa_status.label().to_string(),
            d.is_licensed.map(flag).unwrap_or_default(),
            flag(d.blocked),
            d.last_sync
                .and_then(|ts| ts.format(&Rfc3339).ok())
                .unwrap_or_default(),
            flag(d.sign_in_allowed),
            f.status_label().to_string(),
            f.reason_text(),
        ],
        FindingDetail::HostAudit(d) => vec![
            d.host.clone(),
            d.kind.label().to_string(),
            audit_item(f, d.kind),
            f.status_label().to_string(),
            f.reason_text(),
        ],
        FindingDetail::MailDomain(d) => vec![
            d.domain.clone(),
            d.mechanism.label().to_string(),
            d.selector.clone().unwrap_or_default(),
            d.record.clone().unwrap_or_default(),
            d.policy.clone().unwrap_or_default(),
            f.status_label().to_string(),
            f.reason_text(),
        ],
    }
}

/// `Security (Size)` for log aspects, the bare name for subcategories.
fn audit_item(f: &Finding, kind: AuditItemKind) -> String {
    let (_, name) = f.target.split_once(':').unwrap_or(("", f.target.as_str()));
    match kind {
        AuditItemKind::EventLog => format!("{name} ({})", f.item),
        AuditItemKind::AuditPolicy if f.target.starts_with("subcategory:") => name.to_string(),
        AuditItemKind::AuditPolicy => f.item.clone(),
    }
}

fn flag(v: bool) -> String {
    if v { "True" } else { "False" }.to_string()
}

fn list(items: &[String]) -> String {
    items.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use postureguard_types::{
        AuthMechanism, HostAuditDetail, MailDomainDetail, MailRuleDetail, Severity,
    };

    fn audit_finding(target: &str, item: &str, kind: AuditItemKind) -> Finding {
        Finding {
            category: Category::HostAudit,
            check_id: "host.event_logs".to_string(),
            code: "log_size_below_minimum".to_string(),
            severity: Severity::Medium,
            target: target.to_string(),
            item: item.to_string(),
            reasons: vec!["Maximum size 256 MB. Recommended ≥ 512 MB".to_string()],
            fingerprint: None,
            detail: FindingDetail::HostAudit(HostAuditDetail {
                host: "WS01".to_string(),
                kind,
                raw_state: None,
            }),
        }
    }

    #[test]
    fn audit_rows_follow_column_contract() {
        let findings = vec![
            audit_finding("log:Security", "Size", AuditItemKind::EventLog),
            audit_finding("subcategory:Logon", "Logon", AuditItemKind::AuditPolicy),
        ];
        let table = table_for(Category::HostAudit, &findings);
        assert_eq!(table.columns, AUDIT_COLUMNS);
        assert_eq!(
            table.rows[0],
            vec![
                "WS01",
                "EventLog",
                "Security (Size)",
                "Warn",
                "Maximum size 256 MB. Recommended ≥ 512 MB"
            ]
        );
        assert_eq!(table.rows[1][2], "Logon");
    }

    #[test]
    fn mail_domain_rows_follow_column_contract() {
        let finding = Finding {
            category: Category::MailDomain,
            check_id: "domain.spf".to_string(),
            code: "spf_soft_fail".to_string(),
            severity: Severity::Medium,
            target: "corp.com".to_string(),
            item: "SPF".to_string(),
            reasons: vec!["SPF soft fail (~all); consider -all".to_string()],
            fingerprint: None,
            detail: FindingDetail::MailDomain(MailDomainDetail {
                domain: "corp.com".to_string(),
                mechanism: AuthMechanism::Spf,
                selector: None,
                record: Some("v=spf1 mx ~all".to_string()),
                policy: Some("~all".to_string()),
            }),
        };
        let table = table_for(Category::MailDomain, std::slice::from_ref(&finding));
        assert_eq!(table.columns, MAIL_DOMAIN_COLUMNS);
        assert_eq!(
            table.rows[0],
            vec![
                "corp.com",
                "SPF",
                "",
                "v=spf1 mx ~all",
                "~all",
                "Medium",
                "SPF soft fail (~all); consider -all"
            ]
        );
    }

    #[test]
    fn mail_rows_have_one_cell_per_column() {
        let finding = Finding {
            category: Category::MailRule,
            check_id: "mail.inbox_rules".to_string(),
            code: "external_forward".to_string(),
            severity: Severity::High,
            target: "alice@corp.com".to_string(),
            item: "fwd".to_string(),
            reasons: vec!["a".to_string(), "b".to_string()],
            fingerprint: None,
            detail: FindingDetail::MailRule(MailRuleDetail {
                mailbox: "alice@corp.com".to_string(),
                rule_name: "fwd".to_string(),
                external_recipients: vec!["x@evil.com".to_string(), "y@evil.com".to_string()],
                has_forward: true,
                has_external_forward: true,
                ..MailRuleDetail::default()
            }),
        };
        let table = table_for(Category::MailRule, std::slice::from_ref(&finding));
        let row = &table.rows[0];
        assert_eq!(row.len(), MAIL_RULE_COLUMNS.len());
        assert_eq!(row[11], "x@evil.com; y@evil.com");
        assert_eq!(row[16], "High");
        assert_eq!(row[17], "a; b");

        assert!(table_for(Category::Identity, &[finding]).rows.is_empty());
    }
}
