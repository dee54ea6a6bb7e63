use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for the JSON receipt.
pub const SCHEMA_REPORT_V1: &str = "postureguard.report.v1";

/// Severity lattice shared by every classifier: `Info < Medium < High`.
///
/// Categories render it with their own vocabulary, see [`Category::status_label`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Medium,
    High,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MailRule,
    Identity,
    HostAudit,
    MailDomain,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MailRule,
        Category::Identity,
        Category::HostAudit,
        Category::MailDomain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::MailRule => "mail_rule",
            Category::Identity => "identity",
            Category::HostAudit => "host_audit",
            Category::MailDomain => "mail_domain",
        }
    }

    /// Domain vocabulary for a severity. Host audit speaks Pass/Warn/Fail,
    /// the other categories speak risk levels.
    pub fn status_label(self, severity: Severity) -> &'static str {
        match (self, severity) {
            (Category::HostAudit, Severity::Info) => "Pass",
            (Category::HostAudit, Severity::Medium) => "Warn",
            (Category::HostAudit, Severity::High) => "Fail",
            (_, Severity::Info) => "Info",
            (_, Severity::Medium) => "Medium",
            (_, Severity::High) => "High",
        }
    }
}

/// One classified observation about one target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub category: Category,
    pub check_id: String,
    pub code: String,
    pub severity: Severity,

    /// Stable target key: mailbox address, principal name, `log:<name>`, `subcategory:<name>`
    /// or a mail domain.
    pub target: String,
    /// Secondary per-domain key (rule name, display name, audited aspect).
    pub item: String,

    /// Every rule that contributed, in application order.
    pub reasons: Vec<String>,

    /// Stable identifier intended for dedup and trending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    pub detail: FindingDetail,
}

impl Finding {
    pub fn status_label(&self) -> &'static str {
        self.category.status_label(self.severity)
    }

    pub fn reason_text(&self) -> String {
        self.reasons.join("; ")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum FindingDetail {
    MailRule(MailRuleDetail),
    Identity(IdentityDetail),
    HostAudit(HostAuditDetail),
    MailDomain(MailDomainDetail),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MailRuleDetail {
    pub mailbox: String,
    pub rule_name: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub from_address_contains: Vec<String>,
    pub sent_to_contains: Vec<String>,
    pub subject_contains: Vec<String>,
    pub body_contains: Vec<String>,
    pub has_forward: bool,
    pub has_external_forward: bool,
    pub external_recipients: Vec<String>,
    pub delete_message: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_to_folder: Option<String>,
    pub mark_as_read: bool,
    pub stop_processing_rules: bool,
}

/// Resolved multi-factor authentication state of a principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MfaStatus {
    Enabled,
    Enforced,
    MethodsPresent,
    Disabled,
}

impl MfaStatus {
    pub fn label(self) -> &'static str {
        match self {
            MfaStatus::Enabled => "Enabled",
            MfaStatus::Enforced => "Enforced",
            MfaStatus::MethodsPresent => "Enabled (Methods Present)",
            MfaStatus::Disabled => "Disabled",
        }
    }

    pub fn is_disabled(self) -> bool {
        self == MfaStatus::Disabled
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdentityDetail {
    pub principal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub roles: Vec<String>,
    pub mfa_status: MfaStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_licensed: Option<bool>,
    pub blocked: bool,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sync: Option<OffsetDateTime>,
    pub sign_in_allowed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditItemKind {
    EventLog,
    AuditPolicy,
}

impl AuditItemKind {
    pub fn label(self) -> &'static str {
        match self {
            AuditItemKind::EventLog => "EventLog",
            AuditItemKind::AuditPolicy => "AuditPolicy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostAuditDetail {
    pub host: String,
    pub kind: AuditItemKind,
    /// Raw state text as reported by the host, kept for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_state: Option<String>,
}

/// Sender authentication mechanism published in DNS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMechanism {
    Spf,
    Dmarc,
    Dkim,
}

impl AuthMechanism {
    pub fn label(self) -> &'static str {
        match self {
            AuthMechanism::Spf => "SPF",
            AuthMechanism::Dmarc => "DMARC",
            AuthMechanism::Dkim => "DKIM",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MailDomainDetail {
    pub domain: String,
    pub mechanism: AuthMechanism,
    /// DKIM selector; absent for SPF and DMARC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// The record the assessment is based on, as published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// SPF `all` qualifier or DMARC `p=` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityCounts {
    pub info: u32,
    pub medium: u32,
    pub high: u32,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = SeverityCounts::default();
        for f in findings {
            match f.severity {
                Severity::Info => counts.info += 1,
                Severity::Medium => counts.medium += 1,
                Severity::High => counts.high += 1,
            }
        }
        counts
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipCause {
    FetchFailed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedTarget {
    pub category: Category,
    pub target: String,
    pub cause: SkipCause,
    pub reason: String,
}

/// Partial-failure bookkeeping for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub targets_total: u32,
    pub targets_evaluated: u32,
    #[serde(default)]
    pub skipped: Vec<SkippedTarget>,
    /// Recovered parse problems and partial collection failures.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Checks that could not be evaluated on an otherwise evaluated target.
    #[serde(default)]
    pub degraded: Vec<String>,
}

impl RunSummary {
    pub fn skip(
        &mut self,
        category: Category,
        target: impl Into<String>,
        cause: SkipCause,
        reason: impl Into<String>,
    ) {
        self.skipped.push(SkippedTarget {
            category,
            target: target.into(),
            cause,
            reason: reason.into(),
        });
    }

    pub fn cancelled(&self) -> u32 {
        self.count_skipped(SkipCause::Cancelled)
    }

    pub fn fetch_failures(&self) -> u32 {
        self.count_skipped(SkipCause::FetchFailed)
    }

    fn count_skipped(&self, cause: SkipCause) -> u32 {
        self.skipped.iter().filter(|s| s.cause == cause).count() as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub ended_at: OffsetDateTime,
    pub duration_ms: u64,
}

/// Postureguard-specific summary payload for the report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PostureData {
    pub categories: Vec<Category>,
    pub include_all_principals: bool,
    pub findings_total: u32,
    pub summary: RunSummary,
}

/// Versioned JSON receipt for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostureReport {
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    pub counts: SeverityCounts,
    pub findings: Vec<Finding>,
    pub data: PostureData,
}
