//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_MAIL_INBOX_RULES: &str = "mail.inbox_rules";
pub const CHECK_IDENTITY_ADMIN_MFA: &str = "identity.admin_mfa";
pub const CHECK_HOST_EVENT_LOGS: &str = "host.event_logs";
pub const CHECK_HOST_AUDIT_POLICY: &str = "host.audit_policy";
pub const CHECK_DOMAIN_SPF: &str = "domain.spf";
pub const CHECK_DOMAIN_DMARC: &str = "domain.dmarc";
pub const CHECK_DOMAIN_DKIM: &str = "domain.dkim";

// Codes: mail.inbox_rules
pub const CODE_EXTERNAL_FORWARD: &str = "external_forward";
pub const CODE_INTERNAL_FORWARD: &str = "internal_forward";
pub const CODE_STEALTH_RULE: &str = "stealth_rule";

// Codes: identity.admin_mfa
pub const CODE_ADMIN_WITHOUT_MFA: &str = "admin_without_mfa";
pub const CODE_ADMIN_WITH_MFA: &str = "admin_with_mfa";
pub const CODE_NON_ADMIN_WITHOUT_MFA: &str = "non_admin_without_mfa";
pub const CODE_NON_ADMIN_WITH_MFA: &str = "non_admin_with_mfa";

// Codes: host.event_logs
pub const CODE_LOG_DISABLED: &str = "log_disabled";
pub const CODE_LOG_ENABLED: &str = "log_enabled";
pub const CODE_LOG_METADATA_MISSING: &str = "log_metadata_missing";
pub const CODE_LOG_SIZE_BELOW_MINIMUM: &str = "log_size_below_minimum";
pub const CODE_LOG_SIZE_OK: &str = "log_size_ok";
pub const CODE_LOG_SIZE_UNKNOWN: &str = "log_size_unknown";
pub const CODE_LOG_MODE_CIRCULAR: &str = "log_mode_circular";
pub const CODE_LOG_MODE_AUTO_BACKUP: &str = "log_mode_auto_backup";
pub const CODE_LOG_MODE_RETAIN: &str = "log_mode_retain";
pub const CODE_LOG_MODE_UNKNOWN: &str = "log_mode_unknown";

// Codes: host.audit_policy
pub const CODE_NO_AUDITING: &str = "no_auditing";
pub const CODE_SUCCESS_ONLY: &str = "success_only";
pub const CODE_FAILURE_ONLY: &str = "failure_only";
pub const CODE_SUCCESS_AND_FAILURE: &str = "success_and_failure";
pub const CODE_UNPARSED_STATE: &str = "unparsed_state";
pub const CODE_AUDIT_TOOL_UNAVAILABLE: &str = "audit_tool_unavailable";

// Codes: domain.spf
pub const CODE_SPF_MISSING: &str = "spf_missing";
pub const CODE_SPF_MULTIPLE_RECORDS: &str = "spf_multiple_records";
pub const CODE_SPF_HARD_FAIL: &str = "spf_hard_fail";
pub const CODE_SPF_SOFT_FAIL: &str = "spf_soft_fail";
pub const CODE_SPF_PERMISSIVE: &str = "spf_permissive";
pub const CODE_SPF_REDIRECT: &str = "spf_redirect";
pub const CODE_SPF_NO_ALL: &str = "spf_no_all";

// Codes: domain.dmarc
pub const CODE_DMARC_MISSING: &str = "dmarc_missing";
pub const CODE_DMARC_MULTIPLE_RECORDS: &str = "dmarc_multiple_records";
pub const CODE_DMARC_REJECT: &str = "dmarc_reject";
pub const CODE_DMARC_QUARANTINE: &str = "dmarc_quarantine";
pub const CODE_DMARC_MONITOR_ONLY: &str = "dmarc_monitor_only";
pub const CODE_DMARC_POLICY_UNKNOWN: &str = "dmarc_policy_unknown";
pub const CODE_DMARC_PARTIAL_PCT: &str = "dmarc_partial_pct";

// Codes: domain.dkim
pub const CODE_DKIM_PRESENT: &str = "dkim_present";
pub const CODE_DKIM_MISSING: &str = "dkim_missing";
