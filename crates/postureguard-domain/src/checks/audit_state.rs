//! Narrow parser for free-form audit policy tool output.

use postureguard_types::{Severity, ids};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditSetting {
    NoAuditing,
    SuccessOnly,
    FailureOnly,
    SuccessAndFailure,
    Unknown,
}

impl AuditSetting {
    pub fn severity(self) -> Severity {
        match self {
            AuditSetting::NoAuditing => Severity::High,
            AuditSetting::SuccessOnly | AuditSetting::FailureOnly | AuditSetting::Unknown => {
                Severity::Medium
            }
            AuditSetting::SuccessAndFailure => Severity::Info,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AuditSetting::NoAuditing => ids::CODE_NO_AUDITING,
            AuditSetting::SuccessOnly => ids::CODE_SUCCESS_ONLY,
            AuditSetting::FailureOnly => ids::CODE_FAILURE_ONLY,
            AuditSetting::SuccessAndFailure => ids::CODE_SUCCESS_AND_FAILURE,
            AuditSetting::Unknown => ids::CODE_UNPARSED_STATE,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            AuditSetting::NoAuditing => "No Auditing",
            AuditSetting::SuccessOnly => "Success only; consider enabling Failure as well",
            AuditSetting::FailureOnly => "Failure only; consider enabling Success as well",
            AuditSetting::SuccessAndFailure => "Success and Failure",
            AuditSetting::Unknown => "Could not parse audit setting",
        }
    }
}

/// Reduce a raw state line (which may still carry the subcategory name and padding)
/// to an [`AuditSetting`]. Never fails; anything unrecognized is `Unknown`.
pub fn parse_audit_state(raw: &str) -> AuditSetting {
    let text = raw.to_ascii_lowercase();
    if text.contains("no auditing") {
        return AuditSetting::NoAuditing;
    }
    let success = text.contains("success");
    let failure = text.contains("failure");
    match (success, failure) {
        (true, true) => AuditSetting::SuccessAndFailure,
        (true, false) => AuditSetting::SuccessOnly,
        (false, true) => AuditSetting::FailureOnly,
        (false, false) => AuditSetting::Unknown,
    }
}
