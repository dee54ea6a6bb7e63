//! Stable DTOs and IDs used across the postureguard workspace.
//!
//! This crate is intentionally boring:
//! - the severity lattice and the finding shape emitted by every classifier
//! - stable string IDs and codes
//! - the error taxonomy shared by collectors and use cases
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod error;
pub mod explain;
pub mod ids;
pub mod receipt;

pub use error::PostureError;
pub use explain::{Explanation, lookup_explanation};
pub use receipt::{
    AuditItemKind, AuthMechanism, Category, Finding, FindingDetail, HostAuditDetail,
    IdentityDetail, MailDomainDetail, MailRuleDetail, MfaStatus, PostureData, PostureReport, RunMeta, RunSummary, SCHEMA_REPORT_V1,
    Severity, SeverityCounts, SkipCause, SkippedTarget, ToolMeta,
};
