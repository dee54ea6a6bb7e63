//! Raw collector facts and their normalized, canonical counterparts.

use postureguard_types::Category;
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// One loosely-structured record as received from a collector. Consumed once by the normalizer.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFact {
    pub category: Category,
    pub target: String,
    pub attributes: BTreeMap<String, Value>,
}

impl RawFact {
    pub fn new(category: Category, target: impl Into<String>) -> Self {
        Self {
            category,
            target: target.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailRuleFacts {
    pub name: String,
    pub enabled: bool,
    pub priority: Option<i64>,
    pub description: Option<String>,
    /// Resolved addresses; entries that resolved to nothing are already dropped.
    pub forward_to: Vec<String>,
    pub forward_as_attachment_to: Vec<String>,
    pub redirect_to: Vec<String>,
    pub from_address_contains: Vec<String>,
    pub sent_to_contains: Vec<String>,
    pub subject_contains: Vec<String>,
    pub body_contains: Vec<String>,
    pub delete_message: bool,
    pub move_to_folder: Option<String>,
    pub mark_as_read: bool,
    pub stop_processing_rules: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailboxFacts {
    pub mailbox: String,
    pub rules: Vec<MailRuleFacts>,
}

impl MailboxFacts {
    /// Domain part of the mailbox's own address, lowercased.
    pub fn own_domain(&self) -> Option<String> {
        domain_of(&self.mailbox)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrincipalFacts {
    pub principal_id: String,
    pub display_name: Option<String>,
    /// State of the first MFA requirement record, if any.
    pub mfa_requirement_state: Option<String>,
    pub mfa_methods_registered: usize,
    pub blocked: bool,
    pub is_licensed: Option<bool>,
    pub last_sync: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogMode {
    Circular,
    AutoBackup,
    Retain,
    Other(String),
    Missing,
}

impl LogMode {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => LogMode::Missing,
            "circular" => LogMode::Circular,
            "autobackup" | "auto_backup" | "auto-backup" => LogMode::AutoBackup,
            "retain" => LogMode::Retain,
            _ => LogMode::Other(raw.trim().to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFacts {
    pub name: String,
    pub enabled: Option<bool>,
    pub max_size_bytes: Option<u64>,
    pub mode: LogMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditPolicyFacts {
    /// Subcategory name -> raw state text.
    Available(BTreeMap<String, String>),
    /// The audit policy tool could not be run on the host.
    Unavailable { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostFacts {
    pub host: String,
    pub logs: BTreeMap<String, LogFacts>,
    pub audit_policy: AuditPolicyFacts,
}

/// TXT records published for one mail domain, grouped by lookup name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailDomainFacts {
    pub domain: String,
    /// TXT strings at the domain apex.
    pub apex: Vec<String>,
    /// TXT strings at `_dmarc.<domain>`.
    pub dmarc: Vec<String>,
    /// Selector -> TXT strings at `<selector>._domainkey.<domain>`.
    pub dkim: BTreeMap<String, Vec<String>>,
}

/// Domain part of an address (after the last `@`), lowercased. `None` when there is none.
pub fn domain_of(address: &str) -> Option<String> {
    let (_, domain) = address.trim().rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('>').to_ascii_lowercase();
    if domain.is_empty() { None } else { Some(domain) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_splits_at_last_at_sign() {
        assert_eq!(domain_of("alice@Corp.com").as_deref(), Some("corp.com"));
        assert_eq!(domain_of("\"odd@name\"@evil.com").as_deref(), Some("evil.com"));
        assert_eq!(domain_of("no-domain"), None);
        assert_eq!(domain_of("trailing@"), None);
    }

    #[test]
    fn log_mode_parse_is_case_insensitive() {
        assert_eq!(LogMode::parse("Circular"), LogMode::Circular);
        assert_eq!(LogMode::parse("AutoBackup"), LogMode::AutoBackup);
        assert_eq!(LogMode::parse(" retain "), LogMode::Retain);
        assert_eq!(LogMode::parse(""), LogMode::Missing);
        assert_eq!(LogMode::parse("Weird"), LogMode::Other("Weird".to_string()));
    }
}
