use postureguard_domain::model::RawFact;
use postureguard_domain::normalize::Normalized;
use postureguard_types::PostureError;
use std::collections::BTreeMap;

/// Mailbox rules, one mailbox at a time.
///
/// Listing failures are run-fatal when they are [`PostureError::Connection`];
/// a per-mailbox failure only skips that mailbox. Entries a source had to drop
/// while reading a target come back as warnings next to the payload.
pub trait MailSource: Sync {
    fn mailboxes(&self) -> Result<Vec<String>, PostureError>;
    fn mail_rules(&self, mailbox: &str) -> Result<Normalized<Vec<RawFact>>, PostureError>;
}

pub trait DirectorySource: Sync {
    /// Member principal ids of one role.
    fn role_members(&self, role: &str) -> Result<Normalized<Vec<String>>, PostureError>;
    fn principals(&self) -> Result<Normalized<Vec<RawFact>>, PostureError>;
}

pub trait HostAuditSource: Sync {
    fn hosts(&self) -> Result<Vec<String>, PostureError>;

    /// `None` when the host has no such log.
    fn log_metadata(
        &self,
        host: &str,
        log: &str,
    ) -> Result<Normalized<Option<RawFact>>, PostureError>;

    /// Subcategory name -> raw state text. An error means the audit tool could not run.
    fn audit_policy(&self, host: &str) -> Result<Normalized<BTreeMap<String, String>>, PostureError>;
}

/// DNS TXT lookups for the mail domains in scope.
pub trait MailDomainSource: Sync {
    fn domains(&self) -> Result<Vec<String>, PostureError>;

    /// TXT strings published at `name`, one entry per record. Empty when the name
    /// does not exist.
    fn txt_records(&self, domain: &str, name: &str) -> Result<Normalized<Vec<String>>, PostureError>;
}
