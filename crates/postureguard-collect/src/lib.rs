//! Collector adapters: fact source traits, a JSON snapshot reader, and the bounded
//! per-target worker pool.
//!
//! This crate is allowed to do filesystem IO. Live service collectors are external;
//! they plug in by implementing the source traits.

#![forbid(unsafe_code)]

mod pool;
mod snapshot;
mod source;

pub use pool::{Cancellation, TargetKey, WorkerPool};
pub use snapshot::SnapshotSource;
pub use source::{DirectorySource, HostAuditSource, MailDomainSource, MailSource};

/// Fuzz-friendly API for testing snapshot parsing without filesystem access.
pub mod fuzz {
    use super::{DirectorySource, HostAuditSource, MailDomainSource, MailSource, SnapshotSource};

    /// Parse arbitrary text as a collector snapshot and read every target in it.
    /// **Never panics** on any input; per-target errors are ignored.
    pub fn parse_snapshot(text: &str) -> Result<(), postureguard_types::PostureError> {
        let source = SnapshotSource::from_json_str(text)?;
        for mailbox in source.mailboxes()? {
            let _ = source.mail_rules(&mailbox);
        }
        let _ = source.principals()?;
        let _ = source.role_members("Company Administrator");
        for host in source.hosts()? {
            let _ = source.log_metadata(&host, "Security");
            let _ = source.audit_policy(&host);
        }
        for domain in source.domains()? {
            let _ = source.txt_records(&domain, &domain);
        }
        Ok(())
    }
}
