//! Fixed catalogs the classifiers are evaluated against.
//!
//! Catalogs are plain data handed to the engine by the caller; the engine never
//! holds its own copy. Built-in values live in `postureguard-settings`.

pub const MIB: u64 = 1024 * 1024;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalogs {
    /// Role names whose members count as admins. Every entry is treated as privileged.
    pub privileged_roles: Vec<String>,
    /// Core event logs and their recommended minimum sizes.
    pub logs: Vec<LogSpec>,
    /// Audit subcategories checked on every host.
    pub audit_subcategories: Vec<String>,
    /// DKIM selectors looked up on every mail domain. Empty skips the DKIM check.
    pub dkim_selectors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSpec {
    pub name: String,
    pub min_size_bytes: u64,
}

impl LogSpec {
    /// `None` when the size in bytes does not fit in a `u64`.
    pub fn new(name: &str, min_size_mb: u64) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            min_size_bytes: min_size_mb.checked_mul(MIB)?,
        })
    }

    pub fn min_size_mb(&self) -> u64 {
        self.min_size_bytes / MIB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_minimum_is_rejected() {
        assert_eq!(
            LogSpec::new("Security", 512).map(|s| s.min_size_bytes),
            Some(512 * MIB)
        );
        assert!(LogSpec::new("Security", u64::MAX / MIB + 1).is_none());
        assert!(LogSpec::new("Security", 9_000_000_000_000_000_000).is_none());
    }
}
