use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - category
/// - target key
/// - item
/// - code
/// - host (host audit findings only)
pub fn fingerprint_for(
    category: &str,
    target: &str,
    item: &str,
    code: &str,
    host: Option<&str>,
) -> String {
    let mut parts = vec![category, target, item, code];
    if let Some(h) = host {
        parts.push(h);
    }
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
