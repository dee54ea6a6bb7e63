use crate::fingerprint::fingerprint_for;
use postureguard_types::{Category, Finding, FindingDetail, Severity};

/// Assemble a finding and stamp its fingerprint.
pub fn finding(
    category: Category,
    check_id: &str,
    code: &str,
    target: impl Into<String>,
    item: impl Into<String>,
    (severity, reasons): (Severity, Vec<String>),
    detail: FindingDetail,
) -> Finding {
    let target = target.into();
    let item = item.into();
    let host = match &detail {
        FindingDetail::HostAudit(d) => Some(d.host.as_str()),
        _ => None,
    };
    let fingerprint = fingerprint_for(category.as_str(), &target, &item, code, host);

    Finding {
        category,
        check_id: check_id.to_string(),
        code: code.to_string(),
        severity,
        target,
        item,
        reasons,
        fingerprint: Some(fingerprint),
        detail,
    }
}

pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}
