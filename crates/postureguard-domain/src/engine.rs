use crate::report::DomainReport;
use postureguard_types::{Finding, FindingDetail, RunSummary, SeverityCounts};

/// Outcome of merging every classifier's findings.
#[derive(Clone, Debug, PartialEq)]
pub enum AggregateOutcome {
    Findings(DomainReport),
    /// Nothing to report; the sink must not be invoked.
    NoMatchingItems { summary: RunSummary },
}

impl AggregateOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            AggregateOutcome::Findings(report) => &report.summary,
            AggregateOutcome::NoMatchingItems { summary } => summary,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        match self {
            AggregateOutcome::Findings(report) => &report.findings,
            AggregateOutcome::NoMatchingItems { .. } => &[],
        }
    }
}

/// Merge findings from every classifier into one ordered sequence.
pub fn aggregate(mut findings: Vec<Finding>, summary: RunSummary) -> AggregateOutcome {
    if findings.is_empty() {
        return AggregateOutcome::NoMatchingItems { summary };
    }

    findings.sort_by(compare_findings);
    let counts = SeverityCounts::from_findings(&findings);

    AggregateOutcome::Findings(DomainReport {
        findings,
        counts,
        summary,
    })
}

pub fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (high -> medium -> info)
    // 2) target key
    // 3) item
    // 4) category, check_id, code
    // 5) host (host audit only)
    // 6) fingerprint, reasons
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.target.cmp(&b.target))
        .then_with(|| a.item.cmp(&b.item))
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.check_id.cmp(&b.check_id))
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| host_of(a).cmp(&host_of(b)))
        .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        .then_with(|| a.reasons.cmp(&b.reasons))
}

fn host_of(f: &Finding) -> Option<&str> {
    match &f.detail {
        FindingDetail::HostAudit(d) => Some(d.host.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::host_audit::classify_host;
    use crate::checks::mail_rules::classify_mailbox;
    use crate::model::LogMode;
    use crate::test_support::{audit_states, config, host, log, mail_rule, mailbox};
    use postureguard_types::Severity;
    use serde_json::json;

    #[test]
    fn empty_finding_set_signals_no_matching_items() {
        let outcome = aggregate(Vec::new(), RunSummary::default());
        assert!(matches!(outcome, AggregateOutcome::NoMatchingItems { .. }));
        assert!(outcome.findings().is_empty());
    }

    #[test]
    fn highest_severity_sorts_first() {
        let mut findings = classify_mailbox(&mailbox(
            "zed@corp.com",
            vec![mail_rule(json!({"Name": "out", "ForwardTo": ["x@evil.com"]}))],
        ));
        findings.extend(classify_mailbox(&mailbox(
            "amy@corp.com",
            vec![
                mail_rule(json!({"Name": "b-internal", "ForwardTo": ["bob@corp.com"]})),
                mail_rule(json!({"Name": "a-internal", "RedirectTo": ["bob@corp.com"]})),
            ],
        )));

        let outcome = aggregate(findings, RunSummary::default());
        let order: Vec<(Severity, &str, &str)> = outcome
            .findings()
            .iter()
            .map(|f| (f.severity, f.target.as_str(), f.item.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Severity::High, "zed@corp.com", "out"),
                (Severity::Medium, "amy@corp.com", "a-internal"),
                (Severity::Medium, "amy@corp.com", "b-internal"),
            ]
        );
        let AggregateOutcome::Findings(report) = outcome else {
            panic!("expected findings");
        };
        assert_eq!(report.counts.high, 1);
        assert_eq!(report.counts.medium, 2);
    }

    #[test]
    fn identical_host_findings_order_by_host_name() {
        let cfg = config();
        let findings: Vec<Finding> = ["WS03", "WS02", "WS01"]
            .into_iter()
            .flat_map(|name| {
                let facts = host(
                    name,
                    vec![log("Security", Some(true), Some(64), LogMode::Circular)],
                    audit_states(&[("Logon", "No Auditing")]),
                );
                classify_host(&facts, &cfg).findings
            })
            .collect();

        let outcome = aggregate(findings, RunSummary::default());
        let logon_hosts: Vec<&str> = outcome
            .findings()
            .iter()
            .filter(|f| f.target == "subcategory:Logon")
            .filter_map(host_of)
            .collect();
        assert_eq!(logon_hosts, vec!["WS01", "WS02", "WS03"]);

        let size_hosts: Vec<&str> = outcome
            .findings()
            .iter()
            .filter(|f| f.target == "log:Security" && f.item == "Size")
            .filter_map(host_of)
            .collect();
        assert_eq!(size_hosts, vec!["WS01", "WS02", "WS03"]);
    }
}
