use postureguard_types::{Category, PostureReport, SkipCause};

pub fn render_markdown(report: &PostureReport) -> String {
    let mut out = String::new();

    out.push_str("# Postureguard report\n\n");
    let categories: Vec<&str> = report.data.categories.iter().map(|c| c.as_str()).collect();
    out.push_str(&format!(
        "- Categories: {}\n- Findings: {} (high {}, medium {}, info {})\n",
        categories.join(", "),
        report.data.findings_total,
        report.counts.high,
        report.counts.medium,
        report.counts.info
    ));

    let summary = &report.data.summary;
    out.push_str(&format!(
        "- Targets: {} evaluated / {} total, {} skipped, {} cancelled\n\n",
        summary.targets_evaluated,
        summary.targets_total,
        summary.fetch_failures(),
        summary.cancelled()
    ));

    if !summary.skipped.is_empty() {
        out.push_str("## Skipped targets\n\n");
        for s in &summary.skipped {
            let cause = match s.cause {
                SkipCause::FetchFailed => "fetch failed",
                SkipCause::Cancelled => "cancelled",
            };
            out.push_str(&format!(
                "- `{}` ({}, {}): {}\n",
                s.target,
                s.category.as_str(),
                cause,
                s.reason
            ));
        }
        out.push('\n');
    }

    if !summary.degraded.is_empty() {
        out.push_str("## Not evaluated\n\n");
        for d in &summary.degraded {
            out.push_str(&format!("- {d}\n"));
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No matching items.\n");
        return out;
    }

    for category in Category::ALL {
        let findings: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if findings.is_empty() {
            continue;
        }

        out.push_str(&format!("## {}\n\n", heading(category)));
        for f in findings {
            out.push_str(&format!(
                "- [{}] `{}` / `{}` {} / {}: {}\n",
                f.status_label(),
                f.check_id,
                f.code,
                f.target,
                f.item,
                f.reason_text()
            ));
        }
        out.push('\n');
    }

    out
}

fn heading(category: Category) -> &'static str {
    match category {
        Category::MailRule => "Mailbox rules",
        Category::Identity => "Privileged accounts",
        Category::HostAudit => "Host audit",
        Category::MailDomain => "Mail domain authentication",
    }
}
