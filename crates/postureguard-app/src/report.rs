use anyhow::Context;
use postureguard_domain::AggregateOutcome;
use postureguard_types::{
    Category, PostureData, PostureReport, RunMeta, SCHEMA_REPORT_V1, SeverityCounts, ToolMeta,
};
use time::OffsetDateTime;

/// Wrap an aggregated outcome in the versioned JSON receipt.
pub fn build_report(
    outcome: &AggregateOutcome,
    categories: &[Category],
    include_all_principals: bool,
    started_at: OffsetDateTime,
    ended_at: OffsetDateTime,
) -> PostureReport {
    let duration_ms = (ended_at - started_at).whole_milliseconds().max(0) as u64;
    let findings = outcome.findings().to_vec();

    PostureReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "postureguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunMeta {
            started_at,
            ended_at,
            duration_ms,
        },
        counts: SeverityCounts::from_findings(&findings),
        data: PostureData {
            categories: categories.to_vec(),
            include_all_principals,
            findings_total: findings.len() as u32,
            summary: outcome.summary().clone(),
        },
        findings,
    }
}

pub fn serialize_report(report: &PostureReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<PostureReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse postureguard v1 report")
}

pub fn render_markdown(report: &PostureReport) -> String {
    postureguard_render::render_markdown(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postureguard_domain::aggregate;
    use postureguard_types::RunSummary;

    #[test]
    fn empty_outcome_round_trips_through_json() {
        let now = OffsetDateTime::now_utc();
        let outcome = aggregate(Vec::new(), RunSummary::default());
        let report = build_report(&outcome, &[Category::HostAudit], false, now, now);
        assert_eq!(report.data.findings_total, 0);

        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        let parsed = parse_report_json(&text).expect("parse");
        assert_eq!(parsed.data.categories, vec![Category::HostAudit]);
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let err = parse_report_json(r#"{"schema":"other.report.v1"}"#).expect_err("schema");
        assert!(err.to_string().contains("unknown report schema"));
    }
}
