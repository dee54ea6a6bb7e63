use crate::normalize::ParseWarning;
use postureguard_types::{Category, Finding, RunSummary, SeverityCounts, SkipCause};

/// Result of collecting and evaluating one target.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetOutcome<T> {
    Evaluated {
        target: String,
        value: T,
        warnings: Vec<ParseWarning>,
    },
    Skipped {
        target: String,
        cause: SkipCause,
        reason: String,
    },
}

impl<T> TargetOutcome<T> {
    pub fn target(&self) -> &str {
        match self {
            TargetOutcome::Evaluated { target, .. } | TargetOutcome::Skipped { target, .. } => {
                target
            }
        }
    }
}

/// Fold per-target outcomes into their values, recording skips and warnings.
/// Values keep the input order.
pub fn collect_outcomes<T>(
    category: Category,
    outcomes: Vec<TargetOutcome<T>>,
    summary: &mut RunSummary,
) -> Vec<T> {
    let mut values = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        summary.targets_total += 1;
        match outcome {
            TargetOutcome::Evaluated {
                value, warnings, ..
            } => {
                summary.targets_evaluated += 1;
                summary
                    .warnings
                    .extend(warnings.iter().map(ToString::to_string));
                values.push(value);
            }
            TargetOutcome::Skipped {
                target,
                cause,
                reason,
            } => summary.skip(category, target, cause, reason),
        }
    }
    values
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomainReport {
    pub findings: Vec<Finding>,
    pub counts: SeverityCounts,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_outcomes_counts_every_target() {
        let outcomes = vec![
            TargetOutcome::Evaluated {
                target: "a".to_string(),
                value: 1,
                warnings: vec![ParseWarning {
                    target: "a".to_string(),
                    field: "priority".to_string(),
                    message: "expected an integer".to_string(),
                }],
            },
            TargetOutcome::Skipped {
                target: "b".to_string(),
                cause: SkipCause::FetchFailed,
                reason: "not found".to_string(),
            },
            TargetOutcome::Evaluated {
                target: "c".to_string(),
                value: 3,
                warnings: Vec::new(),
            },
        ];
        let mut summary = RunSummary::default();
        let values = collect_outcomes(Category::MailRule, outcomes, &mut summary);

        assert_eq!(values, vec![1, 3]);
        assert_eq!(summary.targets_total, 3);
        assert_eq!(summary.targets_evaluated, 2);
        assert_eq!(summary.fetch_failures(), 1);
        assert_eq!(summary.warnings, vec!["a: priority: expected an integer"]);
    }
}
