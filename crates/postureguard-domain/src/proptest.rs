//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Mail rule severity (external forward always wins, silent rules are dropped)
//! - Severity accumulation never going down
//! - The identity classification matrix
//! - Audit state reduction
//! - Determinism of the full pipeline
//! - The admin-only reporting filter

use crate::checks::identity::{RoleIndex, classify_principal, is_reported};
use crate::checks::mail_rules::classify_mailbox;
use crate::checks::{AuditSetting, RiskAccumulator, parse_audit_state};
use crate::engine::{AggregateOutcome, aggregate};
use crate::model::{MailRuleFacts, MailboxFacts, PrincipalFacts};
use crate::test_support::{config, memberships, principal};
use postureguard_types::{RunSummary, Severity};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn arb_local_part() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9.]{0,11}").unwrap()
}

fn arb_domain() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}\\.(com|net|org)").unwrap()
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Medium),
        Just(Severity::High),
    ]
}

/// Recipients inside `own_domain`.
fn arb_internal(own_domain: String) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_local_part(), 0..3).prop_map(move |locals| {
        locals
            .into_iter()
            .map(|l| format!("{l}@{own_domain}"))
            .collect()
    })
}

#[derive(Clone, Debug)]
struct RuleFlags {
    delete: bool,
    move_to: Option<String>,
    mark_read: bool,
    stop: bool,
}

fn arb_flags() -> impl Strategy<Value = RuleFlags> {
    (
        any::<bool>(),
        prop::option::of("[A-Za-z ]{1,12}"),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(delete, move_to, mark_read, stop)| RuleFlags {
            delete,
            move_to,
            mark_read,
            stop,
        })
}

fn rule_with(
    name: &str,
    forward_to: Vec<String>,
    redirect_to: Vec<String>,
    flags: &RuleFlags,
) -> MailRuleFacts {
    MailRuleFacts {
        name: name.to_string(),
        enabled: true,
        forward_to,
        redirect_to,
        delete_message: flags.delete,
        move_to_folder: flags.move_to.clone(),
        mark_as_read: flags.mark_read,
        stop_processing_rules: flags.stop,
        ..MailRuleFacts::default()
    }
}

fn arb_mailbox() -> impl Strategy<Value = MailboxFacts> {
    (arb_local_part(), arb_domain()).prop_flat_map(|(local, own)| {
        let address = format!("{local}@{own}");
        prop::collection::vec(
            (
                arb_internal(own.clone()),
                prop::collection::vec((arb_local_part(), arb_domain()), 0..2),
                arb_flags(),
            ),
            0..4,
        )
        .prop_map(move |rules| MailboxFacts {
            mailbox: address.clone(),
            rules: rules
                .into_iter()
                .enumerate()
                .map(|(i, (internal, other, flags))| {
                    let other = other
                        .into_iter()
                        .map(|(l, d)| format!("{l}@{d}"))
                        .collect();
                    rule_with(&format!("rule-{i}"), internal, other, &flags)
                })
                .collect(),
        })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn external_forward_is_always_high(
        own in arb_domain(),
        internal_local in arb_local_part(),
        external_local in arb_local_part(),
        flags in arb_flags(),
    ) {
        let external_domain = format!("x{own}");
        let rule = rule_with(
            "r",
            vec![format!("{internal_local}@{own}")],
            vec![format!("{external_local}@{external_domain}")],
            &flags,
        );
        let mb = MailboxFacts { mailbox: format!("owner@{own}"), rules: vec![rule] };

        let out = classify_mailbox(&mb);
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(out[0].severity, Severity::High);
    }

    #[test]
    fn silent_rules_never_emit(own in arb_domain(), name in "[a-z]{1,10}") {
        let flags = RuleFlags { delete: false, move_to: None, mark_read: false, stop: false };
        let rule = rule_with(&name, Vec::new(), Vec::new(), &flags);
        let mb = MailboxFacts { mailbox: format!("owner@{own}"), rules: vec![rule] };
        prop_assert!(classify_mailbox(&mb).is_empty());
    }

    #[test]
    fn accumulator_is_monotonic(seed in arb_severity(), steps in prop::collection::vec(arb_severity(), 0..12)) {
        let mut acc = RiskAccumulator::new(seed);
        let mut previous = acc.severity();
        for (i, step) in steps.iter().enumerate() {
            acc.raise(*step, format!("step {i}"));
            prop_assert!(acc.severity() >= previous);
            prop_assert!(acc.severity() >= *step);
            previous = acc.severity();
        }
        let (final_severity, reasons) = acc.finish();
        prop_assert_eq!(reasons.len(), steps.len());
        prop_assert_eq!(final_severity, steps.iter().copied().fold(seed, Severity::max));
    }

    #[test]
    fn identity_matrix_is_exact(
        is_admin in any::<bool>(),
        state in prop::option::of(prop_oneof![
            Just("Enabled".to_string()),
            Just("enforced".to_string()),
            Just("Disabled".to_string()),
            "[a-z]{0,8}",
        ]),
        methods in 0usize..3,
        blocked in any::<bool>(),
    ) {
        let mut p: PrincipalFacts = principal("user", state.as_deref(), methods);
        p.blocked = blocked;
        let mut memberships = BTreeMap::new();
        if is_admin {
            memberships.insert("Company Administrator".to_string(), vec!["user".to_string()]);
        }
        let index = RoleIndex::build(&config().catalogs.privileged_roles, &memberships);
        let f = classify_principal(&p, &index);

        let mfa_disabled = !matches!(
            state.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("enabled") | Some("enforced")
        ) && methods == 0;

        match (is_admin, mfa_disabled) {
            (true, true) => {
                prop_assert_eq!(f.severity, Severity::High);
                prop_assert_eq!(f.reasons[0].as_str(), "Admin without MFA");
            }
            (true, false) => prop_assert_eq!(f.severity, Severity::Medium),
            (false, _) => prop_assert_eq!(f.severity, Severity::Info),
        }
        prop_assert_eq!(f.reasons.len(), if blocked { 2 } else { 1 });
    }

    #[test]
    fn audit_state_reduction_ignores_case_and_padding(
        lead in "[ \t]{0,4}",
        trail in "[ \t\r\n]{0,4}",
        upper in any::<bool>(),
    ) {
        let shape = |s: &str| {
            let body = if upper { s.to_ascii_uppercase() } else { s.to_string() };
            format!("{lead}{body}{trail}")
        };
        prop_assert_eq!(parse_audit_state(&shape("No Auditing")), AuditSetting::NoAuditing);
        prop_assert_eq!(parse_audit_state(&shape("Success and Failure")), AuditSetting::SuccessAndFailure);
        prop_assert_eq!(parse_audit_state(&shape("Success")), AuditSetting::SuccessOnly);
        prop_assert_eq!(AuditSetting::NoAuditing.severity(), Severity::High);
    }

    #[test]
    fn pipeline_is_deterministic(mailboxes in prop::collection::vec(arb_mailbox(), 0..5)) {
        let roles = memberships(vec![("Company Administrator", vec!["a"])]);
        let index = RoleIndex::build(&config().catalogs.privileged_roles, &roles);
        let principals = vec![principal("a", None, 0), principal("b", Some("Enabled"), 0)];
        let run = || {
            let mut findings: Vec<_> = mailboxes.iter().flat_map(classify_mailbox).collect();
            findings.extend(principals.iter().map(|p| classify_principal(p, &index)));
            aggregate(findings, RunSummary::default())
        };

        let first = run();
        let second = run();
        let a = serde_json::to_string(first.findings()).unwrap();
        let b = serde_json::to_string(second.findings()).unwrap();
        prop_assert_eq!(a, b);

        let findings = first.findings();
        for pair in findings.windows(2) {
            prop_assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn inclusion_filter_is_idempotent(
        admins in prop::collection::btree_set("[a-z]{1,6}", 0..4),
        others in prop::collection::btree_set("[0-9]{1,6}", 0..4),
        include_all in any::<bool>(),
    ) {
        let mut memberships = BTreeMap::new();
        memberships.insert(
            "Company Administrator".to_string(),
            admins.iter().cloned().collect::<Vec<_>>(),
        );
        let index = RoleIndex::build(&config().catalogs.privileged_roles, &memberships);
        let classified: Vec<_> = admins
            .iter()
            .chain(&others)
            .map(|id| classify_principal(&principal(id, None, 0), &index))
            .collect();

        let once: Vec<_> = classified
            .iter()
            .filter(|f| is_reported(f, include_all))
            .cloned()
            .collect();
        let twice: Vec<_> = once
            .iter()
            .filter(|f| is_reported(f, include_all))
            .cloned()
            .collect();

        prop_assert_eq!(&once, &twice);
        let expected = if include_all { admins.len() + others.len() } else { admins.len() };
        prop_assert_eq!(once.len(), expected);
    }
}

#[test]
fn empty_target_set_has_no_findings() {
    let mailboxes: Vec<MailboxFacts> = Vec::new();
    let findings: Vec<_> = mailboxes.iter().flat_map(classify_mailbox).collect();
    let outcome = aggregate(findings, RunSummary::default());
    assert!(matches!(outcome, AggregateOutcome::NoMatchingItems { .. }));
}
