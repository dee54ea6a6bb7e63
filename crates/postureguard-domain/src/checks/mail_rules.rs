use super::risk::RiskAccumulator;
use super::utils::{finding, join_list};
use crate::model::{MailRuleFacts, MailboxFacts, RawFact, domain_of};
use crate::normalize::{Normalized, normalize_mail_rule};
use postureguard_types::{Category, Finding, FindingDetail, MailRuleDetail, Severity, ids};
use std::collections::BTreeSet;

/// Normalize the raw rules collected for one mailbox, then classify them.
pub fn evaluate_mailbox(mailbox: &str, rules: &[RawFact]) -> Normalized<Vec<Finding>> {
    let mut warnings = Vec::new();
    let rules = rules
        .iter()
        .map(|fact| {
            let normalized = normalize_mail_rule(fact);
            warnings.extend(normalized.warnings);
            normalized.value
        })
        .collect();

    let facts = MailboxFacts {
        mailbox: mailbox.to_string(),
        rules,
    };
    Normalized {
        value: classify_mailbox(&facts),
        warnings,
    }
}

/// Classify every rule of one mailbox. Rules without side effects produce nothing.
pub fn classify_mailbox(mailbox: &MailboxFacts) -> Vec<Finding> {
    let own_domain = mailbox.own_domain();
    mailbox
        .rules
        .iter()
        .filter_map(|rule| classify_rule(&mailbox.mailbox, own_domain.as_deref(), rule))
        .collect()
}

struct Forwarding {
    all: Vec<String>,
    external: Vec<String>,
}

/// Union of forward, forward-as-attachment and redirect targets, first occurrence kept.
fn forwarding_targets(rule: &MailRuleFacts, own_domain: Option<&str>) -> Forwarding {
    let mut seen = BTreeSet::new();
    let mut all = Vec::new();
    for address in rule
        .forward_to
        .iter()
        .chain(&rule.forward_as_attachment_to)
        .chain(&rule.redirect_to)
    {
        if seen.insert(address.to_ascii_lowercase()) {
            all.push(address.clone());
        }
    }

    let external = all
        .iter()
        .filter(|address| is_external(address, own_domain))
        .cloned()
        .collect();

    Forwarding { all, external }
}

/// An address with no domain part is a local alias and counts as internal.
/// When the mailbox's own domain is unknown every qualified address is external.
fn is_external(address: &str, own_domain: Option<&str>) -> bool {
    match (domain_of(address), own_domain) {
        (Some(domain), Some(own)) => domain != own,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn stealth_actions(rule: &MailRuleFacts) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if rule.delete_message {
        actions.push("DeleteMessage");
    }
    if rule.move_to_folder.is_some() {
        actions.push("MoveToFolder");
    }
    if rule.mark_as_read {
        actions.push("MarkAsRead");
    }
    actions
}

fn classify_rule(mailbox: &str, own_domain: Option<&str>, rule: &MailRuleFacts) -> Option<Finding> {
    let forwarding = forwarding_targets(rule, own_domain);
    let has_forward = !forwarding.all.is_empty();
    let has_external_forward = !forwarding.external.is_empty();
    let stealth = stealth_actions(rule);

    if !has_forward && stealth.is_empty() {
        return None;
    }

    let mut risk = RiskAccumulator::new(Severity::Info);
    let code = if has_external_forward {
        risk.raise(
            Severity::High,
            format!(
                "External forwarding/redirect to {}",
                join_list(&forwarding.external)
            ),
        );
        ids::CODE_EXTERNAL_FORWARD
    } else if has_forward {
        risk.raise(Severity::Medium, "Internal forwarding/redirect");
        ids::CODE_INTERNAL_FORWARD
    } else {
        ids::CODE_STEALTH_RULE
    };

    if !stealth.is_empty() {
        let actions = stealth.join(", ");
        if risk.severity() == Severity::High {
            risk.note(format!("Stealth actions alongside external forward ({actions})"));
        } else {
            risk.raise(Severity::Medium, format!("Local stealth actions ({actions})"));
        }
    }

    if rule.stop_processing_rules {
        risk.raise(
            Severity::Medium,
            "StopProcessingRules set; later rules are skipped",
        );
    }

    let detail = MailRuleDetail {
        mailbox: mailbox.to_string(),
        rule_name: rule.name.clone(),
        enabled: rule.enabled,
        priority: rule.priority,
        description: rule.description.clone(),
        from_address_contains: rule.from_address_contains.clone(),
        sent_to_contains: rule.sent_to_contains.clone(),
        subject_contains: rule.subject_contains.clone(),
        body_contains: rule.body_contains.clone(),
        has_forward,
        has_external_forward,
        external_recipients: forwarding.external,
        delete_message: rule.delete_message,
        move_to_folder: rule.move_to_folder.clone(),
        mark_as_read: rule.mark_as_read,
        stop_processing_rules: rule.stop_processing_rules,
    };

    Some(finding(
        Category::MailRule,
        ids::CHECK_MAIL_INBOX_RULES,
        code,
        mailbox,
        rule.name.clone(),
        risk.finish(),
        FindingDetail::MailRule(detail),
    ))
}
