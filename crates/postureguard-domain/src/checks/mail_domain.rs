//! Sender authentication posture of a mail domain: SPF, DMARC and DKIM records.

use super::risk::RiskAccumulator;
use super::utils::{finding, join_list};
use crate::model::MailDomainFacts;
use crate::policy::EffectiveConfig;
use postureguard_types::{
    AuthMechanism, Category, Finding, FindingDetail, MailDomainDetail, Severity, ids,
};

/// Lookup name of a domain's DMARC record.
pub fn dmarc_name(domain: &str) -> String {
    format!("_dmarc.{domain}")
}

/// Lookup name of a DKIM selector's key record.
pub fn dkim_name(selector: &str, domain: &str) -> String {
    format!("{selector}._domainkey.{domain}")
}

pub fn classify_domain(facts: &MailDomainFacts, cfg: &EffectiveConfig) -> Vec<Finding> {
    let mut out = Vec::new();
    if cfg.check_enabled(ids::CHECK_DOMAIN_SPF) {
        out.push(classify_spf(&facts.domain, &facts.apex));
    }
    if cfg.check_enabled(ids::CHECK_DOMAIN_DMARC) {
        out.push(classify_dmarc(&facts.domain, &facts.dmarc));
    }
    if cfg.check_enabled(ids::CHECK_DOMAIN_DKIM) {
        for selector in &cfg.catalogs.dkim_selectors {
            let records = facts
                .dkim
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(selector))
                .map(|(_, records)| records.as_slice())
                .unwrap_or_default();
            out.push(classify_dkim(&facts.domain, selector, records));
        }
    }
    out
}

// --- SPF ---

/// Records starting with the `v=spf1` version tag.
fn spf_records(txt: &[String]) -> Vec<&str> {
    txt.iter()
        .map(|record| record.trim())
        .filter(|record| {
            let mut terms = record.split_whitespace();
            terms.next().is_some_and(|v| v.eq_ignore_ascii_case("v=spf1"))
        })
        .collect()
}

/// Qualifier of the `all` mechanism; a bare `all` is `+`.
fn all_qualifier(record: &str) -> Option<char> {
    record.split_whitespace().skip(1).find_map(|term| {
        let term = term.to_ascii_lowercase();
        match term.as_str() {
            "all" => Some('+'),
            "+all" | "-all" | "~all" | "?all" => term.chars().next(),
            _ => None,
        }
    })
}

fn spf_modifier<'a>(record: &'a str, prefix: &str) -> Vec<&'a str> {
    record
        .split_whitespace()
        .filter_map(|term| {
            let (key, value) = term.split_at_checked(prefix.len())?;
            key.eq_ignore_ascii_case(prefix).then_some(value)
        })
        .collect()
}

pub fn classify_spf(domain: &str, apex: &[String]) -> Finding {
    let records = spf_records(apex);
    let emit = |code: &str, risk: RiskAccumulator, record: Option<&str>, policy: Option<String>| {
        finding(
            Category::MailDomain,
            ids::CHECK_DOMAIN_SPF,
            code,
            domain,
            AuthMechanism::Spf.label(),
            risk.finish(),
            detail(domain, AuthMechanism::Spf, None, record, policy),
        )
    };

    let Some(record) = records.first().copied() else {
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(Severity::High, "No SPF record found");
        return emit(ids::CODE_SPF_MISSING, risk, None, None);
    };

    if records.len() > 1 {
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(
            Severity::Medium,
            format!("{} SPF records published; receivers return a permanent error", records.len()),
        );
        return emit(ids::CODE_SPF_MULTIPLE_RECORDS, risk, Some(record), None);
    }

    let mut risk = RiskAccumulator::new(Severity::Info);
    let qualifier = all_qualifier(record);
    let redirect = spf_modifier(record, "redirect=");
    let code = match (qualifier, redirect.first()) {
        (Some('-'), _) => {
            risk.note("Restrictive SPF (-all)");
            ids::CODE_SPF_HARD_FAIL
        }
        (Some('~'), _) => {
            risk.raise(Severity::Medium, "SPF soft fail (~all); consider -all");
            ids::CODE_SPF_SOFT_FAIL
        }
        (Some(q), _) => {
            risk.raise(Severity::High, format!("Permissive SPF ({q}all); review necessity"));
            ids::CODE_SPF_PERMISSIVE
        }
        (None, Some(target)) => {
            risk.note(format!("SPF delegated via redirect={target}"));
            ids::CODE_SPF_REDIRECT
        }
        (None, None) => {
            risk.raise(Severity::Medium, "SPF has no all mechanism; unmatched senders are neutral");
            ids::CODE_SPF_NO_ALL
        }
    };

    let includes: Vec<String> = spf_modifier(record, "include:")
        .into_iter()
        .map(str::to_string)
        .collect();
    if !includes.is_empty() {
        risk.note(format!("Includes: {}", join_list(&includes)));
    }

    emit(
        code,
        risk,
        Some(record),
        qualifier.map(|q| format!("{q}all")),
    )
}

// --- DMARC ---

/// `k=v` pairs of a semicolon separated tag list. Keys are lowercased.
fn parse_tags(record: &str) -> Vec<(String, &str)> {
    record
        .split(';')
        .filter_map(|tag| tag.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim()))
        .collect()
}

fn tag<'a>(tags: &[(String, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
}

fn dmarc_records(txt: &[String]) -> Vec<&str> {
    txt.iter()
        .map(|record| record.trim())
        .filter(|record| {
            tag(&parse_tags(record), "v").is_some_and(|v| v.eq_ignore_ascii_case("DMARC1"))
        })
        .collect()
}

pub fn classify_dmarc(domain: &str, txt: &[String]) -> Finding {
    let records = dmarc_records(txt);
    let emit = |code: &str, risk: RiskAccumulator, record: Option<&str>, policy: Option<String>| {
        finding(
            Category::MailDomain,
            ids::CHECK_DOMAIN_DMARC,
            code,
            domain,
            AuthMechanism::Dmarc.label(),
            risk.finish(),
            detail(domain, AuthMechanism::Dmarc, None, record, policy),
        )
    };

    let Some(record) = records.first().copied() else {
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(Severity::High, "No DMARC record found");
        return emit(ids::CODE_DMARC_MISSING, risk, None, None);
    };

    if records.len() > 1 {
        let mut risk = RiskAccumulator::new(Severity::Info);
        risk.raise(
            Severity::Medium,
            format!("{} DMARC records published; receivers ignore DMARC", records.len()),
        );
        return emit(ids::CODE_DMARC_MULTIPLE_RECORDS, risk, Some(record), None);
    }

    let tags = parse_tags(record);
    let policy = tag(&tags, "p").map(str::to_ascii_lowercase);
    let mut risk = RiskAccumulator::new(Severity::Info);
    let mut code = match policy.as_deref() {
        Some("reject") => {
            risk.note("DMARC policy: reject");
            ids::CODE_DMARC_REJECT
        }
        Some("quarantine") => {
            risk.note("DMARC policy: quarantine");
            ids::CODE_DMARC_QUARANTINE
        }
        Some("none") => {
            risk.raise(Severity::Medium, "DMARC monitoring only (p=none); consider quarantine/reject");
            ids::CODE_DMARC_MONITOR_ONLY
        }
        Some(other) => {
            risk.raise(Severity::High, format!("DMARC policy unrecognised (p={other})"));
            ids::CODE_DMARC_POLICY_UNKNOWN
        }
        None => {
            risk.raise(Severity::High, "DMARC record has no policy (p=)");
            ids::CODE_DMARC_POLICY_UNKNOWN
        }
    };

    if let Some(raw) = tag(&tags, "pct") {
        match raw.parse::<u8>() {
            Ok(pct) if pct < 100 => {
                risk.raise(Severity::Medium, format!("DMARC applies to {pct}% of failing mail"));
                if risk.severity() == Severity::Medium && code != ids::CODE_DMARC_MONITOR_ONLY {
                    code = ids::CODE_DMARC_PARTIAL_PCT;
                }
            }
            Ok(_) => {}
            Err(_) => risk.note(format!("Unparsed pct={raw}")),
        }
    }

    match tag(&tags, "rua").filter(|rua| !rua.is_empty()) {
        Some(rua) => risk.note(format!("Aggregate reports to {rua}")),
        None => risk.note("No aggregate report address (rua)"),
    }

    emit(code, risk, Some(record), policy)
}

// --- DKIM ---

pub fn classify_dkim(domain: &str, selector: &str, txt: &[String]) -> Finding {
    let key = txt.iter().map(|record| record.trim()).find_map(|record| {
        let tags = parse_tags(record);
        let versioned = tag(&tags, "v").is_some_and(|v| v.eq_ignore_ascii_case("DKIM1"));
        (versioned || tag(&tags, "p").is_some()).then(|| (record, tag(&tags, "p")))
    });

    let mut risk = RiskAccumulator::new(Severity::Info);
    let (code, record) = match key {
        None => {
            risk.raise(Severity::Medium, format!("DKIM selector {selector} not found"));
            (ids::CODE_DKIM_MISSING, None)
        }
        Some((record, Some(""))) => {
            risk.raise(
                Severity::Medium,
                format!("DKIM key for selector {selector} is revoked (empty p=)"),
            );
            (ids::CODE_DKIM_MISSING, Some(record))
        }
        Some((record, _)) => {
            risk.note(format!("DKIM key published for selector {selector}"));
            (ids::CODE_DKIM_PRESENT, Some(record))
        }
    };

    finding(
        Category::MailDomain,
        ids::CHECK_DOMAIN_DKIM,
        code,
        domain,
        format!("{}:{selector}", AuthMechanism::Dkim.label()),
        risk.finish(),
        detail(domain, AuthMechanism::Dkim, Some(selector), record, None),
    )
}

fn detail(
    domain: &str,
    mechanism: AuthMechanism,
    selector: Option<&str>,
    record: Option<&str>,
    policy: Option<String>,
) -> FindingDetail {
    FindingDetail::MailDomain(MailDomainDetail {
        domain: domain.to_string(),
        mechanism,
        selector: selector.map(str::to_string),
        record: record.map(str::to_string),
        policy,
    })
}
