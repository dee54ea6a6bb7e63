//! The scan use case: collect facts per target, classify, aggregate, and wrap the
//! result in a report.
//!
//! Listing failures abort the run. A failure on a single target only skips that
//! target; the rest of the run continues.

use crate::report::build_report;
use crate::selector::TargetSelector;
use anyhow::Context;
use postureguard_collect::{
    Cancellation, DirectorySource, HostAuditSource, MailDomainSource, MailSource, WorkerPool,
};
use postureguard_domain::checks::host_audit::{HostAuditOutcome, classify_host};
use postureguard_domain::checks::identity::{RoleIndex, evaluate_principal, is_reported};
use postureguard_domain::checks::mail_domain::{classify_domain, dkim_name, dmarc_name};
use postureguard_domain::checks::mail_rules::evaluate_mailbox;
use postureguard_domain::model::{AuditPolicyFacts, HostFacts, MailDomainFacts};
use postureguard_domain::normalize::{Normalized, ParseWarning, normalize_log};
use postureguard_domain::policy::EffectiveConfig;
use postureguard_domain::report::{TargetOutcome, collect_outcomes};
use postureguard_domain::{AggregateOutcome, aggregate};
use postureguard_settings::{
    Overrides, PostureguardConfigV1, ResolvedConfig, parse_config_toml, resolve_config,
};
use postureguard_types::{
    Category, Finding, PostureError, PostureReport, RunSummary, SkipCause, ids,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// The fact sources one scan reads from.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub mail: &'a dyn MailSource,
    pub directory: &'a dyn DirectorySource,
    pub hosts: &'a dyn HostAuditSource,
    pub domains: &'a dyn MailDomainSource,
}

impl<'a> Sources<'a> {
    /// Use one source for every category, e.g. a snapshot.
    pub fn from_one<S>(source: &'a S) -> Self
    where
        S: MailSource + DirectorySource + HostAuditSource + MailDomainSource,
    {
        Self {
            mail: source,
            directory: source,
            hosts: source,
            domains: source,
        }
    }
}
pub struct ScanInput<'a> {
    pub sources: Sources<'a>,
    /// Raw `postureguard.toml` contents; empty means built-in defaults.
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub categories: Vec<Category>,
    pub selector: TargetSelector,
    /// Set from outside (e.g. a Ctrl-C handler) to stop scheduling new targets.
    pub abort: Arc<AtomicBool>,
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub outcome: AggregateOutcome,
    pub report: PostureReport,
    pub resolved_config: ResolvedConfig,
}

pub fn run_scan(input: ScanInput<'_>) -> anyhow::Result<ScanOutput> {
    let started_at = OffsetDateTime::now_utc();

    let cfg = if input.config_text.trim().is_empty() {
        PostureguardConfigV1::default()
    } else {
        parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved = resolve_config(cfg, input.overrides).context("resolve config")?;

    let cancel = Cancellation::with_abort_flag(input.abort, resolved.timeout);
    let pool = WorkerPool::new(resolved.workers, cancel)?;
    let ctx = ScanContext {
        pool: &pool,
        resolved: &resolved,
        selector: &input.selector,
    };

    let mut findings = Vec::new();
    let mut summary = RunSummary::default();

    for category in &input.categories {
        let _span = tracing::info_span!("scan", category = category.as_str()).entered();
        if !ctx.category_enabled(*category) {
            debug!("all checks disabled; skipping");
            continue;
        }

        let before = findings.len();
        match category {
            Category::MailRule => scan_mail(&ctx, input.sources.mail, &mut findings, &mut summary)?,
            Category::Identity => {
                scan_identity(&ctx, input.sources.directory, &mut findings, &mut summary)?
            }
            Category::HostAudit => {
                scan_hosts(&ctx, input.sources.hosts, &mut findings, &mut summary)?
            }
            Category::MailDomain => {
                scan_domains(&ctx, input.sources.domains, &mut findings, &mut summary)?
            }
        }
        info!(findings = findings.len() - before, "category done");
    }

    let outcome = aggregate(findings, summary);
    let ended_at = OffsetDateTime::now_utc();
    let report = build_report(
        &outcome,
        &input.categories,
        resolved.effective.include_all_principals,
        started_at,
        ended_at,
    );

    Ok(ScanOutput {
        outcome,
        report,
        resolved_config: resolved,
    })
}

struct ScanContext<'a> {
    pool: &'a WorkerPool,
    resolved: &'a ResolvedConfig,
    selector: &'a TargetSelector,
}

impl ScanContext<'_> {
    fn category_enabled(&self, category: Category) -> bool {
        let cfg = &self.resolved.effective;
        match category {
            Category::MailRule => cfg.check_enabled(ids::CHECK_MAIL_INBOX_RULES),
            Category::Identity => cfg.check_enabled(ids::CHECK_IDENTITY_ADMIN_MFA),
            Category::HostAudit => {
                cfg.check_enabled(ids::CHECK_HOST_EVENT_LOGS)
                    || cfg.check_enabled(ids::CHECK_HOST_AUDIT_POLICY)
            }
            Category::MailDomain => {
                cfg.check_enabled(ids::CHECK_DOMAIN_SPF)
                    || cfg.check_enabled(ids::CHECK_DOMAIN_DMARC)
                    || cfg.check_enabled(ids::CHECK_DOMAIN_DKIM)
            }
        }
    }

    fn select(&self, targets: Vec<String>) -> Vec<String> {
        targets
            .into_iter()
            .filter(|t| self.selector.matches(t))
            .collect()
    }
}

fn scan_mail(
    ctx: &ScanContext<'_>,
    source: &dyn MailSource,
    findings: &mut Vec<Finding>,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let mailboxes = ctx.select(source.mailboxes().context("list mailboxes")?);
    debug!(targets = mailboxes.len(), "mailboxes selected");

    let outcomes = ctx.pool.run(&mailboxes, |mailbox| {
        let rules = match source.mail_rules(mailbox) {
            Ok(rules) => rules,
            Err(e) => return fetch_failed(mailbox, &e),
        };
        let classified = evaluate_mailbox(mailbox, &rules.value);
        TargetOutcome::Evaluated {
            target: mailbox.clone(),
            value: classified.value,
            warnings: rules.warnings.into_iter().chain(classified.warnings).collect(),
        }
    });

    for per_mailbox in fold(Category::MailRule, outcomes, summary) {
        findings.extend(per_mailbox);
    }
    Ok(())
}

fn scan_identity(
    ctx: &ScanContext<'_>,
    source: &dyn DirectorySource,
    findings: &mut Vec<Finding>,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let cfg = &ctx.resolved.effective;

    // Role membership is shared by every principal, so it is resolved up front.
    let mut memberships = BTreeMap::new();
    for role in &cfg.catalogs.privileged_roles {
        match source.role_members(role) {
            Ok(members) => {
                record_warnings(&members.warnings, summary);
                memberships.insert(role.clone(), members.value);
            }
            Err(e) if e.is_fatal() => {
                return Err(e).with_context(|| format!("enumerate role {role}"));
            }
            Err(e) => {
                warn!(%role, error = %e, "role enumeration failed; treating role as empty");
                summary
                    .warnings
                    .push(format!("role {role}: enumeration failed: {e}"));
            }
        }
    }
    let index = RoleIndex::build(&cfg.catalogs.privileged_roles, &memberships);
    debug!(admins = index.admin_count(), "role index built");

    let listed = source.principals().context("list principals")?;
    record_warnings(&listed.warnings, summary);
    let principals: Vec<_> = listed
        .value
        .into_iter()
        .filter(|fact| ctx.selector.matches(&fact.target))
        .collect();

    let outcomes = ctx.pool.run(&principals, |fact| {
        let classified = evaluate_principal(fact, &index);
        TargetOutcome::Evaluated {
            target: fact.target.clone(),
            value: classified.value,
            warnings: classified.warnings,
        }
    });

    findings.extend(
        fold(Category::Identity, outcomes, summary)
            .into_iter()
            .filter(|f| is_reported(f, cfg.include_all_principals)),
    );
    Ok(())
}

fn scan_hosts(
    ctx: &ScanContext<'_>,
    source: &dyn HostAuditSource,
    findings: &mut Vec<Finding>,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let cfg = &ctx.resolved.effective;
    let hosts = ctx.select(source.hosts().context("list hosts")?);
    debug!(targets = hosts.len(), "hosts selected");

    let outcomes = ctx.pool.run(&hosts, |host| {
        let mut logs = BTreeMap::new();
        let mut warnings = Vec::new();

        if cfg.check_enabled(ids::CHECK_HOST_EVENT_LOGS) {
            for spec in &cfg.catalogs.logs {
                let metadata = match source.log_metadata(host, &spec.name) {
                    Ok(metadata) => metadata,
                    Err(e) => return fetch_failed(host, &e),
                };
                warnings.extend(metadata.warnings);
                if let Some(fact) = metadata.value {
                    let normalized = normalize_log(&fact);
                    warnings.extend(normalized.warnings);
                    logs.insert(spec.name.clone(), normalized.value);
                }
            }
        }

        let audit_policy = if cfg.check_enabled(ids::CHECK_HOST_AUDIT_POLICY) {
            match source.audit_policy(host) {
                Ok(states) => {
                    warnings.extend(states.warnings);
                    AuditPolicyFacts::Available(states.value)
                }
                Err(e) => AuditPolicyFacts::Unavailable {
                    reason: e.to_string(),
                },
            }
        } else {
            AuditPolicyFacts::Available(BTreeMap::new())
        };

        let facts = HostFacts {
            host: host.clone(),
            logs,
            audit_policy,
        };
        TargetOutcome::Evaluated {
            target: host.clone(),
            value: classify_host(&facts, cfg),
            warnings,
        }
    });

    for HostAuditOutcome {
        findings: host_findings,
        degraded,
    } in fold(Category::HostAudit, outcomes, summary)
    {
        for entry in &degraded {
            warn!("{entry}");
        }
        findings.extend(host_findings);
        summary.degraded.extend(degraded);
    }
    Ok(())
}

fn scan_domains(
    ctx: &ScanContext<'_>,
    source: &dyn MailDomainSource,
    findings: &mut Vec<Finding>,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let cfg = &ctx.resolved.effective;
    let domains = ctx.select(source.domains().context("list mail domains")?);
    debug!(targets = domains.len(), "mail domains selected");

    let outcomes = ctx.pool.run(&domains, |domain| {
        match domain_facts(source, domain, cfg) {
            Ok(facts) => TargetOutcome::Evaluated {
                target: domain.clone(),
                value: classify_domain(&facts.value, cfg),
                warnings: facts.warnings,
            },
            Err(e) => fetch_failed(domain, &e),
        }
    });

    for per_domain in fold(Category::MailDomain, outcomes, summary) {
        findings.extend(per_domain);
    }
    Ok(())
}

/// TXT lookups for one domain. Names whose check is disabled are not looked up.
fn domain_facts(
    source: &dyn MailDomainSource,
    domain: &str,
    cfg: &EffectiveConfig,
) -> Result<Normalized<MailDomainFacts>, PostureError> {
    let mut warnings = Vec::new();
    let mut lookup = |name: &str| -> Result<Vec<String>, PostureError> {
        let txt = source.txt_records(domain, name)?;
        warnings.extend(txt.warnings);
        Ok(txt.value)
    };

    let mut facts = MailDomainFacts {
        domain: domain.to_string(),
        ..MailDomainFacts::default()
    };
    if cfg.check_enabled(ids::CHECK_DOMAIN_SPF) {
        facts.apex = lookup(domain)?;
    }
    if cfg.check_enabled(ids::CHECK_DOMAIN_DMARC) {
        facts.dmarc = lookup(&dmarc_name(domain))?;
    }
    if cfg.check_enabled(ids::CHECK_DOMAIN_DKIM) {
        for selector in &cfg.catalogs.dkim_selectors {
            let records = lookup(&dkim_name(selector, domain))?;
            facts.dkim.insert(selector.clone(), records);
        }
    }

    Ok(Normalized {
        value: facts,
        warnings,
    })
}

/// Warnings raised while listing, outside any one target.
fn record_warnings(warnings: &[ParseWarning], summary: &mut RunSummary) {
    for w in warnings {
        warn!("{w}");
        summary.warnings.push(w.to_string());
    }
}

fn fetch_failed<T>(target: &str, err: &PostureError) -> TargetOutcome<T> {
    TargetOutcome::Skipped {
        target: target.to_string(),
        cause: SkipCause::FetchFailed,
        reason: err.to_string(),
    }
}

/// Log skips and parse warnings, then fold the outcomes into the summary.
fn fold<T>(
    category: Category,
    outcomes: Vec<TargetOutcome<T>>,
    summary: &mut RunSummary,
) -> Vec<T> {
    for outcome in &outcomes {
        match outcome {
            TargetOutcome::Skipped {
                target,
                cause: SkipCause::FetchFailed,
                reason,
            } => warn!(%target, %reason, "target skipped"),
            TargetOutcome::Skipped { target, reason, .. } => {
                debug!(%target, %reason, "target not started")
            }
            TargetOutcome::Evaluated { warnings, .. } => {
                for w in warnings {
                    warn!("{w}");
                }
            }
        }
    }
    collect_outcomes(category, outcomes, summary)
}
