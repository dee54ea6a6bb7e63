//! CLI entry point for postureguard.
//!
//! This module is intentionally thin: it handles argument parsing, logging, I/O, and exit
//! codes. All business logic lives in the `postureguard-app` crate.

#![forbid(unsafe_code)]

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgGroup, Args, Parser, Subcommand};
use postureguard_app::{
    CsvFileSink, Delivery, ExplainOutput, ScanInput, ScanOutput, Sources, TargetSelector,
    default_file_name, deliver, format_explanation, format_not_found, parse_report_json,
    render_markdown, run_explain, run_scan, serialize_report,
};
use postureguard_collect::SnapshotSource;
use postureguard_settings::Overrides;
use postureguard_types::{Category, PostureReport};
use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(
    name = "postureguard",
    version,
    about = "Rule-based risk classification for mailbox rules, admin MFA, host audit logging, and mail domain authentication",
    arg_required_else_help = true
)]
struct Cli {
    /// Path to postureguard config TOML (missing file means built-in defaults).
    #[arg(long, global = true, default_value = "postureguard.toml")]
    config: Utf8PathBuf,

    /// Debug logging (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Override the number of concurrent per-target workers.
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Stop scheduling new targets after this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    cmd: Commands,
}

/// Arguments shared by every scanning subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("selector").required(true).args(["all", "target"])))]
struct ScanArgs {
    /// Collector snapshot (JSON) to read facts from.
    #[arg(long)]
    facts: Utf8PathBuf,

    /// Scan every target in the snapshot.
    #[arg(long)]
    all: bool,

    /// Scan targets matching this glob (e.g. "*@corp.com", "WS0?").
    #[arg(long)]
    target: Option<String>,

    /// Also write the versioned JSON report here.
    #[arg(long)]
    json_out: Option<Utf8PathBuf>,

    /// Also write a Markdown run summary here.
    #[arg(long)]
    markdown_out: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify inbox rules for forwarding and stealth actions.
    MailRules {
        #[command(flatten)]
        scan: ScanArgs,

        /// Where to write the CSV report.
        #[arg(long, short, default_value = "mail_rules.csv")]
        output: Utf8PathBuf,
    },

    /// Classify privileged-role membership against MFA state.
    Identity {
        #[command(flatten)]
        scan: ScanArgs,

        /// Report every principal, not only admins.
        #[arg(long)]
        include_all: bool,

        /// Where to write the CSV report.
        #[arg(long, short, default_value = "identity_mfa.csv")]
        output: Utf8PathBuf,
    },

    /// Classify core event logs and advanced audit policy per host.
    HostAudit {
        #[command(flatten)]
        scan: ScanArgs,

        /// Where to write the CSV report.
        #[arg(long, short, default_value = "host_audit.csv")]
        output: Utf8PathBuf,
    },

    /// Classify SPF, DMARC and DKIM records of each mail domain.
    MailDomains {
        #[command(flatten)]
        scan: ScanArgs,

        /// Where to write the CSV report.
        #[arg(long, short, default_value = "mail_domains.csv")]
        output: Utf8PathBuf,
    },

    /// Run every classifier.
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Report every principal, not only admins.
        #[arg(long)]
        include_all: bool,

        /// Directory for the per-classifier CSV reports.
        #[arg(long, default_value = ".")]
        output_dir: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long)]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "mail.inbox_rules") or code (e.g., "external_forward") to explain.
        identifier: String,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors (including a bare invocation) exit 1; --help and --version exit 0.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Commands::MailRules {
            ref scan,
            ref output,
        } => cmd_scan(
            &cli,
            scan,
            &[Category::MailRule],
            None,
            CsvFileSink::File(output.clone()),
        ),
        Commands::Identity {
            ref scan,
            include_all,
            ref output,
        } => cmd_scan(
            &cli,
            scan,
            &[Category::Identity],
            include_all.then_some(true),
            CsvFileSink::File(output.clone()),
        ),
        Commands::HostAudit {
            ref scan,
            ref output,
        } => cmd_scan(
            &cli,
            scan,
            &[Category::HostAudit],
            None,
            CsvFileSink::File(output.clone()),
        ),
        Commands::MailDomains {
            ref scan,
            ref output,
        } => cmd_scan(
            &cli,
            scan,
            &[Category::MailDomain],
            None,
            CsvFileSink::File(output.clone()),
        ),
        Commands::Scan {
            ref scan,
            include_all,
            ref output_dir,
        } => cmd_scan(
            &cli,
            scan,
            &Category::ALL,
            include_all.then_some(true),
            CsvFileSink::Directory(output_dir.clone()),
        ),
        Commands::Md {
            ref report,
            ref output,
        } => cmd_md(report, output.as_deref()),
        Commands::Explain { ref identifier } => cmd_explain(identifier),
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("postureguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("postureguard=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_scan(
    cli: &Cli,
    args: &ScanArgs,
    categories: &[Category],
    include_all: Option<bool>,
    sink: CsvFileSink,
) -> anyhow::Result<()> {
    let config_text = read_config(&cli.config)?;
    let selector = match &args.target {
        Some(pattern) if !args.all => TargetSelector::glob(pattern)?,
        _ => TargetSelector::All,
    };
    let source = SnapshotSource::load(&args.facts).context("load facts")?;

    let abort = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&abort);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "cannot install Ctrl-C handler");
    }

    let output = run_scan(ScanInput {
        sources: Sources::from_one(&source),
        config_text: &config_text,
        overrides: Overrides {
            include_all_principals: include_all,
            workers: cli.workers,
            timeout_secs: cli.timeout_secs,
        },
        categories: categories.to_vec(),
        selector,
        abort,
    })?;

    eprintln!("{}", summary_line(&output));

    match deliver(&output.outcome, categories, &sink).context("write csv report")? {
        Delivery::NoMatchingItems => eprintln!("postureguard: no matching items"),
        Delivery::Written { tables } => tracing::debug!(tables, "csv reports written"),
    }

    if let Some(path) = &args.json_out {
        write_report_file(path, &output.report).context("write report json")?;
    }
    if let Some(path) = &args.markdown_out {
        write_text_file(path, &render_markdown(&output.report)).context("write markdown")?;
    }

    Ok(())
}

/// A missing config file means defaults; any other read failure is an error.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    if !path.exists() {
        tracing::debug!(%path, "no config file; using defaults");
        return Ok(String::new());
    }
    std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
}

fn summary_line(output: &ScanOutput) -> String {
    let counts = &output.report.counts;
    let summary = output.outcome.summary();
    format!(
        "postureguard: {} findings ({} high, {} medium, {} info); {}/{} targets evaluated, \
         {} skipped, {} cancelled, {} warnings, {} degraded",
        output.report.data.findings_total,
        counts.high,
        counts.medium,
        counts.info,
        summary.targets_evaluated,
        summary.targets_total,
        summary.fetch_failures(),
        summary.cancelled(),
        summary.warnings.len(),
        summary.degraded.len(),
    )
}

fn write_report_file(path: &Utf8Path, report: &PostureReport) -> anyhow::Result<()> {
    let data = serialize_report(report)?;
    write_bytes(path, &data)
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes(path, text.as_bytes())
}

fn write_bytes(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data).with_context(|| format!("write: {path}"))?;
    tracing::info!(%path, "wrote");
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    match output {
        Some(out_path) => write_text_file(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }

    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}
