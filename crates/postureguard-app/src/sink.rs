//! Report sinks: where the tabular reports go once a run has findings.

use camino::{Utf8Path, Utf8PathBuf};
use postureguard_domain::AggregateOutcome;
use postureguard_render::{Table, render_csv, table_for};
use postureguard_types::{Category, PostureError};

pub trait ReportSink {
    fn write_table(&self, category: Category, table: &Table) -> Result<(), PostureError>;
}

/// What [`deliver`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing matched; the sink was never called.
    NoMatchingItems,
    Written { tables: usize },
}

/// Hand one table per category that produced findings to `sink`.
pub fn deliver(
    outcome: &AggregateOutcome,
    categories: &[Category],
    sink: &dyn ReportSink,
) -> Result<Delivery, PostureError> {
    let AggregateOutcome::Findings(report) = outcome else {
        return Ok(Delivery::NoMatchingItems);
    };

    let mut tables = 0;
    for category in categories {
        let table = table_for(*category, &report.findings);
        if table.rows.is_empty() {
            continue;
        }
        sink.write_table(*category, &table)?;
        tables += 1;
    }
    Ok(Delivery::Written { tables })
}

pub fn default_file_name(category: Category) -> &'static str {
    match category {
        Category::MailRule => "mail_rules.csv",
        Category::Identity => "identity_mfa.csv",
        Category::HostAudit => "host_audit.csv",
        Category::MailDomain => "mail_domains.csv",
    }
}

/// Writes CSV files, either to one fixed path or one file per category in a directory.
#[derive(Clone, Debug)]
pub enum CsvFileSink {
    File(Utf8PathBuf),
    Directory(Utf8PathBuf),
}

impl CsvFileSink {
    fn path_for(&self, category: Category) -> Utf8PathBuf {
        match self {
            CsvFileSink::File(path) => path.clone(),
            CsvFileSink::Directory(dir) => dir.join(default_file_name(category)),
        }
    }
}

impl ReportSink for CsvFileSink {
    fn write_table(&self, category: Category, table: &Table) -> Result<(), PostureError> {
        let path = self.path_for(category);
        write_file(&path, &render_csv(table))?;
        tracing::info!(%path, rows = table.rows.len(), "wrote {} report", category.as_str());
        Ok(())
    }
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), PostureError> {
    let fail = |e: std::io::Error| PostureError::Write {
        path: path.to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    std::fs::write(path, contents).map_err(fail)
}
