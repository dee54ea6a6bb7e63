//! Use case orchestration for postureguard.
//!
//! This crate provides the application layer: use cases that coordinate the collect, domain,
//! and render layers. It is intentionally thin and delegates heavy lifting to those layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod report;
mod scan;
mod selector;
mod sink;

pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use report::{build_report, parse_report_json, render_markdown, serialize_report};
pub use scan::{ScanInput, ScanOutput, Sources, run_scan};
pub use selector::TargetSelector;
pub use sink::{CsvFileSink, Delivery, ReportSink, default_file_name, deliver};
