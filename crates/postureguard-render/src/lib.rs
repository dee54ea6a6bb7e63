//! Rendering for report artifacts (CSV tables, Markdown summaries).

#![forbid(unsafe_code)]

mod csv;
mod markdown;
mod table;

pub use csv::render_csv;
pub use markdown::render_markdown;
pub use table::{
    AUDIT_COLUMNS, IDENTITY_COLUMNS, MAIL_DOMAIN_COLUMNS, MAIL_RULE_COLUMNS, Table, columns_for,
    table_for,
};
