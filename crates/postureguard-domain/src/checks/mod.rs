mod audit_state;
pub mod host_audit;
pub mod identity;
pub mod mail_domain;
pub mod mail_rules;
mod risk;
mod utils;

pub use audit_state::{AuditSetting, parse_audit_state};
pub use risk::RiskAccumulator;
