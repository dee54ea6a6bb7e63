//! Pure risk classification (no IO).
//!
//! Input: raw facts handed over by a collector, normalized here.
//! Output: findings + run summary, in a deterministic order.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod normalize;
pub mod policy;
pub mod report;

mod engine;
mod fingerprint;
pub mod checks;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{AggregateOutcome, aggregate, compare_findings};
