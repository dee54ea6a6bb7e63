use thiserror::Error;

/// Failure taxonomy shared by collectors and use cases.
///
/// Only [`PostureError::Connection`] is run-fatal. Every other variant is recovered
/// at the level of a single target or artifact. Field-level parse problems never
/// become errors; the normalizer reports them as warnings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostureError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("cannot fetch facts for {target}: {reason}")]
    TargetFetch { target: String, reason: String },

    #[error("cannot write report {path}: {reason}")]
    Write { path: String, reason: String },
}

impl PostureError {
    pub fn target_fetch(target: impl Into<String>, reason: impl Into<String>) -> Self {
        PostureError::TargetFetch {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, PostureError::Connection(_))
    }
}
