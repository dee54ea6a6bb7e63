use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};

/// Which targets a run covers: all of them, or those matching one glob.
#[derive(Clone, Debug)]
pub enum TargetSelector {
    All,
    Matching(GlobMatcher),
}

impl TargetSelector {
    /// Target keys compare case-insensitively (`Alice@Corp.com` matches `alice@*`).
    pub fn glob(pattern: &str) -> anyhow::Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(false)
            .build()
            .with_context(|| format!("invalid target pattern: {pattern}"))?;
        Ok(TargetSelector::Matching(glob.compile_matcher()))
    }

    pub fn matches(&self, target: &str) -> bool {
        match self {
            TargetSelector::All => true,
            TargetSelector::Matching(m) => m.is_match(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_wildcard_patterns() {
        let one = TargetSelector::glob("alice@corp.com").expect("glob");
        assert!(one.matches("Alice@Corp.com"));
        assert!(!one.matches("bob@corp.com"));

        let domain = TargetSelector::glob("*@corp.com").expect("glob");
        assert!(domain.matches("bob@corp.com"));
        assert!(!domain.matches("bob@evil.com"));

        let logs = TargetSelector::glob("WS*").expect("glob");
        assert!(logs.matches("ws01"));

        assert!(TargetSelector::All.matches("anything"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = TargetSelector::glob("[unclosed").expect_err("invalid");
        assert!(err.to_string().contains("invalid target pattern"));
    }
}
