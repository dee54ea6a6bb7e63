use postureguard_types::Severity;

/// Accumulates severity across an ordered rule sequence.
///
/// Severity only ever moves up the lattice, and every applied rule leaves a reason
/// whether or not it changed the level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiskAccumulator {
    severity: Severity,
    reasons: Vec<String>,
}

impl RiskAccumulator {
    pub fn new(seed: Severity) -> Self {
        Self {
            severity: seed,
            reasons: Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Raise to at least `to` and record `reason`.
    pub fn raise(&mut self, to: Severity, reason: impl Into<String>) {
        self.severity = self.severity.max(to);
        self.reasons.push(reason.into());
    }

    /// Record `reason` without touching the severity.
    pub fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    pub fn finish(self) -> (Severity, Vec<String>) {
        (self.severity, self.reasons)
    }
}
