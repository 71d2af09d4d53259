//! The diagnostic envelope: `(code, canonPath, provable?, details?, phase)`
//! tuples, partitioned by severity for cheap short-circuit checks.

use serde_json::Value;

use crate::pointer::Pointer;

use super::codes::{DiagCode, Phase};

/// One diagnostic emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub canon_path: Pointer,
    pub phase: Phase,
    /// `Some` only for codes whose unsatisfiability claim can be proven or
    /// refuted independently (e.g. `CONTAINS_UNSAT_BY_SUM`'s disjointness
    /// proof); absent for codes where the notion doesn't apply.
    pub provable: Option<bool>,
    pub details: Option<Value>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(code: DiagCode, canon_path: Pointer, phase: Phase) -> Self {
        Self { code, canon_path, phase, provable: None, details: None }
    }

    #[must_use]
    pub fn with_provable(mut self, provable: bool) -> Self {
        self.provable = Some(provable);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// A diagnostic counts as an *unsatisfiable* proof if it's one of the
    /// strong codes, or if it carries an explicit `provable: true`.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.code.is_strong_unsat() || self.provable == Some(true)
    }
}

/// The diagnostics produced across the whole pipeline run, partitioned by
/// whether they're fatal (proven UNSAT), advisory warnings, non-provable
/// `unsatHints` kept for visibility without blocking generation, or purely
/// informational notes about a heuristic the run took (`run`).
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsEnvelope {
    pub fatal: Vec<Diagnostic>,
    pub warn: Vec<Diagnostic>,
    pub unsat_hints: Vec<Diagnostic>,
    pub run: Vec<Diagnostic>,
}

impl DiagnosticsEnvelope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File `diagnostic` into the correct partition based on its strength.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_unsatisfiable() {
            self.fatal.push(diagnostic);
        } else if diagnostic.provable == Some(false) {
            self.unsat_hints.push(diagnostic);
        } else {
            self.warn.push(diagnostic);
        }
    }

    /// Record a purely informational diagnostic that never affects
    /// satisfiability classification (e.g. `EVALTRACE_PROP_SOURCE`,
    /// `IF_AWARE_HINT_APPLIED`), bypassing `record`'s severity routing.
    pub fn record_run(&mut self, diagnostic: Diagnostic) {
        self.run.push(diagnostic);
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        !self.fatal.is_empty()
    }

    pub fn merge(&mut self, other: Self) {
        self.fatal.extend(other.fatal);
        self.warn.extend(other.warn);
        self.unsat_hints.extend(other.unsat_hints);
        self.run.extend(other.run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_code_files_as_fatal() {
        let mut envelope = DiagnosticsEnvelope::new();
        envelope.record(Diagnostic::new(DiagCode::UnsatNumericBounds, Pointer::root(), Phase::Compose));
        assert!(envelope.has_fatal());
        assert_eq!(envelope.fatal.len(), 1);
    }

    #[test]
    fn non_provable_hint_files_separately() {
        let mut envelope = DiagnosticsEnvelope::new();
        let diag = Diagnostic::new(DiagCode::ContainsUnsatBySum, Pointer::root(), Phase::Compose).with_provable(false);
        envelope.record(diag);
        assert!(!envelope.has_fatal());
        assert_eq!(envelope.unsat_hints.len(), 1);
    }

    #[test]
    fn advisory_warning_files_as_warn() {
        let mut envelope = DiagnosticsEnvelope::new();
        envelope.record(Diagnostic::new(DiagCode::ComplexityCapEnum, Pointer::root(), Phase::Compose));
        assert_eq!(envelope.warn.len(), 1);
        assert!(!envelope.has_fatal());
    }

    #[test]
    fn merge_concatenates_all_partitions() {
        let mut a = DiagnosticsEnvelope::new();
        a.record(Diagnostic::new(DiagCode::ComplexityCapEnum, Pointer::root(), Phase::Compose));
        let mut b = DiagnosticsEnvelope::new();
        b.record(Diagnostic::new(DiagCode::UnsatNumericBounds, Pointer::root(), Phase::Compose));
        a.merge(b);
        assert_eq!(a.warn.len(), 1);
        assert_eq!(a.fatal.len(), 1);
    }
}
