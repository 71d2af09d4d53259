//! Coverage evaluation: pair planned targets against the events generation
//! actually produced, and roll the result up by dimension and operation.

use std::collections::{BTreeMap, BTreeSet};

use crate::generate::CoverageEvent;
use crate::planner::CoverageTarget;

/// Whether a single target was exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetStatus {
    Covered,
    Uncovered,
    /// Rooted under a schema location compose proved fatally unsatisfiable.
    /// Recorded raw but excluded from the coverage ratio's denominator.
    Unreachable,
}

/// One target's evaluated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    pub target: CoverageTarget,
    pub status: TargetStatus,
}

/// Aggregate coverage counts for one grouping key (a dimension or an
/// operation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageCounts {
    pub covered: usize,
    pub total: usize,
}

/// Overall run coverage, rolled up three ways.
#[derive(Debug, Clone, Default)]
pub struct EvaluationResult {
    pub overall: CoverageCounts,
    pub by_dimension: BTreeMap<&'static str, CoverageCounts>,
    pub by_operation: BTreeMap<String, CoverageCounts>,
    pub targets: Vec<TargetResult>,
}

impl EvaluationResult {
    /// `targets` left uncovered, sorted by target id for a deterministic
    /// report ordering.
    #[must_use]
    pub fn uncovered_targets(&self) -> Vec<&CoverageTarget> {
        let mut uncovered: Vec<&CoverageTarget> =
            self.targets.iter().filter(|t| t.status == TargetStatus::Uncovered).map(|t| &t.target).collect();
        uncovered.sort_by(|a, b| a.id.cmp(&b.id));
        uncovered
    }

    /// `true` only if every planned target (after `exclude_unreachable`
    /// filtering upstream) was covered.
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.overall.total == 0 || self.overall.covered == self.overall.total
    }

    /// Raw per-status target counts, computed before `exclude_unreachable`
    /// drops anything from the coverage ratio's denominator.
    #[must_use]
    pub fn targets_by_status(&self) -> BTreeMap<TargetStatus, usize> {
        let mut counts = BTreeMap::new();
        for target in &self.targets {
            *counts.entry(target.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Evaluate `targets` against the coverage `events` generation recorded.
///
/// A target is covered when some event shares its `(canon_path, dimension,
/// operation_key)` triple. `exclude_unreachable` drops targets rooted under
/// a schema location known to be fatally unsatisfiable (the caller passes
/// the set of such canon paths, derived from the compose diagnostics).
#[must_use]
pub fn evaluate(targets: &[CoverageTarget], events: &[CoverageEvent], unreachable_canon_paths: &BTreeSet<String>) -> EvaluationResult {
    let covered_keys: BTreeSet<(String, &'static str, String)> =
        events.iter().map(|e| (e.canon_path.as_fragment(), e.dimension, e.operation_key.clone())).collect();

    let mut result = EvaluationResult::default();
    for target in targets {
        if unreachable_canon_paths.contains(&target.canon_path.as_fragment()) {
            result.targets.push(TargetResult { target: target.clone(), status: TargetStatus::Unreachable });
            continue;
        }
        let key = (target.canon_path.as_fragment(), target.dimension, target.operation_key.clone());
        let status = if covered_keys.contains(&key) { TargetStatus::Covered } else { TargetStatus::Uncovered };

        result.overall.total += 1;
        let dimension_counts = result.by_dimension.entry(target.dimension).or_default();
        dimension_counts.total += 1;
        let operation_counts = result.by_operation.entry(target.operation_key.clone()).or_default();
        operation_counts.total += 1;

        if status == TargetStatus::Covered {
            result.overall.covered += 1;
            dimension_counts.covered += 1;
            operation_counts.covered += 1;
        }

        result.targets.push(TargetResult { target: target.clone(), status });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_core::pointer::Pointer;

    fn target(operation_key: &str) -> CoverageTarget {
        CoverageTarget { id: format!("cov:1:1:{operation_key}"), dimension: "structure", canon_path: Pointer::root(), operation_key: operation_key.to_string() }
    }

    fn event(operation_key: &str) -> CoverageEvent {
        CoverageEvent { canon_path: Pointer::root(), dimension: "structure", operation_key: operation_key.to_string(), instance_path: Pointer::root() }
    }

    #[test]
    fn matching_event_covers_its_target() {
        let targets = vec![target("required:a")];
        let events = vec![event("required:a")];
        let result = evaluate(&targets, &events, &BTreeSet::new());
        assert!(result.is_fully_covered());
        assert_eq!(result.overall, CoverageCounts { covered: 1, total: 1 });
    }

    #[test]
    fn unmatched_target_is_uncovered() {
        let targets = vec![target("required:a"), target("required:b")];
        let events = vec![event("required:a")];
        let result = evaluate(&targets, &events, &BTreeSet::new());
        assert!(!result.is_fully_covered());
        assert_eq!(result.uncovered_targets().len(), 1);
        assert_eq!(result.uncovered_targets()[0].operation_key, "required:b");
    }

    #[test]
    fn unreachable_targets_are_excluded_from_the_ratio_but_retained_raw() {
        let targets = vec![target("required:a")];
        let mut unreachable = BTreeSet::new();
        unreachable.insert(Pointer::root().as_fragment());
        let result = evaluate(&targets, &[], &unreachable);
        assert_eq!(result.overall.total, 0);
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].status, TargetStatus::Unreachable);
        assert_eq!(result.targets_by_status().get(&TargetStatus::Unreachable), Some(&1));
    }
}
