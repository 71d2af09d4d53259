//! The closed diagnostic code vocabulary.
//!
//! An unknown code is a protocol violation, not a warning to tolerate: the
//! wire envelope only ever carries members of [`DiagCode`], never a raw
//! `String`, so a caller pattern-matching on phase can't miss a variant.

use std::fmt;

/// Which pipeline stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Normalize,
    Compose,
    Generate,
    Repair,
    Validate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normalize => "normalize",
            Self::Compose => "compose",
            Self::Generate => "generate",
            Self::Repair => "repair",
            Self::Validate => "validate",
        };
        write!(f, "{s}")
    }
}

/// The closed set of diagnostic codes. Variants documented as "strong"
/// semantically prove a subtree admits no valid instance; everything else
/// is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagCode {
    /// Strong: numeric bounds cross or meet under exclusivity, or the
    /// integer-restricted domain is empty.
    UnsatNumericBounds,
    /// Strong when `disjointness: provable`, otherwise carried as an
    /// `unsatHints` entry with `provable=false`.
    ContainsUnsatBySum,
    /// A `patternProperties`/`propertyNames` key universe is provably
    /// infinite or exceeds the enumeration cap; `enumerate()` is absent.
    ComplexityCapEnum,
    /// Pattern-witness search aborted because the regex product automaton
    /// exceeded its state budget.
    ComplexityCapPatterns,
    /// A pattern uses lookaround or a backreference, outside the supported
    /// sublanguage.
    LookaroundOrBackref,
    /// The bounded repair loop exhausted its stagnation budget without
    /// reaching a passing score.
    UnsatBudgetExhausted,
    /// A `$ref` could not be resolved (locally or externally).
    UnresolvedReference,
    /// An external `$ref` resolution was skipped under lax mode.
    ExternalRefSkippedLax,
    /// A closed-enum rename needed a must-cover coverage entry that compose
    /// never populated for this canonical path.
    MustCoverIndexMissing,
    /// A rename candidate failed its `unevaluatedProperties` evaluation
    /// guard and the loop advanced to the next candidate.
    RepairEvalGuardFail,
    /// Every rename candidate was tried and rejected; the preflight gave up.
    RepairRenamePreflightFail,
    /// `oneOf` branches lack a discriminant; a per-branch `exclusivityRand`
    /// broke the tie deterministically.
    OneOfExclusivityTieBreak,
    /// `if/then/else` was resolved by the if-aware-lite heuristic instead of
    /// full conditional evaluation.
    IfAwareHintApplied,
    /// A required property was generated by resolving `properties` through
    /// an `allOf` branch (optionally behind a `$ref`) rather than directly.
    EvalTracePropSource,
}

impl DiagCode {
    /// `true` for codes that semantically prove a subtree is unsatisfiable.
    #[must_use]
    pub fn is_strong_unsat(self) -> bool {
        matches!(self, Self::UnsatNumericBounds | Self::ContainsUnsatBySum)
    }
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnsatNumericBounds => "UNSAT_NUMERIC_BOUNDS",
            Self::ContainsUnsatBySum => "CONTAINS_UNSAT_BY_SUM",
            Self::ComplexityCapEnum => "COMPLEXITY_CAP_ENUM",
            Self::ComplexityCapPatterns => "COMPLEXITY_CAP_PATTERNS",
            Self::LookaroundOrBackref => "LOOKAROUND_OR_BACKREF",
            Self::UnsatBudgetExhausted => "UNSAT_BUDGET_EXHAUSTED",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::ExternalRefSkippedLax => "EXTERNAL_REF_SKIPPED_LAX",
            Self::MustCoverIndexMissing => "MUSTCOVER_INDEX_MISSING",
            Self::RepairEvalGuardFail => "REPAIR_EVAL_GUARD_FAIL",
            Self::RepairRenamePreflightFail => "REPAIR_RENAME_PREFLIGHT_FAIL",
            Self::OneOfExclusivityTieBreak => "ONEOF_EXCLUSIVITY_TIE_BREAK",
            Self::IfAwareHintApplied => "IF_AWARE_HINT_APPLIED",
            Self::EvalTracePropSource => "EVALTRACE_PROP_SOURCE",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_unsat_classification() {
        assert!(DiagCode::UnsatNumericBounds.is_strong_unsat());
        assert!(DiagCode::ContainsUnsatBySum.is_strong_unsat());
        assert!(!DiagCode::ComplexityCapEnum.is_strong_unsat());
    }

    #[test]
    fn display_matches_wire_vocabulary() {
        assert_eq!(DiagCode::UnsatNumericBounds.to_string(), "UNSAT_NUMERIC_BOUNDS");
        assert_eq!(Phase::Compose.to_string(), "compose");
    }
}
