//! Anchored-subset lifting: deciding whether a pattern can be replaced by
//! an explicit, enumerated set of literals instead of driving generation
//! through the automaton every time a matching value is needed.
//!
//! Lifting only applies to fully anchored (`^...$`), finite, non-empty
//! languages under the complexity cap; anything else is refused with a
//! reason a caller can surface as a diagnostic rather than silently
//! falling back to slow per-value automaton walks.

use super::dfa;
use super::enumerate::{enumerate, EnumerateBudget};
use super::nfa;
use super::parser::{parse, ParseError};
use super::product;

/// What a successful lift produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftKind {
    /// The pattern's language was enumerated in full as a closed set of literals.
    ClosedEnum,
    /// No lift was attempted or it failed; see `refusal` on [`LiftOutcome`].
    Unliftable,
}

/// Why a pattern could not be lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// The pattern uses lookaround or a backreference, outside the
    /// supported sublanguage entirely.
    LookaroundOrBackref,
    /// The pattern's automaton (or enumeration of it) exceeded the
    /// configured state/candidate budget.
    ComplexityCap,
    /// The pattern parses but isn't a fully anchored, finite language
    /// (e.g. unanchored, or accepts infinitely many strings).
    NotSimpleEnough,
}

/// The result of attempting to lift a pattern to a closed enum.
#[derive(Debug, Clone)]
pub struct LiftOutcome {
    pub can_lift: bool,
    pub kind: LiftKind,
    /// A lightweight, non-authoritative classification tag (e.g. `"lifted"`),
    /// reserved for callers that want to group lifted patterns; absent when
    /// lifting fails.
    pub family: Option<String>,
    /// The enumerated literals, present only when `can_lift` is `true`.
    pub lifted_source: Option<Vec<String>>,
    pub refusal: Option<RefusalReason>,
}

impl LiftOutcome {
    fn refuse(reason: RefusalReason) -> Self {
        Self { can_lift: false, kind: LiftKind::Unliftable, family: None, lifted_source: None, refusal: Some(reason) }
    }
}

/// Complexity budget shared by DFA/product construction and enumeration.
#[derive(Debug, Clone, Copy)]
pub struct LiftBudget {
    pub max_states: usize,
    pub max_length: usize,
    pub max_candidates: usize,
}

impl Default for LiftBudget {
    fn default() -> Self {
        Self { max_states: 512, max_length: 32, max_candidates: 256 }
    }
}

/// Decide whether `pattern` can be lifted to an explicit set of literals.
#[must_use]
pub fn lift(pattern: &str, budget: LiftBudget) -> LiftOutcome {
    let parsed = match parse(pattern) {
        Ok(p) => p,
        Err(ParseError::Lookaround | ParseError::Backreference) => {
            return LiftOutcome::refuse(RefusalReason::LookaroundOrBackref);
        }
        Err(_) => return LiftOutcome::refuse(RefusalReason::NotSimpleEnough),
    };
    if !parsed.anchored_start || !parsed.anchored_end {
        return LiftOutcome::refuse(RefusalReason::NotSimpleEnough);
    }

    let n = nfa::compile(&parsed.ast);
    let d = dfa::compile(&n);
    let built = product::build(&[d], budget.max_states);
    let summary = built.summarize();
    if summary.caps_hit {
        return LiftOutcome::refuse(RefusalReason::ComplexityCap);
    }
    if summary.empty {
        return LiftOutcome { can_lift: true, kind: LiftKind::ClosedEnum, family: Some("lifted".to_string()), lifted_source: Some(Vec::new()), refusal: None };
    }
    if !summary.finite {
        return LiftOutcome::refuse(RefusalReason::NotSimpleEnough);
    }

    let probe = enumerate(&built, EnumerateBudget { max_length: budget.max_length, max_candidates: budget.max_candidates + 1 });
    if probe.len() > budget.max_candidates {
        return LiftOutcome::refuse(RefusalReason::ComplexityCap);
    }
    LiftOutcome { can_lift: true, kind: LiftKind::ClosedEnum, family: Some("lifted".to_string()), lifted_source: Some(probe), refusal: None }
}
