//! Error scoring: the repair loop's acceptance signal.

use std::collections::BTreeSet;

use schema_core::diag::stable_params_key;

use crate::contract::ValidationError;

/// `(keyword, canonPath, instancePath, stableParamsKey)` -- the dedup key
/// for "how many distinct kinds of validator complaint remain", not a raw
/// error count (ten instances of the same complaint score as one).
pub type ErrorSignature = (String, String, String, String);

/// Compute the error signature for one validator error.
#[must_use]
pub fn signature(error: &ValidationError) -> ErrorSignature {
    (
        error.keyword.clone(),
        error.canon_path.as_fragment(),
        error.instance_path.as_fragment(),
        stable_params_key(&error.params).as_str().to_string(),
    )
}

/// Scores a set of validator errors for the repair loop's monotonicity
/// check: generalizes the teacher's `ValueScorer` from "candidate bonus"
/// to "post-action error count".
pub trait ErrorScorer {
    fn score(&self, errors: &[ValidationError]) -> u32;
}

/// Scores by count of distinct error signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctSignatureScorer;

impl ErrorScorer for DistinctSignatureScorer {
    fn score(&self, errors: &[ValidationError]) -> u32 {
        let signatures: BTreeSet<ErrorSignature> = errors.iter().map(signature).collect();
        u32::try_from(signatures.len()).unwrap_or(u32::MAX)
    }
}
