//! Repair world contract: an instance's schema, coverage index, and the
//! one caller-supplied extension point, a [`Validator`].

use std::collections::BTreeMap;

use serde_json::Value;

use schema_core::compose::CoverageEntry;
use schema_core::normalize::CanonicalSchema;
use schema_core::pointer::Pointer;

/// One validator-reported error against an instance.
///
/// `canon_path`/`instance_path` are already resolved through the
/// normalizer's `PointerMap` back to canonical schema locations; `params`
/// carries whatever keyword-specific detail the validator attached (e.g.
/// `{"limit": 10}` for a `maxLength` violation).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub keyword: String,
    pub canon_path: Pointer,
    pub instance_path: Pointer,
    pub params: Value,
}

/// The external validation oracle. Repair never re-implements JSON Schema
/// validation itself; it only drives a caller-supplied implementation to a
/// zero-error fixed point.
pub trait Validator {
    fn validate(&self, instance: &Value) -> Vec<ValidationError>;
}

/// Everything one repair run needs: the canonical schema, its composed
/// coverage index (for must-cover-gated rename candidates), and the
/// validator oracle.
pub trait RepairWorld {
    fn schema(&self) -> &CanonicalSchema;
    fn coverage_index(&self) -> &BTreeMap<Pointer, CoverageEntry>;
    fn validator(&self) -> &dyn Validator;
}
