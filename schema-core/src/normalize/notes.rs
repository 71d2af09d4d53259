//! Non-fatal observations emitted while canonicalizing a schema.

use crate::pointer::Pointer;

/// A non-fatal observation made during normalization. Unlike diagnostics
/// (`schema_core::diag`), notes never represent a defect in the schema --
/// only a transformation the normalizer applied or declined to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// A trivially-true member of `allOf`, or a trivially-false member of
    /// `allOf`/`anyOf`/`oneOf`, was dropped as a no-op.
    TrivialBranchUnwrapped { canon_path: Pointer },
    /// A bundled metaschema `$id` collided with a canonical dialect URL and
    /// was stripped to avoid ambiguous `$ref` resolution.
    BundleIdStripped { canon_path: Pointer, id: String },
    /// Both `definitions` and `$defs` were present at the same location;
    /// `$defs` entries win on name collision.
    DefinitionsDefsConflict { canon_path: Pointer, name: String },
    /// A `$ref` target could not be found anywhere in the document after
    /// relocation; left unresolved for the resolver stage to attempt.
    UnreachableRefTarget { canon_path: Pointer, reference: String },
}
