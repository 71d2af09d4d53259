//! Canonicalization: source schema -> canonical arena + pointer map.
//!
//! See [`normalize`] for the entry point and [`schema::CanonicalSchema`]
//! for the arena shape downstream stages consume.

pub mod dialect;
pub mod normalize;
pub mod notes;
pub mod schema;

pub use dialect::{keyword_table, Dialect, KeywordTable};
pub use normalize::{normalize, NormalizeFailure, NormalizeOptions, NormalizeResult};
pub use notes::Note;
pub use schema::{CanonicalSchema, NodeId, SchemaNode};
