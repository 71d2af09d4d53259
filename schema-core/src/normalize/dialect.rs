//! Dialect detection and per-dialect keyword tables.
//!
//! JSON Schema renamed a handful of keywords across drafts (`definitions`
//! became `$defs`, `id` became `$id`) and changed `exclusiveMinimum`/
//! `exclusiveMaximum` from a boolean flag paired with `minimum`/`maximum`
//! (draft-04) to a standalone numeric keyword (draft-06+). Normalization
//! needs to know which shape it's looking at before it can canonicalize.

use serde_json::Value;

/// A supported JSON Schema dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    Draft202012,
}

impl Dialect {
    /// Detect from a `$schema` URL. Falls back to [`Dialect::Draft202012`]
    /// when `$schema` is absent or unrecognized -- the newest dialect is
    /// the most permissive keyword table superset, so unknown schemas are
    /// least likely to have a keyword silently misinterpreted.
    #[must_use]
    pub fn detect(schema: &Value) -> Self {
        let Some(url) = schema.get("$schema").and_then(Value::as_str) else {
            return Self::Draft202012;
        };
        if url.contains("draft-04") {
            Self::Draft4
        } else if url.contains("draft-06") {
            Self::Draft6
        } else if url.contains("draft-07") {
            Self::Draft7
        } else if url.contains("2019-09") {
            Self::Draft201909
        } else if url.contains("2020-12") {
            Self::Draft202012
        } else {
            Self::Draft202012
        }
    }

    /// The canonical `$schema` URL for this dialect, used for bundle-safety
    /// collision checks.
    #[must_use]
    pub fn canonical_url(self) -> &'static str {
        match self {
            Self::Draft4 => "http://json-schema.org/draft-04/schema#",
            Self::Draft6 => "http://json-schema.org/draft-06/schema#",
            Self::Draft7 => "http://json-schema.org/draft-07/schema#",
            Self::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }
}

/// A resolved per-dialect keyword table.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    pub definitions_keyword: &'static str,
    pub id_keyword: &'static str,
    pub exclusive_bounds_are_boolean: bool,
}

/// Resolve the keyword table for `dialect`.
#[must_use]
pub fn keyword_table(dialect: Dialect) -> KeywordTable {
    match dialect {
        Dialect::Draft4 => KeywordTable {
            definitions_keyword: "definitions",
            id_keyword: "id",
            exclusive_bounds_are_boolean: true,
        },
        Dialect::Draft6 | Dialect::Draft7 => KeywordTable {
            definitions_keyword: "definitions",
            id_keyword: "$id",
            exclusive_bounds_are_boolean: false,
        },
        Dialect::Draft201909 | Dialect::Draft202012 => KeywordTable {
            definitions_keyword: "$defs",
            id_keyword: "$id",
            exclusive_bounds_are_boolean: false,
        },
    }
}
