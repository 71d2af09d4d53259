//! JSON Pointer (RFC 6901) and the canonical/origin bijection.
//!
//! The normalizer relocates and rewrites subtrees while canonicalizing a
//! schema. Every relocation is recorded here so that a canonical location
//! can always be traced back to where it came from in the source document,
//! and vice versa. The bijection on the `canon` side is enforced at
//! construction time (a canonical pointer is produced by exactly one
//! normalization step), the same way the teacher's `RegistryV1` proves its
//! `Code32 <-> ConceptID` bijection at construction time instead of hoping
//! callers never violate it.

use std::collections::BTreeMap;
use std::fmt;

/// A single RFC 6901 JSON Pointer, stored as its decoded reference tokens.
///
/// Tokens are kept decoded (not `~0`/`~1`-escaped) internally; escaping only
/// happens when rendering [`Pointer::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// The root pointer (`#` / `""`).
    #[must_use]
    pub fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Append one reference token (unescaped form) and return the new pointer.
    #[must_use]
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Append an array index token.
    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        self.child(i.to_string())
    }

    /// Decoded reference tokens, in order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// `true` for the root pointer.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parse a pointer from its JSON Pointer string form (e.g.
    /// `"/properties/foo/items"`), with an optional leading `#`.
    ///
    /// Returns `None` on a malformed escape sequence (`~` not followed by
    /// `0` or `1`) or a pointer that doesn't start with `/` or `#`/empty.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let body = s.strip_prefix('#').unwrap_or(s);
        if body.is_empty() {
            return Some(Self::root());
        }
        if !body.starts_with('/') {
            return None;
        }
        let mut tokens = Vec::new();
        for raw in body[1..].split('/') {
            tokens.push(unescape_token(raw)?);
        }
        Some(Self { tokens })
    }

    /// Render as a JSON Pointer string, without a leading `#`.
    #[must_use]
    pub fn as_str(&self) -> String {
        let mut out = String::new();
        for t in &self.tokens {
            out.push('/');
            escape_token_into(t, &mut out);
        }
        out
    }

    /// Render as a URI fragment form (`#/properties/foo`), `"#"` at root.
    #[must_use]
    pub fn as_fragment(&self) -> String {
        if self.is_root() {
            "#".to_string()
        } else {
            format!("#{}", self.as_str())
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_fragment())
    }
}

fn unescape_token(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn escape_token_into(token: &str, out: &mut String) {
    for c in token.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            _ => out.push(c),
        }
    }
}

/// Error for [`PointerMap`] construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerMapError {
    /// The same canonical pointer was inserted twice with different origins.
    DuplicateCanon { canon: Pointer, first_origin: Pointer, second_origin: Pointer },
}

impl fmt::Display for PointerMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCanon { canon, first_origin, second_origin } => write!(
                f,
                "canonical pointer {canon} already mapped to origin {first_origin}, cannot remap to {second_origin}"
            ),
        }
    }
}

impl std::error::Error for PointerMapError {}

/// Bijective map between canonical and origin JSON Pointers, plus the
/// one-to-many inverse kept in sorted order for deterministic enumeration.
///
/// Invariant (enforced at construction): every canonical pointer maps to
/// exactly one origin pointer. Multiple canonical pointers MAY map back to
/// the same origin pointer (e.g. a `$ref` target reached from two places),
/// which is why `origin_to_canon` is one-to-many.
#[derive(Debug, Clone, Default)]
pub struct PointerMap {
    canon_to_origin: BTreeMap<Pointer, Pointer>,
    origin_to_canon: BTreeMap<Pointer, Vec<Pointer>>,
}

impl PointerMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `canon` was produced from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`PointerMapError::DuplicateCanon`] if `canon` was already
    /// mapped to a *different* origin. Re-inserting the same
    /// `(canon, origin)` pair is idempotent.
    pub fn insert(&mut self, canon: Pointer, origin: Pointer) -> Result<(), PointerMapError> {
        if let Some(existing) = self.canon_to_origin.get(&canon) {
            if *existing != origin {
                return Err(PointerMapError::DuplicateCanon {
                    canon,
                    first_origin: existing.clone(),
                    second_origin: origin,
                });
            }
            return Ok(());
        }
        self.canon_to_origin.insert(canon.clone(), origin.clone());
        let bucket = self.origin_to_canon.entry(origin).or_default();
        if !bucket.contains(&canon) {
            bucket.push(canon);
            bucket.sort();
        }
        Ok(())
    }

    /// The origin pointer for a canonical pointer, if recorded.
    #[must_use]
    pub fn origin_of(&self, canon: &Pointer) -> Option<&Pointer> {
        self.canon_to_origin.get(canon)
    }

    /// All canonical pointers that trace back to `origin`, sorted.
    #[must_use]
    pub fn canon_of(&self, origin: &Pointer) -> &[Pointer] {
        self.origin_to_canon
            .get(origin)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct canonical pointers recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.canon_to_origin.len()
    }

    /// `true` if no pointers have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canon_to_origin.is_empty()
    }

    /// Iterate `(canon, origin)` pairs in canonical-pointer sort order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &Pointer)> {
        self.canon_to_origin.iter()
    }
}
