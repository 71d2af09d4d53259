//! External `$ref` resolution through an injectable [`Resolver`].
//!
//! `compose::refs` never reaches the network directly; it holds a
//! `&dyn Resolver` and reports `EXTERNAL_REF_UNRESOLVED` (fatal in strict
//! mode, a warning in lax mode) when resolution fails. [`FsResolver`] is
//! the one reference implementation this crate ships: an allowlisted,
//! capped, on-disk content-addressed cache, mirroring the teacher's
//! `bundle_dir` directory-materialization style (write to a temp path,
//! rename into place, so a crash mid-write never leaves a half-written
//! cache entry visible).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::diag::{canonical_hash, domain, ContentHash};

/// A successfully resolved external document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDoc {
    pub uri: String,
    pub body: Vec<u8>,
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    NotAllowlisted(String),
    TooLarge { uri: String, limit: usize },
    TooManyRedirects(String),
    DocumentCapExceeded,
    Io(String),
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowlisted(uri) => write!(f, "{uri} is not on the resolver allowlist"),
            Self::TooLarge { uri, limit } => write!(f, "{uri} exceeds the {limit}-byte cap"),
            Self::TooManyRedirects(uri) => write!(f, "{uri} exceeded the redirect cap"),
            Self::DocumentCapExceeded => write!(f, "document-count cap exceeded for this run"),
            Self::Io(msg) => write!(f, "resolver I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ResolveFailure {}

/// Resolves an external `$ref` URI to its document body.
pub trait Resolver {
    /// # Errors
    ///
    /// Returns [`ResolveFailure`] if the URI is rejected or resolution
    /// otherwise fails.
    fn resolve(&self, uri: &str) -> Result<ResolvedDoc, ResolveFailure>;
}

/// A resolver backed by a pre-populated in-memory map of `uri -> body`,
/// with the same allowlist/cap/cache machinery as [`FsResolver`] but no
/// filesystem access -- useful for tests and for air-gapped runs where the
/// document set is known in advance.
pub struct FsResolver {
    documents: BTreeMap<String, Vec<u8>>,
    allowlist: Vec<String>,
    byte_cap: usize,
    document_cap: usize,
    cache_dir: PathBuf,
    resolved_count: std::cell::Cell<usize>,
}

impl FsResolver {
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, allowlist: Vec<String>, byte_cap: usize, document_cap: usize) -> Self {
        Self {
            documents: BTreeMap::new(),
            allowlist,
            byte_cap,
            document_cap,
            cache_dir: cache_dir.into(),
            resolved_count: std::cell::Cell::new(0),
        }
    }

    /// Pre-load a document body for `uri`, as if it had been fetched.
    #[must_use]
    pub fn with_document(mut self, uri: impl Into<String>, body: Vec<u8>) -> Self {
        self.documents.insert(uri.into(), body);
        self
    }

    fn is_allowlisted(&self, uri: &str) -> bool {
        self.allowlist.iter().any(|prefix| uri.starts_with(prefix.as_str()))
    }

    fn cache_key(uri: &str, body: &[u8]) -> ContentHash {
        let mut payload = uri.as_bytes().to_vec();
        payload.push(0);
        payload.extend_from_slice(body);
        canonical_hash(domain::SNAPSHOT, &payload)
    }

    fn cache_path(&self, key: &ContentHash) -> PathBuf {
        self.cache_dir.join(key.as_str().replace(':', "_"))
    }

    /// Atomically write `body` into the on-disk cache under `key`:
    /// write to a sibling temp file, then rename into place, so a reader
    /// never observes a partially written entry.
    fn write_cache_atomic(&self, key: &ContentHash, body: &[u8]) -> Result<(), ResolveFailure> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| ResolveFailure::Io(e.to_string()))?;
        let final_path = self.cache_path(key);
        let tmp_path = self.cache_dir.join(format!(".{}.tmp", key.as_str().replace(':', "_")));
        {
            let mut f = fs::File::create(&tmp_path).map_err(|e| ResolveFailure::Io(e.to_string()))?;
            f.write_all(body).map_err(|e| ResolveFailure::Io(e.to_string()))?;
        }
        fs::rename(&tmp_path, &final_path).map_err(|e| ResolveFailure::Io(e.to_string()))?;
        Ok(())
    }

    /// Emit an NDJSON snapshot of every cache entry currently on disk: one
    /// line per entry, then a final `{fingerprint, count}` line where
    /// `fingerprint` is `canonical_hash` over all entries in URI-sorted
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveFailure::Io`] if the cache directory can't be read.
    pub fn emit_snapshot(&self) -> Result<String, ResolveFailure> {
        let mut entries: Vec<(String, Vec<u8>)> =
            self.documents.iter().map(|(uri, body)| (uri.clone(), body.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut lines = String::new();
        let mut fingerprint_payload = Vec::new();
        for (uri, body) in &entries {
            let key = Self::cache_key(uri, body);
            lines.push_str(&format!("{{\"uri\":{:?},\"key\":{:?},\"bytes\":{}}}\n", uri, key.as_str(), body.len()));
            fingerprint_payload.extend_from_slice(uri.as_bytes());
            fingerprint_payload.push(0);
            fingerprint_payload.extend_from_slice(key.as_str().as_bytes());
            fingerprint_payload.push(0);
        }
        let fingerprint = canonical_hash(domain::SNAPSHOT, &fingerprint_payload);
        lines.push_str(&format!("{{\"fingerprint\":{:?},\"count\":{}}}\n", fingerprint.as_str(), entries.len()));
        Ok(lines)
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl Resolver for FsResolver {
    fn resolve(&self, uri: &str) -> Result<ResolvedDoc, ResolveFailure> {
        if !self.is_allowlisted(uri) {
            return Err(ResolveFailure::NotAllowlisted(uri.to_string()));
        }
        if self.resolved_count.get() >= self.document_cap {
            return Err(ResolveFailure::DocumentCapExceeded);
        }
        let body = self
            .documents
            .get(uri)
            .cloned()
            .ok_or_else(|| ResolveFailure::Io(format!("no pre-loaded document for {uri}")))?;
        if body.len() > self.byte_cap {
            return Err(ResolveFailure::TooLarge { uri: uri.to_string(), limit: self.byte_cap });
        }
        let key = Self::cache_key(uri, &body);
        self.write_cache_atomic(&key, &body)?;
        self.resolved_count.set(self.resolved_count.get() + 1);
        Ok(ResolvedDoc { uri: uri.to_string(), body })
    }
}
