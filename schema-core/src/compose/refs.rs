//! External `$ref` resolution hooked into the compose walk.

use crate::diag::{DiagCode, Diagnostic, Phase};
use crate::pointer::Pointer;
use crate::resolve::{ResolveFailure, Resolver};

/// Whether an unresolved external `$ref` is fatal or merely a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMode {
    Strict,
    Lax,
}

/// Resolve `uri` at `canon_path` through `resolver`, producing a diagnostic
/// appropriate for `mode` on failure. `Ok(None)` is never returned: either
/// the body comes back, or a diagnostic explains why it didn't.
pub fn resolve_external(resolver: &dyn Resolver, uri: &str, canon_path: &Pointer, mode: RefMode) -> Result<Vec<u8>, Diagnostic> {
    match resolver.resolve(uri) {
        Ok(doc) => Ok(doc.body),
        Err(failure) => Err(unresolved_diagnostic(uri, canon_path, mode, &failure)),
    }
}

fn unresolved_diagnostic(uri: &str, canon_path: &Pointer, mode: RefMode, failure: &ResolveFailure) -> Diagnostic {
    let code = match mode {
        RefMode::Strict => DiagCode::UnresolvedReference,
        RefMode::Lax => DiagCode::ExternalRefSkippedLax,
    };
    Diagnostic::new(code, canon_path.clone(), Phase::Compose)
        .with_details(serde_json::json!({"uri": uri, "reason": failure.to_string()}))
}
