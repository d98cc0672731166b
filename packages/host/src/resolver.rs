//! Module resolution: specifier (as authored in an `import`/`<import from>`) to an
//! absolute file identity. File I/O itself is an external collaborator.

use viewc_core::ids::DocumentUri;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NotFound,
    Ambiguous(Vec<DocumentUri>),
}

pub trait ModuleResolver {
    fn resolve(&self, specifier: &str, from_file: &DocumentUri) -> Result<DocumentUri, ResolveError>;

    /// Sibling-file convention lookup (`foo.ts` -> `foo.html`), used by the convention
    /// recognizer and by `.define()`'s implicit sibling-template rule.
    fn sibling(&self, file: &DocumentUri, extension: &str) -> Option<DocumentUri>;
}
