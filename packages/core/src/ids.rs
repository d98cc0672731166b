//! Branded identifiers and source spans.
//!
//! Corresponds to the identifier/span primitives carried by `parse_util.rs` in spirit
//! (`ParseSourceSpan`, `ParseLocation`) but flattened to plain integer offsets — this
//! system never needs line/column tracking beyond what editors recompute themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

macro_rules! branded_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                $name(raw)
            }
        }
    };
}

branded_id!(NodeId);
branded_id!(ExprId);
branded_id!(TemplateId);
branded_id!(FrameId);
branded_id!(SourceFileId);

/// A project-relative or absolute document path, canonicalized to forward slashes so
/// the same file never appears under two keys in the workspace's document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentUri(String);

impl DocumentUri {
    pub fn new(raw: impl AsRef<str>) -> Self {
        DocumentUri(canonicalize_uri(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File stem with the extension stripped, e.g. `foo` for `src/foo.html`.
    pub fn stem(&self) -> &str {
        let base = self.basename();
        base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base)
    }

    pub fn with_extension(&self, ext: &str) -> DocumentUri {
        let dir_end = self.0.rfind('/').map(|i| i + 1).unwrap_or(0);
        DocumentUri(format!("{}{}.{}", &self.0[..dir_end], self.stem(), ext))
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentUri {
    fn from(raw: &str) -> Self {
        DocumentUri::new(raw)
    }
}

impl From<String> for DocumentUri {
    fn from(raw: String) -> Self {
        DocumentUri::new(raw)
    }
}

fn canonicalize_uri(raw: &str) -> String {
    let replaced = raw.replace('\\', "/");
    let path = Path::new(&replaced);
    let mut out = PathBuf::new();
    for component in path.components() {
        out.push(component);
    }
    out.to_string_lossy().replace('\\', "/")
}

/// A resource scope's identity. Root is the fixed literal `"root"`; component-local
/// scopes are `local:<uri>`; local-template scopes are `local-template:<owner-uri>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceScopeId(String);

impl ResourceScopeId {
    pub const ROOT: &'static str = "root";

    pub fn root() -> Self {
        ResourceScopeId(Self::ROOT.to_string())
    }

    pub fn local(uri: &DocumentUri) -> Self {
        ResourceScopeId(format!("local:{}", uri.as_str()))
    }

    pub fn local_template(owner_uri: &DocumentUri, name: &str) -> Self {
        ResourceScopeId(format!("local-template:{}::{}", owner_uri.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }
}

impl fmt::Display for ResourceScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open integer interval `[start, end)` into the content of `file`, if known.
/// `file` is `None` for synthetic spans that do not trace back to authored source
/// (e.g. built-in resource definitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: Option<SourceFileId>,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: Option<SourceFileId>, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Span { file, start, end }
    }

    pub fn synthetic(start: u32, end: u32) -> Self {
        Span::new(None, start, end)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_offset(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.file == other.file && self.start < other.end && other.start < self.end
    }

    /// Length of the overlap between two spans on the same file, or 0 if disjoint.
    pub fn overlap_len(&self, other: &Span) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }

    pub fn slice(&self, text: &str) -> &str {
        &text[self.start as usize..self.end as usize]
    }
}

/// Interns source file paths so spans can carry a cheap `SourceFileId` instead of a
/// `String`. The authority holds exactly one of these for the lifetime of a workspace.
#[derive(Debug, Default)]
pub struct FileTable {
    paths: Vec<DocumentUri>,
}

impl FileTable {
    pub fn new() -> Self {
        FileTable { paths: Vec::new() }
    }

    pub fn intern(&mut self, uri: DocumentUri) -> SourceFileId {
        if let Some(pos) = self.paths.iter().position(|p| p == &uri) {
            return SourceFileId::new(pos as u32);
        }
        let id = SourceFileId::new(self.paths.len() as u32);
        self.paths.push(uri);
        id
    }

    pub fn path(&self, id: SourceFileId) -> Option<&DocumentUri> {
        self.paths.get(id.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_canonicalizes_backslashes() {
        let a = DocumentUri::new("src\\foo\\bar.html");
        let b = DocumentUri::new("src/foo/bar.html");
        assert_eq!(a, b);
    }

    #[test]
    fn uri_stem_and_basename() {
        let u = DocumentUri::new("src/foo/nav-bar.ts");
        assert_eq!(u.basename(), "nav-bar.ts");
        assert_eq!(u.stem(), "nav-bar");
        assert_eq!(u.with_extension("html").as_str(), "src/foo/nav-bar.html");
    }

    #[test]
    fn span_overlap_requires_same_file() {
        let a = Span::new(Some(SourceFileId::new(0)), 0, 10);
        let b = Span::new(Some(SourceFileId::new(1)), 0, 10);
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap_len(&b), 0);
    }

    #[test]
    fn span_overlap_len() {
        let a = Span::synthetic(0, 10);
        let b = Span::synthetic(5, 15);
        assert_eq!(a.overlap_len(&b), 5);
    }

    #[test]
    fn scope_id_formats() {
        let uri = DocumentUri::new("app.html");
        assert_eq!(ResourceScopeId::root().as_str(), "root");
        assert_eq!(ResourceScopeId::local(&uri).as_str(), "local:app.html");
        assert_eq!(
            ResourceScopeId::local_template(&uri, "local-card").as_str(),
            "local-template:app.html::local-card"
        );
    }

    #[test]
    fn file_table_interns_once() {
        let mut table = FileTable::new();
        let a = table.intern(DocumentUri::new("a.ts"));
        let b = table.intern(DocumentUri::new("a.ts"));
        let c = table.intern(DocumentUri::new("b.ts"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
