//! Minimal in-memory reference implementations of every external-collaborator trait.
//! Not a production parser — just enough behavior for the other two crates' test
//! suites to drive the pipeline end to end without a real toolchain behind it.

use crate::expr::{ExprParseResult, ExprParser};
use crate::reflect::{ReflectedModule, VmReflection};
use crate::resolver::{ModuleResolver, ResolveError};
use crate::typecheck::{HostTypeChecker, OverlayDiagnostic, OverlayProgram};
use indexmap::IndexMap;
use std::cell::RefCell;
use viewc_core::expr_ast::ExprNode;
use viewc_core::ids::{DocumentUri, SourceFileId};

/// An in-memory project: a fixed mapping of `DocumentUri -> ReflectedModule` plus
/// sibling-resolution rules, used to back `ModuleResolver`/`VmReflection` in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryProject {
    pub modules: IndexMap<DocumentUri, ReflectedModule>,
    pub files: IndexMap<DocumentUri, ()>,
}

impl MemoryProject {
    pub fn new() -> Self {
        MemoryProject::default()
    }

    pub fn with_module(mut self, module: ReflectedModule) -> Self {
        self.files.insert(module.file.clone(), ());
        self.modules.insert(module.file.clone(), module);
        self
    }

    pub fn with_file(mut self, uri: DocumentUri) -> Self {
        self.files.insert(uri, ());
        self
    }
}

impl ModuleResolver for MemoryProject {
    fn resolve(&self, specifier: &str, from_file: &DocumentUri) -> Result<DocumentUri, ResolveError> {
        let dir_end = from_file.as_str().rfind('/').map(|i| i + 1).unwrap_or(0);
        let joined = format!("{}{}", &from_file.as_str()[..dir_end], specifier.trim_start_matches("./"));
        for ext in ["", ".ts", ".js"] {
            let candidate = DocumentUri::new(format!("{joined}{ext}"));
            if self.files.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        Err(ResolveError::NotFound)
    }

    fn sibling(&self, file: &DocumentUri, extension: &str) -> Option<DocumentUri> {
        let candidate = file.with_extension(extension);
        self.files.contains_key(&candidate).then_some(candidate)
    }
}

impl VmReflection for MemoryProject {
    fn reflect(&self, file: &DocumentUri) -> ReflectedModule {
        self.modules.get(file).cloned().unwrap_or_else(|| ReflectedModule {
            file: file.clone(),
            classes: vec![],
            calls: vec![],
            imports: vec![],
        })
    }

    fn get_root_vm_type_expr(&self, _file: &DocumentUri, class_name: &str) -> String {
        format!("InstanceType<typeof {class_name}>")
    }

    fn get_synthetic_prefix(&self) -> &str {
        "__au_overlay_"
    }
}

/// A deliberately simplistic expression "parser": recognizes bare identifiers and
/// dotted member chains, and treats anything else as a bad expression. Good enough to
/// exercise the link/bind stages' scope resolution in tests without a real parser.
#[derive(Debug, Default)]
pub struct MemoryExprParser;

impl ExprParser for MemoryExprParser {
    fn parse(&self, text: &str, offset: u32, file: Option<SourceFileId>) -> ExprParseResult {
        let trimmed = text.trim();
        let span = viewc_core::ids::Span::new(file, offset, offset + text.len() as u32);
        if trimmed.is_empty() || !is_simple_chain(trimmed) {
            return ExprParseResult {
                ast: ExprNode::BadExpression {
                    message: format!("could not parse expression: {trimmed}"),
                    span,
                },
                recovered: !is_simple_chain(trimmed),
            };
        }
        let mut parts = trimmed.split('.');
        let mut node = ExprNode::AccessScope {
            name: parts.next().unwrap().to_string(),
            ancestor: 0,
            span,
        };
        for part in parts {
            node = ExprNode::AccessMember {
                object: Box::new(node),
                name: part.to_string(),
                optional: false,
                span,
            };
        }
        ExprParseResult {
            ast: node,
            recovered: false,
        }
    }

    fn parse_for_of(&self, text: &str, offset: u32, file: Option<SourceFileId>) -> ExprParseResult {
        let span = viewc_core::ids::Span::new(file, offset, offset + text.len() as u32);
        match text.split_once(" of ") {
            Some((decl, iterable)) => {
                let decl = viewc_core::expr_ast::IteratorDeclaration::Identifier(decl.trim().to_string());
                let iter_result = self.parse(iterable.trim(), offset, file);
                ExprParseResult {
                    ast: ExprNode::ForOfStatement {
                        declaration: decl,
                        iterable: Box::new(iter_result.ast),
                        span,
                    },
                    recovered: iter_result.recovered,
                }
            }
            None => ExprParseResult {
                ast: ExprNode::BadExpression {
                    message: "expected 'of' in iterator declaration".to_string(),
                    span,
                },
                recovered: true,
            },
        }
    }
}

fn is_simple_chain(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|part| {
            !part.is_empty()
                && part.chars().next().map(|c| c.is_alphabetic() || c == '_' || c == '$').unwrap_or(false)
                && part.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// A type-checker stand-in that never produces diagnostics; records every program it
/// was asked to check for test assertions.
#[derive(Debug, Default)]
pub struct MemoryTypeChecker {
    pub checked: RefCell<Vec<OverlayProgram>>,
}

impl HostTypeChecker for MemoryTypeChecker {
    fn check(&self, overlay: &OverlayProgram) -> Vec<OverlayDiagnostic> {
        self.checked.borrow_mut().push(overlay.clone());
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_sibling_template() {
        let project = MemoryProject::new()
            .with_file(DocumentUri::new("src/foo.ts"))
            .with_file(DocumentUri::new("src/foo.html"));
        let sibling = project.sibling(&DocumentUri::new("src/foo.ts"), "html");
        assert_eq!(sibling, Some(DocumentUri::new("src/foo.html")));
    }

    #[test]
    fn parses_member_chain() {
        let parser = MemoryExprParser;
        let result = parser.parse("foo.bar", 0, None);
        assert!(!result.recovered);
        match result.ast {
            ExprNode::AccessMember { name, .. } => assert_eq!(name, "bar"),
            _ => panic!("expected member access"),
        }
    }

    #[test]
    fn malformed_expression_recovers() {
        let parser = MemoryExprParser;
        let result = parser.parse("foo(", 0, None);
        assert!(result.recovered);
        assert!(result.ast.is_bad());
    }
}
