//! Project configuration (§11): `authority.json` replaces the teacher's
//! `tsconfig.json`/`angular.json` pair. Carries root file globs, the third-party
//! package scan toggle, and per-code diagnostic severity overrides.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::model::Severity;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse {path} as JSON: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
}

/// The `authority.json` shape. Every field has a default so a minimal `{}` is a valid
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorityConfig {
    /// Glob patterns (relative to the project root) for root source files to include
    /// in discovery.
    pub include: Vec<String>,
    /// Glob patterns excluded after `include` is expanded.
    pub exclude: Vec<String>,
    /// Whether discovery scans third-party `package.json` dependencies for resource
    /// registrations (§4.D.6). Disabling this trades completeness for speed on large
    /// `node_modules` trees.
    pub scan_third_party: bool,
    /// Per-code severity overrides layered onto the diagnostics runtime's defaults;
    /// a code absent here keeps whatever severity it was constructed with.
    pub severity_overrides: HashMap<String, Severity>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        AuthorityConfig {
            include: vec!["src/**/*.html".to_string(), "src/**/*.ts".to_string()],
            exclude: vec!["**/*.spec.ts".to_string()],
            scan_third_party: true,
            severity_overrides: HashMap::new(),
        }
    }
}

impl AuthorityConfig {
    pub fn severity_for(&self, code: &str, fallback: Severity) -> Severity {
        self.severity_overrides.get(code).copied().unwrap_or(fallback)
    }
}

/// Reads and parses `authority.json` from `project`, which may be a directory (in
/// which case `authority.json` is looked up inside it) or a direct path to the file
/// itself.
pub fn read_configuration(project: &Path) -> Result<AuthorityConfig, ConfigError> {
    let config_path = if project.is_dir() { project.join("authority.json") } else { project.to_path_buf() };
    if !config_path.exists() {
        return Err(ConfigError::NotFound(config_path));
    }
    let text = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;
    parse_configuration(&text, &config_path)
}

pub fn parse_configuration(text: &str, path: &Path) -> Result<AuthorityConfig, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Expands `config.include`/`exclude` against `project_root`, returning the sorted,
/// deduplicated set of root files discovery should scan. A pattern that fails to glob
/// (bad syntax, unreadable directory) contributes no paths rather than aborting the scan.
pub fn resolve_root_files(project_root: &Path, config: &AuthorityConfig) -> Vec<PathBuf> {
    let exclude_patterns: Vec<glob::Pattern> = config
        .exclude
        .iter()
        .filter_map(|pattern| glob::Pattern::new(&project_root.join(pattern).to_string_lossy()).ok())
        .collect();

    let mut matched: Vec<PathBuf> = config
        .include
        .iter()
        .filter_map(|pattern| glob::glob(&project_root.join(pattern).to_string_lossy()).ok())
        .flat_map(|paths| paths.flatten())
        .filter(|path| !exclude_patterns.iter().any(|pattern| pattern.matches_path(path)))
        .collect();

    matched.sort();
    matched.dedup();
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_parses_to_defaults() {
        let config = parse_configuration("{}", Path::new("authority.json")).unwrap();
        assert!(config.scan_third_party);
        assert!(config.include.iter().any(|p| p.ends_with(".html")));
    }

    #[test]
    fn severity_override_wins_over_fallback() {
        let mut config = AuthorityConfig::default();
        config.severity_overrides.insert("aurelia/unknown-element".to_string(), Severity::Warning);
        assert_eq!(config.severity_for("aurelia/unknown-element", Severity::Error), Severity::Warning);
        assert_eq!(config.severity_for("aurelia/unknown-attribute", Severity::Error), Severity::Error);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let err = read_configuration(Path::new("/nonexistent/authority.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn resolve_root_files_applies_include_then_exclude() {
        let root = std::env::temp_dir().join("viewc-authority-config-test-resolve-root-files");
        let src = root.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("app.html"), "<div></div>").unwrap();
        fs::write(src.join("app.spec.html"), "<div></div>").unwrap();

        let config = AuthorityConfig {
            include: vec!["src/*.html".to_string()],
            exclude: vec!["src/*.spec.html".to_string()],
            ..Default::default()
        };

        let files = resolve_root_files(&root, &config);
        fs::remove_dir_all(&root).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.html"));
    }
}
