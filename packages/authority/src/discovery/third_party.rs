//! Third-party package recognizer: scans `package.json` dependencies for framework
//! usage, analyzes a hit's exports, and caches the result under a content-addressed
//! `.aurelia-cache/npm-analysis/<schemaVersion>/<lockfileHash+configHash>/<package>.json`
//! path (§4.D.6, §6). Cache entries are never written atomically; a corrupt entry is
//! reported as `aurelia/gap/cache-corrupt` and the package is re-analyzed.
//!
//! Grounded on the teacher's resource loader's on-disk artifact caching in
//! `engine/resource`, adapted from compiled-template caching to per-package analysis
//! caching.

use super::candidate::{Candidate, CandidateSource};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use viewc_core::gap::{Gap, GapKind};
use viewc_core::semantics::ResourceDef;

/// A single `package.json` dependency entry worth probing.
#[derive(Debug, Clone)]
pub struct PackageDependency {
    pub name: String,
    pub version: String,
}

/// Heuristic: a dependency looks framework-relevant if its name contains `aurelia`, or
/// a caller-supplied probe (simulating a metadata/export scan) says so.
pub fn looks_relevant(dep: &PackageDependency, probe_hit: bool) -> bool {
    dep.name.contains("aurelia") || probe_hit
}

/// One resolved package analysis result: either resources were found, or the package
/// was relevant but nothing could be statically determined (conservative gap).
#[derive(Debug, Clone)]
pub struct PackageAnalysis {
    pub package: String,
    pub resources: Vec<ResourceDef>,
}

/// Computes the cache fingerprint: a content hash of the lockfile text plus the
/// project's `authority.json` configuration text, per §4.D.6.
pub fn cache_fingerprint(lockfile_text: &str, config_text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    lockfile_text.hash(&mut hasher);
    config_text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn cache_path(project_root: &str, schema_version: u32, fingerprint: &str, package: &str) -> String {
    format!("{project_root}/.aurelia-cache/npm-analysis/{schema_version}/{fingerprint}/{package}.json")
}

/// A cache read outcome: `Hit` with a parsed analysis, `Miss`, or `Corrupt` (the
/// gap-producing case — caller must re-analyze and rewrite on success).
pub enum CacheLookup {
    Hit(PackageAnalysis),
    Miss,
    Corrupt,
}

/// Caller-provided cache reader; kept as a trait so discovery can be driven purely
/// in-memory in tests without touching a real filesystem.
pub trait AnalysisCache {
    fn lookup(&self, path: &str) -> CacheLookup;
    fn store(&self, path: &str, analysis: &PackageAnalysis);
}

pub fn analyze(
    deps: &[PackageDependency],
    probe: impl Fn(&PackageDependency) -> Option<Vec<ResourceDef>>,
    cache: &dyn AnalysisCache,
    project_root: &str,
    schema_version: u32,
    fingerprint: &str,
) -> (Vec<Candidate>, Vec<Gap>) {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();

    for dep in deps {
        let probed = probe(dep);
        if !looks_relevant(dep, probed.is_some()) {
            continue;
        }
        let path = cache_path(project_root, schema_version, fingerprint, &dep.name);
        match cache.lookup(&path) {
            CacheLookup::Hit(analysis) => {
                for def in analysis.resources {
                    candidates.push(Candidate::new(def, CandidateSource::PluginActivation));
                }
                continue;
            }
            CacheLookup::Corrupt => {
                gaps.push(
                    Gap::new(
                        format!("npm-analysis cache entry for '{}' is corrupt; re-analyzing", dep.name),
                        GapKind::CacheCorrupt,
                    )
                    .for_resource("package", &dep.name),
                );
            }
            CacheLookup::Miss => {}
        }

        match probed {
            Some(resources) => {
                let analysis = PackageAnalysis {
                    package: dep.name.clone(),
                    resources: resources.clone(),
                };
                cache.store(&path, &analysis);
                for def in resources {
                    candidates.push(Candidate::new(def, CandidateSource::PluginActivation));
                }
            }
            None => {
                gaps.push(
                    Gap::new(
                        format!("dependency '{}' looked framework-relevant but its exports could not be analyzed", dep.name),
                        GapKind::Conservative,
                    )
                    .for_resource("package", &dep.name),
                );
            }
        }
    }

    (candidates, gaps)
}
