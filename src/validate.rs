//! Declared-vs-used dependency validation.
//!
//! Every remote import found in source must be owned by a declared
//! dependency, and every declared dependency must be used by some import.
//! All problems are collected; nothing short-circuits.

use crate::deps::Dependencies;
use crate::errors::ValidationError;
use crate::graph::ImportGraph;
use crate::stats::ProjectStats;
use std::collections::HashSet;

pub fn validate(
    stats: &ProjectStats,
    deps: &Dependencies,
    graph: &ImportGraph,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut used = HashSet::new();

    for import in stats.remote_imports() {
        match graph.lookup(&import.path) {
            Some(dep) => {
                used.insert(dep.import.as_str());
            }
            None => errors.push(ValidationError::UnmanagedImport {
                path: import.path.clone(),
                references: import.reference_list(),
            }),
        }
    }

    for dep in deps.iter() {
        if !used.contains(dep.import.as_str()) && !stats.is_import_used(&dep.import) {
            errors.push(ValidationError::UnusedDependency {
                import: dep.import.clone(),
            });
        }
    }

    tracing::debug!(errors = errors.len(), "validation finished");
    errors
}
