//! Lock file (`gopack.lock`).
//!
//! Records, per resolved dependency, the backend it was checked out with and
//! the revision it ended up on. Git checkouts report their HEAD commit; other
//! backends record the pinned spec.

use crate::deps::{Dep, ResolveReport};
use crate::graph::ImportGraph;
use crate::layout::Layout;
use crate::scm::Scm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LockFile {
    #[serde(rename = "package", default)]
    pub packages: BTreeMap<String, PackageLock>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PackageLock {
    pub scm: String,
    pub rev: String,
}

impl LockFile {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, import: &str) -> Option<&PackageLock> {
        self.packages.get(import)
    }

    pub fn insert(&mut self, import: String, scm: String, rev: String) {
        self.packages.insert(import, PackageLock { scm, rev });
    }

    /// Build the lock from everything a resolution run processed.
    pub fn from_resolution(graph: &ImportGraph, report: &ResolveReport, layout: &Layout) -> Self {
        let mut lock = Self::default();
        for import in &report.resolved {
            if let Some(dep) = graph.get(import) {
                let scm = Scm::resolve(dep, layout);
                lock.insert(
                    import.clone(),
                    scm.to_string(),
                    current_revision(&scm, dep, layout),
                );
            }
        }
        lock
    }
}

/// HEAD commit for git checkouts, the pinned spec otherwise.
pub fn current_revision(scm: &Scm, dep: &Dep, layout: &Layout) -> String {
    let is_git = match scm {
        Scm::Git => true,
        Scm::Go { inner } => inner.as_deref() == Some(&Scm::Git),
        _ => false,
    };

    if is_git
        && let Ok(repo) = git2::Repository::open(layout.src_dir(&dep.import))
        && let Ok(head) = repo.head()
        && let Ok(commit) = head.peel_to_commit()
    {
        return commit.id().to_string();
    }

    dep.checkout_spec.clone()
}
