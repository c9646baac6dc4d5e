//! One project's resolution run.
//!
//! Ties the pieces together in the order a run needs them: load the
//! configuration, register the self repository, build the dependency list and
//! graph, analyze and validate the source tree, resolve, and finally persist
//! the checksum and lock file.

use crate::config::Config;
use crate::deps::{Dependencies, ResolveReport, Resolver};
use crate::errors::{AnalysisError, ValidationError};
use crate::exec::CommandRunner;
use crate::graph::ImportGraph;
use crate::layout::Layout;
use crate::lock::LockFile;
use crate::stats::ProjectStats;
use crate::validate::validate;
use anyhow::{Context, Result};
use std::path::Path;

pub struct Project {
    pub layout: Layout,
    pub config: Config,
    pub graph: ImportGraph,
    pub deps: Dependencies,
    config_changed: bool,
}

impl Project {
    /// Load `gopack.config` from `dir`. Declaration errors abort here, before
    /// any fetch happens.
    pub fn load(dir: &Path) -> Result<Self> {
        let root = dir
            .canonicalize()
            .with_context(|| format!("Project directory {} not found", dir.display()))?;
        let layout = Layout::new(root);
        let config = Config::load(layout.root())?;
        let config_changed = config.modified_checksum(&layout);

        let mut graph = ImportGraph::new();
        config.init_repo(&layout, &mut graph)?;
        let deps = config
            .load_dependencies(&mut graph)
            .with_context(|| format!("Invalid declaration in {}", config.path.display()))?;

        tracing::debug!(
            root = %layout.root().display(),
            deps = deps.len(),
            config_changed,
            "loaded project"
        );

        Ok(Self {
            layout,
            config,
            graph,
            deps,
            config_changed,
        })
    }

    pub fn config_changed(&self) -> bool {
        self.config_changed
    }

    pub fn self_repo(&self) -> Option<&str> {
        self.config.repository.as_deref()
    }

    pub fn analyze(&self) -> Result<ProjectStats, AnalysisError> {
        ProjectStats::analyze(self.layout.root())
    }

    pub fn validate(&self, stats: &ProjectStats) -> Vec<ValidationError> {
        validate(stats, &self.deps, &self.graph)
    }

    pub fn resolve(&mut self, runner: &dyn CommandRunner) -> ResolveReport {
        Resolver::new(&self.layout, runner, self.config_changed)
            .with_self_repo(self.config.repository.as_deref())
            .resolve(&mut self.deps, &mut self.graph)
    }

    /// Persist the configuration checksum and the lock file. Only called after
    /// a run without errors, so a failed run is retried in full next time.
    pub fn finish(&self, report: &ResolveReport) -> Result<()> {
        LockFile::from_resolution(&self.graph, report, &self.layout)
            .save(&self.layout.lock_path())?;
        self.config.write_checksum(&self.layout)
    }
}
