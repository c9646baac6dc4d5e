//! Transitive dependency resolution.
//!
//! Dependencies are processed one at a time in declaration order. For each
//! one the resolver picks a backend, fetches when the caching policy says so,
//! checks out the pinned spec and then, if the fetched source carries its own
//! `gopack.config`, resolves those declarations into the same graph.
//!
//! Failures are isolated per dependency: they are recorded in the
//! [`ResolveReport`] and the run carries on with the next sibling.

use super::model::{Dep, Dependencies};
use crate::config::Config;
use crate::errors::ResolveError;
use crate::exec::CommandRunner;
use crate::graph::ImportGraph;
use crate::layout::{CONFIG_FILE, Layout};
use crate::scm::{InitOutcome, Scm};

#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Imports that went through resolution, in processing order.
    pub resolved: Vec<String>,
    /// Imports whose source was cloned, downloaded or refreshed.
    pub fetched: Vec<String>,
    pub errors: Vec<ResolveError>,
}

impl ResolveReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Resolver<'a> {
    layout: &'a Layout,
    runner: &'a dyn CommandRunner,
    config_changed: bool,
    /// Imports on the current recursion path.
    active: Vec<String>,
    report: ResolveReport,
}

impl<'a> Resolver<'a> {
    pub fn new(layout: &'a Layout, runner: &'a dyn CommandRunner, config_changed: bool) -> Self {
        Self {
            layout,
            runner,
            config_changed,
            active: Vec::new(),
            report: ResolveReport::default(),
        }
    }

    /// Treat the project's own repository as already being resolved, so a
    /// dependency that declares it back is reported as a cycle.
    pub fn with_self_repo(mut self, repo: Option<&str>) -> Self {
        if let Some(repo) = repo {
            self.active.push(repo.to_string());
        }
        self
    }

    pub fn resolve(mut self, deps: &mut Dependencies, graph: &mut ImportGraph) -> ResolveReport {
        self.resolve_all(deps, graph);
        self.report
    }

    fn resolve_all(&mut self, deps: &mut Dependencies, graph: &mut ImportGraph) {
        for dep in deps.deps.iter_mut() {
            self.resolve_one(dep, graph);
        }
    }

    fn resolve_one(&mut self, dep: &mut Dep, graph: &mut ImportGraph) {
        if let Some(start) = self.active.iter().position(|import| *import == dep.import) {
            let mut chain = self.active[start..].to_vec();
            chain.push(dep.import.clone());
            tracing::warn!(import = %dep.import, "dependency cycle, not descending");
            self.report.errors.push(ResolveError::Cycle { chain });
            return;
        }

        let src = self.layout.src_dir(&dep.import);
        let mut scm = Scm::resolve(dep, self.layout);
        dep.fetch = dep.needs_fetch(self.config_changed, src.exists());

        if dep.fetch {
            match scm.init(dep, self.layout, self.runner) {
                Ok(outcome) => {
                    self.report.fetched.push(dep.import.clone());
                    if outcome == InitOutcome::Downloaded {
                        // the metadata directory exists now
                        scm = Scm::resolve(dep, self.layout);
                    }
                }
                Err(source) => {
                    tracing::warn!(import = %dep.import, error = %source, "fetch failed");
                    self.report.errors.push(ResolveError::Scm {
                        import: dep.import.clone(),
                        source,
                    });
                    return;
                }
            }
        } else {
            tracing::debug!(import = %dep.import, "up to date, skipping fetch");
        }

        if dep.has_checkout()
            && let Err(source) = scm.checkout(dep, self.layout, self.runner)
        {
            tracing::warn!(
                import = %dep.import,
                error = %source,
                "could not check out {} {}",
                dep.checkout_type(),
                dep.checkout_spec
            );
            self.report.errors.push(ResolveError::Scm {
                import: dep.import.clone(),
                source,
            });
        }

        self.report.resolved.push(dep.import.clone());

        let nested = src.join(CONFIG_FILE);
        if !nested.is_file() {
            return;
        }

        let loaded = Config::load(&src)
            .map_err(|e| format!("{:#}", e))
            .and_then(|config| {
                Dependencies::from_declarations(&config.declarations, graph)
                    .map_err(|e| e.to_string())
            });

        match loaded {
            Ok(mut transitive) => {
                tracing::debug!(
                    import = %dep.import,
                    count = transitive.len(),
                    "resolving transitive dependencies"
                );
                self.active.push(dep.import.clone());
                self.resolve_all(&mut transitive, graph);
                self.active.pop();
            }
            Err(message) => {
                self.report.errors.push(ResolveError::NestedConfig {
                    import: dep.import.clone(),
                    path: nested,
                    message,
                });
            }
        }
    }
}

/// Resolve `deps` and everything they declare, accumulating into `graph`.
pub fn resolve_dependencies(
    deps: &mut Dependencies,
    graph: &mut ImportGraph,
    layout: &Layout,
    runner: &dyn CommandRunner,
    config_changed: bool,
) -> ResolveReport {
    Resolver::new(layout, runner, config_changed).resolve(deps, graph)
}
