//! Version-control backends.
//!
//! Each dependency binds to one [`Scm`]. Git, Mercurial and Subversion are
//! driven through their command-line tools; the pass-through [`Scm::Go`]
//! variant lets `go get` download the source and then reuses whichever
//! concrete backend it finds on disk for checkout and fetch.
//!
//! Every operation receives explicit paths and runs through a
//! [`CommandRunner`], so nothing here depends on the current directory.

use crate::deps::{CheckoutKind, Dep, ScmKind};
use crate::errors::ScmError;
use crate::exec::{CommandRunner, ScmCommand};
use crate::layout::Layout;
use std::fmt;
use std::fs;
use std::path::Path;

/// Host package-get tool used by the pass-through backend.
pub const GO_TOOL: &str = "go";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scm {
    Git,
    Hg,
    Svn,
    /// `inner` stays `None` until the source has been downloaded once.
    Go { inner: Option<Box<Scm>> },
}

/// What [`Scm::init`] did to bring the source into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Cloned,
    Refreshed,
    Downloaded,
}

/// Concrete backends in the order their metadata is looked for.
const DISCOVERABLE: [Scm; 3] = [Scm::Git, Scm::Hg, Scm::Svn];

impl Scm {
    /// Pick the backend for `dep`: an explicit scm wins, otherwise the
    /// pass-through backend wraps whatever metadata directory is found on disk.
    pub fn resolve(dep: &Dep, layout: &Layout) -> Scm {
        match dep.scm {
            ScmKind::Git => Scm::Git,
            ScmKind::Hg => Scm::Hg,
            ScmKind::Svn => Scm::Svn,
            ScmKind::Go => Scm::Go {
                inner: Self::discover(layout, &dep.import).map(Box::new),
            },
        }
    }

    /// Walk from the dependency's source directory up to (not including) the
    /// vendor `src` root looking for `.git`, `.hg` or `.svn`.
    pub fn discover(layout: &Layout, import: &str) -> Option<Scm> {
        let bound = layout.vendor_src();
        let mut dir = layout.src_dir(import);

        while dir.starts_with(&bound) && dir != bound {
            for scm in DISCOVERABLE {
                if let Some(meta) = scm.metadata_dir()
                    && dir.join(meta).is_dir()
                {
                    tracing::debug!(import, scm = %scm, dir = %dir.display(), "discovered scm");
                    return Some(scm);
                }
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scm::Git => "git",
            Scm::Hg => "hg",
            Scm::Svn => "svn",
            Scm::Go { .. } => GO_TOOL,
        }
    }

    pub fn metadata_dir(&self) -> Option<&'static str> {
        match self {
            Scm::Git => Some(".git"),
            Scm::Hg => Some(".hg"),
            Scm::Svn => Some(".svn"),
            Scm::Go { .. } => None,
        }
    }

    /// The literal clone invocation. For the pass-through backend `source` is
    /// the import path handed to `go get`.
    pub fn download_command(&self, source: &str, path: &Path) -> ScmCommand {
        let path = path.to_string_lossy();
        let path = path.as_ref();
        match self {
            Scm::Git => ScmCommand::new("git", ["clone", source, path]),
            Scm::Hg => ScmCommand::new("hg", ["clone", source, path]),
            Scm::Svn => ScmCommand::new("svn", ["checkout", source, path]),
            Scm::Go { .. } => ScmCommand::new(GO_TOOL, ["get", "-d", "-u", source]),
        }
    }

    /// Bring the dependency's source into existence: clone when absent,
    /// otherwise refresh it.
    pub fn init(
        &self,
        dep: &Dep,
        layout: &Layout,
        runner: &dyn CommandRunner,
    ) -> Result<InitOutcome, ScmError> {
        if let Scm::Go { .. } = self {
            let vendor = layout.vendor_dir();
            let command = self
                .download_command(&dep.import, layout.src_dir(&dep.import).as_path())
                .in_dir(layout.root())
                .with_env("GOPATH", &vendor.to_string_lossy());
            runner.run(&command)?;
            return Ok(InitOutcome::Downloaded);
        }

        let path = layout.src_dir(&dep.import);
        let meta = self.metadata_dir().map(|m| path.join(m));
        if meta.as_ref().is_some_and(|m| m.exists()) {
            tracing::debug!(
                import = %dep.import,
                "{} dir exists, refreshing instead of cloning",
                self.name()
            );
            self.fetch(dep, layout, runner)?;
            return Ok(InitOutcome::Refreshed);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ScmError::Io {
                action: "creating import dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let source = dep.source.as_deref().ok_or_else(|| ScmError::Unknown {
            import: dep.import.clone(),
        })?;
        tracing::info!(import = %dep.import, source, "cloning");
        runner.run(&self.download_command(source, &path))?;
        Ok(InitOutcome::Cloned)
    }

    /// Switch the local copy to the dependency's pinned spec.
    pub fn checkout(
        &self,
        dep: &Dep,
        layout: &Layout,
        runner: &dyn CommandRunner,
    ) -> Result<(), ScmError> {
        let dir = layout.src_dir(&dep.import);
        let spec = dep.checkout_spec.as_str();
        let command = match (self, dep.checkout_kind) {
            (_, CheckoutKind::None) => return Ok(()),
            (Scm::Go { inner }, _) => {
                let inner = inner.as_deref().ok_or_else(|| ScmError::Unknown {
                    import: dep.import.clone(),
                })?;
                return inner.checkout(dep, layout, runner);
            }
            (Scm::Git, _) => ScmCommand::new("git", ["checkout", spec]),
            (Scm::Hg, CheckoutKind::Commit) => ScmCommand::new("hg", ["update", "-c", spec]),
            (Scm::Hg, _) => ScmCommand::new("hg", ["checkout", spec]),
            (Scm::Svn, CheckoutKind::Commit) => ScmCommand::new("svn", ["up", "-r", spec]),
            (Scm::Svn, CheckoutKind::Branch) => {
                ScmCommand::new("svn", ["switch".to_string(), format!("^/branches/{}", spec)])
            }
            (Scm::Svn, CheckoutKind::Tag) => {
                ScmCommand::new("svn", ["switch".to_string(), format!("^/tags/{}", spec)])
            }
        };

        tracing::info!(import = %dep.import, "{} = {}", dep.checkout_type(), spec);
        runner.run(&command.in_dir(&dir))
    }

    /// Update remote-tracking refs without touching the working tree.
    pub fn fetch(
        &self,
        dep: &Dep,
        layout: &Layout,
        runner: &dyn CommandRunner,
    ) -> Result<(), ScmError> {
        let dir = layout.src_dir(&dep.import);
        let command = match self {
            Scm::Git => ScmCommand::new("git", ["fetch"]),
            Scm::Hg => ScmCommand::new("hg", ["pull"]),
            // no remote-tracking refs to update
            Scm::Svn => return Ok(()),
            Scm::Go { inner } => {
                let inner = inner.as_deref().ok_or_else(|| ScmError::Unknown {
                    import: dep.import.clone(),
                })?;
                return inner.fetch(dep, layout, runner);
            }
        };
        runner.run(&command.in_dir(&dir))
    }
}

impl fmt::Display for Scm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scm::Go { inner: Some(inner) } => write!(f, "go({})", inner),
            _ => f.write_str(self.name()),
        }
    }
}
