//! Error taxonomy for the resolution engine.
//!
//! Declaration errors abort a run before anything touches the network.
//! Per-dependency errors ([`ResolveError`]) are collected and the run moves on.
//! Validation errors are always collected exhaustively and reported as a batch.

use std::path::PathBuf;
use thiserror::Error;

/// A dependency declaration that cannot be turned into a [`crate::deps::Dep`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("{key} - missing `import` path")]
    MissingImport { key: String },

    #[error("{key} - invalid import path `{import}`")]
    InvalidImport { key: String, import: String },

    #[error("{import} - only one of branch/commit/tag may be specified")]
    MultipleCheckoutSpecs { import: String },

    #[error("{import} - a `source` is required when scm is `{scm}`")]
    MissingSource { import: String, scm: String },

    #[error("{import} - `source` is only allowed together with an explicit scm")]
    ExtraneousSource { import: String },

    #[error("{import} - unknown scm `{scm}` (expected git, hg, svn or go)")]
    UnknownScm { import: String, scm: String },
}

/// Failure of a single version-control operation.
#[derive(Debug, Error)]
pub enum ScmError {
    #[error("unknown scm for `{import}`")]
    Unknown { import: String },

    #[error("`{command}` failed{}", status_suffix(.status, .stderr))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("could not run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn status_suffix(status: &Option<i32>, stderr: &str) -> String {
    let mut out = String::new();
    if let Some(code) = status {
        out.push_str(&format!(" with exit code {}", code));
    }
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        out.push_str(&format!(": {}", stderr));
    }
    out
}

/// A non-fatal, per-dependency failure recorded during resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{import}: {source}")]
    Scm {
        import: String,
        #[source]
        source: ScmError,
    },

    #[error("dependency cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("{import}: nested configuration {}: {message}", .path.display())]
    NestedConfig {
        import: String,
        path: PathBuf,
        message: String,
    },
}

impl ResolveError {
    /// Import path of the dependency the error belongs to.
    pub fn import(&self) -> &str {
        match self {
            ResolveError::Scm { import, .. } | ResolveError::NestedConfig { import, .. } => import,
            ResolveError::Cycle { chain } => chain.last().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Mismatch between declared dependencies and the imports used in source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unmanaged import `{path}` used at:\n{references}")]
    UnmanagedImport { path: String, references: String },

    #[error("unused dependency `{import}`")]
    UnusedDependency { import: String },
}

/// Failure while scanning a source tree.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
