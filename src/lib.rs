//! # gopack - Go dependency vendoring
//!
//! gopack resolves, fetches, pins and validates a Go project's external
//! dependencies into a project-local vendor tree (`.gopack/vendor`), then
//! runs the go tool with `GOPATH` pointed at it.
//!
//! ## Features
//!
//! - **Pinning**: each dependency names one branch, commit or tag
//! - **Multiple backends**: git, hg, svn, or pass-through `go get`
//! - **Transitive resolution**: dependencies bring their own `gopack.config`
//! - **Validation**: unmanaged imports and unused dependencies are reported
//!
//! ## Module Organization
//!
//! - [`graph`] - Import-path trie with longest-prefix lookup
//! - [`deps`] - Dependency model and transitive resolver
//! - [`scm`] - Version-control backends
//! - [`stats`] - Source tree analysis
//! - [`validate`] - Declared-vs-used diff

/// Configuration file parsing (`gopack.config`).
pub mod config;

/// Dependency model and transitive resolution.
pub mod deps;

/// Error taxonomy.
pub mod errors;

/// Subprocess execution seam.
pub mod exec;

/// Import-path trie.
pub mod graph;

/// Go import declaration scanner.
pub mod imports;

/// Vendor tree layout.
pub mod layout;

/// Lock file (`gopack.lock`) management.
pub mod lock;

/// End-to-end run over one project.
pub mod project;

/// Version-control backends.
pub mod scm;

/// Source tree import statistics.
pub mod stats;

/// Dependency tree visualization.
pub mod tree;

/// Terminal UI utilities (tables, spinners).
pub mod ui;

/// Declared-vs-used dependency validation.
pub mod validate;
