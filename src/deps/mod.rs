//! Dependency declarations and their resolution.
//!
//! - **Model**: validated [`Dep`] records built from configuration declarations
//! - **Resolution**: fetch, checkout and recurse into nested configurations
//!
//! ## Caching policy
//!
//! A dependency is fetched when the configuration changed since the last
//! successful run, when it tracks a branch, or when it is not present locally.

mod model;
mod resolve;

pub use model::{CheckoutKind, Declaration, Dep, Dependencies, ScmKind};
pub use resolve::{ResolveReport, Resolver, resolve_dependencies};
