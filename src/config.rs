//! Configuration file parsing (`gopack.config`).
//!
//! ```toml
//! repo = "github.com/me/project"
//!
//! [deps.mux]
//! import = "github.com/gorilla/mux"
//! tag = "v1.8.0"
//! ```
//!
//! Dependency tables are kept in file order. The file's SHA-256 is stored in
//! `.gopack/checksum` after a successful run and drives the refetch policy.

use crate::deps::{Declaration, Dep, Dependencies};
use crate::errors::DeclarationError;
use crate::graph::ImportGraph;
use crate::layout::{CONFIG_FILE, Layout};
use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    repo: Option<String>,
    #[serde(default)]
    deps: toml::Table,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub path: PathBuf,
    /// Import path of the project itself, e.g. `github.com/d2fn/gopack`.
    pub repository: Option<String>,
    pub declarations: Vec<Declaration>,
    checksum: String,
}

impl Config {
    /// Load `gopack.config` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "{} not found in {}.\n\n\
                Tip: declare dependencies as [deps.<name>] tables with an `import` key.",
                CONFIG_FILE,
                dir.display()
            ));
        }
        let content = fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: PathBuf, content: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(content)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
        let raw: RawConfig = toml::from_str(text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let mut declarations = Vec::with_capacity(raw.deps.len());
        for (key, value) in raw.deps {
            let mut decl: Declaration = value
                .try_into()
                .with_context(|| format!("Invalid [deps.{}] table in {}", key, path.display()))?;
            decl.key = key;
            declarations.push(decl);
        }

        Ok(Self {
            path,
            repository: raw.repo.filter(|r| !r.trim().is_empty()),
            declarations,
            checksum: checksum_hex(content),
        })
    }

    /// Hex SHA-256 of the file contents.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// True when no checksum was stored yet or it differs from this file's.
    pub fn modified_checksum(&self, layout: &Layout) -> bool {
        match fs::read_to_string(layout.checksum_path()) {
            Ok(stored) => stored.trim() != self.checksum,
            Err(_) => true,
        }
    }

    pub fn write_checksum(&self, layout: &Layout) -> Result<()> {
        fs::create_dir_all(layout.gopack_dir())
            .with_context(|| format!("Failed to create {}", layout.gopack_dir().display()))?;
        fs::write(layout.checksum_path(), &self.checksum)
            .context("Failed to write configuration checksum")?;
        Ok(())
    }

    /// Symlink the project into the vendor tree under its own import path and
    /// register it in the graph, so imports of its sub-packages resolve.
    pub fn init_repo(&self, layout: &Layout, graph: &mut ImportGraph) -> Result<()> {
        let Some(repo) = self.repository.as_deref() else {
            return Ok(());
        };

        let link = layout.src_dir(repo);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        if fs::symlink_metadata(&link).is_err() {
            symlink_dir(layout.root(), &link).with_context(|| {
                format!(
                    "Failed to link {} to {}",
                    link.display(),
                    layout.root().display()
                )
            })?;
        }

        graph.insert(Dep::passthrough(repo));
        Ok(())
    }

    /// Validate the declarations and insert them into `graph`.
    pub fn load_dependencies(
        &self,
        graph: &mut ImportGraph,
    ) -> std::result::Result<Dependencies, DeclarationError> {
        Dependencies::from_declarations(&self.declarations, graph)
    }
}

fn checksum_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
