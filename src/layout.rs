//! On-disk layout of the private working area.
//!
//! ```text
//! <project>/gopack.config
//! <project>/gopack.lock
//! <project>/.gopack/checksum
//! <project>/.gopack/vendor/src/<import path>
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "gopack.config";
pub const LOCK_FILE: &str = "gopack.lock";
pub const GOPACK_DIR: &str = ".gopack";
pub const VENDOR_DIR: &str = "vendor";
pub const CHECKSUM_FILE: &str = "checksum";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn gopack_dir(&self) -> PathBuf {
        self.root.join(GOPACK_DIR)
    }

    pub fn checksum_path(&self) -> PathBuf {
        self.gopack_dir().join(CHECKSUM_FILE)
    }

    /// Value exported as `GOPATH` to the host go tool.
    pub fn vendor_dir(&self) -> PathBuf {
        self.gopack_dir().join(VENDOR_DIR)
    }

    pub fn vendor_src(&self) -> PathBuf {
        self.vendor_dir().join("src")
    }

    /// Local source directory of a dependency.
    pub fn src_dir(&self, import: &str) -> PathBuf {
        let mut path = self.vendor_src();
        path.extend(import.split('/').filter(|s| !s.is_empty()));
        path
    }
}
