//! Source tree analysis.
//!
//! Walks a project, parses the import declarations of every `.go` file and
//! groups the references by import path. Each path is classified as remote
//! (its first segment looks like a host name), local (relative) or standard
//! library.
//!
//! ## Example Output
//!
//! ```text
//! Import stats summary:
//!   ┌────────┬──────────────────────────────┬──────┐
//!   │ Origin │ Import                       │ Uses │
//!   ├────────┼──────────────────────────────┼──────┤
//!   │ R      │ github.com/pelletier/go-toml │ 2    │
//!   │ S      │ fmt                          │ 1    │
//!   └────────┴──────────────────────────────┴──────┘
//!   R Remote, L Local, S Stdlib
//! ```

use crate::errors::AnalysisError;
use crate::imports::parse_imports;
use crate::layout::GOPACK_DIR;
use colored::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where an import's code comes from. Ordered Stdlib < Local < Remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    StandardLibrary,
    Local,
    Remote,
}

impl Origin {
    pub fn legend(&self) -> &'static str {
        match self {
            Origin::Remote => "R",
            Origin::Local => "L",
            Origin::StandardLibrary => "S",
        }
    }
}

/// Classify an import path by its shape.
pub fn classify(import_path: &str) -> Origin {
    let first = import_path.split('/').next().unwrap_or_default();
    if first.find('.').is_some_and(|idx| idx > 0) {
        Origin::Remote
    } else if import_path.starts_with('.') {
        Origin::Local
    } else {
        Origin::StandardLibrary
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub path: String,
    pub origin: Origin,
    pub references: Vec<Reference>,
}

impl ImportStats {
    pub fn new(path: &str, reference: Reference) -> Self {
        Self {
            path: path.to_string(),
            origin: classify(path),
            references: vec![reference],
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin == Origin::Remote
    }

    /// One `* file:line` entry per reference.
    pub fn reference_list(&self) -> String {
        self.references
            .iter()
            .map(|r| format!("* {}", r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub origin: Origin,
    pub uses: usize,
    pub path: String,
}

impl SummaryItem {
    pub fn legend(&self) -> String {
        format!("{}\t{}\t{}", self.origin.legend(), self.path, self.uses)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectStats {
    pub by_path: BTreeMap<String, ImportStats>,
}

impl ProjectStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every `.go` file under `dir`. The private `.gopack` area is
    /// skipped unless `dir` itself lies inside it.
    pub fn analyze(dir: &Path) -> Result<Self, AnalysisError> {
        let inside_gopack = has_gopack_component(dir);
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                inside_gopack
                    || entry.depth() == 0
                    || entry.file_name() != OsStr::new(GOPACK_DIR)
            });

        for entry in walker {
            let entry = entry.map_err(|source| AnalysisError::Walk {
                root: dir.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file()
                && entry.path().extension() == Some(OsStr::new("go"))
            {
                files.push(entry.into_path());
            }
        }

        tracing::debug!(root = %dir.display(), files = files.len(), "analyzing source tree");

        // parse in parallel, merge in walk order
        let parsed: Vec<_> = files.par_iter().map(|path| parse_file(path)).collect();

        let mut stats = Self::new();
        for (path, result) in files.into_iter().zip(parsed) {
            for import in result? {
                stats.found_import(
                    &import.path,
                    Reference {
                        file: path.clone(),
                        line: import.line,
                    },
                );
            }
        }
        Ok(stats)
    }

    pub fn found_import(&mut self, import_path: &str, reference: Reference) {
        match self.by_path.get_mut(import_path) {
            Some(stats) => stats.references.push(reference),
            None => {
                self.by_path
                    .insert(import_path.to_string(), ImportStats::new(import_path, reference));
            }
        }
    }

    pub fn is_import_used(&self, import_path: &str) -> bool {
        self.by_path.contains_key(import_path)
    }

    pub fn remote_imports(&self) -> impl Iterator<Item = &ImportStats> {
        self.by_path.values().filter(|s| s.is_remote())
    }

    /// Items sorted by origin (remote first), then by usage count, then path.
    pub fn summary(&self) -> Vec<SummaryItem> {
        let mut items: Vec<SummaryItem> = self
            .by_path
            .values()
            .map(|s| SummaryItem {
                origin: s.origin,
                uses: s.references.len(),
                path: s.path.clone(),
            })
            .collect();
        items.sort_by(|a, b| {
            b.origin
                .cmp(&a.origin)
                .then(b.uses.cmp(&a.uses))
                .then(a.path.cmp(&b.path))
        });
        items
    }

    pub fn print_summary(&self) {
        let summary = self.summary();
        println!("{}", "Import stats summary:".bold());
        if summary.is_empty() {
            println!("  (no imports found)");
            return;
        }

        let mut table = crate::ui::Table::new(&["Origin", "Import", "Uses"]);
        for item in summary {
            let origin = match item.origin {
                Origin::Remote => item.origin.legend().cyan().to_string(),
                Origin::Local => item.origin.legend().green().to_string(),
                Origin::StandardLibrary => item.origin.legend().dimmed().to_string(),
            };
            table.add_row(vec![origin, item.path, item.uses.to_string()]);
        }
        table.print();
        println!("  {}", "R Remote, L Local, S Stdlib".dimmed());
    }
}

fn parse_file(path: &Path) -> Result<Vec<crate::imports::ImportRef>, AnalysisError> {
    let content = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_imports(&content).map_err(|e| AnalysisError::Parse {
        path: path.to_path_buf(),
        line: e.line,
        message: e.message,
    })
}

fn has_gopack_component(dir: &Path) -> bool {
    dir.components()
        .any(|c| c.as_os_str() == OsStr::new(GOPACK_DIR))
}
