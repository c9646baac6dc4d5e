//! In-memory dependency model.
//!
//! A [`Declaration`] is what the configuration file says; a [`Dep`] is a
//! declaration that passed validation. Construction is the only place the
//! checkout and scm/source invariants are checked.

use crate::errors::DeclarationError;
use crate::graph::ImportGraph;
use serde::Deserialize;
use std::fmt;

/// Which kind of ref a dependency is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutKind {
    #[default]
    None,
    Branch,
    Commit,
    Tag,
}

impl CheckoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutKind::None => "",
            CheckoutKind::Branch => "branch",
            CheckoutKind::Commit => "commit",
            CheckoutKind::Tag => "tag",
        }
    }
}

/// Version control backend a dependency declares. `Go` is the pass-through
/// default that lets the host `go get` locate the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScmKind {
    #[default]
    Go,
    Git,
    Hg,
    Svn,
}

impl ScmKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "go" => Some(ScmKind::Go),
            "git" => Some(ScmKind::Git),
            "hg" => Some(ScmKind::Hg),
            "svn" => Some(ScmKind::Svn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScmKind::Go => "go",
            ScmKind::Git => "git",
            ScmKind::Hg => "hg",
            ScmKind::Svn => "svn",
        }
    }
}

/// A raw `[deps.<key>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Declaration {
    #[serde(skip)]
    pub key: String,
    pub import: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub tag: Option<String>,
    pub scm: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dep {
    pub key: String,
    pub import: String,
    pub checkout_kind: CheckoutKind,
    pub checkout_spec: String,
    pub scm: ScmKind,
    pub source: Option<String>,
    /// Set by the resolver once it has looked at the local copy.
    pub fetch: bool,
}

impl Dep {
    /// A default-scm dependency with no pin, as used for the self repository.
    pub fn passthrough(import: &str) -> Self {
        Self {
            key: import.to_string(),
            import: import.to_string(),
            checkout_kind: CheckoutKind::None,
            checkout_spec: String::new(),
            scm: ScmKind::Go,
            source: None,
            fetch: false,
        }
    }

    pub fn from_declaration(decl: &Declaration) -> Result<Self, DeclarationError> {
        let import = match decl.import.as_deref().map(str::trim) {
            Some(import) if !import.is_empty() => import.trim_end_matches('/').to_string(),
            _ => {
                return Err(DeclarationError::MissingImport {
                    key: decl.key.clone(),
                });
            }
        };
        if !is_valid_import(&import) {
            return Err(DeclarationError::InvalidImport {
                key: decl.key.clone(),
                import,
            });
        }

        let pins = [
            (CheckoutKind::Branch, &decl.branch),
            (CheckoutKind::Commit, &decl.commit),
            (CheckoutKind::Tag, &decl.tag),
        ];
        let mut set = pins
            .iter()
            .filter_map(|(kind, value)| value.as_ref().map(|v| (*kind, v.clone())));
        let (checkout_kind, checkout_spec) = set.next().unwrap_or_default();
        if set.next().is_some() {
            return Err(DeclarationError::MultipleCheckoutSpecs { import });
        }

        let scm = match decl.scm.as_deref() {
            None => ScmKind::Go,
            Some(value) => ScmKind::parse(value).ok_or_else(|| DeclarationError::UnknownScm {
                import: import.clone(),
                scm: value.to_string(),
            })?,
        };

        let source = decl.source.clone().filter(|s| !s.trim().is_empty());
        match (scm, &source) {
            (ScmKind::Go, Some(_)) => return Err(DeclarationError::ExtraneousSource { import }),
            (ScmKind::Git | ScmKind::Hg | ScmKind::Svn, None) => {
                return Err(DeclarationError::MissingSource {
                    import,
                    scm: scm.as_str().to_string(),
                });
            }
            _ => {}
        }

        Ok(Self {
            key: decl.key.clone(),
            import,
            checkout_kind,
            checkout_spec,
            scm,
            source,
            fetch: false,
        })
    }

    /// Whether the local copy must be (re)fetched. Branches are mutable refs
    /// and are always brought current; commit and tag pins are only fetched
    /// when the configuration changed or the source is missing.
    pub fn needs_fetch(&self, config_changed: bool, present: bool) -> bool {
        config_changed || self.checkout_kind == CheckoutKind::Branch || !present
    }

    pub fn has_checkout(&self) -> bool {
        self.checkout_kind != CheckoutKind::None
    }

    pub fn checkout_type(&self) -> &'static str {
        self.checkout_kind.as_str()
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_checkout() {
            write!(
                f,
                "import = {}, {} = {}",
                self.import,
                self.checkout_type(),
                self.checkout_spec
            )
        } else {
            write!(f, "import = {}", self.import)
        }
    }
}

/// An import path must stay inside the vendor tree once joined to it: no
/// leading `/`, no backslash, and no empty, `.` or `..` segments.
fn is_valid_import(import: &str) -> bool {
    !import.is_empty()
        && !import.starts_with('/')
        && !import.contains('\\')
        && import
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Ordered dependencies of one configuration file.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    pub deps: Vec<Dep>,
}

impl Dependencies {
    /// Validate every declaration, then insert them into `graph` in order.
    /// Nothing is inserted when any declaration is invalid.
    pub fn from_declarations(
        declarations: &[Declaration],
        graph: &mut ImportGraph,
    ) -> Result<Self, DeclarationError> {
        let deps = declarations
            .iter()
            .map(Dep::from_declaration)
            .collect::<Result<Vec<_>, _>>()?;

        for dep in &deps {
            graph.insert(dep.clone());
        }

        Ok(Self { deps })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dep> {
        self.deps.iter()
    }

    pub fn imports(&self) -> Vec<&str> {
        self.deps.iter().map(|d| d.import.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(import: &str) -> Declaration {
        Declaration {
            key: "dep".to_string(),
            import: Some(import.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_branch_and_commit_is_invalid() {
        let mut d = decl("github.com/x/y");
        d.branch = Some("master".into());
        d.commit = Some("abc123".into());

        assert_eq!(
            Dep::from_declaration(&d),
            Err(DeclarationError::MultipleCheckoutSpecs {
                import: "github.com/x/y".into()
            })
        );
    }

    #[test]
    fn test_single_checkout_spec_is_valid() {
        for (branch, commit, tag, kind) in [
            (Some("master"), None, None, CheckoutKind::Branch),
            (None, Some("abc123"), None, CheckoutKind::Commit),
            (None, None, Some("v1.0"), CheckoutKind::Tag),
        ] {
            let mut d = decl("github.com/x/y");
            d.branch = branch.map(Into::into);
            d.commit = commit.map(Into::into);
            d.tag = tag.map(Into::into);

            let dep = Dep::from_declaration(&d).unwrap();
            assert_eq!(dep.checkout_kind, kind);
            assert!(!dep.checkout_spec.is_empty());
        }
    }

    #[test]
    fn test_no_checkout_spec() {
        let dep = Dep::from_declaration(&decl("github.com/x/y")).unwrap();
        assert_eq!(dep.checkout_kind, CheckoutKind::None);
        assert!(!dep.has_checkout());
        assert_eq!(dep.to_string(), "import = github.com/x/y");
    }

    #[test]
    fn test_explicit_scm_requires_source() {
        let mut d = decl("github.com/x/y");
        d.scm = Some("git".into());

        assert!(matches!(
            Dep::from_declaration(&d),
            Err(DeclarationError::MissingSource { .. })
        ));
    }

    #[test]
    fn test_default_scm_rejects_source() {
        let mut d = decl("github.com/x/y");
        d.source = Some("https://github.com/x/y.git".into());

        assert!(matches!(
            Dep::from_declaration(&d),
            Err(DeclarationError::ExtraneousSource { .. })
        ));
    }

    #[test]
    fn test_explicit_scm_with_source() {
        let mut d = decl("code.google.com/p/go");
        d.scm = Some("hg".into());
        d.source = Some("https://code.google.com/p/go".into());
        d.commit = Some("deadbeef".into());

        let dep = Dep::from_declaration(&d).unwrap();
        assert_eq!(dep.scm, ScmKind::Hg);
        assert_eq!(dep.to_string(), "import = code.google.com/p/go, commit = deadbeef");
    }

    #[test]
    fn test_unknown_scm() {
        let mut d = decl("launchpad.net/x");
        d.scm = Some("bzr".into());
        d.source = Some("lp:x".into());

        assert!(matches!(
            Dep::from_declaration(&d),
            Err(DeclarationError::UnknownScm { .. })
        ));
    }

    #[test]
    fn test_missing_import() {
        let d = Declaration {
            key: "broken".into(),
            ..Default::default()
        };
        assert_eq!(
            Dep::from_declaration(&d),
            Err(DeclarationError::MissingImport {
                key: "broken".into()
            })
        );
    }

    #[test]
    fn test_import_escaping_vendor_tree_is_invalid() {
        for import in [
            "../../../../escape",
            "github.com/x/../../y",
            "github.com/./y",
            "github.com//y",
            "/etc/passwd",
            "/",
            "github.com\\..\\y",
        ] {
            let mut d = decl(import);
            d.scm = Some("git".into());
            d.source = Some("https://example.com/repo.git".into());

            assert!(
                matches!(
                    Dep::from_declaration(&d),
                    Err(DeclarationError::InvalidImport { ref key, .. }) if key == "dep"
                ),
                "{import} should be rejected"
            );
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let dep = Dep::from_declaration(&decl("github.com/x/y/")).unwrap();
        assert_eq!(dep.import, "github.com/x/y");
    }

    #[test]
    fn test_needs_fetch_policy() {
        let mut d = decl("github.com/x/y");
        d.commit = Some("abc".into());
        let commit = Dep::from_declaration(&d).unwrap();
        assert!(!commit.needs_fetch(false, true));
        assert!(commit.needs_fetch(true, true));
        assert!(commit.needs_fetch(false, false));

        let mut d = decl("github.com/x/y");
        d.branch = Some("master".into());
        let branch = Dep::from_declaration(&d).unwrap();
        assert!(branch.needs_fetch(false, true));
    }

    #[test]
    fn test_from_declarations_inserts_in_order() {
        let mut graph = ImportGraph::new();
        let decls = vec![decl("github.com/b/b"), decl("github.com/a/a")];

        let deps = Dependencies::from_declarations(&decls, &mut graph).unwrap();
        assert_eq!(deps.imports(), vec!["github.com/b/b", "github.com/a/a"]);
        assert_eq!(graph.leaf_order, vec!["github.com/b/b", "github.com/a/a"]);
    }

    #[test]
    fn test_from_declarations_invalid_inserts_nothing() {
        let mut graph = ImportGraph::new();
        let mut bad = decl("github.com/bad/bad");
        bad.tag = Some("v1".into());
        bad.branch = Some("master".into());

        let result = Dependencies::from_declarations(&[decl("github.com/a/a"), bad], &mut graph);
        assert!(result.is_err());
        assert!(graph.is_empty());
    }
}
