//! Import graph.
//!
//! A prefix trie keyed by import-path segments. Every declared dependency
//! lives on the node that consumes the last segment of its import path, so a
//! lookup for a sub-package (`github.com/x/y/sub`) stops at the first leaf on
//! the way down and yields the dependency that owns it (`github.com/x/y`).

use crate::deps::Dep;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub key: String,
    /// Only set on leaves.
    pub dependency: Option<Dep>,
    pub leaf: bool,
    pub children: BTreeMap<String, Node>,
}

impl Node {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    fn pre_order_visit<F: FnMut(&Node, usize)>(&self, f: &mut F, depth: usize) {
        for child in self.children.values() {
            f(child, depth);
            if !child.leaf {
                child.pre_order_visit(f, depth + 1);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    pub roots: BTreeMap<String, Node>,
    /// Import paths in insertion order. Re-inserted paths appear again.
    pub leaf_order: Vec<String>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `dep` at its import path. A path that is already present has its
    /// dependency replaced; the trie shape does not change.
    pub fn insert(&mut self, dep: Dep) {
        let mut segments = dep.import.split('/');
        // split always yields at least one item
        let first = segments.next().unwrap_or_default();
        let mut node = self
            .roots
            .entry(first.to_string())
            .or_insert_with(|| Node::new(first));

        for segment in segments {
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Node::new(segment));
        }

        self.leaf_order.push(dep.import.clone());
        node.leaf = true;
        node.dependency = Some(dep);
    }

    /// Descend along `import_path` and return the first leaf met, even when
    /// segments remain unconsumed.
    pub fn search(&self, import_path: &str) -> Option<&Node> {
        let mut nodes = &self.roots;
        for segment in import_path.split('/') {
            let node = nodes.get(segment)?;
            if node.leaf {
                return Some(node);
            }
            nodes = &node.children;
        }
        None
    }

    /// Dependency owning `import_path`, if any.
    pub fn lookup(&self, import_path: &str) -> Option<&Dep> {
        self.search(import_path)
            .and_then(|node| node.dependency.as_ref())
    }

    /// Dependency declared at exactly `import_path`, ignoring shorter leaves
    /// on the way down.
    pub fn get(&self, import_path: &str) -> Option<&Dep> {
        let mut segments = import_path.split('/');
        let first = segments.next()?;
        let mut node = self.roots.get(first)?;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        node.dependency.as_ref().filter(|_| node.leaf)
    }

    pub fn pre_order_visit<F: FnMut(&Node, usize)>(&self, mut f: F) {
        for root in self.roots.values() {
            f(root, 0);
            if !root.leaf {
                root.pre_order_visit(&mut f, 1);
            }
        }
    }

    /// Leaf imports in first-insertion order, without the self repository.
    pub fn install_order(&self, self_repo: Option<&str>) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.leaf_order
            .iter()
            .map(String::as_str)
            .filter(|import| Some(*import) != self_repo)
            .filter(|import| seen.insert(*import))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(import: &str) -> Dep {
        Dep::passthrough(import)
    }

    fn assert_path(graph: &ImportGraph, import: &str) {
        let segments: Vec<&str> = import.split('/').collect();
        let mut nodes = &graph.roots;
        for (idx, segment) in segments.iter().enumerate() {
            let node = nodes.get(*segment).expect("segment node should exist");
            if idx < segments.len() - 1 {
                assert!(!node.leaf, "{} should not be a leaf", segment);
                assert!(node.dependency.is_none());
                nodes = &node.children;
            } else {
                assert!(node.leaf, "{} should be a leaf", segment);
                assert_eq!(node.dependency.as_ref().unwrap().import, import);
            }
        }
    }

    #[test]
    fn test_single_node_is_root_and_leaf() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com"));

        let root = graph.roots.get("github.com").unwrap();
        assert!(root.leaf);
        assert_eq!(root.dependency.as_ref().unwrap().import, "github.com");
    }

    #[test]
    fn test_several_roots() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com"));
        graph.insert(dep("code.google.com"));

        assert!(graph.roots.contains_key("github.com"));
        assert!(graph.roots.contains_key("code.google.com"));
    }

    #[test]
    fn test_three_segments_create_three_nodes() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("a/b/c"));

        let mut count = 0;
        graph.pre_order_visit(|_, _| count += 1);
        assert_eq!(count, 3);
        assert_path(&graph, "a/b/c");
    }

    #[test]
    fn test_deep_graph() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/d2fn/gopack"));
        graph.insert(dep("code.google.com/p/go.net"));

        assert_path(&graph, "github.com/d2fn/gopack");
        assert_path(&graph, "code.google.com/p/go.net");
    }

    #[test]
    fn test_search_empty_graph() {
        let graph = ImportGraph::new();
        assert!(graph.search("github.com/d2fn/gopack").is_none());
    }

    #[test]
    fn test_search_different_repo() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/d2fn/gopack"));
        assert!(graph.search("github.com/dotcloud/docker").is_none());
    }

    #[test]
    fn test_search_bare_name() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/d2fn/gopack"));
        assert!(graph.search("github.com/d2fn/gopack").is_some());
    }

    #[test]
    fn test_search_sub_package_resolves_to_owner() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/d2fn/gopack"));

        let found = graph.lookup("github.com/d2fn/gopack/graph").unwrap();
        assert_eq!(found.import, "github.com/d2fn/gopack");
    }

    #[test]
    fn test_get_matches_exact_path_only() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/x/y"));
        graph.insert(dep("github.com/x/y/z"));

        assert_eq!(graph.lookup("github.com/x/y/z").unwrap().import, "github.com/x/y");
        assert_eq!(graph.get("github.com/x/y/z").unwrap().import, "github.com/x/y/z");
        assert_eq!(graph.get("github.com/x/y").unwrap().import, "github.com/x/y");
        assert!(graph.get("github.com/x").is_none());
        assert!(graph.get("github.com/x/y/z/sub").is_none());
    }

    #[test]
    fn test_search_shorter_than_declared_fails() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/d2fn/gopack"));
        assert!(graph.search("github.com/d2fn").is_none());
    }

    #[test]
    fn test_search_respects_segment_boundaries() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/x/y"));
        assert!(graph.search("github.com/x/yz").is_none());
    }

    #[test]
    fn test_reinsert_last_writer_wins() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/x/y"));

        let mut replacement = dep("github.com/x/y");
        replacement.source = Some("marker".to_string());
        graph.insert(replacement);

        let found = graph.lookup("github.com/x/y").unwrap();
        assert_eq!(found.source.as_deref(), Some("marker"));

        let mut count = 0;
        graph.pre_order_visit(|_, _| count += 1);
        assert_eq!(count, 3);
        assert_eq!(graph.leaf_order, vec!["github.com/x/y", "github.com/x/y"]);
    }

    #[test]
    fn test_install_order_skips_self_repo_and_duplicates() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/me/app"));
        graph.insert(dep("github.com/b/b"));
        graph.insert(dep("github.com/a/a"));
        graph.insert(dep("github.com/b/b"));

        assert_eq!(
            graph.install_order(Some("github.com/me/app")),
            vec!["github.com/b/b", "github.com/a/a"]
        );
    }

    #[test]
    fn test_pre_order_visit_reports_depth() {
        let mut graph = ImportGraph::new();
        graph.insert(dep("github.com/x/y"));
        graph.insert(dep("github.com/z"));

        let mut seen = Vec::new();
        graph.pre_order_visit(|node, depth| seen.push((node.key.clone(), depth)));
        assert_eq!(
            seen,
            vec![
                ("github.com".to_string(), 0),
                ("x".to_string(), 1),
                ("y".to_string(), 2),
                ("z".to_string(), 1),
            ]
        );
    }
}
