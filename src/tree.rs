//! Dependency tree visualization.
//!
//! Renders the import graph one segment per line, indented by depth. Leaves
//! (declared dependencies) get a `+-` bullet and their pin, intermediate
//! path segments a `-`.
//!
//! ## Example Output
//!
//! ```text
//! - github.com
//!   - gorilla
//!     +- mux (tag: v1.8.0)
//!   - pelletier
//!     +- go-toml (commit: 23d36c0)
//! ```

use crate::deps::{CheckoutKind, Dep};
use crate::graph::ImportGraph;
use colored::*;

pub fn render_tree(graph: &ImportGraph) -> Vec<String> {
    let mut lines = Vec::new();
    graph.pre_order_visit(|node, depth| {
        let indent = "  ".repeat(depth);
        if node.leaf {
            let pin = node.dependency.as_ref().map(pin_label).unwrap_or_default();
            lines.push(format!("{}+- {}{}", indent, node.key, pin));
        } else {
            lines.push(format!("{}- {}", indent, node.key));
        }
    });
    lines
}

fn pin_label(dep: &Dep) -> String {
    match dep.checkout_kind {
        CheckoutKind::None => String::new(),
        CheckoutKind::Commit => format!(" (commit: {})", short_hash(&dep.checkout_spec)),
        _ => format!(" ({}: {})", dep.checkout_type(), dep.checkout_spec),
    }
}

fn short_hash(rev: &str) -> &str {
    if rev.len() > 7 && rev.is_char_boundary(7) {
        &rev[..7]
    } else {
        rev
    }
}

pub fn print_tree(graph: &ImportGraph, self_repo: Option<&str>) {
    println!("{}", self_repo.unwrap_or("(project)").bold().cyan());

    if graph.is_empty() {
        println!("└── (no dependencies)");
        return;
    }

    for line in render_tree(graph) {
        if line.trim_start().starts_with("+-") {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    let order = graph.install_order(self_repo);
    if !order.is_empty() {
        println!();
        println!("{}", "Install order:".bold());
        for (i, import) in order.iter().enumerate() {
            println!("  {}. {}", i + 1, import);
        }
    }
}
