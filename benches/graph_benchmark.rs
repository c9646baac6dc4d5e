use criterion::{Criterion, criterion_group, criterion_main};
use gopack::deps::Dep;
use gopack::graph::ImportGraph;
use gopack::imports::parse_imports;
use std::hint::black_box;

const MOCK_SOURCE: &str = r#"// Package server wires the HTTP handlers.
package server

import (
	"encoding/json"
	"fmt"
	"net/http"

	"github.com/gorilla/mux"
	toml "github.com/pelletier/go-toml"
	_ "github.com/lib/pq"
	"code.google.com/p/go.net/websocket"
)

import "labix.org/v2/mgo"

func Handler(w http.ResponseWriter, r *http.Request) {
	fmt.Fprintln(w, "import \"not/an/import\"")
}
"#;

fn populated_graph() -> ImportGraph {
    let mut graph = ImportGraph::new();
    for host in ["github.com", "bitbucket.org", "code.google.com"] {
        for owner in 0..20 {
            for repo in 0..10 {
                graph.insert(Dep::passthrough(&format!("{host}/owner{owner}/repo{repo}")));
            }
        }
    }
    graph
}

fn bench_graph_insert(c: &mut Criterion) {
    c.bench_function("graph_insert_600", |b| b.iter(|| black_box(populated_graph())));
}

fn bench_graph_lookup(c: &mut Criterion) {
    let graph = populated_graph();
    c.bench_function("graph_lookup_subpackage", |b| {
        b.iter(|| graph.lookup(black_box("github.com/owner7/repo3/internal/codec")))
    });
    c.bench_function("graph_lookup_miss", |b| {
        b.iter(|| graph.lookup(black_box("gopkg.in/yaml.v2")))
    });
}

fn bench_parse_imports(c: &mut Criterion) {
    c.bench_function("parse_go_imports", |b| {
        b.iter(|| parse_imports(black_box(MOCK_SOURCE)))
    });
}

criterion_group!(
    benches,
    bench_graph_insert,
    bench_graph_lookup,
    bench_parse_imports
);
criterion_main!(benches);
