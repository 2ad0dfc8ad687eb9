//! End-to-end traversal tests over the public API
//!
//! Builds small Norse-family graphs and checks the externally observable
//! contract: mutation failures leave the store untouched, traversals yield
//! the right vertices in the right order, and evaluation never works ahead
//! of the consumer.

use std::cell::Cell;
use std::rc::Rc;

use gremlite::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// odin and frigg -> thor -> magni, modi, thrud (all "parent" edges)
fn family() -> GraphStore {
    GraphStore::from_records(
        vec![
            VertexRecord::with_id("odin"),
            VertexRecord::with_id("frigg"),
            VertexRecord::with_id("thor")
                .property("weapon", "Mjolnir")
                .property("species", "Aesir"),
            VertexRecord::with_id("magni"),
            VertexRecord::with_id("modi"),
            VertexRecord::with_id("thrud"),
        ],
        vec![
            EdgeRecord::new("odin", "thor").label("parent"),
            EdgeRecord::new("frigg", "thor").label("parent"),
            EdgeRecord::new("thor", "magni").label("parent"),
            EdgeRecord::new("thor", "modi").label("parent"),
            EdgeRecord::new("thor", "thrud").label("parent"),
        ],
    )
}

fn vertex_ids(run: Run<'_>) -> Vec<String> {
    run.filter_map(|r| r.as_vertex().map(|v| v.id.to_string()))
        .collect()
}

#[test]
fn duplicate_vertex_id_is_reported_and_count_unchanged() {
    init_tracing();
    let mut graph = family();
    let before = graph.vertex_count();

    let err = graph
        .add_vertex(VertexRecord::with_id("thor").property("weapon", "fork"))
        .unwrap_err();

    assert_eq!(err, GraphError::DuplicateVertexId("thor".into()));
    assert_eq!(graph.vertex_count(), before);
    let thor = graph.find_vertex_by_id(&"thor".into()).unwrap();
    assert_eq!(thor.property("weapon").unwrap().as_string(), Some("Mjolnir"));
}

#[test]
fn dangling_edge_leaves_graph_untouched() {
    init_tracing();
    let mut graph = family();
    let edges_before = graph.edge_count();
    let thor_out_before = graph.out_edges(&"thor".into(), &EdgeFilter::Any).len();

    let err = graph
        .add_edge(EdgeRecord::new("thor", "jormungandr").label("foe"))
        .unwrap_err();

    assert!(matches!(
        err,
        GraphError::DanglingEdgeEndpoint { end: EdgeEnd::In, .. }
    ));
    assert_eq!(graph.edge_count(), edges_before);
    assert_eq!(
        graph.out_edges(&"thor".into(), &EdgeFilter::Any).len(),
        thor_out_before
    );
}

#[test]
fn two_hop_chain_reaches_exactly_the_far_end() {
    let graph = GraphStore::from_records(
        vec![
            VertexRecord::with_id("a").property("name", "Alice"),
            VertexRecord::with_id("b").property("name", "Bob"),
            VertexRecord::with_id("c").property("name", "Carol"),
        ],
        vec![
            EdgeRecord::new("a", "b").label("knows"),
            EdgeRecord::new("b", "c").label("knows"),
        ],
    );

    let run = graph.start_at("a").out("knows").out("knows").run();
    assert_eq!(vertex_ids(run), vec!["c"]);

    let names: Vec<PropertyValue> = graph
        .start_at("a")
        .out("knows")
        .property("name")
        .run()
        .filter_map(QueryValue::into_value)
        .collect();
    assert_eq!(names, vec!["Bob".into()]);
}

#[test]
fn diamond_with_unique_yields_the_sink_once() {
    let graph = GraphStore::from_records(
        vec![
            VertexRecord::with_id("a"),
            VertexRecord::with_id("b"),
            VertexRecord::with_id("c"),
            VertexRecord::with_id("d"),
        ],
        vec![
            EdgeRecord::new("a", "b"),
            EdgeRecord::new("a", "c"),
            EdgeRecord::new("b", "d"),
            EdgeRecord::new("c", "d"),
        ],
    );

    // Without unique the sink shows up twice
    let raw = vertex_ids(graph.start_at("a").out(()).out(()).run());
    assert_eq!(raw, vec!["d", "d"]);

    let deduped = vertex_ids(graph.start_at("a").out(()).out(()).unique().run());
    assert_eq!(deduped, vec!["d"]);
}

#[test]
fn bookmark_round_trip_returns_to_the_start() {
    let graph = family();
    let run = graph
        .start_at("odin")
        .as_("start")
        .out("parent")
        .back("start")
        .run();
    assert_eq!(vertex_ids(run), vec!["odin"]);
}

#[test]
fn siblings_via_except() {
    let graph = family();
    let run = graph
        .start_at("magni")
        .as_("me")
        .in_("parent")
        .out("parent")
        .except("me")
        .unique()
        .run();
    assert_eq!(vertex_ids(run), vec!["modi", "thrud"]);
}

#[test]
fn merge_emits_bookmarks_in_argument_order() {
    let graph = family();
    let run = graph
        .start_at("thor")
        .as_("self")
        .in_("parent")
        .take(1)
        .as_("father")
        .merge(["self", "father"])
        .run();
    assert_eq!(vertex_ids(run), vec!["thor", "odin"]);
}

/// Pass-through step that counts every gremlin it forwards.
struct Turnstile {
    forwarded: Rc<Cell<usize>>,
}

impl PipeStep for Turnstile {
    fn step(&mut self, _graph: &GraphStore, input: Option<Gremlin>) -> PipeResult {
        match input {
            Some(gremlin) => {
                self.forwarded.set(self.forwarded.get() + 1);
                PipeResult::Gremlin(gremlin)
            }
            None => PipeResult::Pull,
        }
    }
}

#[test]
fn take_two_pulls_exactly_two_results_from_upstream() {
    let graph = family();

    let forwarded = Rc::new(Cell::new(0));
    let counter = Rc::clone(&forwarded);
    let mut catalog = Pipetypes::default();
    catalog.register("turnstile", move |_args| {
        Box::new(Turnstile {
            forwarded: Rc::clone(&counter),
        })
    });

    // thor has three children; take(2) must not cause a third to cross
    // the turnstile
    let results: Vec<_> = graph
        .start_at("thor")
        .out("parent")
        .add("turnstile", vec![])
        .take(2)
        .with_pipetypes(catalog)
        .run()
        .collect();

    assert_eq!(results.len(), 2);
    assert_eq!(forwarded.get(), 2);
}

#[test]
fn find_all_hands_out_a_detached_sequence() {
    let graph = family();

    let mut all = graph.find_vertices(&VertexSelector::All);
    all.clear();

    assert_eq!(graph.vertex_count(), 6);
    assert_eq!(graph.find_vertices(&VertexSelector::All).len(), 6);
    assert_eq!(vertex_ids(graph.start_at(()).take(1).run()), vec!["odin"]);
}

#[test]
fn identical_programs_yield_identical_ordered_results() {
    let graph = family();
    let build = || {
        graph
            .start_at(())
            .out("parent")
            .unique()
            .run()
    };
    assert_eq!(vertex_ids(build()), vertex_ids(build()));
}

#[test]
fn unregistered_step_name_is_a_transparent_no_op() {
    init_tracing();
    let graph = family();

    let with_typo = vertex_ids(
        graph
            .start_at("thor")
            .add("undefined_pipe", vec![])
            .out("parent")
            .run(),
    );
    let without = vertex_ids(graph.start_at("thor").out("parent").run());
    assert_eq!(with_typo, without);
}

#[test]
fn label_array_filters_by_membership() {
    let graph = GraphStore::from_records(
        vec![
            VertexRecord::with_id("thor"),
            VertexRecord::with_id("sif"),
            VertexRecord::with_id("loki"),
            VertexRecord::with_id("mjolnir"),
        ],
        vec![
            EdgeRecord::new("thor", "sif").label("spouse"),
            EdgeRecord::new("thor", "loki").label("brother"),
            EdgeRecord::new("thor", "mjolnir").label("owns"),
        ],
    );

    let run = graph.start_at("thor").out(["spouse", "brother"]).run();
    assert_eq!(vertex_ids(run), vec!["sif", "loki"]);
}

#[test]
fn property_selector_scan_feeds_a_query() {
    let graph = family();
    let mut selector = PropertyMap::new();
    selector.insert("species".to_string(), "Aesir".into());

    let run = graph.start_at(selector).out("parent").run();
    assert_eq!(vertex_ids(run), vec!["magni", "modi", "thrud"]);
}

#[test]
fn interleaved_runs_do_not_disturb_each_other() {
    let graph = family();
    let mut first = graph.start_at(()).run();
    let mut second = graph.start_at(()).run();

    let mut seen_first = Vec::new();
    let mut seen_second = Vec::new();
    loop {
        match (first.next(), second.next()) {
            (None, None) => break,
            (a, b) => {
                if let Some(v) = a.as_ref().and_then(|r| r.as_vertex()) {
                    seen_first.push(v.id.to_string());
                }
                if let Some(v) = b.as_ref().and_then(|r| r.as_vertex()) {
                    seen_second.push(v.id.to_string());
                }
            }
        }
    }
    assert_eq!(seen_first, seen_second);
    assert_eq!(seen_first.len(), 6);
}

#[test]
fn records_load_from_json() -> anyhow::Result<()> {
    let vertices: Vec<VertexRecord> = serde_json::from_str(
        r#"[{"_id": "alice"}, {"_id": 10, "name": "bob", "hobbies": ["asdf", {"x": 3}]}]"#,
    )?;
    let edges: Vec<EdgeRecord> =
        serde_json::from_str(r#"[{"_out": "alice", "_in": 10, "_label": "knows"}]"#)?;
    let graph = GraphStore::from_records(vertices, edges);

    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let known = vertex_ids(graph.start_at("alice").out("knows").run());
    assert_eq!(known, vec!["10"]);

    let bob = graph.find_vertex_by_id(&VertexId::Int(10)).unwrap();
    assert_eq!(bob.property("name").unwrap().as_string(), Some("bob"));
    Ok(())
}

#[test]
fn bulk_load_reports_and_skips_bad_records() {
    init_tracing();
    let graph = GraphStore::from_records(
        vec![
            VertexRecord::with_id("freya"),
            VertexRecord::with_id("freya"), // duplicate
            VertexRecord::with_id("od"),
        ],
        vec![
            EdgeRecord::new("freya", "od").label("spouse"),
            EdgeRecord::new("freya", "brisingamen"), // dangling
        ],
    );

    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(
        vertex_ids(graph.start_at("freya").out("spouse").run()),
        vec!["od"]
    );
}
