use pybuild::dag::DependencyGraph;
use pybuild::errors::BuildError;

#[test]
fn acyclic_graph_reports_none() {
    let graph = DependencyGraph::from_edges(vec![
        ("beta", vec!["alpha"]),
        ("gamma", vec!["alpha", "beta"]),
        ("alpha", vec![]),
    ]);
    assert_eq!(graph.len(), 3);
    assert!(graph.cycles().is_none());
    assert!(graph.assert_no_cycles_present().is_ok());
}

#[test]
fn self_loop_is_a_cycle() {
    let graph = DependencyGraph::from_edges(vec![("alpha", vec!["alpha"])]);
    assert_eq!(graph.cycles(), Some(vec![vec!["alpha".to_string()]]));
}

#[test]
fn disjoint_cycles_are_all_reported() {
    let graph = DependencyGraph::from_edges(vec![
        ("aa", vec!["bb"]),
        ("bb", vec!["aa"]),
        ("cc", vec!["dd"]),
        ("dd", vec!["cc"]),
        ("ee", vec!["aa"]),
    ]);
    let mut cycles: Vec<Vec<String>> = graph
        .cycles()
        .unwrap()
        .into_iter()
        .map(|mut c| {
            c.sort();
            c
        })
        .collect();
    cycles.sort();
    assert_eq!(
        cycles,
        vec![
            vec!["aa".to_string(), "bb".to_string()],
            vec!["cc".to_string(), "dd".to_string()]
        ]
    );
}

#[test]
fn assert_no_cycles_carries_members_in_message() {
    let mut graph = DependencyGraph::new();
    graph.add_node("aa", vec!["bb"]);
    graph.add_node("bb", vec!["cc"]);
    graph.add_node("cc", vec!["aa"]);

    let err = graph.assert_no_cycles_present().unwrap_err();
    let text = err.to_string();
    for name in ["aa", "bb", "cc"] {
        assert!(text.contains(name), "missing {name} in {text}");
    }
    assert!(matches!(err, BuildError::CircularTaskDependency { .. }));
}
