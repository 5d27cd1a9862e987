// src/graph/order.rs

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::node::BuildGraph;

/// Deterministic topological order of a validated graph.
///
/// Kahn's algorithm with the ready set kept as a min-heap of declaration
/// indices: among jobs whose dependencies are all satisfied, the earliest
/// declared one always comes first. The same graph therefore always yields
/// the same order, which keeps the rendered document diff-friendly.
///
/// Precondition: the graph passed [`validate`](crate::graph::validate).
/// Panics if a cycle or dangling reference slipped through.
pub fn topological_order(graph: &BuildGraph) -> Vec<String> {
    let n = graph.len();

    // depends_on counts per node, and the reverse adjacency (dependents).
    let mut pending_deps: Vec<usize> = Vec::with_capacity(n);
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, node) in graph.nodes().iter().enumerate() {
        pending_deps.push(node.depends_on.len());
        for dep in &node.depends_on {
            let dep_idx = graph
                .index_of(dep)
                .unwrap_or_else(|| panic!("unvalidated graph: unknown dependency '{dep}'"));
            dependents[dep_idx].push(i);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = pending_deps
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(i)) = ready.pop() {
        order.push(graph.nodes()[i].name.clone());
        for &dependent in &dependents[i] {
            pending_deps[dependent] -= 1;
            if pending_deps[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    assert_eq!(
        order.len(),
        n,
        "unvalidated graph: cycle left {} job(s) unordered",
        n - order.len()
    );
    order
}
