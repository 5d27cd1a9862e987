// src/graph/validate.rs

use std::collections::{HashMap, HashSet};

use crate::errors::GraphError;
use crate::graph::node::BuildGraph;

/// Validate a built graph: duplicate node names, dangling dependency
/// references, then cycles. Read-only, fail-fast on the first error.
///
/// The graph builder produces correct graphs by construction; these checks
/// are the safety net for hand-built graphs and future builder changes.
pub fn validate(graph: &BuildGraph) -> Result<(), GraphError> {
    check_duplicates(graph)?;
    check_references(graph)?;
    check_acyclic(graph)?;
    Ok(())
}

fn check_duplicates(graph: &BuildGraph) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for node in graph.nodes() {
        if !seen.insert(node.name.as_str()) {
            return Err(GraphError::DuplicateNode(node.name.clone()));
        }
    }
    Ok(())
}

fn check_references(graph: &BuildGraph) -> Result<(), GraphError> {
    for node in graph.nodes() {
        for dep in &node.depends_on {
            if !graph.contains(dep) {
                return Err(GraphError::DanglingDependency {
                    node: node.name.clone(),
                    missing: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

/// Depth-first cycle search over `depends_on` edges.
///
/// A node revisited while still on the current path closes a cycle; the
/// error carries the full path, with the entry node repeated at the end
/// (e.g. `[A, B, C, A]`).
fn check_acyclic(graph: &BuildGraph) -> Result<(), GraphError> {
    let mut states: HashMap<&str, VisitState> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    for node in graph.nodes() {
        if !states.contains_key(node.name.as_str()) {
            visit(graph, &node.name, &mut states, &mut path)?;
        }
    }
    Ok(())
}

fn visit<'g>(
    graph: &'g BuildGraph,
    name: &'g str,
    states: &mut HashMap<&'g str, VisitState>,
    path: &mut Vec<String>,
) -> Result<(), GraphError> {
    states.insert(name, VisitState::Visiting);
    path.push(name.to_string());

    // `check_references` ran first, so every dep resolves.
    let node = graph
        .get(name)
        .unwrap_or_else(|| panic!("validated reference '{name}' disappeared"));

    for dep in &node.depends_on {
        match states.get(dep.as_str()) {
            Some(VisitState::Done) => {}
            Some(VisitState::Visiting) => {
                let start = path
                    .iter()
                    .position(|n| n == dep)
                    .unwrap_or_else(|| panic!("visiting node '{dep}' missing from path"));
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(dep.clone());
                return Err(GraphError::Cycle { path: cycle });
            }
            None => visit(graph, dep, states, path)?,
        }
    }

    path.pop();
    states.insert(name, VisitState::Done);
    Ok(())
}
