// src/graph/node.rs

use std::collections::HashMap;

use crate::graph::catalog::{NodeCatalog, RuntimeTarget};

/// What a job does. Drives the run step the renderer emits for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// The root job: checks the sources out and seeds the shared workspace.
    Checkout,
    /// Builds and tests on one runtime target.
    BuildOnTarget,
    /// Tests against a secondary tool version on one runtime target.
    CrossVersionTest { spec: String, version: String },
}

/// A cache key of the form `v<schema>-<scope>-<discriminant>[-<fingerprint>]`.
///
/// The fingerprint, when present, is a template (e.g. a checksum directive)
/// resolved later by the CI system, not by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub schema_version: u32,
    pub scope: String,
    pub discriminant: String,
    pub fingerprint: Option<String>,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v{}-{}-{}",
            self.schema_version, self.scope, self.discriminant
        )?;
        if let Some(ref fp) = self.fingerprint {
            write!(f, "-{fp}")?;
        }
        Ok(())
    }
}

impl CacheKey {
    /// Per-target dependency cache key, e.g.
    /// `v3-deps-8-{{ checksum "build.gradle.kts" }}`. The checksum template
    /// is left for the CI system to resolve.
    pub fn dependencies(
        schema_version: u32,
        target: &RuntimeTarget,
        fingerprint_source: &str,
    ) -> Self {
        Self {
            schema_version,
            scope: "deps".to_string(),
            discriminant: normalize_key_component(&target.id),
            fingerprint: Some(format!("{{{{ checksum \"{fingerprint_source}\" }}}}")),
        }
    }

    /// Version-scoped tool cache key, e.g. `v3-tool-4-10-3`.
    pub fn tool_version(schema_version: u32, version: &str) -> Self {
        Self {
            schema_version,
            scope: "tool".to_string(),
            discriminant: normalize_key_component(version),
            fingerprint: None,
        }
    }
}

/// Normalise a cache-key component: every non-alphanumeric character
/// becomes `-` (`4.10.3` → `4-10-3`).
pub fn normalize_key_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// One cache/workspace step attached to a job. Owned by its node, never
/// shared between nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDirective {
    /// Restore a cache by key before the run step.
    Restore { label: String, key: CacheKey },
    /// Save paths under a key after the run step.
    Save {
        label: String,
        key: CacheKey,
        paths: Vec<String>,
    },
    /// Collect test-result files after the run step.
    StoreResults { paths: Vec<String> },
    /// Persist the workspace for downstream jobs.
    PersistWorkspace,
    /// Attach the workspace persisted by upstream jobs.
    AttachWorkspace,
}

impl CacheDirective {
    /// Directives that run before the job's own command.
    pub fn is_pre_run(&self) -> bool {
        matches!(
            self,
            CacheDirective::AttachWorkspace | CacheDirective::Restore { .. }
        )
    }
}

/// A single executable unit in the output pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNode {
    pub name: String,
    pub kind: JobKind,
    pub target: RuntimeTarget,
    /// Set semantics (no duplicates, no self-reference by construction),
    /// kept as a Vec so rendering order is the declaration order.
    pub depends_on: Vec<String>,
    pub cache_directives: Vec<CacheDirective>,
}

/// The aggregate job graph: nodes keyed by name, insertion order preserved
/// so ordering and rendering are deterministic.
///
/// `insert` does not reject duplicate names; the validator reports them as
/// a [`GraphError::DuplicateNode`](crate::errors::GraphError) instead, since
/// graph builders are pluggable and hand-built graphs occur in tests.
#[derive(Debug, Clone)]
pub struct BuildGraph {
    nodes: Vec<JobNode>,
    /// Name → index of the most recently inserted node with that name.
    index: HashMap<String, usize>,
    /// The originating catalog, kept for traceability. `None` for graphs
    /// assembled by hand.
    catalog: Option<NodeCatalog>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            catalog: None,
        }
    }

    pub fn with_catalog(catalog: NodeCatalog) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            catalog: Some(catalog),
        }
    }

    pub fn insert(&mut self, node: JobNode) {
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub fn get(&self, name: &str) -> Option<&JobNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration index of a node, used as the scheduler's tie-break.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[JobNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn catalog(&self) -> Option<&NodeCatalog> {
        self.catalog.as_ref()
    }
}

impl Default for BuildGraph {
    fn default() -> Self {
        Self::new()
    }
}
