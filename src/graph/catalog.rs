// src/graph/catalog.rs

use std::collections::BTreeSet;

use crate::config::model::ConfigFile;
use crate::errors::CatalogError;

/// One execution environment a job can run under (e.g. a runtime major
/// version). The id is normalised to a string at config-parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeTarget {
    pub id: String,
}

impl RuntimeTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A named secondary tool version tested against a subset of the base
/// targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossVersionSpec {
    pub name: String,
    pub version: String,
    /// Non-empty, every element present in the catalog's base target set.
    pub targets: Vec<RuntimeTarget>,
}

/// The validated build/test matrix.
///
/// Construction checks everything the graph builder will later rely on, so
/// the builder can treat a catalog as correct by construction.
#[derive(Debug, Clone)]
pub struct NodeCatalog {
    targets: Vec<RuntimeTarget>,
    /// Sorted by spec name (the config section is a `BTreeMap`).
    cross_versions: Vec<CrossVersionSpec>,
}

impl NodeCatalog {
    /// Build a catalog from a parsed [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Result<Self, CatalogError> {
        let targets: Vec<RuntimeTarget> = cfg
            .matrix
            .targets
            .iter()
            .cloned()
            .map(|raw| RuntimeTarget::new(raw.into_id()))
            .collect();

        let cross_versions = cfg
            .cross_version
            .iter()
            .map(|(name, cv)| CrossVersionSpec {
                name: name.clone(),
                version: cv.version.clone(),
                targets: cv
                    .targets
                    .iter()
                    .cloned()
                    .map(|raw| RuntimeTarget::new(raw.into_id()))
                    .collect(),
            })
            .collect();

        Self::new(targets, cross_versions)
    }

    /// Build a catalog from already-shaped parts. Validates:
    /// - at least one target, no duplicate targets
    /// - no duplicate cross-version spec names
    /// - every spec's target list is a non-empty, duplicate-free subset of
    ///   the base targets
    pub fn new(
        targets: Vec<RuntimeTarget>,
        cross_versions: Vec<CrossVersionSpec>,
    ) -> Result<Self, CatalogError> {
        if targets.is_empty() {
            return Err(CatalogError::EmptyTargets);
        }

        let mut seen_targets = BTreeSet::new();
        for t in &targets {
            if !seen_targets.insert(t.id.clone()) {
                return Err(CatalogError::DuplicateTarget(t.id.clone()));
            }
        }

        let mut seen_specs = BTreeSet::new();
        for spec in &cross_versions {
            if !seen_specs.insert(spec.name.clone()) {
                return Err(CatalogError::DuplicateCrossVersion(spec.name.clone()));
            }
            if spec.targets.is_empty() {
                return Err(CatalogError::EmptyCrossVersionTargets {
                    spec: spec.name.clone(),
                });
            }
            let mut seen_spec_targets = BTreeSet::new();
            for t in &spec.targets {
                if !seen_targets.contains(&t.id) {
                    return Err(CatalogError::UnknownTargetReference {
                        spec: spec.name.clone(),
                        target: t.id.clone(),
                    });
                }
                if !seen_spec_targets.insert(t.id.clone()) {
                    return Err(CatalogError::DuplicateTargetInSpec {
                        spec: spec.name.clone(),
                        target: t.id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            targets,
            cross_versions,
        })
    }

    /// Base runtime targets, in declaration order.
    pub fn targets(&self) -> &[RuntimeTarget] {
        &self.targets
    }

    /// The primary target: first in declaration order.
    pub fn primary_target(&self) -> &RuntimeTarget {
        // A catalog is never empty (checked in `new`).
        &self.targets[0]
    }

    /// Cross-version specs, sorted by name.
    pub fn cross_versions(&self) -> &[CrossVersionSpec] {
        &self.cross_versions
    }
}
