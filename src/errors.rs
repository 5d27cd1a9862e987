// src/errors.rs

//! Crate-wide error types.
//!
//! Two tiers, matching where a problem can be detected:
//! - [`CatalogError`]: bad user configuration, caught while constructing the
//!   [`NodeCatalog`](crate::graph::NodeCatalog).
//! - [`GraphError`]: structural problems in a built job graph, caught by the
//!   validator before anything is rendered.
//!
//! Internal-invariant violations (the builder referencing a target outside
//! the catalog) are bugs, not user errors, and panic instead.

use thiserror::Error;

/// Configuration errors detected at catalog construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate runtime target '{0}'")]
    DuplicateTarget(String),

    #[error("matrix must declare at least one runtime target")]
    EmptyTargets,

    #[error("duplicate cross-version spec '{0}'")]
    DuplicateCrossVersion(String),

    #[error("cross-version spec '{spec}' declares no targets")]
    EmptyCrossVersionTargets { spec: String },

    #[error("cross-version spec '{spec}' lists target '{target}' more than once")]
    DuplicateTargetInSpec { spec: String, target: String },

    #[error("cross-version spec '{spec}' references unknown target '{target}'")]
    UnknownTargetReference { spec: String, target: String },
}

/// Structural errors detected while validating a built job graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate job node '{0}'")]
    DuplicateNode(String),

    #[error("job '{node}' depends on unknown job '{missing}'")]
    DanglingDependency { node: String, missing: String },

    #[error("dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}

/// Top-level error type for the CLI entry points.
#[derive(Error, Debug)]
pub enum PipegenError {
    #[error("Configuration error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML rendering error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PipegenError>;
