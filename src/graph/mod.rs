// src/graph/mod.rs

//! Job graph construction, validation and ordering.
//!
//! - [`catalog`] holds the validated build/test matrix.
//! - [`node`] defines job nodes, cache directives and the insertion-ordered
//!   [`BuildGraph`].
//! - [`builder`] expands a catalog into a graph.
//! - [`validate`] checks a graph for duplicates, dangling references and
//!   cycles.
//! - [`order`] computes the deterministic topological order.

pub mod builder;
pub mod catalog;
pub mod node;
pub mod order;
pub mod validate;

pub use builder::GraphBuilder;
pub use catalog::{CrossVersionSpec, NodeCatalog, RuntimeTarget};
pub use node::{BuildGraph, CacheDirective, CacheKey, JobKind, JobNode};
pub use order::topological_order;
pub use validate::validate;
