// src/config/mod.rs

//! Configuration loading and data model.
//!
//! - [`model`] is the serde mapping of the TOML file.
//! - [`loader`] reads and parses a file from disk.
//!
//! Semantic validation (duplicate targets, unknown references) happens when
//! the matrix is turned into a [`NodeCatalog`](crate::graph::NodeCatalog),
//! not here.

pub mod loader;
pub mod model;

pub use loader::load_from_path;
pub use model::ConfigFile;
