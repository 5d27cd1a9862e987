// src/render/mod.rs

//! Rendering a validated, ordered job graph into a YAML pipeline document.

pub mod workflow;

pub use workflow::WorkflowRenderer;
