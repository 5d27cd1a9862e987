// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_from_path;
use crate::config::model::ConfigFile;
use crate::graph::{BuildGraph, GraphBuilder, NodeCatalog, topological_order, validate};
use crate::render::WorkflowRenderer;

/// High-level entry point used by `main.rs`.
///
/// Single-pass pipeline: load config, build the catalog, expand the job
/// graph, validate it, compute the topological order, render. Any error
/// aborts before the output file is touched; the only write is one
/// `fs::write` of the finished document.
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_from_path(&config_path)?;

    let catalog = NodeCatalog::from_config(&cfg)?;
    let graph = GraphBuilder::from_config(&cfg).build(&catalog);
    validate(&graph)?;

    if args.check {
        info!(jobs = graph.len(), "graph validated; --check, stopping");
        println!("ok: {} jobs, no graph errors", graph.len());
        return Ok(());
    }

    let order = topological_order(&graph);
    debug!(?order, "computed job order");

    if args.plan {
        print_plan(&graph, &order);
        return Ok(());
    }

    let document = WorkflowRenderer::from_config(&cfg).render(&graph, &order)?;

    if args.stdout {
        print!("{document}");
        return Ok(());
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| cfg.output.path.clone());
    write_document(Path::new(&output_path), &document)?;
    info!(path = %output_path, jobs = order.len(), "pipeline document written");
    Ok(())
}

/// Write the finished document, creating parent directories as needed.
fn write_document(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    fs::write(path, document).with_context(|| format!("writing pipeline document to {:?}", path))
}

/// `--plan` output: each job in execution order with its target and deps.
fn print_plan(graph: &BuildGraph, order: &[String]) {
    println!("pipegen plan ({} jobs):", order.len());
    for name in order {
        let Some(node) = graph.get(name) else { continue };
        if node.depends_on.is_empty() {
            println!("  - {name} (target {})", node.target.id);
        } else {
            println!(
                "  - {name} (target {}) after {:?}",
                node.target.id, node.depends_on
            );
        }
    }
}

/// Convenience for tests and library users: run the whole pipeline on an
/// already-parsed config and return the rendered document.
pub fn render_pipeline(cfg: &ConfigFile) -> errors::Result<String> {
    let catalog = NodeCatalog::from_config(cfg)?;
    let graph = GraphBuilder::from_config(cfg).build(&catalog);
    validate(&graph)?;
    let order = topological_order(&graph);
    let document = WorkflowRenderer::from_config(cfg).render(&graph, &order)?;
    Ok(document)
}
