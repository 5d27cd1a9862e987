// src/render/workflow.rs

use serde_yaml::{Mapping, Value};

use crate::config::model::{CommandsSection, ConfigFile};
use crate::graph::node::{BuildGraph, CacheDirective, JobKind, JobNode};

/// Serializes a validated job graph into the pipeline document.
///
/// Purely a serialization step: no decisions about graph shape are made
/// here. The document is built from insertion-ordered `serde_yaml`
/// mappings, so identical input yields byte-identical output.
#[derive(Debug, Clone)]
pub struct WorkflowRenderer {
    image_template: String,
    environment: Vec<String>,
    commands: CommandsSection,
}

impl WorkflowRenderer {
    pub fn new(image_template: String, environment: Vec<String>, commands: CommandsSection) -> Self {
        Self {
            image_template,
            environment,
            commands,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            cfg.matrix.image_template.clone(),
            cfg.matrix.environment.clone(),
            cfg.commands.clone(),
        )
    }

    /// Render the document. `order` is the scheduler's topological order and
    /// controls the listing order of both the `jobs` and `workflows`
    /// sections; the `requires` edges are the graph's `depends_on` sets
    /// exactly, independent of topological position.
    pub fn render(&self, graph: &BuildGraph, order: &[String]) -> Result<String, serde_yaml::Error> {
        let mut doc = Mapping::new();
        doc.insert(str_val("version"), Value::Number(2.into()));

        let mut jobs = Mapping::new();
        for name in order {
            let node = graph
                .get(name)
                .unwrap_or_else(|| panic!("ordered job '{name}' missing from graph"));
            jobs.insert(str_val(name), self.render_job(node));
        }
        doc.insert(str_val("jobs"), Value::Mapping(jobs));

        let mut workflow_jobs = Vec::new();
        for name in order {
            let node = graph.get(name).expect("checked above");
            if node.depends_on.is_empty() {
                workflow_jobs.push(str_val(name));
            } else {
                let mut requires = Mapping::new();
                requires.insert(
                    str_val("requires"),
                    Value::Sequence(node.depends_on.iter().map(|d| str_val(d)).collect()),
                );
                let mut entry = Mapping::new();
                entry.insert(str_val(name), Value::Mapping(requires));
                workflow_jobs.push(Value::Mapping(entry));
            }
        }

        let mut pipeline = Mapping::new();
        pipeline.insert(str_val("jobs"), Value::Sequence(workflow_jobs));
        let mut workflows = Mapping::new();
        workflows.insert(str_val("version"), Value::Number(2.into()));
        workflows.insert(str_val("pipeline"), Value::Mapping(pipeline));
        doc.insert(str_val("workflows"), Value::Mapping(workflows));

        serde_yaml::to_string(&Value::Mapping(doc))
    }

    fn render_job(&self, node: &JobNode) -> Value {
        let mut job = Mapping::new();

        let image = self.image_template.replace("{target}", &node.target.id);
        let mut docker_entry = Mapping::new();
        docker_entry.insert(str_val("image"), str_val(&image));
        job.insert(
            str_val("docker"),
            Value::Sequence(vec![Value::Mapping(docker_entry)]),
        );

        if !self.environment.is_empty() {
            job.insert(str_val("environment"), self.render_environment());
        }

        let mut steps = Vec::new();
        for directive in node.cache_directives.iter().filter(|d| d.is_pre_run()) {
            steps.push(render_directive(directive));
        }
        steps.push(self.render_run_step(node));
        for directive in node.cache_directives.iter().filter(|d| !d.is_pre_run()) {
            steps.push(render_directive(directive));
        }
        job.insert(str_val("steps"), Value::Sequence(steps));

        Value::Mapping(job)
    }

    fn render_environment(&self) -> Value {
        let mut env = Mapping::new();
        for entry in &self.environment {
            let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
            env.insert(str_val(key), str_val(value));
        }
        Value::Mapping(env)
    }

    fn render_run_step(&self, node: &JobNode) -> Value {
        match &node.kind {
            JobKind::Checkout => str_val("checkout"),
            JobKind::BuildOnTarget => run_step("Build", &self.commands.build),
            JobKind::CrossVersionTest { version, .. } => run_step(
                &format!("Test against {version}"),
                &self.commands.cross_test.replace("{version}", version),
            ),
        }
    }
}

fn render_directive(directive: &CacheDirective) -> Value {
    match directive {
        CacheDirective::AttachWorkspace => {
            let mut body = Mapping::new();
            body.insert(str_val("at"), str_val("."));
            single_entry("attach_workspace", Value::Mapping(body))
        }
        CacheDirective::PersistWorkspace => {
            let mut body = Mapping::new();
            body.insert(str_val("root"), str_val("."));
            body.insert(str_val("paths"), Value::Sequence(vec![str_val(".")]));
            single_entry("persist_to_workspace", Value::Mapping(body))
        }
        CacheDirective::StoreResults { paths } => {
            let mut body = Mapping::new();
            body.insert(
                str_val("paths"),
                Value::Sequence(paths.iter().map(|p| str_val(p)).collect()),
            );
            single_entry("store_test_results", Value::Mapping(body))
        }
        CacheDirective::Restore { label, key } => {
            let mut body = Mapping::new();
            body.insert(str_val("name"), str_val(label));
            body.insert(
                str_val("keys"),
                Value::Sequence(vec![str_val(&key.to_string())]),
            );
            single_entry("restore_cache", Value::Mapping(body))
        }
        CacheDirective::Save { label, key, paths } => {
            let mut body = Mapping::new();
            body.insert(str_val("name"), str_val(label));
            body.insert(str_val("key"), str_val(&key.to_string()));
            body.insert(
                str_val("paths"),
                Value::Sequence(paths.iter().map(|p| str_val(p)).collect()),
            );
            single_entry("save_cache", Value::Mapping(body))
        }
    }
}

fn run_step(name: &str, command: &str) -> Value {
    let mut body = Mapping::new();
    body.insert(str_val("name"), str_val(name));
    body.insert(str_val("command"), str_val(command));
    single_entry("run", Value::Mapping(body))
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Mapping::new();
    map.insert(str_val(key), value);
    Value::Mapping(map)
}

fn str_val(s: &str) -> Value {
    Value::String(s.to_string())
}
