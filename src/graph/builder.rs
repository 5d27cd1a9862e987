// src/graph/builder.rs

use tracing::debug;

use crate::config::model::{ArtifactsSection, CacheSection, ConfigFile};
use crate::graph::catalog::{CrossVersionSpec, NodeCatalog, RuntimeTarget};
use crate::graph::node::{BuildGraph, CacheDirective, CacheKey, JobKind, JobNode};

/// Name of the root checkout job.
pub const CHECKOUT_JOB: &str = "checkout";

/// Job name for building on a target.
pub fn build_job_name(target: &RuntimeTarget) -> String {
    format!("build-{}", target.id)
}

/// Job name for a cross-version test on a target.
pub fn test_job_name(spec: &str, target: &RuntimeTarget) -> String {
    format!("test-{}-{}", spec, target.id)
}

/// Expands a validated [`NodeCatalog`] into a [`BuildGraph`].
///
/// Pure with respect to its inputs: no I/O, no randomness. The same catalog
/// and cache settings always produce the same graph.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    cache: CacheSection,
    artifacts: ArtifactsSection,
}

impl GraphBuilder {
    pub fn new(cache: CacheSection, artifacts: ArtifactsSection) -> Self {
        Self { cache, artifacts }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.cache.clone(), cfg.artifacts.clone())
    }

    /// Build the job graph.
    ///
    /// Node and edge layout:
    /// - one root `checkout` job with no dependencies;
    /// - one `build-<t>` job per target; the first target depends on
    ///   `checkout`, every later target depends on the *first* build job,
    ///   so the primary lane gates the secondary lanes;
    /// - one `test-<spec>-<t>` job per (spec, target) pair, depending on
    ///   `build-<t>`, and for every target after the spec's first also on
    ///   the spec's first test job. Cross-version lanes chain behind their
    ///   own first instance, independently of the build chain.
    pub fn build(&self, catalog: &NodeCatalog) -> BuildGraph {
        let mut graph = BuildGraph::with_catalog(catalog.clone());

        let primary = catalog.primary_target().clone();

        graph.insert(JobNode {
            name: CHECKOUT_JOB.to_string(),
            kind: JobKind::Checkout,
            // The checkout job runs on the primary target's image.
            target: primary.clone(),
            depends_on: Vec::new(),
            cache_directives: vec![CacheDirective::PersistWorkspace],
        });

        for target in catalog.targets() {
            let gate = if target == &primary {
                CHECKOUT_JOB.to_string()
            } else {
                build_job_name(&primary)
            };

            graph.insert(JobNode {
                name: build_job_name(target),
                kind: JobKind::BuildOnTarget,
                target: target.clone(),
                depends_on: vec![gate],
                cache_directives: self.build_directives(target),
            });
        }

        for spec in catalog.cross_versions() {
            self.insert_cross_version_jobs(&mut graph, spec);
        }

        debug!(jobs = graph.len(), "expanded catalog into job graph");
        graph
    }

    fn insert_cross_version_jobs(&self, graph: &mut BuildGraph, spec: &CrossVersionSpec) {
        // Catalog construction guarantees spec targets are a non-empty
        // subset of the base targets; a miss here is a builder bug.
        let first = &spec.targets[0];

        for target in &spec.targets {
            let build_dep = build_job_name(target);
            assert!(
                graph.contains(&build_dep),
                "cross-version spec '{}' expanded against target '{}' with no build job",
                spec.name,
                target.id
            );

            let mut depends_on = vec![build_dep];
            if target != first {
                depends_on.push(test_job_name(&spec.name, first));
            }

            graph.insert(JobNode {
                name: test_job_name(&spec.name, target),
                kind: JobKind::CrossVersionTest {
                    spec: spec.name.clone(),
                    version: spec.version.clone(),
                },
                target: target.clone(),
                depends_on,
                cache_directives: self.cross_version_directives(&spec.version),
            });
        }
    }

    /// Directives for a build job: workspace in, per-target dependency
    /// cache (plus the primary tool's own version cache, when configured)
    /// around the run step, test results out, workspace out.
    fn build_directives(&self, target: &RuntimeTarget) -> Vec<CacheDirective> {
        let deps_key = CacheKey::dependencies(
            self.cache.schema_version,
            target,
            &self.cache.fingerprint_source,
        );

        let mut directives = vec![
            CacheDirective::AttachWorkspace,
            CacheDirective::Restore {
                label: format!("Restoring dependencies ({})", target.id),
                key: deps_key.clone(),
            },
        ];
        if let Some(version) = &self.cache.tool_version {
            directives.push(self.restore_tool(version));
        }
        if let Some(store) = self.store_results() {
            directives.push(store);
        }
        if let Some(version) = &self.cache.tool_version {
            directives.push(self.save_tool(version));
        }
        directives.push(CacheDirective::Save {
            label: format!("Saving dependencies ({})", target.id),
            key: deps_key,
            paths: self.cache.dependency_paths.clone(),
        });
        directives.push(CacheDirective::PersistWorkspace);
        directives
    }

    /// Directives for a cross-version test job: workspace in, the primary
    /// tool's cache (when configured) and the spec version's cache around
    /// the run step, test results out, workspace out. Only the spec
    /// version's cache is saved here; the primary tool's is saved by the
    /// build jobs.
    fn cross_version_directives(&self, version: &str) -> Vec<CacheDirective> {
        let mut directives = vec![CacheDirective::AttachWorkspace];
        if let Some(current) = &self.cache.tool_version {
            directives.push(self.restore_tool(current));
        }
        directives.push(self.restore_tool(version));
        if let Some(store) = self.store_results() {
            directives.push(store);
        }
        directives.push(self.save_tool(version));
        directives.push(CacheDirective::PersistWorkspace);
        directives
    }

    fn restore_tool(&self, version: &str) -> CacheDirective {
        CacheDirective::Restore {
            label: format!("Restoring tool {version}"),
            key: CacheKey::tool_version(self.cache.schema_version, version),
        }
    }

    fn save_tool(&self, version: &str) -> CacheDirective {
        CacheDirective::Save {
            label: format!("Saving tool {version}"),
            key: CacheKey::tool_version(self.cache.schema_version, version),
            paths: self
                .cache
                .tool_paths_template
                .iter()
                .map(|p| p.replace("{version}", version))
                .collect(),
        }
    }

    fn store_results(&self) -> Option<CacheDirective> {
        if self.artifacts.test_results_paths.is_empty() {
            None
        } else {
            Some(CacheDirective::StoreResults {
                paths: self.artifacts.test_results_paths.clone(),
            })
        }
    }
}
