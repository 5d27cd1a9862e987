use proptest::prelude::*;

use pipegen::config::model::{ArtifactsSection, CacheSection, CommandsSection};
use pipegen::graph::{
    CrossVersionSpec, GraphBuilder, NodeCatalog, RuntimeTarget, topological_order, validate,
};
use pipegen::render::WorkflowRenderer;

/// Strategy producing valid catalogs: 1..=6 unique targets plus up to four
/// cross-version specs, each over a non-empty subset of the targets.
fn catalog_strategy() -> impl Strategy<Value = NodeCatalog> {
    (1usize..=6).prop_flat_map(|n| {
        let targets: Vec<RuntimeTarget> = (0..n)
            .map(|i| RuntimeTarget::new(format!("t{i}")))
            .collect();

        let specs = proptest::collection::vec(
            (
                proptest::collection::btree_set(0..n, 1..=n),
                "[0-9]\\.[0-9]{1,2}(\\.[0-9]{1,2})?",
            ),
            0..4,
        );

        specs.prop_map(move |raw_specs| {
            let cross_versions = raw_specs
                .into_iter()
                .enumerate()
                .map(|(i, (indices, version))| CrossVersionSpec {
                    name: format!("cv{i}"),
                    version,
                    targets: indices.into_iter().map(|j| targets[j].clone()).collect(),
                })
                .collect();
            NodeCatalog::new(targets.clone(), cross_versions)
                .expect("strategy only builds valid catalogs")
        })
    })
}

proptest! {
    /// Every graph the builder produces from a valid catalog passes
    /// validation: unique names, resolvable deps, no cycles.
    #[test]
    fn built_graphs_are_always_valid(catalog in catalog_strategy()) {
        let graph = GraphBuilder::new(CacheSection::default(), ArtifactsSection::default()).build(&catalog);
        prop_assert!(validate(&graph).is_ok());
    }

    /// Every dependency appears strictly before its dependent in the
    /// topological order, and every job is ordered exactly once.
    #[test]
    fn order_respects_every_edge(catalog in catalog_strategy()) {
        let graph = GraphBuilder::new(CacheSection::default(), ArtifactsSection::default()).build(&catalog);
        validate(&graph).expect("built graphs validate");
        let order = topological_order(&graph);

        prop_assert_eq!(order.len(), graph.len());
        for node in graph.nodes() {
            let own = order.iter().position(|n| n == &node.name).unwrap();
            for dep in &node.depends_on {
                let dep_pos = order.iter().position(|n| n == dep).unwrap();
                prop_assert!(dep_pos < own, "{} not before {}", dep, node.name);
            }
        }
    }

    /// The full pipeline is deterministic: building, ordering and rendering
    /// the same catalog twice yields byte-identical output.
    #[test]
    fn pipeline_output_is_deterministic(catalog in catalog_strategy()) {
        let renderer = WorkflowRenderer::new(
            "runner:{target}".to_string(),
            vec!["CI=true".to_string()],
            CommandsSection::default(),
        );

        let render_once = || {
            let graph = GraphBuilder::new(CacheSection::default(), ArtifactsSection::default()).build(&catalog);
            validate(&graph).expect("built graphs validate");
            let order = topological_order(&graph);
            renderer.render(&graph, &order).expect("rendering succeeds")
        };

        prop_assert_eq!(render_once(), render_once());
    }

    /// Only the first build job hangs off checkout; later build jobs are
    /// gated behind the primary target's build job.
    #[test]
    fn primary_lane_gating_holds_for_all_catalogs(catalog in catalog_strategy()) {
        let graph = GraphBuilder::new(CacheSection::default(), ArtifactsSection::default()).build(&catalog);
        let primary = catalog.primary_target().clone();

        for target in catalog.targets() {
            let node = graph.get(&format!("build-{}", target.id)).unwrap();
            if target == &primary {
                prop_assert_eq!(node.depends_on.clone(), vec!["checkout".to_string()]);
            } else {
                prop_assert_eq!(
                    node.depends_on.clone(),
                    vec![format!("build-{}", primary.id)]
                );
            }
        }
    }
}
