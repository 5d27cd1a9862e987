use std::error::Error;
use std::fs;
use std::path::PathBuf;

use pipegen::cli::CliArgs;
use pipegen::config::load_from_path;

type TestResult = Result<(), Box<dyn Error>>;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn rendered_demo() -> Result<serde_yaml::Value, Box<dyn Error>> {
    let cfg = load_from_path(demo_path("gradle-matrix.toml"))?;
    let doc = pipegen::render_pipeline(&cfg)?;
    Ok(serde_yaml::from_str(&doc)?)
}

#[test]
fn tool_version_cache_keys_are_normalized() -> TestResult {
    let doc = rendered_demo()?;

    let restore_key = &doc["jobs"]["test-gradle410-8"]["steps"][2]["restore_cache"]["keys"][0];
    assert_eq!(restore_key.as_str(), Some("v3-tool-4-10-3"));

    let save_key = &doc["jobs"]["test-gradle410-8"]["steps"][5]["save_cache"]["key"];
    assert_eq!(save_key.as_str(), Some("v3-tool-4-10-3"));

    // The un-normalized version still appears in the command, untouched.
    let command = &doc["jobs"]["test-gradle410-8"]["steps"][3]["run"]["command"];
    assert_eq!(
        command.as_str(),
        Some("./gradlew test -Ptest.gradle-version=4.10.3")
    );

    Ok(())
}

#[test]
fn build_jobs_cache_the_primary_tool_distribution() -> TestResult {
    let doc = rendered_demo()?;

    // [cache].tool_version = "5.6.4": build jobs restore and save the
    // primary tool's version-scoped cache around the run step.
    let restore_key = &doc["jobs"]["build-8"]["steps"][2]["restore_cache"]["keys"][0];
    assert_eq!(restore_key.as_str(), Some("v3-tool-5-6-4"));

    let save = &doc["jobs"]["build-8"]["steps"][5]["save_cache"];
    assert_eq!(save["key"].as_str(), Some("v3-tool-5-6-4"));
    assert_eq!(
        save["paths"][0].as_str(),
        Some("~/.gradle/wrapper/dists/gradle-5.6.4-bin/")
    );

    // Cross-version jobs restore the primary tool's cache too, but only
    // save their own version's.
    let current = &doc["jobs"]["test-gradle410-8"]["steps"][1]["restore_cache"]["keys"][0];
    assert_eq!(current.as_str(), Some("v3-tool-5-6-4"));

    Ok(())
}

#[test]
fn test_results_are_collected_after_the_run_step() -> TestResult {
    let doc = rendered_demo()?;

    for job in ["build-8", "build-11", "test-gradle410-8", "test-gradle43-8"] {
        let store = &doc["jobs"][job]["steps"][4]["store_test_results"]["paths"][0];
        assert_eq!(
            store.as_str(),
            Some("build/test-results/"),
            "missing results step on {job}"
        );
    }

    // The root checkout job produces no test results.
    let steps = doc["jobs"]["checkout"]["steps"]
        .as_sequence()
        .ok_or("steps is not a sequence")?;
    assert!(steps.iter().all(|s| s.get("store_test_results").is_none()));

    Ok(())
}

#[test]
fn no_results_step_without_configured_paths() -> TestResult {
    let cfg = load_from_path(demo_path("minimal.toml"))?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&pipegen::render_pipeline(&cfg)?)?;

    let steps = doc["jobs"]["build-stable"]["steps"]
        .as_sequence()
        .ok_or("steps is not a sequence")?;
    assert!(steps.iter().all(|s| s.get("store_test_results").is_none()));

    Ok(())
}

#[test]
fn dependency_cache_keys_embed_the_fingerprint_template() -> TestResult {
    let doc = rendered_demo()?;

    let key = &doc["jobs"]["build-8"]["steps"][1]["restore_cache"]["keys"][0];
    assert_eq!(
        key.as_str(),
        Some("v3-deps-8-{{ checksum \"build.gradle.kts\" }}")
    );

    Ok(())
}

#[test]
fn jobs_carry_image_and_environment() -> TestResult {
    let doc = rendered_demo()?;

    assert_eq!(
        doc["jobs"]["build-11"]["docker"][0]["image"].as_str(),
        Some("circleci/openjdk:11-jdk")
    );
    assert_eq!(
        doc["jobs"]["checkout"]["environment"]["GRADLE_OPTS"].as_str(),
        Some("-Dorg.gradle.daemon=false")
    );

    Ok(())
}

#[test]
fn workflow_requires_match_graph_edges() -> TestResult {
    let doc = rendered_demo()?;

    let jobs = doc["workflows"]["pipeline"]["jobs"]
        .as_sequence()
        .ok_or("workflows.pipeline.jobs is not a sequence")?;

    // Root job is listed as a bare name.
    assert_eq!(jobs[0].as_str(), Some("checkout"));

    let requires_of = |name: &str| -> Option<Vec<String>> {
        jobs.iter().find_map(|entry| {
            let req = entry.get(name)?.get("requires")?.as_sequence()?;
            Some(
                req.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            )
        })
    };

    assert_eq!(requires_of("build-8"), Some(vec!["checkout".to_string()]));
    assert_eq!(requires_of("build-11"), Some(vec!["build-8".to_string()]));
    assert_eq!(
        requires_of("test-gradle410-11"),
        Some(vec![
            "build-11".to_string(),
            "test-gradle410-8".to_string()
        ])
    );

    Ok(())
}

#[test]
fn workspace_steps_wrap_every_non_root_job() -> TestResult {
    let doc = rendered_demo()?;

    for job in ["build-8", "build-11", "test-gradle43-8"] {
        let steps = doc["jobs"][job]["steps"]
            .as_sequence()
            .ok_or("steps is not a sequence")?;
        assert!(steps.first().and_then(|s| s.get("attach_workspace")).is_some());
        assert!(steps.last().and_then(|s| s.get("persist_to_workspace")).is_some());
    }

    // The root checkout job persists but has nothing to attach.
    let steps = doc["jobs"]["checkout"]["steps"]
        .as_sequence()
        .ok_or("steps is not a sequence")?;
    assert_eq!(steps[0].as_str(), Some("checkout"));
    assert!(steps.last().and_then(|s| s.get("persist_to_workspace")).is_some());

    Ok(())
}

#[test]
fn run_writes_the_document_to_the_output_path() -> TestResult {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("nested").join("pipeline.yml");

    let args = CliArgs {
        config: demo_path("gradle-matrix.toml").to_string_lossy().into_owned(),
        output: Some(out.to_string_lossy().into_owned()),
        stdout: false,
        check: false,
        plan: false,
        log_level: None,
    };
    pipegen::run(args)?;

    let written = fs::read_to_string(&out)?;
    let parsed: serde_yaml::Value = serde_yaml::from_str(&written)?;
    assert!(parsed.get("jobs").is_some());
    assert!(parsed.get("workflows").is_some());

    Ok(())
}

#[test]
fn invalid_config_leaves_the_output_path_untouched() -> TestResult {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("pipeline.yml");

    let args = CliArgs {
        config: demo_path("bad-unknown-target.toml")
            .to_string_lossy()
            .into_owned(),
        output: Some(out.to_string_lossy().into_owned()),
        stdout: false,
        check: false,
        plan: false,
        log_level: None,
    };

    assert!(pipegen::run(args).is_err());
    assert!(!out.exists());

    Ok(())
}

#[test]
fn check_mode_stops_before_rendering() -> TestResult {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("pipeline.yml");

    let args = CliArgs {
        config: demo_path("gradle-matrix.toml").to_string_lossy().into_owned(),
        output: Some(out.to_string_lossy().into_owned()),
        stdout: false,
        check: true,
        plan: false,
        log_level: None,
    };
    pipegen::run(args)?;
    assert!(!out.exists());

    Ok(())
}
