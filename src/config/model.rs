// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [matrix]
/// targets = [8, 11]
/// image_template = "circleci/openjdk:{target}-jdk"
/// environment = ["GRADLE_OPTS=-Dorg.gradle.daemon=false"]
///
/// [cross_version.gradle410]
/// version = "4.10.3"
/// targets = [8, 11]
///
/// [cache]
/// schema_version = 3
/// fingerprint_source = "build.gradle.kts"
/// dependency_paths = ["~/.gradle/caches/modules-2/"]
/// tool_version = "5.6.4"
///
/// [artifacts]
/// test_results_paths = ["build/test-results/"]
///
/// [commands]
/// build = "./gradlew build"
/// cross_test = "./gradlew test -Ptest.version={version}"
///
/// [output]
/// path = ".ci/pipeline.yml"
/// ```
///
/// All sections except `[matrix]` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// The build/test matrix from `[matrix]`.
    pub matrix: MatrixSection,

    /// Cross-version specs from `[cross_version.<name>]`.
    ///
    /// Keys are the spec names (e.g. `"gradle410"`).
    #[serde(default)]
    pub cross_version: BTreeMap<String, CrossVersionConfig>,

    /// Cache key/path settings from `[cache]`.
    #[serde(default)]
    pub cache: CacheSection,

    /// Result-collection settings from `[artifacts]`.
    #[serde(default)]
    pub artifacts: ArtifactsSection,

    /// Command templates from `[commands]`.
    #[serde(default)]
    pub commands: CommandsSection,

    /// Output settings from `[output]`.
    #[serde(default)]
    pub output: OutputSection,
}

/// A target identifier as written in TOML: either an integer (`8`) or a
/// string (`"jdk8"`). Normalised to a string everywhere past parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTargetId {
    Int(u64),
    Str(String),
}

impl RawTargetId {
    pub fn into_id(self) -> String {
        match self {
            RawTargetId::Int(n) => n.to_string(),
            RawTargetId::Str(s) => s,
        }
    }
}

/// `[matrix]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixSection {
    /// Runtime targets, in declaration order. The first target is the
    /// primary lane: it gates all later build jobs and hosts the checkout
    /// job.
    pub targets: Vec<RawTargetId>,

    /// Docker image per target; `{target}` is replaced by the target id.
    #[serde(default = "default_image_template")]
    pub image_template: String,

    /// `KEY=value` environment entries attached to every job.
    #[serde(default)]
    pub environment: Vec<String>,
}

fn default_image_template() -> String {
    "ci-runner:{target}".to_string()
}

/// `[cross_version.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossVersionConfig {
    /// The secondary tool version to test against (e.g. `"4.10.3"`).
    pub version: String,

    /// Subset of `[matrix].targets` this version is tested on.
    pub targets: Vec<RawTargetId>,
}

/// `[cache]` section.
///
/// `schema_version` is a manually bumped integer baked into every cache key
/// so the whole cache family can be invalidated at once.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// File whose checksum scopes the dependency cache. Emitted as a
    /// `{{ checksum "..." }}` template for the CI system to resolve.
    #[serde(default = "default_fingerprint_source")]
    pub fingerprint_source: String,

    /// Paths saved in the per-target dependency cache.
    #[serde(default)]
    pub dependency_paths: Vec<String>,

    /// Paths saved in the per-version tool cache; `{version}` is replaced
    /// by the cross-version spec's version string.
    #[serde(default)]
    pub tool_paths_template: Vec<String>,

    /// Version of the primary tool itself. When set, build jobs restore and
    /// save its version-scoped cache, and cross-version test jobs restore it
    /// alongside their own version's cache.
    #[serde(default)]
    pub tool_version: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_fingerprint_source() -> String {
    "Pipegen.toml".to_string()
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            fingerprint_source: default_fingerprint_source(),
            dependency_paths: Vec::new(),
            tool_paths_template: Vec::new(),
            tool_version: None,
        }
    }
}

/// `[artifacts]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArtifactsSection {
    /// Paths collected as test results by build and cross-version test
    /// jobs. Empty means no results step is emitted.
    #[serde(default)]
    pub test_results_paths: Vec<String>,
}

/// `[commands]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsSection {
    /// Command run by every build job.
    #[serde(default = "default_build_command")]
    pub build: String,

    /// Command template run by cross-version test jobs; `{version}` is
    /// replaced by the spec's version string.
    #[serde(default = "default_cross_test_command")]
    pub cross_test: String,
}

fn default_build_command() -> String {
    "./build.sh".to_string()
}

fn default_cross_test_command() -> String {
    "./test.sh {version}".to_string()
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            build: default_build_command(),
            cross_test: default_cross_test_command(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Where the rendered pipeline document is written.
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_output_path() -> String {
    ".ci/pipeline.yml".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}
