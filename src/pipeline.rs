//! Multi-project build orchestration.
//!
//! The orchestrator resolves the roster and selection, then runs each
//! selected project through the same shape of pipeline the external
//! bundler drives: resolve config, process style sources (the caller's
//! pipeline function), fire the lifecycle stages. Per-project state (the
//! resolved config and the mangling session) is owned by that project's
//! run and never shared, so projects can be processed sequentially or in
//! parallel without cross-talk.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactWriter, BuildManifest};
use crate::config::{resolve_build_config, BuildConfig, BuildMode};
use crate::error::BuildError;
use crate::mangle::{ExclusionRules, ManglingSession, ManglingStrategy};
use crate::project::{load_roster, resolve_project_set};

/// Roster location, relative to the monorepo root.
pub const ROSTER_FILE: &str = "deploy/projects.json";

/// Shared default config, relative to the monorepo root.
pub const DEFAULT_CONFIG_FILE: &str = "app/config/buildconfig.json";

fn override_config_path(root: &Path, project: &str) -> PathBuf {
    root.join("projects")
        .join(project)
        .join("app/config/buildconfig.json")
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROJECT CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything one project's build needs, created once per invocation and
/// passed explicitly down the pipeline. Nothing in the crate reads
/// ambient global state.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub name: String,
    pub config: BuildConfig,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>, config: BuildConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Resolves config for one project under the standard monorepo layout.
    pub fn resolve(root: &Path, name: &str, mode: BuildMode) -> Result<Self, BuildError> {
        let config = resolve_build_config(
            &root.join(DEFAULT_CONFIG_FILE),
            &override_config_path(root, name),
            mode,
        )?;
        Ok(Self::new(name, config))
    }

    /// Fresh mangling session scoped to this project, with the strategy
    /// and exclusion rules the config selects.
    pub fn session(&self) -> ManglingSession {
        ManglingSession::new(
            self.name.clone(),
            ManglingStrategy::select(&self.config),
            ExclusionRules::from_config(&self.config),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIFECYCLE STAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle hooks fired around one project's build, in registration
/// order. [`ArtifactWriter`] implements `on_after_emit` to publish the
/// backend artifacts.
pub trait BuildStage {
    /// Before any build output for the project is touched.
    fn on_before_clean(&mut self, _context: &ProjectContext) {}

    /// After the project's configuration and session are resolved, before
    /// style processing starts.
    fn on_after_resolve(&mut self, _context: &ProjectContext) {}

    /// After the bundler reports all assets emitted. The host guarantees
    /// no identifier is resolved once this fires.
    fn on_after_emit(
        &mut self,
        _context: &ProjectContext,
        _session: &mut ManglingSession,
        _manifest: &BuildManifest,
    ) {
    }
}

/// Runs one project end to end. The pipeline function is the external
/// bundler seam: it resolves class identifiers against the session while
/// processing style sources and reports the emitted bundle paths.
pub fn run_project<F>(
    context: &ProjectContext,
    stages: &mut [Box<dyn BuildStage>],
    pipeline: F,
) -> BuildManifest
where
    F: FnOnce(&ProjectContext, &mut ManglingSession) -> BuildManifest,
{
    for stage in stages.iter_mut() {
        stage.on_before_clean(context);
    }

    let mut session = context.session();
    for stage in stages.iter_mut() {
        stage.on_after_resolve(context);
    }

    let manifest = pipeline(context, &mut session);

    for stage in stages.iter_mut() {
        stage.on_after_emit(context, &mut session, &manifest);
    }

    manifest
}

// ═══════════════════════════════════════════════════════════════════════════════
// MULTI-PROJECT ORCHESTRATION
// ═══════════════════════════════════════════════════════════════════════════════

/// One invocation of the build system.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Monorepo root; roster, configs and artifact paths hang off it.
    pub root: PathBuf,

    /// `"all"` or a comma-separated list of project names.
    pub selection: String,

    pub mode: BuildMode,

    /// Process selected projects on the rayon pool instead of in order.
    pub parallel: bool,
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>, selection: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            selection: selection.into(),
            mode: BuildMode::default(),
            parallel: false,
        }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.root.join(ROSTER_FILE)
    }
}

/// Builds every selected project, emitting the backend artifacts for each.
///
/// All configuration is resolved up front so a bad selection or default
/// config aborts before any build work starts. From there each project
/// owns its own context and session; a failed artifact write for one
/// project never affects another, and work already emitted is not rolled
/// back on later failures.
pub fn build_projects<F>(options: &BuildOptions, pipeline: F) -> Result<Vec<BuildManifest>, BuildError>
where
    F: Fn(&ProjectContext, &mut ManglingSession) -> BuildManifest + Sync,
{
    let roster_path = options.roster_path();
    let roster = load_roster(&roster_path)?;
    let selected = resolve_project_set(
        &options.selection,
        &roster,
        &roster_path.to_string_lossy(),
    )?;

    let contexts = selected
        .iter()
        .map(|name| ProjectContext::resolve(&options.root, name, options.mode))
        .collect::<Result<Vec<_>, BuildError>>()?;

    let run_one = |context: &ProjectContext| {
        let mut stages: Vec<Box<dyn BuildStage>> = vec![Box::new(ArtifactWriter::for_project(
            &options.root,
            &context.name,
        ))];
        run_project(context, &mut stages, &pipeline)
    };

    let manifests = if options.parallel {
        contexts.par_iter().map(run_one).collect()
    } else {
        contexts.iter().map(run_one).collect()
    };

    Ok(manifests)
}
