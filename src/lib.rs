//! # Bundler Core
//!
//! Build core for a multi-project front-end monorepo. The external
//! bundler owns transpilation, module resolution, the dev server and
//! asset hashing; this crate owns per-project configuration resolution,
//! CSS class-name mangling and backend artifact emission, reached through
//! two seams: a naming callback invoked per discovered class identifier
//! ([`ManglingSession::resolve`]) and a build-finished hook
//! ([`BuildStage::on_after_emit`]).
//!
//! ## Mangling Invariants
//!
//! 1. **One decision per session**: within one project's build, an
//!    identifier maps to exactly one mangled value; the first decision is
//!    final and returned on every later lookup.
//!
//! 2. **Complete record**: excluded identifiers are stored as identity
//!    mappings, so the emitted map is an audit of every identifier seen.
//!
//! 3. **No shared state**: each project owns its own config and session.
//!    Mangled values and counters are scoped per project; projects may be
//!    built sequentially or in parallel with identical results.
//!
//! 4. **Mode beats strategy**: development mode disables mangling
//!    regardless of the configured strategy.
//!
//! 5. **No I/O on the hot path**: `resolve` is synchronous and pure;
//!    config reads happen at project setup, artifact writes at teardown.

mod artifact;
mod config;
mod error;
mod mangle;
mod pipeline;
mod project;

#[cfg(test)]
mod session_tests;

pub use artifact::{render_build_manifest, render_mangle_map, ArtifactWriter, BuildManifest};
pub use config::{
    deep_merge, read_json_file, resolve_build_config, BuildConfig, BuildMode, ManglingStrategyKind,
};
pub use error::BuildError;
pub use mangle::{
    ExclusionRules, ManglingSession, ManglingStrategy, DEFAULT_HASH_PREFIX,
    DEFAULT_SEQUENTIAL_PREFIX, HASH_INPUT_LIMIT,
};
pub use pipeline::{
    build_projects, run_project, BuildOptions, BuildStage, ProjectContext, DEFAULT_CONFIG_FILE,
    ROSTER_FILE,
};
pub use project::{load_roster, resolve_project_set, ALL_PROJECTS};
