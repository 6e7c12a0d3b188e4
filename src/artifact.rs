//! Backend artifact emission.
//!
//! At the end of each project build two PHP config objects are written for
//! the backend host: the CSS mangling map (`cssmap.php`) and the bundle
//! entry-point manifest (`build.php`). Emission is best-effort; the bundle
//! itself is the primary deliverable, so a failed write is logged and the
//! build carries on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mangle::ManglingSession;
use crate::pipeline::{BuildStage, ProjectContext};

/// Bundle entry points reported by the external bundler, opaque to the
/// core beyond serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub css: String,
    pub js: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PHP CONFIG RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

fn php_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Renders the mangling map as a `\Phalcon\Config` object, entries in
/// first-seen order.
pub fn render_mangle_map(enabled: bool, mappings: &IndexMap<String, String>) -> String {
    let mut entries = String::new();
    for (original, mangled) in mappings {
        entries.push_str(&format!(
            "            '{}' => '{}',\n",
            php_quote(original),
            php_quote(mangled)
        ));
    }

    format!(
        "<?php return new \\Phalcon\\Config([\n    'css_mangle' => [\n        'enabled' => {},\n        'map' => [\n{}        ]\n    ]\n]);",
        enabled, entries
    )
}

/// Renders the bundle manifest as a `\Phalcon\Config` object.
pub fn render_build_manifest(manifest: &BuildManifest) -> String {
    format!(
        "<?php return new \\Phalcon\\Config([\n    'build' => [\n        'css' => '{}',\n        'js' => '{}'\n    ]\n]);",
        php_quote(&manifest.css),
        php_quote(&manifest.js)
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARTIFACT WRITER
// ═══════════════════════════════════════════════════════════════════════════════

/// Writes the per-project backend artifacts once the bundler signals that
/// all assets were emitted, then resets the session so the next build of
/// the same project starts from a clean map.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    mangle_map_path: PathBuf,
    manifest_path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(mangle_map_path: PathBuf, manifest_path: PathBuf) -> Self {
        Self {
            mangle_map_path,
            manifest_path,
        }
    }

    /// Standard monorepo layout: both artifacts live under the project's
    /// `public/` directory.
    pub fn for_project(root: &Path, project: &str) -> Self {
        let public = root.join("projects").join(project).join("public");
        Self::new(public.join("cssmap.php"), public.join("build.php"))
    }

    pub fn mangle_map_path(&self) -> &Path {
        &self.mangle_map_path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    fn write_file(path: &Path, data: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        if let Err(err) = fs::write(path, data) {
            log::error!("failed to write {}: {}", path.display(), err);
        }
    }

    /// Emits both artifacts and resets the session. Never fails the build.
    pub fn write(&self, session: &mut ManglingSession, manifest: &BuildManifest) {
        let map_data = render_mangle_map(session.is_enabled(), session.mangle_map());
        Self::write_file(&self.mangle_map_path, &map_data);

        Self::write_file(&self.manifest_path, &render_build_manifest(manifest));

        session.reset();
    }
}

impl BuildStage for ArtifactWriter {
    fn on_after_emit(
        &mut self,
        _context: &ProjectContext,
        session: &mut ManglingSession,
        manifest: &BuildManifest,
    ) {
        self.write(session, manifest);
    }
}
