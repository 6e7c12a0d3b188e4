//! Build configuration resolution.
//!
//! Every project build starts from the shared default config file, deep
//! merged with an optional per-project override. The merged object selects
//! the mangling strategy and exclusion rules for that project and carries
//! the global style constants through to the preprocessor untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::BuildError;

// ═══════════════════════════════════════════════════════════════════════════════
// MODE FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// External mode signals for one invocation: production vs development and
/// serve vs one-shot build. Development mode disables mangling outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMode {
    pub development: bool,
    pub serve: bool,
}

impl BuildMode {
    pub fn production() -> Self {
        Self::default()
    }

    pub fn development() -> Self {
        Self {
            development: true,
            serve: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Mangling strategy selector as it appears in config files.
///
/// Unrecognized strings deserialize to `Unknown`, which behaves exactly
/// like `None`; the resolver logs a warning when that happens so a typo in
/// a config file is at least visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum ManglingStrategyKind {
    #[default]
    None,
    SequentialIndex,
    ContentHash,
    Unknown,
}

impl From<String> for ManglingStrategyKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "none" => Self::None,
            "sequentialIndex" => Self::SequentialIndex,
            "contentHash" => Self::ContentHash,
            _ => Self::Unknown,
        }
    }
}

/// Effective configuration for one project build: the deep merge of the
/// shared default config and the project's override, plus the mode flags
/// injected from the invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    pub mangling_strategy_kind: ManglingStrategyKind,

    /// Token prepended to every mangled name. Defaults per strategy when
    /// absent.
    pub mangle_prefix: Option<String>,

    /// Class names starting with any of these are exempt from mangling.
    pub mangle_exclude_prefixes: Vec<String>,

    /// Class names ending with any of these are exempt from mangling.
    pub mangle_exclude_suffixes: Vec<String>,

    /// Constants handed to the style preprocessor. Opaque to the core.
    pub global_constants: Map<String, Value>,

    /// Mode flags for this invocation, not read from config files.
    #[serde(skip)]
    pub mode: BuildMode,

    /// Remaining config keys, preserved for the bundler wiring.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl BuildConfig {
    pub fn is_development(&self) -> bool {
        self.mode.development
    }

    pub fn is_serve(&self) -> bool {
        self.mode.serve
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads and parses one JSON config file.
pub fn read_json_file(path: &Path) -> Result<Value, BuildError> {
    let data = fs::read_to_string(path).map_err(|source| BuildError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&data).map_err(|source| BuildError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursive right-biased merge of two JSON values.
///
/// Objects merge key-wise; for any other pair of values (scalars and
/// arrays included) the override replaces the base wholesale. Keys present
/// on only one side are copied through unchanged.
pub fn deep_merge(base: Value, overrides: Value) -> Value {
    match (base, overrides) {
        (Value::Object(mut base_map), Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => override_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overrides) => overrides,
    }
}

/// Resolves the effective [`BuildConfig`] for one project.
///
/// The default config is required: an unreadable or unparseable file is a
/// fatal error. The project override is optional: any failure to read or
/// parse it falls back to an empty object and the build proceeds on the
/// defaults alone.
pub fn resolve_build_config(
    default_path: &Path,
    override_path: &Path,
    mode: BuildMode,
) -> Result<BuildConfig, BuildError> {
    let base = read_json_file(default_path)?;

    let overrides = match read_json_file(override_path) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            log::warn!(
                "ignoring override config {}: not a JSON object",
                override_path.display()
            );
            Value::Object(Map::new())
        }
        Err(BuildError::ConfigRead { .. }) => {
            log::debug!(
                "no override config at {}, using defaults",
                override_path.display()
            );
            Value::Object(Map::new())
        }
        Err(err) => {
            log::warn!("ignoring unparseable override config: {}", err);
            Value::Object(Map::new())
        }
    };

    let merged = deep_merge(base.clone(), overrides);

    // A structurally bad override (wrong-typed field) surfaces here; the
    // build still proceeds on the defaults alone. Only a default config
    // that is itself invalid is fatal.
    let mut config: BuildConfig = match serde_json::from_value(merged) {
        Ok(config) => config,
        Err(err) => {
            log::warn!(
                "ignoring override config {}: {}",
                override_path.display(),
                err
            );
            serde_json::from_value(base).map_err(|source| BuildError::ConfigParse {
                path: default_path.to_path_buf(),
                source,
            })?
        }
    };
    config.mode = mode;

    if config.mangling_strategy_kind == ManglingStrategyKind::Unknown {
        log::warn!(
            "unrecognized manglingStrategyKind in {}, mangling disabled",
            default_path.display()
        );
    }

    Ok(config)
}
