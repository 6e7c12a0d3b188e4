//! Project roster and selection handling.
//!
//! The roster file is the source of truth for valid project names. A
//! selection expression is either the literal `all` or a comma-separated
//! list of names; naming anything outside the roster is fatal.

use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Selection literal that expands to the whole roster.
pub const ALL_PROJECTS: &str = "all";

/// Loads the project roster: a JSON array of project-name strings, read
/// once per invocation. Missing or unparseable roster is fatal.
pub fn load_roster(path: &Path) -> Result<Vec<String>, BuildError> {
    let data = fs::read_to_string(path).map_err(|source| BuildError::RosterRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&data).map_err(|source| BuildError::RosterParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validates a selection expression against the roster and returns the
/// ordered list of projects to build.
///
/// `"all"` yields the full roster in roster order. Otherwise the
/// expression is split on commas with whitespace trimmed, and every token
/// must be present in the roster. Duplicates are kept: selecting the same
/// project twice builds it twice.
pub fn resolve_project_set(
    selection: &str,
    roster: &[String],
    roster_source: &str,
) -> Result<Vec<String>, BuildError> {
    if selection == ALL_PROJECTS {
        return Ok(roster.to_vec());
    }

    let mut selected = Vec::new();
    for token in selection.split(',') {
        let name = token.trim();
        if !roster.iter().any(|known| known == name) {
            return Err(BuildError::UnknownProject {
                name: name.to_string(),
                roster: roster_source.to_string(),
            });
        }
        selected.push(name.to_string());
    }

    Ok(selected)
}
