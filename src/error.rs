use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors.
///
/// Any of these aborts the whole invocation before build work starts for
/// the affected project; the embedding binary is expected to print the
/// diagnostic and exit non-zero. Soft conditions (missing project override
/// config, artifact write failures) are handled locally and never surface
/// through this type.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("project roster {}: {source}", path.display())]
    RosterRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project roster {} is not a JSON array of project names: {source}", path.display())]
    RosterParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("build config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("build config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A project named in the selection expression is absent from the roster.
    #[error("project \"{name}\" is not listed in {roster}")]
    UnknownProject { name: String, roster: String },
}
