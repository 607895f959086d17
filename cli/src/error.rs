use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the command-line front end. Parse errors are not here; they
/// are rendered as diagnostics instead.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid corpus {}: {source}", path.display())]
    Corpus {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no corpus files found in {}", .0.display())]
    EmptyCorpus(PathBuf),

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
