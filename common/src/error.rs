use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Results root {0:?} is not a directory")]
    MissingRoot(PathBuf),
    #[error("Invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: serde_yml::Error,
    },
    #[error("Invalid run pattern: {0}")]
    RunPattern(#[from] regex::Error),
    #[error("Chart rendering failed for {path:?}: {reason}")]
    Chart { path: PathBuf, reason: String },
}
