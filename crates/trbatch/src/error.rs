//! Error types for the batching pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cohort root not found: {0}. Check the dataset layout under the base directory.")]
    CohortRootMissing(PathBuf),

    #[error("Introspection command failed for {file}: {reason}")]
    Introspection { file: PathBuf, reason: String },

    #[error("Could not parse introspection output for {file}: {reason}")]
    Parse { file: PathBuf, reason: String },

    #[error("Scan file path has no cohort/subject segments: {0}")]
    MalformedPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
