//! Run configuration for the batching pipeline.
//!
//! Built once at startup from an optional TOML file and passed by reference
//! into each stage. There is no process-wide mutable state.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file name, looked up next to the base directory
pub const CONFIG_FILE: &str = "trbatch.toml";

/// What to do when the introspection tool fails or its output cannot be parsed
/// for one scan file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing file (reference behavior).
    Abort,
    /// Skip the failing file, keep extracting, report all failures at the end.
    Skip,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base directory holding the cohort roots
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Cohort root directory names, one per subject population
    #[serde(default = "default_cohorts")]
    pub cohorts: Vec<String>,

    /// Output directory for manifests, data configs, and setup outputs
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Introspection command reporting scan metadata as free text
    #[serde(default = "default_introspect_cmd")]
    pub introspect_cmd: String,

    /// Downstream setup command invoked once per manifest
    #[serde(default = "default_setup_cmd")]
    pub setup_cmd: String,

    /// Substring a file's directory path must contain (acquisition tier)
    #[serde(default = "default_tier_marker")]
    pub tier_marker: String,

    /// Substring a file's name must contain (concatenated resting-state runs)
    #[serde(default = "default_rest_marker")]
    pub rest_marker: String,

    /// Required file name suffix for compressed scan images
    #[serde(default = "default_scan_suffix")]
    pub scan_suffix: String,

    /// Policy for introspection/parse failures on individual files
    #[serde(default = "default_failure_policy")]
    pub on_extraction_error: FailurePolicy,

    /// Also write the combined record table (3dinfo_TRs.csv)
    #[serde(default)]
    pub record_table: bool,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cohorts() -> Vec<String> {
    vec![
        "adult".to_string(),
        "adolescent".to_string(),
        "child".to_string(),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("cpac")
}

fn default_introspect_cmd() -> String {
    "3dinfo".to_string()
}

fn default_setup_cmd() -> String {
    "cpac_setup.py".to_string()
}

fn default_tier_marker() -> String {
    "3T".to_string()
}

fn default_rest_marker() -> String {
    "REST_ALL".to_string()
}

fn default_scan_suffix() -> String {
    ".nii.gz".to_string()
}

fn default_failure_policy() -> FailurePolicy {
    FailurePolicy::Abort
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            cohorts: default_cohorts(),
            output_dir: default_output_dir(),
            introspect_cmd: default_introspect_cmd(),
            setup_cmd: default_setup_cmd(),
            tier_marker: default_tier_marker(),
            rest_marker: default_rest_marker(),
            scan_suffix: default_scan_suffix(),
            on_extraction_error: default_failure_policy(),
            record_table: false,
        }
    }
}

impl RunConfig {
    /// Load configuration. An explicitly given path must parse; the default
    /// path falls back to built-in defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::load_from_path(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                RunConfig::default()
            })),
        }
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Absolute-ish cohort root paths, in configured order.
    pub fn cohort_roots(&self) -> Vec<PathBuf> {
        self.cohorts.iter().map(|c| self.base_dir.join(c)).collect()
    }

    /// Output directory resolved against the base directory.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            self.base_dir.join(&self.output_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.cohorts, vec!["adult", "adolescent", "child"]);
        assert_eq!(config.introspect_cmd, "3dinfo");
        assert_eq!(config.on_extraction_error, FailurePolicy::Abort);
        assert!(!config.record_table);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RunConfig = toml::from_str(
            r#"
base_dir = "/data/hcp"
on_extraction_error = "skip"
"#,
        )
        .unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/data/hcp"));
        assert_eq!(config.on_extraction_error, FailurePolicy::Skip);
        assert_eq!(config.tier_marker, "3T");
        assert_eq!(config.rest_marker, "REST_ALL");
        assert_eq!(config.scan_suffix, ".nii.gz");
    }

    #[test]
    fn test_cohort_roots_join_base() {
        let mut config = RunConfig::default();
        config.base_dir = PathBuf::from("/data/hcp");
        let roots = config.cohort_roots();
        assert_eq!(roots[0], PathBuf::from("/data/hcp/adult"));
        assert_eq!(roots.len(), 3);
    }
}
