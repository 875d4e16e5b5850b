//! Scan-file discovery across the cohort roots.
//!
//! Walks every cohort root recursively and keeps the files matching all
//! three qualifying predicates. Traversal order is filesystem order and not
//! part of the contract; the grouper imposes its own order later.

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::types::ScanFile;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Find every qualifying scan file under the configured cohort roots.
///
/// A file qualifies iff its containing directory path contains the tier
/// marker, its name contains the rest marker, and its name ends with the
/// scan suffix. A missing cohort root is fatal: it indicates a misconfigured
/// dataset layout, not an empty cohort.
pub fn scan(config: &RunConfig) -> Result<Vec<ScanFile>> {
    let mut files = Vec::new();

    for root in config.cohort_roots() {
        if !root.is_dir() {
            return Err(PipelineError::CohortRootMissing(root));
        }

        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            if parent.to_string_lossy().contains(&config.tier_marker)
                && name.contains(&config.rest_marker)
                && name.ends_with(&config.scan_suffix)
            {
                debug!("Qualifying scan: {}", entry.path().display());
                files.push(ScanFile {
                    root: parent.to_path_buf(),
                    file_name: name.into_owned(),
                });
            }
        }
    }

    info!("Discovered {} qualifying scan files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn test_config(base: &Path) -> RunConfig {
        let mut config = RunConfig::default();
        config.base_dir = base.to_path_buf();
        config.cohorts = vec!["adult".to_string()];
        config
    }

    #[test]
    fn test_qualifying_file_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            &tmp.path()
                .join("adult/S1/unprocessed/3T/S1_3T_rfMRI_REST_ALL_AP.nii.gz"),
        );

        let files = scan(&test_config(tmp.path())).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "S1_3T_rfMRI_REST_ALL_AP.nii.gz");
    }

    #[test]
    fn test_each_predicate_excludes_independently() {
        let tmp = tempfile::tempdir().unwrap();
        // wrong tier directory
        touch(
            &tmp.path()
                .join("adult/S1/unprocessed/7T/S1_7T_rfMRI_REST_ALL_AP.nii.gz"),
        );
        // name lacks the rest marker
        touch(
            &tmp.path()
                .join("adult/S2/unprocessed/3T/S2_3T_rfMRI_REST1_AP.nii.gz"),
        );
        // wrong suffix
        touch(
            &tmp.path()
                .join("adult/S3/unprocessed/3T/S3_3T_rfMRI_REST_ALL_AP.nii"),
        );

        let files = scan(&test_config(tmp.path())).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_cohort_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(tmp.path());
        config.cohorts = vec!["adult".to_string(), "child".to_string()];
        touch(
            &tmp.path()
                .join("adult/S1/unprocessed/3T/S1_3T_rfMRI_REST_ALL_AP.nii.gz"),
        );
        // no child/ directory at all
        let err = scan(&config).unwrap_err();
        assert!(matches!(err, PipelineError::CohortRootMissing(_)));
    }
}
