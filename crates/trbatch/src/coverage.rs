//! Missing-subject detection.
//!
//! Every immediate subdirectory of a cohort root is assumed to be a subject.
//! Subjects with no qualifying scan record are reported to the operator;
//! nothing is persisted.

use crate::config::RunConfig;
use crate::error::Result;
use crate::types::SubjectRecord;
use std::fs;
use tracing::{info, warn};

/// List (cohort, subject directory name) for every cohort root.
pub fn list_subjects(config: &RunConfig) -> Result<Vec<(String, String)>> {
    let mut subjects = Vec::new();
    for (cohort, root) in config.cohorts.iter().zip(config.cohort_roots()) {
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                subjects.push((cohort.clone(), entry.file_name().to_string_lossy().into_owned()));
            }
        }
    }
    Ok(subjects)
}

/// Subjects whose directory name matches no extracted record.
///
/// Matching is substring containment: a subject counts as covered when its
/// directory name occurs anywhere inside a record's subject id. This keeps
/// the historical tolerance for minor naming variants, at the cost of false
/// negatives when one subject id is a substring of another (realistic for
/// numeric-style ids). Do not tighten to exact equality without checking
/// downstream expectations.
pub fn missing_subjects(
    all_subjects: &[(String, String)],
    records: &[SubjectRecord],
) -> Vec<(String, String)> {
    all_subjects
        .iter()
        .filter(|(_, dir_name)| !records.iter().any(|r| r.subject_id.contains(dir_name.as_str())))
        .cloned()
        .collect()
}

/// Compute and log the missing-subject report.
pub fn report_missing(config: &RunConfig, records: &[SubjectRecord]) -> Result<()> {
    let subjects = list_subjects(config)?;
    let missing = missing_subjects(&subjects, records);
    if missing.is_empty() {
        info!("All {} subjects have a concatenated scan file", subjects.len());
    } else {
        info!("Subjects missing concatenated scan files: {}", missing.len());
        for (cohort, subject) in &missing {
            warn!("  {}/{}", cohort, subject);
        }
    }
    Ok(())
}
