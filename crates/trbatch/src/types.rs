//! Core data model: discovered scan files, extracted subject records, and
//! the composite key the grouper partitions over.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A qualifying scan file found during discovery.
///
/// Identity is (root, file_name); consumed once by the extractor and not
/// retained afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFile {
    /// Directory containing the file
    pub root: PathBuf,
    /// File name within `root`
    pub file_name: String,
}

impl ScanFile {
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }
}

/// One extracted record per scan file. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Cohort root the file came from (adult / adolescent / child)
    pub cohort: String,
    /// Subject identifier (second path segment under the base directory)
    pub subject_id: String,
    /// Scan file name; not part of the grouping key
    pub file_name: String,
    /// Number of acquired volumes in the run
    pub time_steps: u32,
    /// Repetition time in seconds
    pub repetition_time: f64,
}

impl SubjectRecord {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            cohort: self.cohort.clone(),
            time_steps: self.time_steps,
            repetition_time: self.repetition_time,
        }
    }
}

/// Composite grouping key. Two records with the same key are interchangeable
/// for manifest purposes.
#[derive(Debug, Clone)]
pub struct GroupKey {
    pub cohort: String,
    pub time_steps: u32,
    pub repetition_time: f64,
}

impl GroupKey {
    /// Deterministic manifest file name for this key, e.g. `adult_420_0.720s.txt`.
    pub fn manifest_file_name(&self) -> String {
        format!(
            "{}_{}_{:.3}s.txt",
            self.cohort, self.time_steps, self.repetition_time
        )
    }

    /// Full manifest path inside the output directory.
    pub fn manifest_path(&self, outdir: &Path) -> PathBuf {
        outdir.join(self.manifest_file_name())
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    /// Cohort ascending, then time-step count, then repetition time. This is
    /// the order manifests are named and written in.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cohort
            .cmp(&other.cohort)
            .then(self.time_steps.cmp(&other.time_steps))
            .then(self.repetition_time.total_cmp(&other.repetition_time))
    }
}
