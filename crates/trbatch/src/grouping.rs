//! Record grouping and manifest output.
//!
//! Partitions the extracted records by (cohort, time-step count, repetition
//! time) and writes one manifest per key. Group membership is unordered;
//! the written order is pinned so reruns over identical inputs produce
//! byte-identical files.

use crate::error::Result;
use crate::types::{GroupKey, SubjectRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Header of the optional combined record table.
const RECORD_TABLE_HEADER: &str = "dir,subj,file,TRcount,TR";

/// File name of the optional combined record table.
pub const RECORD_TABLE_FILE: &str = "3dinfo_TRs.csv";

/// Partition records by grouping key.
///
/// The BTreeMap iterates keys in (cohort, steps, TR) order; subject ids
/// within a group are sorted lexicographically.
pub fn group(records: &[SubjectRecord]) -> BTreeMap<GroupKey, Vec<String>> {
    let mut groups: BTreeMap<GroupKey, Vec<String>> = BTreeMap::new();
    for record in records {
        groups.entry(record.key()).or_default().push(record.subject_id.clone());
    }
    for members in groups.values_mut() {
        members.sort();
    }
    groups
}

/// Write one manifest per group into the output directory, in key order.
/// Returns the written paths.
pub fn write_manifests(
    outdir: &Path,
    groups: &BTreeMap<GroupKey, Vec<String>>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (key, members) in groups {
        let path = key.manifest_path(outdir);
        let mut content = members.join("\n");
        content.push('\n');
        fs::write(&path, content)?;
        info!("Wrote manifest {} ({} subjects)", path.display(), members.len());
        written.push(path);
    }
    Ok(written)
}

/// Write the pre-grouping record table. Supporting output only; not needed
/// for the grouping contract.
pub fn write_record_table(outdir: &Path, records: &[SubjectRecord]) -> Result<PathBuf> {
    let path = outdir.join(RECORD_TABLE_FILE);
    let mut lines = vec![RECORD_TABLE_HEADER.to_string()];
    for r in records {
        lines.push(format!(
            "{},{},{},{},{}",
            r.cohort, r.subject_id, r.file_name, r.time_steps, r.repetition_time
        ));
    }
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    info!("Wrote record table {}", path.display());
    Ok(path)
}
