//! Run sequencing: rewrite/reuse handling, then the strictly sequential
//! scan -> extract -> coverage -> group -> handoff stages.

use crate::config::{FailurePolicy, RunConfig};
use crate::error::Result;
use crate::{coverage, cpac, grouping, introspect, scan};
use crate::types::SubjectRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Execute one full run.
///
/// With `rewrite` (or a missing output directory) the output directory is
/// cleared and recreated, forcing re-extraction. Otherwise any existing
/// manifests short-circuit straight to the downstream handoff; they are
/// reused as-is even if the dataset changed since they were written.
pub fn run(config: &RunConfig, rewrite: bool) -> Result<()> {
    let outdir = config.resolved_output_dir();

    if rewrite || !outdir.exists() {
        info!("Creating fresh output directory {}", outdir.display());
        let _ = fs::remove_dir_all(&outdir);
        fs::create_dir_all(&outdir)?;
    }

    let mut manifests = existing_manifests(&outdir)?;
    if manifests.is_empty() {
        info!("Generating subject-list manifests in {}", outdir.display());
        let records = extract_all(config)?;
        coverage::report_missing(config, &records)?;

        let groups = grouping::group(&records);
        manifests = grouping::write_manifests(&outdir, &groups)?;
        if config.record_table {
            grouping::write_record_table(&outdir, &records)?;
        }
    } else {
        info!(
            "Reusing {} existing manifests in {} (pass --rewrite to regenerate)",
            manifests.len(),
            outdir.display()
        );
    }

    cpac::run_setup(config, &manifests)
}

/// Manifest files already present in the output directory, sorted by name.
pub fn existing_manifests(outdir: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();
    for entry in fs::read_dir(outdir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "txt") {
            manifests.push(path);
        }
    }
    manifests.sort();
    Ok(manifests)
}

/// Discover scan files and extract one record per file, sequentially.
///
/// Under the default abort policy the first introspection or parse failure
/// ends the run; under the skip policy failing files are dropped and
/// summarized after the pass.
fn extract_all(config: &RunConfig) -> Result<Vec<SubjectRecord>> {
    let files = scan::scan(config)?;

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for file in &files {
        match introspect::extract(config, file) {
            Ok(record) => records.push(record),
            Err(e) if config.on_extraction_error == FailurePolicy::Skip => {
                warn!("Skipping {}: {}", file.path().display(), e);
                failures.push(file.path());
            }
            Err(e) => return Err(e),
        }
    }

    if !failures.is_empty() {
        warn!("{} of {} scan files failed extraction:", failures.len(), files.len());
        for path in &failures {
            warn!("  {}", path.display());
        }
    }
    info!("Extracted {} subject records", records.len());
    Ok(records)
}
