//! Metadata extraction via the external introspection tool.
//!
//! Runs `<tool> <relative-path>` for one scan file, captures stdout, and
//! pulls the time-step count and repetition time out of the free-text
//! report. The text is never interpreted beyond pattern extraction.

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::types::{ScanFile, SubjectRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;
use tracing::debug;

/// Label anchoring the metadata section of the tool's report.
const TIME_STEPS_LABEL: &str = "Number of time steps";

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:0|[1-9][0-9]*)(?:\.[0-9]*)?|\.[0-9]+").unwrap());

/// Extract (time-step count, repetition time) from the introspection report.
///
/// Format contract with the tool's output (versioned, not re-derived):
/// the line starting at `TIME_STEPS_LABEL` is followed by at least three
/// `key = value` pairs in fixed order; the count is the value of the first
/// pair and the repetition time the value of the second. The label position
/// and the next three `=` positions delimit the two value windows; within a
/// window the *last* digit run / decimal literal is the value. Any missing
/// label, delimiter, or literal is a hard parse failure, never a default.
pub fn parse_introspection_output(output: &str) -> std::result::Result<(u32, f64), String> {
    let label = output
        .find(TIME_STEPS_LABEL)
        .ok_or_else(|| format!("label {:?} not found", TIME_STEPS_LABEL))?;

    let mut marks = [label; 4];
    for i in 1..4 {
        let from = marks[i - 1] + 1;
        let rel = output[from..]
            .find('=')
            .ok_or_else(|| format!("expected 3 '=' delimiters after label, found {}", i - 1))?;
        marks[i] = from + rel;
    }

    let window_a = &output[marks[1]..marks[2]];
    let window_b = &output[marks[2]..marks[3]];

    let steps = DIGIT_RUN
        .find_iter(window_a)
        .last()
        .ok_or_else(|| format!("no digit run in time-step window {:?}", window_a))?
        .as_str()
        .parse::<u32>()
        .map_err(|e| format!("time-step count out of range: {}", e))?;

    let tr = DECIMAL
        .find_iter(window_b)
        .last()
        .ok_or_else(|| format!("no decimal literal in repetition-time window {:?}", window_b))?
        .as_str()
        .parse::<f64>()
        .map_err(|e| format!("bad repetition time: {}", e))?;

    Ok((steps, tr))
}

/// Run the introspection tool for one scan file and build its record.
///
/// Cohort and subject id come from the first two segments of the file's
/// path relative to the base directory. The tool is invoked with the
/// relative path as its sole argument, from the base directory.
pub fn extract(config: &RunConfig, file: &ScanFile) -> Result<SubjectRecord> {
    let path = file.path();
    let rel = path.strip_prefix(&config.base_dir).unwrap_or(&path);

    let mut segments = rel.iter().map(|s| s.to_string_lossy().into_owned());
    let cohort = segments
        .next()
        .ok_or_else(|| PipelineError::MalformedPath(rel.to_path_buf()))?;
    let subject_id = segments
        .next()
        .ok_or_else(|| PipelineError::MalformedPath(rel.to_path_buf()))?;

    debug!("Running {} {}", config.introspect_cmd, rel.display());
    let output = Command::new(&config.introspect_cmd)
        .arg(rel)
        .current_dir(&config.base_dir)
        .output()
        .map_err(|e| PipelineError::Introspection {
            file: rel.to_path_buf(),
            reason: format!("failed to run {}: {}", config.introspect_cmd, e),
        })?;

    if !output.status.success() {
        return Err(PipelineError::Introspection {
            file: rel.to_path_buf(),
            reason: format!(
                "{} exited with {}: {}",
                config.introspect_cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let (time_steps, repetition_time) =
        parse_introspection_output(&text).map_err(|reason| PipelineError::Parse {
            file: rel.to_path_buf(),
            reason,
        })?;

    Ok(SubjectRecord {
        cohort,
        subject_id,
        file_name: file.file_name.clone(),
        time_steps,
        repetition_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed-down report in the tool's actual layout: the label line holds
    // the count and repetition time as the 1st and 2nd `key = value` pairs.
    const SAMPLE: &str = "\
Dataset File:    S1_3T_rfMRI_REST_ALL_AP.nii.gz
Data Axes Orientation: first  (x) = Right-to-Left
Number of time steps = 420  Time step = 0.720s  Origin = 0s  Number time-axis slices = 0
";

    #[test]
    fn test_parse_sample_report() {
        assert_eq!(parse_introspection_output(SAMPLE).unwrap(), (420, 0.72));
    }

    #[test]
    fn test_last_digit_run_in_window_wins() {
        let out = "Number of time steps = run 2 has 420  Time step = 0.720s  Origin = 0";
        assert_eq!(parse_introspection_output(out).unwrap(), (420, 0.72));
    }

    #[test]
    fn test_last_decimal_in_window_wins() {
        let out = "Number of time steps = 420  Time step = v2 0.800s  Origin = 0";
        assert_eq!(parse_introspection_output(out).unwrap(), (420, 0.8));
    }

    #[test]
    fn test_bare_fractional_repetition_time() {
        let out = "Number of time steps = 400  Time step = .5s  Origin = 0";
        assert_eq!(parse_introspection_output(out).unwrap(), (400, 0.5));
    }

    #[test]
    fn test_missing_label_fails() {
        let err = parse_introspection_output("Time step = 0.720s").unwrap_err();
        assert!(err.contains("label"));
    }

    #[test]
    fn test_too_few_delimiters_fails() {
        let err =
            parse_introspection_output("Number of time steps = 420  Time step = 0.720s").unwrap_err();
        assert!(err.contains("delimiters"));
    }

    #[test]
    fn test_empty_window_fails() {
        let err =
            parse_introspection_output("Number of time steps = n/a  Time step = none  Origin = 0")
                .unwrap_err();
        assert!(err.contains("digit run"));
    }
}
