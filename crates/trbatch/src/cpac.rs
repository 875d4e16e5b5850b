//! Downstream handoff: one data-config document plus one setup-tool run per
//! manifest.
//!
//! The key set and value shapes of the YAML document are the setup tool's
//! recognized options and must not be renamed.

use crate::config::RunConfig;
use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Data-config document consumed by the setup tool.
#[derive(Debug, Serialize)]
pub struct DataConfig {
    #[serde(rename = "dataFormat")]
    pub data_format: Vec<String>,
    #[serde(rename = "bidsBaseDir")]
    pub bids_base_dir: Option<String>,
    #[serde(rename = "anatomicalTemplate")]
    pub anatomical_template: String,
    #[serde(rename = "functionalTemplate")]
    pub functional_template: String,
    #[serde(rename = "subjectList")]
    pub subject_list: String,
    #[serde(rename = "exclusionSubjectList")]
    pub exclusion_subject_list: Option<String>,
    #[serde(rename = "siteList")]
    pub site_list: Option<String>,
    #[serde(rename = "scanParametersCSV")]
    pub scan_parameters_csv: Option<String>,
    #[serde(rename = "awsCredentialsFile")]
    pub aws_credentials_file: Option<String>,
    #[serde(rename = "outputSubjectListLocation")]
    pub output_subject_list_location: String,
    #[serde(rename = "subjectListName")]
    pub subject_list_name: String,
}

impl DataConfig {
    /// Build the document for one manifest. The cohort is the manifest
    /// name's prefix before the first underscore; anatomical and functional
    /// templates point back into that cohort's unprocessed subtree with a
    /// `{participant}` placeholder for the subject id.
    pub fn for_manifest(config: &RunConfig, manifest: &Path) -> Option<Self> {
        let base_name = manifest.file_name()?.to_string_lossy().into_owned();
        let cohort = base_name.split('_').next()?.to_string();
        let stem = base_name.strip_suffix(".txt").unwrap_or(&base_name).to_string();

        let cohort_dir = config.base_dir.join(&cohort);
        let tier = &config.tier_marker;
        let anatomical = format!(
            "{}/{{participant}}/unprocessed/{tier}/T1w_MPR1/{{participant}}_{tier}_T1w_MPR1.nii.gz",
            cohort_dir.display()
        );
        let functional = format!(
            "{}/{{participant}}/unprocessed/{tier}/{{participant}}_{tier}_rfMRI_REST_ALL_AP.nii.gz",
            cohort_dir.display()
        );

        Some(Self {
            data_format: vec!["Custom".to_string()],
            bids_base_dir: None,
            anatomical_template: anatomical,
            functional_template: functional,
            subject_list: manifest.to_string_lossy().into_owned(),
            exclusion_subject_list: None,
            site_list: None,
            scan_parameters_csv: None,
            aws_credentials_file: None,
            output_subject_list_location: config.resolved_output_dir().to_string_lossy().into_owned(),
            subject_list_name: stem,
        })
    }
}

/// Generate the data config and run the setup tool for every manifest.
///
/// Setup-tool failures are reported but do not abort the run; the handoff's
/// own success is the downstream pipeline's responsibility.
pub fn run_setup(config: &RunConfig, manifests: &[PathBuf]) -> Result<()> {
    let outdir = config.resolved_output_dir();
    let cfg_path = outdir.join("data_config.yml");

    for manifest in manifests {
        let Some(doc) = DataConfig::for_manifest(config, manifest) else {
            warn!("Skipping malformed manifest name: {}", manifest.display());
            continue;
        };
        info!("Running {} for {}", config.setup_cmd, manifest.display());

        fs::write(&cfg_path, serde_yaml::to_string(&doc)?)?;

        match Command::new(&config.setup_cmd)
            .arg(&cfg_path)
            .current_dir(&outdir)
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("{} exited with {}", config.setup_cmd, status),
            Err(e) => warn!("Failed to run {}: {}", config.setup_cmd, e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_config_for_manifest() {
        let mut config = RunConfig::default();
        config.base_dir = PathBuf::from("/data/hcp");
        config.output_dir = PathBuf::from("cpac");

        let doc =
            DataConfig::for_manifest(&config, Path::new("/data/hcp/cpac/adult_420_0.720s.txt"))
                .unwrap();
        assert_eq!(doc.data_format, vec!["Custom"]);
        assert_eq!(doc.subject_list_name, "adult_420_0.720s");
        assert_eq!(
            doc.anatomical_template,
            "/data/hcp/adult/{participant}/unprocessed/3T/T1w_MPR1/{participant}_3T_T1w_MPR1.nii.gz"
        );
        assert!(doc.functional_template.contains("rfMRI_REST_ALL_AP.nii.gz"));
        assert_eq!(doc.bids_base_dir, None);
    }

    #[test]
    fn test_yaml_uses_tool_key_names() {
        let config = RunConfig::default();
        let doc = DataConfig::for_manifest(&config, Path::new("cpac/child_400_0.800s.txt")).unwrap();
        let yaml = serde_yaml::to_string(&doc).unwrap();
        assert!(yaml.contains("dataFormat:"));
        assert!(yaml.contains("subjectListName: child_400_0.800s"));
        assert!(yaml.contains("bidsBaseDir: null"));
        assert!(yaml.contains("outputSubjectListLocation:"));
    }
}
