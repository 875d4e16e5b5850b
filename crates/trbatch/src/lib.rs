//! trbatch - batches neuroimaging subjects by acquisition parameters.
//!
//! Discovers concatenated resting-state scan files under the cohort roots,
//! extracts (time-step count, repetition time) per file via an external
//! introspection tool, reports subjects with no qualifying file, writes one
//! subject-list manifest per distinct (cohort, steps, TR) key, and hands
//! each manifest to the downstream setup tool.

pub mod config;
pub mod coverage;
pub mod cpac;
pub mod error;
pub mod grouping;
pub mod introspect;
pub mod pipeline;
pub mod scan;
pub mod types;

pub use config::{FailurePolicy, RunConfig};
pub use error::{PipelineError, Result};
pub use types::{GroupKey, ScanFile, SubjectRecord};
