use std::path::Path;

use serde::Serialize;

use crate::codec;
use crate::compare::{diff_records, match_records, merge_records};
use crate::config::{JobConfig, Operation};
use crate::error::KeymatchError;
use crate::model::{ComparisonResult, Keyed, LoadedCollection};

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub job_name: String,
    pub operation: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub left_keys: usize,
    pub left_loss: usize,
    pub right_keys: usize,
    pub right_loss: usize,
    pub result_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Run a reconciliation job end to end: load both sources, dispatch the
/// operation, write the output file if one is configured. Source and
/// output paths resolve relative to `base_dir`.
pub fn run(
    config: &JobConfig,
    base_dir: &Path,
) -> Result<(ComparisonResult, RunReport), KeymatchError> {
    let left = LoadedCollection::from_path(&base_dir.join(&config.left.file), &config.left.key_fields)?;
    let right =
        LoadedCollection::from_path(&base_dir.join(&config.right.file), &config.right.key_fields)?;

    let result = match config.operation {
        Operation::Match => match_records(&left, &right)?,
        Operation::Diff => diff_records(&left, &right)?,
        Operation::Merge => merge_records(&left, &right, &config.merge_fields)?,
    };

    if let Some(ref file) = config.output.file {
        codec::write_collection(
            &result,
            &base_dir.join(file),
            config.output.fieldnames.as_deref(),
        )?;
    }

    let report = RunReport {
        meta: RunMeta {
            job_name: config.name.clone(),
            operation: config.operation.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: RunSummary {
            left_keys: left.records().len(),
            left_loss: left.loss_count(),
            right_keys: right.records().len(),
            right_loss: right.loss_count(),
            result_keys: result.records().len(),
        },
    };

    Ok((result, report))
}
