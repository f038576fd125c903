use serde::Deserialize;

use crate::error::KeymatchError;

// ---------------------------------------------------------------------------
// Top-level job config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub operation: Operation,
    /// Fields pulled over from the right collection. Merge only.
    #[serde(default)]
    pub merge_fields: Vec<String>,
    pub left: SourceConfig,
    pub right: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Match,
    Diff,
    Merge,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Diff => write!(f, "diff"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Empty means every column of the source is part of the key.
    #[serde(default)]
    pub key_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: Option<String>,
    /// Output column order. Derived from the result when omitted.
    #[serde(default)]
    pub fieldnames: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, KeymatchError> {
        let config: JobConfig =
            toml::from_str(input).map_err(|e| KeymatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KeymatchError> {
        if self.operation == Operation::Merge && self.merge_fields.is_empty() {
            return Err(KeymatchError::ConfigValidation(
                "merge requires at least one merge field".into(),
            ));
        }
        if self.operation != Operation::Merge && !self.merge_fields.is_empty() {
            return Err(KeymatchError::ConfigValidation(format!(
                "merge_fields do not apply to operation '{}'",
                self.operation
            )));
        }

        // Empty key lists resolve against the source's columns at load
        // time, so arity can only be checked here when both are explicit.
        let (l, r) = (self.left.key_fields.len(), self.right.key_fields.len());
        if l != 0 && r != 0 && l != r {
            return Err(KeymatchError::ConfigValidation(format!(
                "left has {l} key field(s), right has {r}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
