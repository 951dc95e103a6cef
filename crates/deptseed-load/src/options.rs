use std::fmt;

use serde::{Deserialize, Serialize};

use deptseed_core::{Result, SeedError};

/// How the loader treats the department and employee tables before inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// Tables must already exist.
    Keep,
    /// Create the tables when missing.
    Create,
    /// Drop both tables (ignoring failures) and create them again.
    #[default]
    Recreate,
}

/// When inserted rows become durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Every insert commits on its own.
    #[default]
    Row,
    /// One transaction for the whole run.
    Batch,
}

/// Reaction to a rejected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OnRowError {
    #[default]
    Abort,
    /// Record the row as skipped, along with every row that depends on it.
    Skip,
}

/// Options that control how loading behaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub schema_mode: SchemaMode,
    pub commit: CommitMode,
    pub on_error: OnRowError,
    /// Compare table row counts before and after loading.
    pub verify: bool,
    pub connect_timeout_secs: Option<u32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            schema_mode: SchemaMode::default(),
            commit: CommitMode::default(),
            on_error: OnRowError::default(),
            verify: true,
            connect_timeout_secs: None,
        }
    }
}

impl LoadOptions {
    pub fn validate(&self) -> Result<()> {
        if self.commit == CommitMode::Batch && self.on_error == OnRowError::Skip {
            return Err(SeedError::InvalidArgument(
                "on_error=skip cannot be combined with commit=batch".to_string(),
            ));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(SeedError::InvalidArgument(
                "connect timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl SchemaMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaMode::Keep => "keep",
            SchemaMode::Create => "create",
            SchemaMode::Recreate => "recreate",
        }
    }
}

impl CommitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitMode::Row => "row",
            CommitMode::Batch => "batch",
        }
    }
}

impl OnRowError {
    pub fn as_str(self) -> &'static str {
        match self {
            OnRowError::Abort => "abort",
            OnRowError::Skip => "skip",
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OnRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
