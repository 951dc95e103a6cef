use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use deptseed_core::DEFAULT_SEED;

/// Options for the record generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Seed for every random draw of the run.
    pub seed: u64,
    /// Hire dates are drawn from the window ending at this date.
    pub base_date: NaiveDate,
    /// Width of the hire date window, in days.
    pub hire_window_days: u64,
    /// Maximum draws for a single unique value.
    pub max_unique_attempts: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            base_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            hire_window_days: 20 * 365,
            max_unique_attempts: 50,
        }
    }
}

impl GenerateOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
