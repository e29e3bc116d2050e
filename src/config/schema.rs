use serde::{Deserialize, Serialize};

use crate::data_source::DEFAULT_SEED;
use crate::scoring::ScoringConfig;

/// Where crime and climate observations come from when a request omits them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
    /// Seeded demo data; results are marked simulated
    #[default]
    Synthetic,
    /// Real feeds; fails until an integration is configured
    Live,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSourceConfig {
    pub mode: DataSourceMode,
    pub seed: u64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            mode: DataSourceMode::Synthetic,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub data_source: DataSourceConfig,
}
