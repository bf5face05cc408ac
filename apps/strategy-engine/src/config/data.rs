//! Price history locations.

use serde::{Deserialize, Serialize};

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Daily CSV with `Date` and `Adj Close` columns.
    #[serde(default = "default_daily_path")]
    pub daily_path: String,
    /// 5-minute CSV with `datetime` and `close` columns.
    #[serde(default = "default_intraday_path")]
    pub intraday_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            daily_path: default_daily_path(),
            intraday_path: default_intraday_path(),
        }
    }
}

fn default_daily_path() -> String {
    "data/simulated_daily_data.csv".to_string()
}

fn default_intraday_path() -> String {
    "data/simulated_5min_data.csv".to_string()
}
