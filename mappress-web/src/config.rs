//! Standard configuration module.

use serde_derive::Deserialize;
use mappress_util::{ConfigExt, crate_name};

/// `mappress-web` configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Address to listen on.
    pub listen: String,
    /// Path to the SQLite database.
    pub database_path: String,
    /// Public base URL (no trailing slash), used to build permalinks.
    pub public_url: String,
}

impl ConfigExt for Config {
    fn crate_name() -> &'static str {
        crate_name!()
    }
}
