use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub provider: ProviderConfig,
    pub seasons: Vec<SeasonConfig>,
    /// Optional price tables; without them the scored table carries no costs
    #[serde(default)]
    pub prices: Option<PricesConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the results provider, e.g. "http://localhost:8500/api"
    pub base_url: String,
}

/// One season's worth of completed events: rounds 1..=rounds are fetched.
/// Future events must not be listed; the provider only serves completed ones.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SeasonConfig {
    pub year: u16,
    pub rounds: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PricesConfig {
    pub drivers: PathBuf,
    pub constructors: PathBuf,
}
