use anyhow::{Context, Result};
use std::time::Duration;

/// Create an HTTP client for the results provider
pub fn create_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("gridfp/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create provider HTTP client")
}
