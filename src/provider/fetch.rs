use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::provider::cache::{CacheConfig, DiskCache};
use crate::provider::types::{EventResultRow, TrackStatusEntry};

/// Fetch the per-driver result rows for one completed event
pub async fn get_event_results(
    client: &reqwest::Client,
    base_url: &str,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    season: u16,
    round: u32,
) -> Result<Vec<EventResultRow>> {
    let url = format!(
        "{}/results/{}/{}",
        base_url.trim_end_matches('/'),
        season,
        round
    );
    fetch_rows(client, cache, cache_config, &url)
        .await
        .with_context(|| format!("Failed to fetch results for {} round {}", season, round))
}

/// Fetch the race-control track-status entries for one completed event
pub async fn get_track_status(
    client: &reqwest::Client,
    base_url: &str,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    season: u16,
    round: u32,
) -> Result<Vec<TrackStatusEntry>> {
    let url = format!(
        "{}/track_status/{}/{}",
        base_url.trim_end_matches('/'),
        season,
        round
    );
    fetch_rows(client, cache, cache_config, &url)
        .await
        .with_context(|| format!("Failed to fetch track status for {} round {}", season, round))
}

/// Fetch a JSON array from the provider, retrying transient failures.
/// Successful bodies are cached on disk; completed-event data never changes.
async fn fetch_rows<T: DeserializeOwned>(
    client: &reqwest::Client,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    url: &str,
) -> Result<Vec<T>> {
    if cache_config.enabled {
        if let Some(body) = cache.get(url) {
            return serde_json::from_slice(&body)
                .with_context(|| format!("Invalid cached JSON for {}", url));
        }
    }

    // Retry strategy: exponential backoff with 3 attempts
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let body = Retry::spawn(retry_strategy, || async {
        let response = client.get(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                anyhow!("Could not reach the results provider. Check your network connection and the configured base_url.")
            } else {
                anyhow!("Provider request failed: {}", e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| anyhow!("Failed to read provider response: {}", e))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(anyhow!(
                "No data published for this event. It may not be completed yet."
            ))
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(anyhow!(
                "Provider rate limit exceeded. Wait a few minutes and try again."
            ))
        } else {
            Err(anyhow!("Provider returned {} for {}", status, url))
        }
    })
    .await?;

    let rows = serde_json::from_slice(&body)
        .with_context(|| format!("Invalid JSON from {}", url))?;

    if cache_config.enabled {
        cache.put(url, &body);
    }

    Ok(rows)
}
