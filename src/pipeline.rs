use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::Config;
use crate::provider::cache::{CacheConfig, DiskCache};
use crate::provider::types::{EventResultRow, TrackStatusEntry};
use crate::provider::{get_event_results, get_track_status};
use crate::scoring::{score_event, ScoredEntrantRow};
use crate::summary::{summarize_event, EventSummaryRow};

/// Bounded in-flight fetch window
const MAX_CONCURRENT_FETCHES: usize = 8;

/// All (season, round) pairs the config asks for, optionally filtered to one
/// season.
pub fn configured_events(config: &Config, season_filter: Option<u16>) -> Vec<(u16, u32)> {
    config
        .seasons
        .iter()
        .filter(|s| season_filter.map_or(true, |year| s.year == year))
        .flat_map(|s| (1..=s.rounds).map(move |round| (s.year, round)))
        .collect()
}

/// Fetch and score every configured event.
///
/// Network failures for individual events are reported and skipped (partial
/// results are better than none); if every event fails the whole run fails.
/// A scoring contract violation inside one event is fatal to the batch.
///
/// The result is sorted season asc, round asc, finishing position asc with
/// unclassified entrants last.
pub async fn fetch_and_score(
    client: &reqwest::Client,
    config: &Config,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    season_filter: Option<u16>,
    verbose: bool,
) -> Result<Vec<ScoredEntrantRow>> {
    let events = configured_events(config, season_filter);
    let batches = fetch_event_batches(client, config, cache, cache_config, &events, false, verbose)
        .await?;

    let mut scored = Vec::new();
    for batch in &batches {
        scored.extend(score_event(&batch.results)?);
    }

    sort_scored(&mut scored);
    Ok(scored)
}

/// Fetch every configured event and build its prediction summary row.
/// Events missing a pole, fastest lap, or any classified podium finisher are
/// dropped from the output. Sorted season asc, round asc.
pub async fn fetch_summaries(
    client: &reqwest::Client,
    config: &Config,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    season_filter: Option<u16>,
    verbose: bool,
) -> Result<Vec<EventSummaryRow>> {
    let events = configured_events(config, season_filter);
    let batches =
        fetch_event_batches(client, config, cache, cache_config, &events, true, verbose).await?;

    let mut summaries = Vec::new();
    for batch in &batches {
        match summarize_event(&batch.results, &batch.track_status) {
            Some(row) => summaries.push(row),
            None => {
                if verbose {
                    eprintln!(
                        "  {} round {}: incomplete event (no pole, fastest lap, or podium), dropped from summary",
                        batch.season, batch.round
                    );
                }
            }
        }
    }

    summaries.sort_by_key(|s| (s.season, s.round));
    Ok(summaries)
}

struct EventBatch {
    season: u16,
    round: u32,
    results: Vec<EventResultRow>,
    track_status: Vec<TrackStatusEntry>,
}

/// Fetch event result rows (and optionally track status) for a list of
/// events with a bounded concurrent window, tolerant of partial failure:
/// failed events are skipped with a warning unless all of them fail.
async fn fetch_event_batches(
    client: &reqwest::Client,
    config: &Config,
    cache: &DiskCache,
    cache_config: &CacheConfig,
    events: &[(u16, u32)],
    with_track_status: bool,
    verbose: bool,
) -> Result<Vec<EventBatch>> {
    let base_url = config.provider.base_url.as_str();

    let fetch_one = |season: u16, round: u32| async move {
        let results = get_event_results(client, base_url, cache, cache_config, season, round).await;
        let results = match results {
            Ok(rows) => rows,
            Err(e) => return (season, round, Err(e)),
        };
        let track_status = if with_track_status {
            match get_track_status(client, base_url, cache, cache_config, season, round).await {
                Ok(entries) => entries,
                Err(e) => return (season, round, Err(e)),
            }
        } else {
            Vec::new()
        };
        (
            season,
            round,
            Ok(EventBatch {
                season,
                round,
                results,
                track_status,
            }),
        )
    };

    let mut futures = FuturesUnordered::new();
    let mut events_iter = events.iter().copied();
    let mut batches = Vec::new();
    let mut any_succeeded = false;

    // Fill initial window
    for _ in 0..MAX_CONCURRENT_FETCHES {
        if let Some((season, round)) = events_iter.next() {
            futures.push(fetch_one(season, round));
        }
    }

    // Process results and feed new fetches
    while let Some((season, round, result)) = futures.next().await {
        match result {
            Ok(batch) => {
                if verbose {
                    eprintln!(
                        "  {} round {}: {} result rows",
                        season,
                        round,
                        batch.results.len()
                    );
                }
                batches.push(batch);
                any_succeeded = true;
            }
            Err(e) => {
                eprintln!("Event {} round {} failed: {:#}", season, round, e);
                // Continue with other events
            }
        }

        if let Some((next_season, next_round)) = events_iter.next() {
            futures.push(fetch_one(next_season, next_round));
        }
    }

    if !any_succeeded && !events.is_empty() {
        anyhow::bail!(
            "All events failed to fetch. Check your network connection and the provider base_url."
        );
    }

    // FuturesUnordered completes out of order
    batches.sort_by_key(|b| (b.season, b.round));
    Ok(batches)
}

/// Display sort for the per-entrant table: season asc, round asc, finishing
/// position asc (unclassified last), driver code as the final tie-break.
pub fn sort_scored(scored: &mut [ScoredEntrantRow]) {
    scored.sort_by(|a, b| {
        (a.result.season, a.result.round, a.race_rank())
            .cmp(&(b.result.season, b.result.round, b.race_rank()))
            .then_with(|| a.result.driver.cmp(&b.result.driver))
    });
}
