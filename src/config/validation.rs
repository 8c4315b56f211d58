use std::collections::HashSet;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.provider.base_url.trim().is_empty() {
        errors.push("provider.base_url: must not be empty".to_string());
    } else if !config.provider.base_url.starts_with("http://")
        && !config.provider.base_url.starts_with("https://")
    {
        errors.push(format!(
            "provider.base_url: '{}' must be an http(s) URL",
            config.provider.base_url
        ));
    }

    if config.seasons.is_empty() {
        errors.push("seasons: at least one season is required".to_string());
    }

    let mut seen_years = HashSet::new();
    for (i, season) in config.seasons.iter().enumerate() {
        if season.rounds == 0 {
            errors.push(format!(
                "seasons[{}]: rounds must be at least 1 for {}",
                i, season.year
            ));
        }
        if !seen_years.insert(season.year) {
            errors.push(format!(
                "seasons[{}]: duplicate year {}",
                i, season.year
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
