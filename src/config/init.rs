use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, ProviderConfig, SeasonConfig};

/// Write a starter config the user can edit.
///
/// If `path` is Some, uses that as the config file path; otherwise the
/// default (~/.config/gridfp/config.yaml). Refuses to overwrite an existing
/// file unless `force` is set.
pub fn write_starter_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config {
        provider: ProviderConfig {
            base_url: "http://localhost:8500/api".to_string(),
        },
        seasons: vec![SeasonConfig {
            year: 2023,
            rounds: 22,
        }],
        prices: None,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!("Config written to {}", config_path.display());
    println!("Edit provider.base_url to point at your results provider, and");
    println!("add a `prices:` section to attach driver/constructor costs.");
    println!("Run `gridfp score` to get started.");

    Ok(())
}
