use std::path::PathBuf;

use anyhow::Context;
use shiftwarden_config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions};
use tracing::{info, warn};

use super::telemetry;

/// Load configuration, install tracing and report what was loaded.
pub fn load_runtime_config(
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
) -> anyhow::Result<Config> {
    let ConfigLoad { config, warnings } = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path,
        env_file,
    })
    .load()
    .context("failed to load configuration")?;

    telemetry::init_tracing(&config.logging.filter);

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}
