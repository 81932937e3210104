//! The `config` module loads the exporter's runtime settings.
//!
//! Settings come from, in increasing priority: built-in defaults, an optional
//! settings file (`config/default.*`, or the path given with `--config`), and
//! `SBEXPORT_`-prefixed environment variables using `__` between sections,
//! e.g. `SBEXPORT_CLIENT__PAGE_SIZE=50`.

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ClientSettings, LogSettings, Settings};

const ENV_PREFIX: &str = "SBEXPORT";
const DEFAULT_FILE: &str = "config/default";

/// Loads settings from `path` (required when given) or the default file
/// (optional), then the environment, merged onto `Settings::default()`.
pub fn load_config(path: Option<&str>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name(DEFAULT_FILE).required(false),
    };

    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
        client: ClientSettings {
            api_version: partial
                .client
                .as_ref()
                .and_then(|c| c.api_version.clone())
                .unwrap_or(default.client.api_version),
            page_size: partial
                .client
                .as_ref()
                .and_then(|c| c.page_size)
                .unwrap_or(default.client.page_size),
            request_timeout_secs: partial
                .client
                .as_ref()
                .and_then(|c| c.request_timeout_secs)
                .unwrap_or(default.client.request_timeout_secs),
            token_ttl_secs: partial
                .client
                .as_ref()
                .and_then(|c| c.token_ttl_secs)
                .unwrap_or(default.client.token_ttl_secs),
        },
    })
}
