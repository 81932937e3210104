use serde::Deserialize;

/// Top-level runtime settings for the exporter.
///
/// Includes logging and the management API client settings.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    pub log: LogSettings,
    pub client: ClientSettings,
}

/// Logging settings. `level` is overridden by `--log-level`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Settings for the management API client.
///
/// Controls the API version requested, page size of listings, the per-request
/// timeout and how long each shared access signature stays valid.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_version: String,
    pub page_size: usize,
    pub request_timeout_secs: u64,
    pub token_ttl_secs: u64,
}

/// Partial settings loaded from a file or the environment.
///
/// Missing values are filled in from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub log: Option<PartialLogSettings>,
    pub client: Option<PartialClientSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub api_version: Option<String>,
    pub page_size: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub token_ttl_secs: Option<u64>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_version: "2021-05".to_string(),
            page_size: 100,
            request_timeout_secs: 30,
            token_ttl_secs: 3600,
        }
    }
}
