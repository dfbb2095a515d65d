use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use std::path::PathBuf;

/// Default remote service URL
pub const DEFAULT_API_URL: &str = "https://mybestflix-9620fb832942.herokuapp.com/";

pub const API_URL_VAR: &str = "MYFLIX_API_URL";
pub const STORE_PATH_VAR: &str = "MYFLIX_STORE_PATH";
pub const ROLLBACK_VAR: &str = "MYFLIX_ROLLBACK_FAVORITES";

/// Platform data directory location of the session file.
pub fn default_store_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("myflix");
    path.push("session.json");
    path
}

/// Builder pre-filled from the environment, for callers that override some values.
pub fn builder_from_env() -> AppConfigBuilder {
    let api_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let store_path = std::env::var_os(STORE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(default_store_path);
    let rollback = std::env::var(ROLLBACK_VAR)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    AppConfig::builder()
        .api_url(api_url)
        .store_path(store_path)
        .rollback_on_failure(rollback)
}

/// Load configuration from `MYFLIX_*` environment variables.
pub fn from_env() -> Result<AppConfig, ConfigError> {
    builder_from_env().build()
}
