// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{Result, TranslatorError};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl TranslatorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest, `MS_TRANSLATOR__AUTH__SUBSCRIPTION_KEY=...`)
    /// 2. Config file (`path`, or `~/.ms-translator/config.toml` when absent)
    /// 3. Defaults (lowest)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix("MS_TRANSLATOR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| TranslatorError::Configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TranslatorError::Configuration(e.to_string()))
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ms-translator")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[auth]
mode = "client_credentials"
client_id = "dumb"
client_secret = "dumber"

[store]
kind = "memory"

[http]
timeout_seconds = 3
"#
        )
        .unwrap();

        let config = TranslatorConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.auth.mode, AuthMode::ClientCredentials);
        assert_eq!(config.auth.client_id.as_deref(), Some("dumb"));
        assert_eq!(config.auth.scope, API_CLIENT_SCOPE);
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.http.timeout_seconds, 3);
        assert_eq!(config.api.base_url, API_BASE_URL);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = TranslatorConfig::load(Some(Path::new("/nonexistent/ms-translator.toml")));
        assert!(matches!(result, Err(TranslatorError::Configuration(_))));
    }
}
