//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use stash_core::StashError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable selecting the environment-specific file.
pub const ENVIRONMENT_VAR: &str = "STASH_ENVIRONMENT";

/// Prefix for environment variable overrides (`STASH__REDIS__URL`).
pub const ENV_PREFIX: &str = "STASH";

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: String,
}

impl ConfigLoader {
    /// Creates a loader for `config_dir`, taking the environment name from
    /// `STASH_ENVIRONMENT` (default `development`).
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{dir}/default.toml` - Default values
    /// 2. `{dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{dir}/local.toml` - Local overrides
    /// 4. Environment variables with `STASH__` prefix
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        // Load .env file if present, so STASH_ENVIRONMENT can come from it
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        Self::with_environment(config_dir, environment)
    }

    /// Creates a loader with an explicit environment name.
    pub fn with_environment(
        config_dir: impl Into<PathBuf>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: environment.into(),
        }
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> Result<AppConfig, StashError> {
        info!(
            environment = %self.environment,
            dir = %self.config_dir.display(),
            "Loading configuration"
        );

        let mut builder = Config::builder();

        for name in ["default", self.environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config layer from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_stash_error)?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_stash_error)?;

        app_config.app.environment.clone_from(&self.environment);

        ConfigValidator::validate(&app_config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            StashError::Configuration(messages.join("; "))
        })?;

        Ok(app_config)
    }
}

fn config_error_to_stash_error(err: ConfigError) -> StashError {
    StashError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_dir_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_environment(dir.path().join("absent"), "test");

        let config = loader.load().unwrap();
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.app.environment, "test");
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[redis]\nurl = \"redis://default:6379\"\npool_size = 4\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[redis]\nurl = \"redis://staging:6379\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[redis]\nscan_count = 50\n").unwrap();

        let config = ConfigLoader::with_environment(dir.path(), "staging").load().unwrap();
        assert_eq!(config.redis.url, "redis://staging:6379");
        assert_eq!(config.redis.pool_size, 4);
        assert_eq!(config.redis.scan_count, 50);
        assert_eq!(config.app.environment, "staging");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[redis]\npool_size = 0\n").unwrap();

        let err = ConfigLoader::with_environment(dir.path(), "test").load().unwrap_err();
        match err {
            StashError::Configuration(msg) => assert!(msg.contains("pool_size")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_logging_section() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[logging]\njson = true\nfilter = \"warn\"\n",
        )
        .unwrap();

        let config = ConfigLoader::with_environment(dir.path(), "test").load().unwrap();
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "warn");
    }
}
