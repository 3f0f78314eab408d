use anyhow::Result;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::privacy::HashingConfig;

/// Main configuration structure for privacy-confirm
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrivacyConfirmConfig {
    /// Where requests are persisted
    pub store: StoreConfig,
    /// Database settings (optional)
    pub database: Option<DatabaseConfig>,
    /// Token hashing cost
    pub hashing: HashingConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend used by the CLI
    pub backend: StoreBackend,
    /// Request file for the file backend
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or EnvFilter directive
    pub log_level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            file_path: PathBuf::from(".privacy-confirm/requests.json"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://.privacy-confirm/privacy.db".to_string(),
            max_connections: 5,
            auto_migrate: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
        }
    }
}

impl Default for PrivacyConfirmConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            database: Some(DatabaseConfig::default()),
            hashing: HashingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl PrivacyConfirmConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (privacy-confirm.toml, .privacy-confirm-rc)
    /// 3. Environment variables (prefixed with PRIVACY_CONFIRM_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("privacy-confirm.toml").exists() {
            builder = builder.add_source(File::with_name("privacy-confirm"));
        }

        if Path::new(".privacy-confirm-rc").exists() {
            builder = builder.add_source(
                File::with_name(".privacy-confirm-rc").format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("PRIVACY_CONFIRM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let privacy_config: PrivacyConfirmConfig = config.try_deserialize()?;

        Ok(privacy_config)
    }

    /// Load from an explicit file, still honouring environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PRIVACY_CONFIRM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PrivacyConfirmConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = PrivacyConfirmConfig::load_env_file();
        PrivacyConfirmConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PrivacyConfirmConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
