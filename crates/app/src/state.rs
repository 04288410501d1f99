use std::{fs, path::PathBuf};

use common::identity::KeyStore;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "datacrypt";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEYS_DIR_NAME: &str = "keys";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the identity key pair (defaults to <app dir>/keys).
    /// Relative paths are resolved against the app directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_dir: Option<PathBuf>,
    /// Default log level when neither --log-level nor RUST_LOG is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            key_dir: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the datacrypt directory (~/.datacrypt)
    pub app_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Resolved key directory
    pub key_dir: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the datacrypt directory path (custom or default ~/.datacrypt)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new datacrypt directory with its config file
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&app_dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self::from_parts(app_dir, config_path, config))
    }

    /// Load existing state from the datacrypt directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self::from_parts(app_dir, config_path, config))
    }

    /// Load existing state, or fall back to defaults if `init` was never run
    pub fn load_or_default(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        match Self::load(custom_path.clone()) {
            Err(StateError::NotInitialized) => {
                let app_dir = Self::app_dir(custom_path)?;
                let config_path = app_dir.join(CONFIG_FILE_NAME);
                Ok(Self::from_parts(app_dir, config_path, AppConfig::default()))
            }
            other => other,
        }
    }

    /// The key store for the configured key directory
    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(&self.key_dir)
    }

    fn from_parts(app_dir: PathBuf, config_path: PathBuf, config: AppConfig) -> Self {
        let key_dir = match &config.key_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => app_dir.join(dir),
            None => app_dir.join(KEYS_DIR_NAME),
        };
        Self {
            app_dir,
            config_path,
            key_dir,
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("datacrypt directory not initialized. Run 'datacrypt init' first")]
    NotInitialized,

    #[error("datacrypt directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
