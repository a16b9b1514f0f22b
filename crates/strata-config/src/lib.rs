use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strata_model::{ModelError, Schema, SchemaSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid schema in {schema_path}: {source}")]
    InvalidSchema {
        schema_path: PathBuf,
        source: ModelError,
    },
}

/// Engine settings, stored as TOML.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// A TOML schema description to use instead of the built-in schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = read(config_path)?;
        let mut config: Config = parse(config_path, &content)?;

        // Expand shell variables and tilde in the loaded schema path
        config.schema_path = config
            .schema_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/strata");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The schema documents are built against: the built-in one unless a
    /// schema file is configured.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        match &self.schema_path {
            None => Ok(Schema::basic()),
            Some(path) => load_schema(path),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

/// Read and compile a TOML schema description.
pub fn load_schema<P: AsRef<Path>>(schema_path: P) -> Result<Schema, ConfigError> {
    let schema_path = schema_path.as_ref();
    let content = read(schema_path)?;
    let spec: SchemaSpec = parse(schema_path, &content)?;
    Schema::new(spec).map_err(|source| ConfigError::InvalidSchema {
        schema_path: schema_path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
        config_path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::ConfigParseError {
        config_path: path.to_path_buf(),
        source,
    })
}
