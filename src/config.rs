use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShortlistConfig {
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            catalog: CatalogConfig::default(),
            index: IndexConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "data/catalog.csv".into(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: "data/catalog_embeddings.bin".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_shortlist_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 10 }
    }
}

/// Returns `~/.shortlist/`
pub fn default_shortlist_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".shortlist")
}

/// Returns the default config file path: `~/.shortlist/config.toml`
pub fn default_config_path() -> PathBuf {
    default_shortlist_dir().join("config.toml")
}

impl ShortlistConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ShortlistConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (SHORTLIST_CATALOG, SHORTLIST_INDEX, SHORTLIST_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SHORTLIST_CATALOG") {
            self.catalog.path = val;
        }
        if let Ok(val) = std::env::var("SHORTLIST_INDEX") {
            self.index.path = val;
        }
        if let Ok(val) = std::env::var("SHORTLIST_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Resolve the catalog CSV path, expanding `~` if needed.
    pub fn resolved_catalog_path(&self) -> PathBuf {
        expand_tilde(&self.catalog.path)
    }

    /// Resolve the embedding index path, expanding `~` if needed.
    pub fn resolved_index_path(&self) -> PathBuf {
        expand_tilde(&self.index.path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
