use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub gnews_api_key: Option<String>,
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_max_per_query")]
    pub max_per_query: u32,

    #[serde(default = "default_featured_count")]
    pub featured_count: usize,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_min_confidence")]
    pub min_confidence: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("attra-news");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("news.db").to_string_lossy().to_string()
}

fn default_language() -> String {
    "pt".to_string()
}

fn default_country() -> String {
    "br".to_string()
}

fn default_max_per_query() -> u32 {
    10
}

fn default_featured_count() -> usize {
    3
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_min_confidence() -> u32 {
    75
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            gnews_api_key: None,
            gemini_api_key: None,
            language: default_language(),
            country: default_country(),
            max_per_query: default_max_per_query(),
            featured_count: default_featured_count(),
            similarity_threshold: default_similarity_threshold(),
            min_confidence: default_min_confidence(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        // Environment takes precedence over the config file for secrets
        if let Ok(key) = std::env::var("GNEWS_API_KEY") {
            config.gnews_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini_api_key = Some(key);
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("attra-news")
            .join("config.toml")
    }
}
