//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for vitalpipe
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub crawl: CrawlConfig,
    pub flush: FlushConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("./data/catalog"),
            staging_dir: PathBuf::from("./data/staging"),
            archive_dir: PathBuf::from("./data/archive"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    pub surnames_file: PathBuf,
    pub workers: usize,
    pub max_retries: u32,
    /// Established member-session cookie; login happens outside the pipeline.
    pub session_cookie: Option<String>,
    pub activity_id: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            base_url: "https://www.archives.com/member/Default.aspx".to_string(),
            surnames_file: PathBuf::from("./surnames.tsv"),
            workers: cpus.min(8),
            max_retries: 3,
            session_cookie: std::env::var("VITALPIPE_SESSION_COOKIE").ok(),
            activity_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FlushConfig {
    pub interval_secs: u64,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./vitalpipe.toml (current directory)
    /// 2. ~/.config/vitalpipe/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("vitalpipe.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "vitalpipe") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
