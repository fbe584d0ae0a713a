use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    #[default]
    Readability,
    Mercury,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub parser: ParserKind,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_crawl_concurrency")]
    pub crawl_concurrency: usize,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub mercury: MercuryConfig,

    #[serde(default)]
    pub readability: ReadabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub tries: u32,
    pub delay_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MercuryConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilityConfig {
    pub port: u16,
    pub log_file: Option<PathBuf>,
    pub server_dir: PathBuf,
    pub repo_url: String,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feed-catalog");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("articles.db").to_string_lossy().to_string()
}

fn default_user_agent() -> String {
    concat!("feed-catalog/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_crawl_concurrency() -> usize {
    4
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            tries: 3,
            delay_ms: 2500,
            timeout_secs: 30,
        }
    }
}

impl Default for MercuryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://mercury.postlight.com/parser".to_string(),
        }
    }
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            port: 25287,
            log_file: None,
            server_dir: PathBuf::from("./readability.js-server"),
            repo_url: "https://github.com/joejacobs/readability.js-server".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            parser: ParserKind::default(),
            user_agent: default_user_agent(),
            crawl_concurrency: default_crawl_concurrency(),
            http: HttpConfig::default(),
            mercury: MercuryConfig::default(),
            readability: ReadabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config at `path` (or the default location), writing the
    /// defaults there first if no file exists yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
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
            .join("feed-catalog")
            .join("config.toml")
    }

    /// Checks that the selected parser has what it needs to run.
    pub fn validate_parser(&self) -> Result<()> {
        match self.parser {
            ParserKind::Readability if self.readability.log_file.is_none() => Err(AppError::Config(
                "you need to specify the path to a log file for the Readability.js server".to_string(),
            )),
            ParserKind::Mercury if self.mercury.api_key.is_none() => Err(AppError::Config(
                "you need to specify an API key to use the Mercury Web Parser".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
