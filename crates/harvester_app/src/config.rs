//! JSON run configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_warn;
use harvester_engine::{Credentials, HarvestSettings, Selectors, WebDriverSettings};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserMode {
    #[default]
    Gui,
    Headless,
}

/// Keys as they appear in `config.json`; delays are in seconds.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    username: String,
    password: String,
    #[serde(default)]
    browser: Option<String>,
    #[serde(default)]
    action_delay: f64,
    #[serde(default = "default_loading_delay")]
    loading_delay: u64,
    #[serde(default = "default_scrolling_delay")]
    scrolling_delay: u64,
    #[serde(default = "default_scraping_delay")]
    scraping_delay: u64,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
}

fn default_loading_delay() -> u64 {
    15
}

fn default_scrolling_delay() -> u64 {
    30
}

fn default_scraping_delay() -> u64 {
    70
}

fn default_max_retries() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub browser: BrowserMode,
    pub action_delay: Duration,
    pub loading_delay: Duration,
    pub scrolling_delay: Duration,
    pub scraping_delay: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawConfig = serde_json::from_str(text)?;
        Ok(Self {
            browser: parse_browser_mode(raw.browser.as_deref()),
            action_delay: Duration::from_secs_f64(raw.action_delay.max(0.0)),
            loading_delay: Duration::from_secs(raw.loading_delay),
            scrolling_delay: Duration::from_secs(raw.scrolling_delay),
            scraping_delay: Duration::from_secs(raw.scraping_delay),
            max_retries: raw.max_retries,
            username: raw.username,
            password: raw.password,
        })
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            loading_delay: self.loading_delay,
            scrolling_delay: self.scrolling_delay,
            scraping_delay: self.scraping_delay,
            max_retries: self.max_retries,
            credentials: Some(Credentials {
                username: self.username.clone(),
                password: self.password.clone(),
            }),
            selectors: Selectors::default(),
        }
    }

    pub fn webdriver_settings(&self, endpoint: &str) -> WebDriverSettings {
        WebDriverSettings {
            endpoint: endpoint.to_string(),
            headless: self.browser == BrowserMode::Headless,
            action_delay: self.action_delay,
            ..WebDriverSettings::default()
        }
    }
}

fn parse_browser_mode(value: Option<&str>) -> BrowserMode {
    let Some(value) = value else {
        return BrowserMode::default();
    };
    match value.to_ascii_lowercase().as_str() {
        "gui" => BrowserMode::Gui,
        "headless" => BrowserMode::Headless,
        other => {
            engine_warn!(
                "browser option {other} not recognized (available options are gui and headless)"
            );
            BrowserMode::default()
        }
    }
}
