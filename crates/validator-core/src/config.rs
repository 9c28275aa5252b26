use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::prompt::{RequestSettings, TemperaturePolicy};
use crate::transport::DEFAULT_PROXY_URL;

pub const PROXY_URL_ENV: &str = "SAAS_VALIDATOR_PROXY_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub proxy_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Fixed sampling temperature; unset means "derive from the tone slider".
    pub temperature: Option<f64>,
    /// Typewriter effect on replies. On unless set to false.
    pub reveal: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Proxy endpoint: env var first, then the config file, then the local default.
    pub fn proxy_url(&self) -> String {
        std::env::var(PROXY_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.proxy_url.clone())
            .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string())
    }

    pub fn reveal_enabled(&self) -> bool {
        self.reveal.unwrap_or(true)
    }

    pub fn request_settings(&self) -> RequestSettings {
        let defaults = RequestSettings::default();
        RequestSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self
                .temperature
                .map(TemperaturePolicy::Fixed)
                .unwrap_or(defaults.temperature),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("saas-validator").join("config.json"))
    }
}
