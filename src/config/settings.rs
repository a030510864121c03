use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// How to reach the external classification tool. Defaults match a local
/// `mods` install backed by llama-cpp.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_api")]
    pub api: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_command() -> String {
    "mods".to_string()
}

fn default_api() -> String {
    "llama-cpp".to_string()
}

fn default_model() -> String {
    "dummy".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            api: default_api(),
            model: default_model(),
        }
    }
}

pub fn observer_dir() -> PathBuf {
    dirs::home_dir()
        .expect("Could not find home directory")
        .join(".observer")
}

pub fn config_path() -> PathBuf {
    observer_dir().join("config.toml")
}

pub fn load_config() -> Result<Config> {
    let path = config_path();
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
