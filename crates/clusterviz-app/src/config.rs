use std::fs;
use std::path::{Path, PathBuf};

use clusterviz_render::{Layout, Theme};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Client-side settings. Missing fields in a config file fall back to
/// [`ViewerConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the simulation server.
    pub base_url: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Steps sent per advance when no explicit count is given.
    pub step_size: u32,
    /// Directory rendered PNG frames are written to.
    pub output_dir: PathBuf,
    /// Fixed seed for the cluster palette shuffle; random when unset.
    pub palette_seed: Option<u64>,
    pub layout: Layout,
    pub theme: Theme,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            canvas_width: 800,
            canvas_height: 800,
            step_size: 1,
            output_dir: PathBuf::from("frames"),
            palette_seed: None,
            layout: Layout::default(),
            theme: Theme::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ViewerConfig =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url).map_err(|err| {
            ConfigError::Invalid(format!("base_url {:?} is not a URL: {err}", self.base_url))
        })?;
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid(
                "canvas dimensions must be non-zero".to_string(),
            ));
        }
        if self.step_size == 0 {
            return Err(ConfigError::Invalid("step_size must be at least 1".to_string()));
        }
        self.layout
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }
}
