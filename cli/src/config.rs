use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::CliError;
use crate::render::Format;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cook.toml";

/// Settings read from `cook.toml`. Command-line flags take precedence.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output format for `cook parse` when `--format` is absent.
    pub format: Format,
    pub no_color: bool,
}

impl Config {
    /// Load `explicit` if given, else `./cook.toml` if it exists, else
    /// defaults. A missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Config::default());
                }
                fallback
            }
        };
        debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        Config::from_toml(&text).map_err(|source| CliError::Config { path, source })
    }

    pub fn from_toml(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }
}
