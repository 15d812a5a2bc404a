use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::selection::{DEFAULT_CHAPTER, DEFAULT_VERSE};

/// User configuration, read once at startup. A missing file is fine; a
/// malformed one is an error.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub default_chapter: Option<String>,
    pub default_verse: Option<String>,
    /// Alternate corpus file with the same shape as the bundled one.
    pub corpus_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("{} is malformed", config_path.display()))?;
        Ok(config)
    }

    /// The startup selection: configured values, else chapter 1 verse 47.
    pub fn default_selection(&self) -> (&str, &str) {
        (
            self.default_chapter.as_deref().unwrap_or(DEFAULT_CHAPTER),
            self.default_verse.as_deref().unwrap_or(DEFAULT_VERSE),
        )
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gita-dashboard").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_the_documented_default() {
        let config = Config::new();
        assert_eq!(config.default_selection(), ("1", "47"));
    }

    #[test]
    fn configured_defaults_win() {
        let config = Config {
            default_chapter: Some("2".to_string()),
            default_verse: Some("47".to_string()),
            corpus_path: None,
        };
        assert_eq!(config.default_selection(), ("2", "47"));
    }
}
