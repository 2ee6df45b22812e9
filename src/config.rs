use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::glossary::DEFAULT_RESULT_LIMIT;
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
    pub theme_name: String,
    #[serde(skip)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Lines moved per scroll step.
    pub scroll_step: usize,
    /// Lines kept visible around the cursor when jumping.
    pub scroll_margin: usize,
    pub show_parse_warnings: bool,
    pub wrap_width: u16,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scroll_step: 1,
            scroll_margin: 3,
            show_parse_warnings: true,
            wrap_width: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Page title suffix, appended after the chapter title.
    pub title_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("html"),
            title_suffix: String::from("FASM Book"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reader: ReaderConfig::default(),
            search: SearchConfig::default(),
            export: ExportConfig::default(),
            theme_name: String::from("dark"),
            theme: Theme::dark(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let mut config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            // Initialize theme from theme_name
            config.theme = Theme::from_name(&config.theme_name);
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn set_theme(&mut self, name: &str) {
        self.theme_name = name.to_string();
        self.theme = Theme::from_name(name);
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "fasmbook", "fasmbook")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.search.result_limit, DEFAULT_RESULT_LIMIT);
        assert_eq!(back.theme_name, "dark");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("theme_name = \"gruvbox\"").unwrap();
        assert_eq!(config.theme_name, "gruvbox");
        assert_eq!(config.reader.scroll_step, 1);
    }
}
