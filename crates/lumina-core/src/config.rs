use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::ai::AssistantSettings;
use crate::document::{CodeDocument, Padding, Theme};

/// User preferences stored in `config.json`.
///
/// The API key is not part of this file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub theme: Option<String>,
    pub padding: Option<String>,
    pub language: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Record `model` as the default in the config file at `path`,
    /// keeping its other settings.
    pub fn save_default_model(path: &Path, model: &str) -> Result<()> {
        let mut config = Self::load_from(path).unwrap_or_else(|_| Self::new());
        config.model = Some(model.to_string());
        config.save_to(path)
    }

    pub fn assistant_settings(&self) -> AssistantSettings {
        let defaults = AssistantSettings::default();
        AssistantSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            base_url: self.api_base_url.clone().unwrap_or(defaults.base_url),
        }
    }

    /// The playground sample with configured style preferences applied.
    pub fn initial_document(&self) -> CodeDocument {
        let mut document = CodeDocument::playground_default();
        if let Some(theme) = self.theme.as_deref().and_then(Theme::from_str) {
            document.theme = theme;
        }
        if let Some(padding) = self.padding.as_deref().and_then(Padding::from_str) {
            document.padding = padding;
        }
        if let Some(language) = &self.language {
            document.language.clone_from(language);
        }
        document
    }

    /// Where exported images go: the configured directory, else Pictures,
    /// else the current directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lumina").join("config.json"))
    }
}
