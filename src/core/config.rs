use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::rules::{ToggleRule, default_rules};
use crate::builders::validator::{ConfigValidator, StandardValidator};

pub const CONFIG_FILE_NAME: &str = "pom-toggle.toml";
pub const DEFAULT_TARGET_FILE: &str = "pom.xml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    pub verbose: bool,
    /// Leave matches alone when their block is already inside a comment.
    #[serde(default = "default_skip_commented")]
    pub skip_commented: bool,
}

fn default_skip_commented() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            skip_commented: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToggleConfig {
    pub version: String,
    pub target_file: String,
    #[serde(default)]
    pub global_settings: GlobalSettings,
    #[serde(default)]
    pub rules: Vec<ToggleRule>,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            target_file: DEFAULT_TARGET_FILE.to_string(),
            global_settings: GlobalSettings::default(),
            rules: default_rules(),
        }
    }
}

/// Export formats supported by `export_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
    #[default]
    Toml,
}

pub struct ConfigManager {
    config_path: PathBuf,
    root: PathBuf,
}

impl ConfigManager {
    pub fn new_at(root: PathBuf) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE_NAME);
        Ok(Self { config_path, root })
    }

    /// Use an explicit rule file instead of `pom-toggle.toml` in the root.
    pub fn set_config_path(&mut self, path: PathBuf) {
        self.config_path = if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        };
    }

    pub fn initialize(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }

        let default_config = ToggleConfig::default();
        self.save_config(&default_config)?;
        Ok(true)
    }

    pub fn validate_config(&self) -> Result<()> {
        let config = self.load_config()?;
        let validator = StandardValidator::new(self.root.clone());
        let issues = validator.validate_config(&config)?;

        if issues.is_empty() {
            println!("✓ Configuration is valid.");
            Ok(())
        } else {
            println!("⚠️  Found issues in configuration:");
            for issue in issues {
                println!("  - {issue}");
            }
            anyhow::bail!("Configuration validation failed.");
        }
    }

    pub fn list_rules(&self) -> Result<()> {
        let config = self.load_config()?;

        if config.rules.is_empty() {
            println!("No toggle rules configured.");
            return Ok(());
        }

        println!("\n📁 File: {}", config.target_file);
        for (position, rule) in config.rules.iter().enumerate() {
            println!("  🔍 {}. {} | {}", position + 1, rule.name, rule.target);
            if let Some(anchor) = &rule.anchor {
                println!("     anchor: {anchor}");
            }
        }
        Ok(())
    }

    pub fn export_rules(&self, file_path: &Path, format: ExportFormat) -> Result<()> {
        let config = self.load_config()?;

        let content = match format {
            ExportFormat::Json => {
                serde_json::to_string_pretty(&config).context("Failed to serialize to JSON")?
            }
            ExportFormat::Yaml => {
                serde_yaml::to_string(&config).context("Failed to serialize to YAML")?
            }
            ExportFormat::Toml => {
                toml::to_string_pretty(&config).context("Failed to serialize to TOML")?
            }
        };

        fs::write(file_path, content).context("Failed to write export file")?;

        Ok(())
    }

    /// Resolves the configured target file against the root.
    pub fn target_path(&self, config: &ToggleConfig) -> PathBuf {
        self.root.join(&config.target_file)
    }

    pub fn get_root(&self) -> &Path {
        &self.root
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<ToggleConfig>;
    fn save_config(&self, config: &ToggleConfig) -> Result<()>;
    fn get_config_path(&self) -> Result<PathBuf>;
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<ToggleConfig> {
        if !self.config_path.exists() {
            return Ok(ToggleConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    fn save_config(&self, config: &ToggleConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.config_path.clone())
    }
}
