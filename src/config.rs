//! Application configuration.
//!
//! Loads settings from a config.json next to the executable, falling back to
//! one in the working directory, then to defaults. Every field has a default
//! matching the gommehd.net BedWars profile page.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::Filter;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL for player statistics; the username is appended.
    #[serde(default = "default_stats_url")]
    pub stats_url: String,
    /// Section title that opens the stat block.
    #[serde(default = "default_section_start")]
    pub section_start: String,
    /// Title of the following section, which closes the stat block.
    #[serde(default = "default_section_end")]
    pub section_end: String,
    /// Statistic names expected in every populated record, in column order.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Image filter applied before OCR.
    #[serde(default)]
    pub filter: Filter,
}

fn default_stats_url() -> String {
    "https://www.gommehd.net/player/index?playerName=".to_string()
}

fn default_section_start() -> String {
    "BedWars".to_string()
}

fn default_section_end() -> String {
    "SkyWars".to_string()
}

fn default_columns() -> Vec<String> {
    ["Wins", "Kills", "Games", "Beds destroyed", "Deaths"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stats_url: default_stats_url(),
            section_start: default_section_start(),
            section_end: default_section_end(),
            columns: default_columns(),
            filter: Filter::default(),
        }
    }
}

/// Loads configuration from config.json or returns defaults.
pub fn load_config() -> AppConfig {
    let exe_config = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .filter(|p| p.exists());
    let path = exe_config.unwrap_or_else(|| PathBuf::from("config.json"));

    load_from(&path)
}

fn load_from(path: &Path) -> AppConfig {
    if !path.exists() {
        log::debug!("{} not found, using default config", path.display());
        return AppConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                AppConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            AppConfig::default()
        }
    }
}
