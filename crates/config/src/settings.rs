// Application settings
// Loaded from ~/.config/lishe/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Data
    #[serde(rename = "data.foodTable")]
    pub food_table: PathBuf,

    /// Catalog TOML; None = built-in catalog
    #[serde(rename = "data.catalog")]
    pub catalog: Option<PathBuf>,

    // History
    #[serde(rename = "history.dir")]
    pub history_dir: PathBuf,

    #[serde(rename = "history.enabled")]
    pub history_enabled: bool,

    // Recommendation
    #[serde(rename = "recommend.topN")]
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            food_table: PathBuf::from("VYAKULA.csv"),
            catalog: None,
            history_dir: PathBuf::from("goal_history"),
            history_enabled: false,
            top_n: 5,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lishe");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::debug!("cannot create config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Food composition table (CSV with "code" and name columns)
    "data.foodTable": "VYAKULA.csv",

    // Catalog of food groups and health goals (TOML); null = built-in
    "data.catalog": null,

    // Recommendation history log, one CSV per goal
    "history.dir": "goal_history",
    "history.enabled": false,

    // Foods returned per group
    "recommend.topN": 5
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::debug!("cannot write default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
