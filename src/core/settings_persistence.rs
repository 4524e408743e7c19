//! Settings persistence
//!
//! Saves and loads [`Settings`] to/from a JSON file so hyperparameters and the
//! model location carry over between `qchess` runs.
//!
//! # File Location
//!
//! Settings are stored in `settings.json` in the user's configuration
//! directory, or in the working directory when no such directory exists.
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings
//! - Save failures are returned to the caller

use std::fs;
use std::path::{Path, PathBuf};

use chess_agent::{AgentConfig, DEFAULT_MODEL_FILE};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::CoreResult;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// User settings for the command-line front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub agent: AgentConfig,
    pub model_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_FILE),
        }
    }
}

/// Path to `settings.json` in the user's configuration directory
///
/// E.g. `~/.config/qchess/settings.json` on Linux. Falls back to a local
/// `settings.json` if the system config dir cannot be found.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "qchess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Load settings from `path`, using defaults when missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!("[SETTINGS] Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!(
                        "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> CoreResult<PathBuf> {
        let path = settings_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("[SETTINGS] Saved settings to {:?}", path);
        Ok(())
    }
}
