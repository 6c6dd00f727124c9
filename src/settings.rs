//! Persistent user settings for the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tidyfile_core::SessionConfig;

/// Persistent user settings stored in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Classification engine program name or path.
    pub engine: PathBuf,
    /// Show hidden files in listings by default.
    pub show_hidden: bool,
    /// Default output format ("text" or "json").
    pub format: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            engine: PathBuf::from("tidyfile-engine"),
            show_hidden: false,
            format: "text".to_string(),
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tidyfile").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&path, content)
    }

    /// Session configuration derived from these settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::builder()
            .engine_program(self.engine.clone())
            .include_hidden(self.show_hidden)
            .build()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = UserSettings::default();
        assert_eq!(settings.engine, PathBuf::from("tidyfile-engine"));
        assert!(!settings.show_hidden);
        assert_eq!(settings.format, "text");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: UserSettings = toml::from_str("show_hidden = true").unwrap();
        assert!(settings.show_hidden);
        assert_eq!(settings.engine, PathBuf::from("tidyfile-engine"));
    }

    #[test]
    fn test_session_config_carries_overrides() {
        let settings = UserSettings {
            engine: PathBuf::from("/opt/engine"),
            show_hidden: true,
            format: "json".to_string(),
        };
        let config = settings.session_config();
        assert_eq!(config.engine_program, PathBuf::from("/opt/engine"));
        assert!(config.include_hidden);
    }
}
