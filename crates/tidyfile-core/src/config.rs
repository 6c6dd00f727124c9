//! Session configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration shared by the local backend and the session layer.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SessionConfig {
    /// Program name or path of the classification engine sidecar.
    #[builder(default = "PathBuf::from(\"tidyfile-engine\")")]
    #[serde(default = "default_engine_program")]
    pub engine_program: PathBuf,

    /// Include dotfiles in directory listings.
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Largest file the preview loader will read (bytes).
    #[builder(default = "50 * 1024 * 1024")]
    #[serde(default = "default_preview_max_bytes")]
    pub preview_max_bytes: u64,

    /// Maximum depth for the stats walk.
    #[builder(default = "10")]
    #[serde(default = "default_stats_max_depth")]
    pub stats_max_depth: usize,

    /// Maximum entries visited by the stats walk.
    #[builder(default = "50_000")]
    #[serde(default = "default_stats_max_entries")]
    pub stats_max_entries: usize,

    /// Maximum entries visited when filtering by category.
    #[builder(default = "10_000")]
    #[serde(default = "default_category_max_entries")]
    pub category_max_entries: usize,

    /// Maximum matches returned when filtering by category.
    #[builder(default = "500")]
    #[serde(default = "default_category_max_results")]
    pub category_max_results: usize,

    /// How many largest/recent files the stats walk keeps.
    #[builder(default = "15")]
    #[serde(default = "default_stats_top_files")]
    pub stats_top_files: usize,
}

fn default_engine_program() -> PathBuf {
    PathBuf::from("tidyfile-engine")
}

fn default_preview_max_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_stats_max_depth() -> usize {
    10
}

fn default_stats_max_entries() -> usize {
    50_000
}

fn default_category_max_entries() -> usize {
    10_000
}

fn default_category_max_results() -> usize {
    500
}

fn default_stats_top_files() -> usize {
    15
}

impl SessionConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref program) = self.engine_program {
            if program.as_os_str().is_empty() {
                return Err("Engine program cannot be empty".to_string());
            }
        }
        if let Some(depth) = self.stats_max_depth {
            if depth == 0 {
                return Err("Stats walk depth must be at least 1".to_string());
            }
        }
        if let Some(bytes) = self.preview_max_bytes {
            if bytes == 0 {
                return Err("Preview size cap must be non-zero".to_string());
            }
        }
        Ok(())
    }
}

impl SessionConfig {
    /// Create a new session config builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine_program: default_engine_program(),
            include_hidden: false,
            preview_max_bytes: default_preview_max_bytes(),
            stats_max_depth: default_stats_max_depth(),
            stats_max_entries: default_stats_max_entries(),
            category_max_entries: default_category_max_entries(),
            category_max_results: default_category_max_results(),
            stats_top_files: default_stats_top_files(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.engine_program, PathBuf::from("tidyfile-engine"));
        assert!(!config.include_hidden);
        assert_eq!(config.stats_max_depth, 10);
        assert_eq!(config.stats_top_files, 15);
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::builder()
            .engine_program("/opt/engine/bin/engine")
            .include_hidden(true)
            .stats_max_entries(100usize)
            .build()
            .unwrap();

        assert_eq!(config.engine_program, PathBuf::from("/opt/engine/bin/engine"));
        assert!(config.include_hidden);
        assert_eq!(config.stats_max_entries, 100);
    }

    #[test]
    fn test_config_rejects_zero_depth() {
        let result = SessionConfig::builder().stats_max_depth(0usize).build();
        assert!(result.is_err());
    }
}
