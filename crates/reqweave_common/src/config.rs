//! Pipeline configuration
//!
//! Loaded from a TOML file; every field has a serde default so partial
//! files load cleanly. A missing file yields the built-in defaults.

use crate::llm_client::GenConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Retry policy for generation calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff delay, doubled per retry
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Backoff cap
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    50
}

fn default_max_delay_ms() -> u64 {
    800
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub generator: GenConfig,

    /// Reconciliation iteration bound; reaching it without Pass is a
    /// convergence failure, never a longer loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Derive the functional-requirements chapter after a Pass
    #[serde(default = "default_write_requirements")]
    pub write_requirements: bool,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_write_requirements() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator: GenConfig::default(),
            max_iterations: default_max_iterations(),
            retry: RetryConfig::default(),
            write_requirements: default_write_requirements(),
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file; a missing file yields defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.write_requirements);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reqweave.toml");
        std::fs::write(&path, "max_iterations = 4\n\n[retry]\nmax_attempts = 1\n").unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.retry.max_attempts, 1);
        // Untouched sections keep defaults
        assert_eq!(config.retry.initial_delay_ms, 50);
        assert_eq!(config.generator.model, "llama3.2:3b");
    }
}
