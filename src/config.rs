//! Configuration loading for Hamlet

use crate::{ClassNameStrategy, Direction, TransformOptions};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".hamletrc.json";

/// On-disk configuration schema
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Default transform direction when the CLI flag is omitted
    pub direction: Option<String>,
    /// Naming strategy for generated TestCase classes
    pub class_name_strategy: Option<String>,
    /// setUp attribute count above which a namespace bundle is emitted
    pub autouse_inline_threshold: Option<usize>,
    /// Keep unrecognised pytest markers on converted tests
    pub preserve_unknown_markers: Option<bool>,
    /// File-name patterns treated as test files during directory discovery
    pub test_patterns: Vec<String>,
}

impl Config {
    /// Resolve the configured direction, if any
    pub fn direction(&self) -> Result<Option<Direction>> {
        match &self.direction {
            Some(value) => {
                let direction = value
                    .parse::<Direction>()
                    .map_err(|e| anyhow::anyhow!(e))?;
                Ok(Some(direction))
            }
            None => Ok(None),
        }
    }

    /// Build transform options from this config
    pub fn to_options(&self) -> Result<TransformOptions> {
        let mut options = TransformOptions::default();
        if let Some(strategy) = &self.class_name_strategy {
            options.class_name_strategy = strategy
                .parse::<ClassNameStrategy>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(threshold) = self.autouse_inline_threshold {
            options.autouse_inline_threshold = threshold;
        }
        if let Some(preserve) = self.preserve_unknown_markers {
            options.preserve_unknown_markers = preserve;
        }
        Ok(options)
    }

    /// Compiled test-file patterns; defaults match pytest's conventions
    pub fn test_patterns(&self) -> Result<Vec<Regex>> {
        let patterns: Vec<&str> = if self.test_patterns.is_empty() {
            vec!["^test_.*\\.py$", ".*_test\\.py$"]
        } else {
            self.test_patterns.iter().map(|s| s.as_str()).collect()
        };
        patterns
            .into_iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid test pattern: {}", p)))
            .collect()
    }
}

/// Find and load the config file. Searches the work directory and its
/// parents; a missing config is not an error.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Some(path)
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in config: {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
