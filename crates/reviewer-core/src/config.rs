//! Repository-level configuration stored in `.gitreviewer.json`.

use crate::analyzer::AnalyzerConfig;
use crate::diff::DiffEngine;
use crate::error::{Error, Result};
use crate::stats::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file at the repository root.
pub const CONFIG_FILE_NAME: &str = ".gitreviewer.json";

/// Settings read from the configuration file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerConfig {
    /// Edit distance above which a file counts as fully replaced.
    pub max_edit_distance: Option<usize>,
    /// Unchanged lines on either side of a change credited as context.
    pub context_lines: usize,
    /// Ranking weights.
    pub weights: ScoreWeights,
    /// Worker threads; defaults to the number of cores.
    pub workers: Option<usize>,
    /// Exact paths left out of the analysis.
    pub ignore_files: Vec<String>,
    /// Directories whose contents are left out of the analysis.
    pub ignore_folders: Vec<String>,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: None,
            context_lines: 3,
            weights: ScoreWeights::default(),
            workers: None,
            ignore_files: Vec::new(),
            ignore_folders: Vec::new(),
        }
    }
}

impl ReviewerConfig {
    /// Location of the configuration file under `root`.
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration under `root`, or the defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(&path)?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the configuration under `root`, replacing any existing file.
    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(root), data + "\n")?;
        Ok(())
    }

    /// Write the default configuration unless a file already exists.
    ///
    /// Returns whether a file was created.
    pub fn init(root: &Path) -> Result<bool> {
        if Self::path(root).exists() {
            return Ok(false);
        }
        Self::default().save(root)?;
        Ok(true)
    }

    /// Diff engine honouring `max_edit_distance`.
    pub fn diff_engine(&self) -> DiffEngine {
        match self.max_edit_distance {
            Some(limit) => DiffEngine::new().with_max_edit_distance(limit),
            None => DiffEngine::new(),
        }
    }

    /// Analyzer settings derived from this configuration.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            context_lines: self.context_lines,
            workers: self.workers,
            ignore_files: self.ignore_files.clone(),
            ignore_folders: self.ignore_folders.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ReviewerConfig::load(dir.path()).unwrap();
        assert_eq!(config, ReviewerConfig::default());
        assert_eq!(config.context_lines, 3);
    }

    #[test]
    fn test_init_writes_once() {
        let dir = TempDir::new().unwrap();
        assert!(ReviewerConfig::init(dir.path()).unwrap());
        assert!(!ReviewerConfig::init(dir.path()).unwrap());
        assert!(ReviewerConfig::path(dir.path()).exists());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            ReviewerConfig::path(dir.path()),
            r#"{ "max_edit_distance": 500, "ignore_folders": ["vendor"] }"#,
        )
        .unwrap();

        let config = ReviewerConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_edit_distance, Some(500));
        assert_eq!(config.context_lines, 3);
        assert_eq!(config.weights, ScoreWeights::default());
        assert_eq!(config.diff_engine().max_edit_distance(), Some(500));
        assert!(config.analyzer_config().is_ignored("vendor/lib.rs"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(ReviewerConfig::path(dir.path()), "{ not json").unwrap();

        assert!(matches!(
            ReviewerConfig::load(dir.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_save_round_trips() {
        let dir = TempDir::new().unwrap();
        let config = ReviewerConfig {
            workers: Some(2),
            ignore_files: vec!["Cargo.lock".to_string()],
            ..ReviewerConfig::default()
        };
        config.save(dir.path()).unwrap();

        assert_eq!(ReviewerConfig::load(dir.path()).unwrap(), config);
    }
}
