//! Pipeline configuration loader.
//!
//! Paths and options are read from an optional YAML file, then overridden by
//! environment variables. Relative paths resolve against `root`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "epoxy-prep.yaml";

pub const ENV_ROOT: &str = "EPOXY_PREP_ROOT";
pub const ENV_INPUT: &str = "EPOXY_PREP_INPUT";
pub const ENV_OUTPUT: &str = "EPOXY_PREP_OUTPUT";

/// Pipeline configuration.
///
/// # Example
///
/// ```yaml
/// root: /srv/epoxy
/// input_path: data/all_epoxy_data.csv
/// output_path: data/preprocessed_data.csv
/// directories: [data, results]
/// encode_categories: false
/// report_path: results/preprocess_report.json
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base directory for relative paths
    pub root: PathBuf,

    /// Raw CSV table
    pub input_path: PathBuf,

    /// Processed CSV table
    pub output_path: PathBuf,

    /// Directories created before the run
    pub directories: Vec<PathBuf>,

    /// One-hot encode filler type and accelerator instead of dropping them
    pub encode_categories: bool,

    /// Optional JSON run report
    pub report_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            input_path: PathBuf::from("data/all_epoxy_data.csv"),
            output_path: PathBuf::from("data/preprocessed_data.csv"),
            directories: vec![PathBuf::from("data"), PathBuf::from("results")],
            encode_categories: false,
            report_path: None,
        }
    }
}

impl PipelineConfig {
    /// Default layout under `root`
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&contents)?;
        debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply `EPOXY_PREP_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_ROOT) {
            self.root = PathBuf::from(root);
        }
        if let Some(input) = lookup(ENV_INPUT) {
            self.input_path = PathBuf::from(input);
        }
        if let Some(output) = lookup(ENV_OUTPUT) {
            self.output_path = PathBuf::from(output);
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn input(&self) -> PathBuf {
        self.resolve(&self.input_path)
    }

    pub fn output(&self) -> PathBuf {
        self.resolve(&self.output_path)
    }

    pub fn report(&self) -> Option<PathBuf> {
        self.report_path.as_deref().map(|p| self.resolve(p))
    }

    /// Create every configured directory. Existing directories are fine.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in &self.directories {
            let dir = self.resolve(dir);
            fs::create_dir_all(&dir)?;
            debug!(path = %dir.display(), "Ensured directory");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_resolve_against_root() {
        let config = PipelineConfig::with_root("/srv/epoxy");

        assert_eq!(config.input(), PathBuf::from("/srv/epoxy/data/all_epoxy_data.csv"));
        assert_eq!(config.output(), PathBuf::from("/srv/epoxy/data/preprocessed_data.csv"));
        assert_eq!(config.report(), None);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = PipelineConfig::from_yaml(
            "input_path: raw.csv\nencode_categories: true\nreport_path: results/report.json\n",
        )
        .unwrap();

        assert_eq!(config.input_path, PathBuf::from("raw.csv"));
        assert_eq!(config.output_path, PathBuf::from("data/preprocessed_data.csv"));
        assert!(config.encode_categories);
        assert_eq!(config.report(), Some(PathBuf::from("./results/report.json")));
    }

    #[test]
    fn test_from_yaml_rejects_bad_types() {
        let result = PipelineConfig::from_yaml("encode_categories: [1, 2]\n");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_absolute_paths_ignore_root() {
        let mut config = PipelineConfig::with_root("/srv/epoxy");
        config.output_path = PathBuf::from("/tmp/out.csv");
        assert_eq!(config.output(), PathBuf::from("/tmp/out.csv"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = HashMap::new();
        vars.insert(ENV_ROOT, "/data");
        vars.insert(ENV_OUTPUT, "features.csv");

        let mut config = PipelineConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.input_path, PathBuf::from("data/all_epoxy_data.csv"));
        assert_eq!(config.output(), PathBuf::from("/data/features.csv"));
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_root(temp_dir.path());

        config.ensure_directories().unwrap();
        config.ensure_directories().unwrap();

        assert!(temp_dir.path().join("data").is_dir());
        assert!(temp_dir.path().join("results").is_dir());
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = PipelineConfig::load_from_file("/nonexistent/epoxy-prep.yaml");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
