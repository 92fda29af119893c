//! Run configuration of the report runner.
//!
//! Configuration comes from an optional YAML file; command line flags are
//! applied on top by the binary.
//!
//! ```yaml
//! resources_dir: resources
//! output_dir: out
//! number_format:
//!   currency_symbol: "$"
//!   grouping_separator: ","
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use crate::numfmt::NumberFormat;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_saphyr::Error,
    },
}

/// Where reports read their inputs and write their documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root holding the `data/`, `docs/` and `images/` directories
    pub resources_dir: PathBuf,
    pub output_dir: PathBuf,
    pub number_format: NumberFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            output_dir: PathBuf::from("."),
            number_format: NumberFormat::default(),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file. Keys it leaves out keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(text: &str) -> Result<Self, serde_saphyr::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(text)
    }

    pub fn with_resources_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.resources_dir = dir.into();
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.resources_dir.join("data").join(name)
    }

    pub fn doc_file(&self, name: &str) -> PathBuf {
        self.resources_dir.join("docs").join(name)
    }

    pub fn image_file(&self, name: &str) -> PathBuf {
        self.resources_dir.join("images").join(name)
    }

    /// `result.<extension>` inside the output directory.
    pub fn output_file(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!("result.{}", extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.resources_dir, PathBuf::from("resources"));
        assert_eq!(config.output_file("docx"), PathBuf::from("./result.docx"));
        assert_eq!(
            config.data_file("ims_response.json"),
            PathBuf::from("resources/data/ims_response.json")
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RunConfig::from_yaml("output_dir: out\nnumber_format:\n  currency_symbol: \"EUR \"\n").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.resources_dir, PathBuf::from("resources"));
        assert_eq!(config.number_format.currency_symbol, "EUR ");
        assert_eq!(config.number_format.grouping_separator, ",");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docforge.yaml");
        std::fs::write(&path, "output_dir: [1, 2\n").unwrap();
        match RunConfig::load(&path) {
            Err(err @ ConfigError::Parse { .. }) => {
                let source = std::error::Error::source(&err).expect("parse error keeps its cause");
                assert!(source.is::<serde_saphyr::Error>());
                assert!(err.to_string().ends_with(&source.to_string()));
                let ConfigError::Parse { path: reported, .. } = err else { unreachable!() };
                assert_eq!(reported, path);
            },
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            RunConfig::load(dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), RunConfig::default());
    }
}
