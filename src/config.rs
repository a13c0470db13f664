//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.issuelens.toml` files.

use crate::cli::OutputFormat;
use crate::report::charts::DEFAULT_HISTOGRAM_EDGES;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".issuelens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory for reports written under their default name.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Issue export to analyze.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Abort on the first malformed record instead of skipping it.
    #[serde(default)]
    pub strict: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            strict: false,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("issues.json")
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of keywords reported by the content analysis.
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Number of distinct error lines reported.
    #[serde(default = "default_error_messages")]
    pub error_messages: usize,

    /// Response-time histogram bucket edges, in hours.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: Vec<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_keywords: default_top_keywords(),
            error_messages: default_error_messages(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

fn default_top_keywords() -> usize {
    20
}

fn default_error_messages() -> usize {
    10
}

fn default_histogram_bins() -> Vec<f64> {
    DEFAULT_HISTOGRAM_EDGES.to_vec()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Render chart data as text bars.
    #[serde(default = "default_true")]
    pub include_charts: bool,

    /// Width of the longest text bar, in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_charts: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bar_width() -> usize {
    40
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let bins = &self.analysis.histogram_bins;
        if bins.len() < 2 {
            bail!("histogram_bins needs at least two edges");
        }
        if bins.windows(2).any(|w| w[0] >= w[1]) {
            bail!("histogram_bins must be strictly increasing");
        }
        if self.analysis.top_keywords == 0 {
            bail!("top_keywords must be at least 1");
        }
        if self.report.bar_width == 0 {
            bail!("bar_width must be at least 1");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.data.path = input.clone();
        }
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(top_keywords) = args.top_keywords {
            self.analysis.top_keywords = top_keywords;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.strict {
            self.data.strict = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("issues.json"));
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert_eq!(config.analysis.top_keywords, 20);
        assert_eq!(config.analysis.histogram_bins.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "reports"
format = "json"
verbose = true

[data]
path = "export/issues.json"
strict = true

[analysis]
top_keywords = 5
histogram_bins = [0.5, 2, 8]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("reports"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.verbose);
        assert_eq!(config.data.path, PathBuf::from("export/issues.json"));
        assert!(config.data.strict);
        assert_eq!(config.analysis.top_keywords, 5);
        assert_eq!(config.analysis.error_messages, 10);
        assert_eq!(config.analysis.histogram_bins, vec![0.5, 2.0, 8.0]);
        assert!(config.report.include_charts);
    }

    #[test]
    fn test_verbose_from_file_raises_log_level() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nverbose = true").unwrap();

        let mut config = Config::load(file.path()).unwrap();
        let args = crate::cli::Args::try_parse_from(["issuelens", "-i", "x.json"]).unwrap();
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let quiet = crate::cli::Args::try_parse_from(["issuelens", "-i", "x.json", "-q"]).unwrap();
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_invalid_histogram_bins() {
        let mut config = Config::default();
        config.analysis.histogram_bins = vec![1.0, 1.0, 2.0];
        assert!(config.validate().is_err());

        config.analysis.histogram_bins = vec![1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nhistogram_bins = [5, 1]").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_merge_with_args() {
        let args = crate::cli::Args::try_parse_from([
            "issuelens",
            "--input",
            "other.json",
            "--format",
            "json",
            "--top-keywords",
            "3",
            "--strict",
        ])
        .unwrap();

        let mut config = Config::default();
        config.general.output_dir = PathBuf::from("reports");
        config.merge_with_args(&args);

        assert_eq!(config.data.path, PathBuf::from("other.json"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.analysis.top_keywords, 3);
        assert!(config.data.strict);
        // Not given on the command line, so the file value stays.
        assert_eq!(config.general.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[analysis]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.analysis.histogram_bins, default_histogram_bins());
    }
}
