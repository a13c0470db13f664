//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and the mapping of filter flags onto an
//! [`IssueFilter`].

use crate::analysis::{content, contributors, labels, timing};
use crate::data::IssueFilter;
use crate::models::State;
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// IssueLens - analytics for issue-tracker exports
///
/// Summarizes contributor activity, response and resolution latency,
/// label distribution and issue text from a JSON export of issues.
/// Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   issuelens --input issues.json
///   issuelens --feature response --state closed
///   issuelens -f 1 --contributor alice --format json
///   issuelens --start-date 2024-01-01 --end-date 2024-03-31 --label kind/bug
///   issuelens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analysis to run
    ///
    /// Numeric aliases 1-5 follow the order listed.
    #[arg(short, long, default_value = "all", value_name = "FEATURE")]
    pub feature: Feature,

    /// Issue export to analyze (JSON array of issue records)
    ///
    /// Defaults to the [data] path in the config file, then issues.json.
    #[arg(short, long, value_name = "FILE", env = "ISSUELENS_DATA")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, the report is written to the output directory
    /// under a name derived from the feature.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for reports written under their default name
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .issuelens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Only analyze issues created on or after this date
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Only analyze issues created on or before this date
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Only analyze issues carrying this exact label
    #[arg(short, long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Only analyze issues in this state
    #[arg(long, value_name = "STATE")]
    pub state: Option<StateArg>,

    /// Report the activity summary of one contributor (case-insensitive)
    #[arg(long, value_name = "LOGIN")]
    pub contributor: Option<String>,

    /// Number of keywords in the content analysis
    #[arg(long, value_name = "COUNT")]
    pub top_keywords: Option<usize>,

    /// Abort on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Disable the progress bar while loading
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .issuelens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// The analyses this tool can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Feature {
    /// Contributor activity
    #[value(alias = "1")]
    Contributors,
    /// Response and resolution times
    #[value(alias = "2")]
    Response,
    /// Keywords, error messages and sentiment
    #[value(alias = "3")]
    Content,
    /// Label distribution
    #[value(alias = "4")]
    Labels,
    /// All of the above in one combined report
    #[value(alias = "5")]
    All,
}

impl Feature {
    /// The single features, in the order `All` runs them.
    pub fn individual() -> &'static [Feature] {
        &[
            Feature::Contributors,
            Feature::Response,
            Feature::Content,
            Feature::Labels,
        ]
    }

    /// Title of the report this feature produces.
    pub fn title(&self) -> &'static str {
        match self {
            Feature::Contributors => contributors::TITLE,
            Feature::Response => timing::TITLE,
            Feature::Content => content::TITLE,
            Feature::Labels => labels::TITLE,
            Feature::All => "Combined Project Analysis Report",
        }
    }

    /// Default report file name, without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Feature::Contributors => "contributor_activity_report",
            Feature::Response => "response_resolution_report",
            Feature::Content => "content_text_analysis_report",
            Feature::Labels => "label_analysis_report",
            Feature::All => "combined_analysis_report",
        }
    }

    pub fn running_message(&self) -> &'static str {
        match self {
            Feature::Contributors => "Running contributor activity analysis",
            Feature::Response => "Running response and resolution time analysis",
            Feature::Content => "Running content and text analysis",
            Feature::Labels => "Running label analysis",
            Feature::All => "Running all analyses",
        }
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

/// Issue state accepted by --state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StateArg {
    Open,
    Closed,
}

impl From<StateArg> for State {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Open => State::Open,
            StateArg::Closed => State::Closed,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD format", s))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(format!("Start date {} is after end date {}", start, end));
            }
        }

        if self.top_keywords == Some(0) {
            return Err("Top keywords must be at least 1".to_string());
        }

        if let Some(ref label) = self.label {
            if label.trim().is_empty() {
                return Err("Label filter cannot be empty".to_string());
            }
        }

        let runs_contributors = matches!(self.feature, Feature::Contributors | Feature::All);
        if self.contributor.is_some() && !runs_contributors {
            return Err("--contributor requires the contributors or all feature".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings. `--quiet` wins
    /// over a config file that asks for verbose output.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The issue filter described by the filter flags.
    pub fn issue_filter(&self) -> IssueFilter {
        IssueFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            label: self.label.clone(),
            state: self.state.map(State::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    fn make_args() -> Args {
        Args {
            feature: Feature::All,
            input: Some(PathBuf::from("issues.json")),
            output: None,
            output_dir: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            start_date: None,
            end_date: None,
            label: None,
            state: None,
            contributor: None,
            top_keywords: None,
            strict: false,
            no_progress: false,
            init_config: false,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "issuelens",
            "-f",
            "2",
            "--input",
            "data.json",
            "--state",
            "closed",
            "--start-date",
            "2024-01-01",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.feature, Feature::Response);
        assert_eq!(args.input, Some(PathBuf::from("data.json")));
        assert_eq!(args.state, Some(StateArg::Closed));
        assert_eq!(args.start_date, Some(date("2024-01-01")));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_feature_aliases() {
        let names = ["1", "2", "3", "4", "5"];
        let parsed: Vec<Feature> = names
            .iter()
            .map(|n| Feature::from_str(n, true).unwrap())
            .collect();
        assert_eq!(
            parsed,
            vec![
                Feature::Contributors,
                Feature::Response,
                Feature::Content,
                Feature::Labels,
                Feature::All
            ]
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let result = Args::try_parse_from(["issuelens", "--start-date", "01/02/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_date_order() {
        let mut args = make_args();
        args.start_date = Some(date("2024-02-01"));
        args.end_date = Some(date("2024-01-01"));
        assert!(args.validate().is_err());

        args.end_date = Some(date("2024-02-01"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_contributor_needs_feature() {
        let mut args = make_args();
        args.contributor = Some("alice".to_string());
        assert!(args.validate().is_ok());

        args.feature = Feature::Labels;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_issue_filter() {
        let mut args = make_args();
        assert!(args.issue_filter().is_empty());

        args.label = Some("kind/bug".to_string());
        args.state = Some(StateArg::Open);
        let filter = args.issue_filter();
        assert_eq!(filter.label.as_deref(), Some("kind/bug"));
        assert_eq!(filter.state, Some(State::Open));
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(Feature::All.file_stem(), "combined_analysis_report");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(Feature::All.title(), "Combined Project Analysis Report");
    }
}
