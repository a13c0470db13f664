//! Issue corpus loading.
//!
//! This module reads a JSON export of issue records and turns it into
//! typed [`Issue`] values, keeping track of records that could not be
//! constructed so they can be reported instead of silently dropped.

pub mod filter;

pub use filter::IssueFilter;

use crate::models::Issue;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options controlling how a corpus is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Abort on the first malformed record instead of skipping it.
    pub strict: bool,
    /// Show a progress bar while constructing records.
    pub show_progress: bool,
}

/// A raw record that failed construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Zero-based position in the input array.
    pub index: usize,
    pub reason: String,
}

/// The issues constructed from one input file.
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    pub issues: Vec<Issue>,
    pub rejected: Vec<RejectedRecord>,
}

impl LoadedCorpus {
    /// Number of records in the input, accepted or not.
    pub fn record_count(&self) -> usize {
        self.issues.len() + self.rejected.len()
    }
}

/// Load an issue corpus from a JSON file.
pub fn load_corpus(path: &Path, options: &LoadOptions) -> Result<LoadedCorpus> {
    info!("Loading issues from: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read issue file: {}", path.display()))?;

    let corpus = parse_corpus(&content, options)
        .with_context(|| format!("Failed to load issues from {}", path.display()))?;

    info!(
        "Loaded {} issues ({} rejected)",
        corpus.issues.len(),
        corpus.rejected.len()
    );

    Ok(corpus)
}

/// Build a corpus from the text of a JSON export (a top-level array).
pub fn parse_corpus(content: &str, options: &LoadOptions) -> Result<LoadedCorpus> {
    let document: Value = serde_json::from_str(content).context("Issue file is not valid JSON")?;

    let Value::Array(records) = document else {
        bail!("Expected a JSON array of issue records");
    };

    debug!("Constructing {} records", records.len());

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records")
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let mut corpus = LoadedCorpus::default();

    for (index, record) in records.iter().enumerate() {
        match Issue::from_value(record) {
            Ok(issue) => corpus.issues.push(issue),
            Err(e) if options.strict => {
                if let Some(ref pb) = progress_bar {
                    pb.abandon();
                }
                bail!("Record {} is malformed: {}", index, e);
            }
            Err(e) => {
                warn!("Skipping record {}: {}", index, e);
                corpus.rejected.push(RejectedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(corpus)
}
