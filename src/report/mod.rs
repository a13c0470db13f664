//! Report assembly.
//!
//! Analyzers return [`FeatureReport`]s made of typed sections and chart
//! data. This module wraps them with run metadata and renders the result
//! as Markdown or JSON.

pub mod charts;
pub mod generator;

pub use charts::{Chart, ChartKind};
pub use generator::{generate_json_report, generate_markdown_report, write_report};

use crate::analysis::contributors::ContributorSummary;
use crate::analysis::content::SentimentSummary;
use crate::analysis::stats::SummaryStats;
use crate::context::AnalysisContext;
use crate::models::IssueNumber;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub title: String,
    /// Path of the issue export that was analyzed.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Issues left after filtering.
    pub issues_analyzed: usize,
    /// Issues constructed from the input, before filtering.
    pub issues_loaded: usize,
    pub records_rejected: usize,
    pub filters: Vec<String>,
    pub duration_seconds: f64,
}

impl ReportMetadata {
    pub fn from_context(ctx: &AnalysisContext, title: &str, duration_seconds: f64) -> Self {
        Self {
            title: title.to_string(),
            source: ctx.source().display().to_string(),
            generated_at: Utc::now(),
            issues_analyzed: ctx.issues().len(),
            issues_loaded: ctx.loaded_count(),
            records_rejected: ctx.rejected().len(),
            filters: ctx.filter().describe(),
            duration_seconds,
        }
    }
}

/// A complete report: one or more feature reports plus metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub features: Vec<FeatureReport>,
}

/// Output of a single analysis feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub charts: Vec<Chart>,
}

impl FeatureReport {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: Vec::new(),
            charts: Vec::new(),
        }
    }

    pub fn section(&mut self, heading: &str, body: SectionBody) {
        self.sections.push(ReportSection {
            heading: heading.to_string(),
            body,
        });
    }

    /// Look up a section by heading.
    pub fn find(&self, heading: &str) -> Option<&SectionBody> {
        self.sections
            .iter()
            .find(|s| s.heading == heading)
            .map(|s| &s.body)
    }
}

/// A named block of report data.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub body: SectionBody,
}

/// The aggregated data carried by a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SectionBody {
    /// Key to count.
    Counts(BTreeMap<String, u64>),
    /// Outer key to inner key to count.
    Nested(BTreeMap<String, BTreeMap<String, u64>>),
    /// Issue number to hours.
    Hours(BTreeMap<IssueNumber, f64>),
    /// Ordered (value, count) pairs, most frequent first.
    Ranked(Vec<(String, u64)>),
    Summary(SummaryStats),
    Sentiment(SentimentSummary),
    Contributor {
        login: String,
        summary: ContributorSummary,
    },
    /// A list of issues, e.g. those whose metric is unavailable.
    Issues(Vec<IssueNumber>),
    Notes(Vec<String>),
}
