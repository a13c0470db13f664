//! Label distribution.
//!
//! Labels are opaque strings; the `area/` and `kind/` prefixes are a
//! naming convention interpreted only here.

use crate::context::AnalysisContext;
use crate::models::Issue;
use crate::report::charts::{bar_chart, pie_chart, ranked_bars};
use crate::report::{FeatureReport, SectionBody};
use std::collections::BTreeMap;
use tracing::info;

pub const TITLE: &str = "Label Analysis Report";

pub const AREA_PREFIX: &str = "area/";
pub const KIND_PREFIX: &str = "kind/";

/// The `<token>` part of every `kind/<token>` label, in order.
pub fn kind_tokens(labels: &[String]) -> impl Iterator<Item = &str> {
    labels.iter().filter_map(|l| l.strip_prefix(KIND_PREFIX))
}

fn count_with_prefix(issues: &[Issue], prefix: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for label in issues.iter().flat_map(|i| &i.labels) {
        if label.starts_with(prefix) {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Frequency of each full `area/...` label.
pub fn area_label_counts(issues: &[Issue]) -> BTreeMap<String, u64> {
    count_with_prefix(issues, AREA_PREFIX)
}

/// Frequency of each full `kind/...` label.
pub fn kind_label_counts(issues: &[Issue]) -> BTreeMap<String, u64> {
    count_with_prefix(issues, KIND_PREFIX)
}

/// Frequency of the text before the first `/`. Labels without `/` are ignored.
pub fn label_prefix_breakdown(issues: &[Issue]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for label in issues.iter().flat_map(|i| &i.labels) {
        if let Some((prefix, _)) = label.split_once('/') {
            *counts.entry(prefix.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn analyze(ctx: &AnalysisContext) -> FeatureReport {
    let issues = ctx.issues();
    let area = area_label_counts(issues);
    let kind = kind_label_counts(issues);
    let prefixes = label_prefix_breakdown(issues);

    info!(
        "{} area labels, {} kind labels, {} prefixes",
        area.len(),
        kind.len(),
        prefixes.len()
    );

    let mut report = FeatureReport::new(TITLE);
    report.section("Area Label Counts", SectionBody::Counts(area));
    report.section("Kind Label Counts", SectionBody::Counts(kind.clone()));
    report.section("Label Prefix Breakdown", SectionBody::Counts(prefixes.clone()));

    if kind.is_empty() {
        info!("No kind labels, skipping kind distribution chart");
    } else {
        report.charts.push(pie_chart("Kind Label Distribution", &kind));
    }

    if prefixes.is_empty() {
        info!("No prefixed labels, skipping prefix chart");
    } else {
        report.charts.push(bar_chart(
            "Label Prefix Breakdown",
            "Prefix",
            "Number of Labels",
            &ranked_bars(&prefixes),
        ));
    }

    report
}
