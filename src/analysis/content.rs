//! Free-text content analysis.
//!
//! Keyword frequency, recurring error lines and a sentiment breakdown
//! over issue bodies.

use super::sentiment::{classify, PolarityScorer, Sentiment};
use crate::context::AnalysisContext;
use crate::models::Issue;
use crate::report::charts::{bar_chart, word_cloud};
use crate::report::{FeatureReport, SectionBody};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::info;

pub const TITLE: &str = "Content & Text Analysis Report";

/// Substrings that mark a line as an error line. "failure" is not one of them.
const ERROR_MARKERS: &[&str] = &["error", "exception"];

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("valid word regex"))
}

/// Issues per sentiment category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentSummary {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentSummary {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn entries(&self) -> [(String, u64); 3] {
        [
            (Sentiment::Positive.to_string(), self.positive),
            (Sentiment::Neutral.to_string(), self.neutral),
            (Sentiment::Negative.to_string(), self.negative),
        ]
    }

    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }
}

/// Rank keys by descending count, ties in first-seen order.
fn most_common(counts: HashMap<String, (u64, usize)>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(key, (count, first_seen))| (key, count, first_seen))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries
        .into_iter()
        .take(limit)
        .map(|(key, count, _)| (key, count))
        .collect()
}

fn tally(counts: &mut HashMap<String, (u64, usize)>, key: &str) {
    let next = counts.len();
    counts.entry(key.to_string()).or_insert((0, next)).0 += 1;
}

/// The `n` most frequent words (three or more ASCII letters, lowercased).
pub fn top_keywords(issues: &[Issue], n: usize) -> Vec<(String, u64)> {
    let mut counts = HashMap::new();

    for issue in issues {
        let body = issue.body().to_lowercase();
        for word in word_regex().find_iter(&body) {
            tally(&mut counts, word.as_str());
        }
    }

    most_common(counts, n)
}

/// Whether a line reads like an error message.
pub fn is_error_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    ERROR_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Split on every line boundary, including a bare `\r` and the Unicode
/// separators. `\r\n` leaves an empty piece between the two breaks.
fn body_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
}

/// The `limit` most frequent trimmed error lines across all bodies.
pub fn common_error_messages(issues: &[Issue], limit: usize) -> Vec<(String, u64)> {
    let mut counts = HashMap::new();

    for issue in issues {
        for line in body_lines(issue.body()).filter(|l| is_error_line(l)) {
            tally(&mut counts, line.trim());
        }
    }

    most_common(counts, limit)
}

/// Classify every issue body. Missing bodies are scored as empty text.
pub fn sentiment_summary(issues: &[Issue], scorer: &dyn PolarityScorer) -> SentimentSummary {
    let mut summary = SentimentSummary::default();
    for issue in issues {
        summary.record(classify(scorer, issue.body()));
    }
    summary
}

pub fn analyze(ctx: &AnalysisContext, scorer: &dyn PolarityScorer) -> FeatureReport {
    let issues = ctx.issues();
    let settings = &ctx.config().analysis;

    let keywords = top_keywords(issues, settings.top_keywords);
    let errors = common_error_messages(issues, settings.error_messages);
    let sentiment = sentiment_summary(issues, scorer);

    info!(
        "Sentiment: {} positive, {} neutral, {} negative",
        sentiment.positive, sentiment.neutral, sentiment.negative
    );

    let mut report = FeatureReport::new(TITLE);
    report.section("Top Keywords", SectionBody::Ranked(keywords.clone()));
    report.section("Common Errors", SectionBody::Ranked(errors));
    report.section("Sentiment Summary", SectionBody::Sentiment(sentiment));

    if sentiment.total() == 0 {
        info!("No issues to classify, skipping sentiment chart");
    } else {
        report.charts.push(bar_chart(
            "Sentiment Distribution",
            "Sentiment",
            "Number of Issues",
            &sentiment.entries(),
        ));
    }

    if keywords.is_empty() {
        info!("No keywords found, skipping word cloud");
    } else {
        report.charts.push(word_cloud("Top Keywords", &keywords));
    }

    report
}
