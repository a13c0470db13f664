//! Markdown and JSON report generation.
//!
//! This module renders a [`Report`] as a Markdown document (tables for
//! mappings, numbered lists for rankings, text bars for chart data) or
//! as pretty-printed JSON.

use super::{Chart, ChartKind, FeatureReport, Report, ReportMetadata, SectionBody};
use crate::config::ReportConfig;
use crate::models::IssueNumber;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Longest error line kept in a report, in characters.
pub const MAX_LINE_CHARS: usize = 400;

const TRUNCATION_MARKER: &str = "… [truncated]";
const BAR_CHAR: char = '█';

/// Generate a complete Markdown report.
///
/// A single feature gets its sections at `##`; a combined report nests
/// each feature's sections one level deeper.
pub fn generate_markdown_report(report: &Report, settings: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", report.metadata.title));

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Table of contents
    output.push_str(&generate_table_of_contents(report, settings));

    let combined = report.features.len() > 1;
    let mut chart_headings = 0;
    for feature in &report.features {
        if combined {
            output.push_str(&format!("## {}\n\n", feature.title));
            output.push_str(&generate_feature_body(feature, 3, settings));
        } else {
            output.push_str(&generate_feature_body(feature, 2, settings));
        }
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Issues Analyzed:** {} of {}\n",
        metadata.issues_analyzed, metadata.issues_loaded
    ));
    if metadata.records_rejected > 0 {
        section.push_str(&format!(
            "- **Records Rejected:** {}\n",
            metadata.records_rejected
        ));
    }
    if !metadata.filters.is_empty() {
        section.push_str(&format!("- **Filters:** {}\n", metadata.filters.join(", ")));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report, settings: &ReportConfig) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");

    let combined = report.features.len() > 1;
    let mut chart_headings = 0;
    for feature in &report.features {
        let indent = if combined {
            toc.push_str(&format!("- [{}](#{})\n", feature.title, anchor(&feature.title)));
            "  "
        } else {
            ""
        };

        for section in &feature.sections {
            toc.push_str(&format!(
                "{}- [{}](#{})\n",
                indent,
                section.heading,
                anchor(&section.heading)
            ));
        }
        if settings.include_charts && !feature.charts.is_empty() {
            toc.push_str(&format!(
                "{}- [Charts](#{})\n",
                indent,
                charts_anchor(chart_headings)
            ));
            chart_headings += 1;
        }
    }

    toc.push('\n');

    toc
}

fn generate_feature_body(feature: &FeatureReport, level: usize, settings: &ReportConfig) -> String {
    let hashes = "#".repeat(level);
    let mut body = String::new();

    for section in &feature.sections {
        body.push_str(&format!("{} {}\n\n", hashes, section.heading));
        body.push_str(&generate_section_body(&section.body));
    }

    if settings.include_charts && !feature.charts.is_empty() {
        body.push_str(&format!("{} Charts\n\n", hashes));
        for chart in &feature.charts {
            body.push_str(&format!("{}# {}\n\n", hashes, chart.title));
            body.push_str(&generate_chart(chart, settings.bar_width));
        }
    }

    body
}

/// Render the data of one section.
fn generate_section_body(body: &SectionBody) -> String {
    match body {
        SectionBody::Counts(counts) => counts_table("Name", "Count", counts),
        SectionBody::Nested(nested) => nested_table(nested),
        SectionBody::Hours(hours) => hours_table(hours),
        SectionBody::Ranked(entries) => ranked_list(entries),
        SectionBody::Summary(stats) => {
            let mut table = String::from("| Metric | Value |\n|:---|---:|\n");
            for (key, value) in stats.entries() {
                table.push_str(&format!("| {} | {} |\n", key, value));
            }
            table.push('\n');
            table
        }
        SectionBody::Sentiment(summary) => {
            let mut table = String::from("| Sentiment | Issues |\n|:---|---:|\n");
            for (category, count) in summary.entries() {
                table.push_str(&format!("| {} | {} |\n", category, count));
            }
            table.push('\n');
            table
        }
        SectionBody::Contributor { login, summary } => {
            let mut block = format!(
                "**{}** has {} active issue(s).\n\n",
                escape_cell(login),
                summary.active_issues
            );
            block.push_str(&counts_table("Kind", "Issues", &summary.issue_type_distribution));
            block
        }
        SectionBody::Issues(numbers) => issue_list(numbers),
        SectionBody::Notes(notes) => {
            let mut list = String::new();
            for note in notes {
                list.push_str(&format!("- {}\n", note));
            }
            list.push('\n');
            list
        }
    }
}

fn counts_table(key_header: &str, value_header: &str, counts: &BTreeMap<String, u64>) -> String {
    if counts.is_empty() {
        return "_No data available._\n\n".to_string();
    }

    let mut table = format!("| {} | {} |\n|:---|---:|\n", key_header, value_header);
    for (key, count) in counts {
        table.push_str(&format!("| {} | {} |\n", escape_cell(key), count));
    }
    table.push('\n');
    table
}

fn nested_table(nested: &BTreeMap<String, BTreeMap<String, u64>>) -> String {
    if nested.is_empty() {
        return "_No data available._\n\n".to_string();
    }

    let mut table = String::from("| Name | Category | Count |\n|:---|:---|---:|\n");
    for (outer, inner) in nested {
        for (key, count) in inner {
            table.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(outer),
                escape_cell(key),
                count
            ));
        }
    }
    table.push('\n');
    table
}

fn hours_table(hours: &BTreeMap<IssueNumber, f64>) -> String {
    if hours.is_empty() {
        return "_No data available._\n\n".to_string();
    }

    let mut table = String::from("| Issue | Hours |\n|:---|---:|\n");
    for (number, value) in hours {
        table.push_str(&format!("| #{} | {:.2} |\n", number, value));
    }
    table.push('\n');
    table
}

fn ranked_list(entries: &[(String, u64)]) -> String {
    if entries.is_empty() {
        return "_No data available._\n\n".to_string();
    }

    let mut list = String::new();
    for (i, (value, count)) in entries.iter().enumerate() {
        list.push_str(&format!(
            "{}. `{}` (Count: {})\n",
            i + 1,
            sanitize_line(value).replace('`', "'"),
            count
        ));
    }
    list.push('\n');
    list
}

fn issue_list(numbers: &[IssueNumber]) -> String {
    if numbers.is_empty() {
        return "_None._\n\n".to_string();
    }

    let items: Vec<String> = numbers.iter().map(|n| format!("#{}", n)).collect();
    format!("{}\n\n", items.join(", "))
}

/// Render chart data as a table with text bars.
fn generate_chart(chart: &Chart, bar_width: usize) -> String {
    let mut out = String::new();

    match chart.kind {
        ChartKind::Scatter => {
            let _ = writeln!(out, "| Issue | {} | {} |", chart.x_label, chart.y_label);
            out.push_str("|:---|---:|---:|\n");
            for point in &chart.points {
                let _ = writeln!(
                    out,
                    "| #{} | {:.2} | {:.2} |",
                    point.label,
                    point.value,
                    point.y.unwrap_or(0.0)
                );
            }
        }
        ChartKind::StackedBar => {
            // One row per bar, segments listed in key order.
            let mut bars: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
            for point in &chart.points {
                bars.entry(point.label.as_str())
                    .or_default()
                    .push((point.group.as_deref().unwrap_or(""), point.value));
            }
            let max = bars
                .values()
                .map(|segments| segments.iter().map(|(_, v)| v).sum::<f64>())
                .fold(0.0, f64::max);

            let _ = writeln!(out, "| {} | Breakdown | Total | |", chart.y_label);
            out.push_str("|:---|:---|---:|:---|\n");
            for (label, segments) in &bars {
                let total: f64 = segments.iter().map(|(_, v)| v).sum();
                let breakdown: Vec<String> = segments
                    .iter()
                    .map(|(group, value)| format!("{}: {}", escape_cell(group), value))
                    .collect();
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    escape_cell(label),
                    breakdown.join(", "),
                    total,
                    text_bar(total, max, bar_width)
                );
            }
        }
        _ => {
            let max = chart.points.iter().map(|p| p.value).fold(0.0, f64::max);
            let total: f64 = chart.points.iter().map(|p| p.value).sum();
            let label_header = if chart.x_label.is_empty() {
                "Label"
            } else {
                chart.x_label.as_str()
            };

            let _ = writeln!(out, "| {} | Value | |", label_header);
            out.push_str("|:---|---:|:---|\n");
            for point in &chart.points {
                let value = if chart.kind == ChartKind::Pie && total > 0.0 {
                    format!("{} ({:.1}%)", point.value, point.value / total * 100.0)
                } else {
                    point.value.to_string()
                };
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    escape_cell(&point.label),
                    value,
                    text_bar(point.value, max, bar_width)
                );
            }
        }
    }

    out.push('\n');
    out
}

/// A bar of `width` characters for `max`, scaled down for `value`.
fn text_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * width as f64).round().max(1.0) as usize;
    BAR_CHAR.to_string().repeat(len)
}

/// Make an arbitrary line safe to print: non-printable or non-ASCII
/// characters become `?`, whitespace runs collapse to one space, and the
/// result is cut at [`MAX_LINE_CHARS`].
pub fn sanitize_line(text: &str) -> String {
    let printable: String = text
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect();
    let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_LINE_CHARS {
        let cut: String = collapsed.chars().take(MAX_LINE_CHARS).collect();
        format!("{}{}", cut, TRUNCATION_MARKER)
    } else {
        collapsed
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// GitHub-style heading anchor.
/// Repeated "Charts" headings get GitHub's `-1`, `-2`, ... suffixes.
fn charts_anchor(index: usize) -> String {
    match index {
        0 => "charts".to_string(),
        n => format!("charts-{}", n),
    }
}

fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by issuelens v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content, creating the parent directory if needed.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
