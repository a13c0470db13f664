//! Response and resolution latency.
//!
//! Response time is the delay between an issue's creation and its first
//! comment; resolution time is the delay between creation and the last
//! update of a closed issue. Both are reported in fractional hours.

use super::stats::summarize;
use crate::context::AnalysisContext;
use crate::models::{Issue, IssueNumber, State};
use crate::report::charts::{histogram, histogram_chart, scatter_chart, scatter_pairs};
use crate::report::{FeatureReport, SectionBody};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const TITLE: &str = "Response & Resolution Analysis Report";

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Signed hours from `start` to `end`.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_HOUR,
        // Only reachable for spans of hundreds of thousands of years.
        None => delta.num_seconds() as f64 / 3600.0,
    }
}

/// Hours from creation to the earliest comment, per issue.
///
/// Issues without a creation date, without events or without a dated
/// comment event have no entry. Events with no type are skipped.
pub fn first_response_times(issues: &[Issue]) -> BTreeMap<IssueNumber, f64> {
    let mut times = BTreeMap::new();

    for issue in issues {
        let Some(created) = issue.created_date else {
            continue;
        };
        if issue.events.is_empty() {
            continue;
        }

        let first_comment = issue
            .events
            .iter()
            .filter(|event| {
                if event.event_type.is_none() {
                    debug!("Issue {}: skipping event without a type", issue.number);
                }
                event.is_comment()
            })
            .filter_map(|event| event.event_date)
            .min();

        if let Some(date) = first_comment {
            insert_hours(&mut times, issue.number, hours_between(created, date));
        }
    }

    times
}

/// Resolution hours for closed issues, plus the closed issues whose
/// resolution time cannot be computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionTimes {
    pub hours: BTreeMap<IssueNumber, f64>,
    /// Closed issues missing a creation or update date.
    pub unavailable: Vec<IssueNumber>,
}

pub fn resolution_times(issues: &[Issue]) -> ResolutionTimes {
    let mut result = ResolutionTimes::default();

    for issue in issues.iter().filter(|i| i.state == State::Closed) {
        match (issue.created_date, issue.updated_date) {
            (Some(created), Some(updated)) => {
                insert_hours(&mut result.hours, issue.number, hours_between(created, updated));
            }
            _ => {
                debug!("Issue {}: resolution time unavailable", issue.number);
                result.unavailable.push(issue.number);
            }
        }
    }

    result
}

fn insert_hours(map: &mut BTreeMap<IssueNumber, f64>, number: IssueNumber, hours: f64) {
    if let Some(previous) = map.insert(number, hours) {
        debug!(
            "Issue number {} seen more than once, replacing {:.2}h with {:.2}h",
            number, previous, hours
        );
    }
}

/// Build the response and resolution feature report.
pub fn analyze(ctx: &AnalysisContext) -> FeatureReport {
    let issues = ctx.issues();
    let response = first_response_times(issues);
    let resolution = resolution_times(issues);

    info!(
        "Response times for {} issues, resolution times for {} ({} unavailable)",
        response.len(),
        resolution.hours.len(),
        resolution.unavailable.len()
    );

    let mut report = FeatureReport::new(TITLE);
    report.section("Response Times (hrs)", SectionBody::Hours(response.clone()));
    report.section(
        "Response Time Statistics",
        SectionBody::Summary(summarize(response.values())),
    );
    report.section(
        "Resolution Times (hrs)",
        SectionBody::Hours(resolution.hours.clone()),
    );
    report.section(
        "Resolution Time Statistics",
        SectionBody::Summary(summarize(resolution.hours.values())),
    );
    report.section(
        "Resolution Time Unavailable",
        SectionBody::Issues(resolution.unavailable.clone()),
    );

    if response.is_empty() {
        info!("No response times, skipping response charts");
    } else {
        let bins = histogram(
            response.values().copied(),
            &ctx.config().analysis.histogram_bins,
        );
        report.charts.push(histogram_chart(
            "Distribution of First Response Times",
            "Response Time (hours)",
            &bins,
        ));
    }

    let pairs = scatter_pairs(&response, &resolution.hours);
    if pairs.is_empty() {
        info!("No issues with both response and resolution times, skipping scatter chart");
    } else {
        report.charts.push(scatter_chart(
            "Response Time vs Resolution Time",
            "Response Time (hours)",
            "Resolution Time (hours)",
            &pairs,
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::SummaryStats;
    use crate::analysis::test_support::{sample_context, sample_issues};
    use crate::report::ChartKind;
    use serde_json::json;

    fn issue(value: serde_json::Value) -> Issue {
        Issue::from_value(&value).unwrap()
    }

    #[test]
    fn test_earliest_comment_wins() {
        let issues = vec![issue(json!({
            "number": 1,
            "state": "open",
            "created_date": "2024-01-01T00:00:00Z",
            "events": [
                {"event_type": "commented", "event_date": "2024-01-01T05:00:00Z"},
                {"event_type": "commented", "event_date": "2024-01-01T02:00:00Z"}
            ]
        }))];

        let times = first_response_times(&issues);
        assert_eq!(times.get(&IssueNumber::Known(1)), Some(&2.0));
    }

    #[test]
    fn test_untyped_and_undated_events_are_skipped() {
        let issues = vec![
            issue(json!({
                "number": 1,
                "state": "open",
                "created_date": "2024-01-01T00:00:00Z",
                "events": [
                    {"event_date": "2024-01-01T00:30:00Z"},
                    {"event_type": "commented"},
                    {"event_type": "COMMENTED", "event_date": "2024-01-01T03:00:00Z"}
                ]
            })),
            issue(json!({
                "number": 2,
                "state": "open",
                "created_date": "2024-01-01T00:00:00Z",
                "events": [{"event_type": "labeled", "event_date": "2024-01-01T01:00:00Z"}]
            })),
            issue(json!({"number": 3, "state": "open", "events": [
                {"event_type": "commented", "event_date": "2024-01-01T01:00:00Z"}
            ]})),
        ];

        let times = first_response_times(&issues);
        assert_eq!(times.len(), 1);
        assert_eq!(times.get(&IssueNumber::Known(1)), Some(&3.0));
    }

    #[test]
    fn test_resolution_time_exact_hours() {
        let issues = vec![
            issue(json!({
                "number": 1,
                "state": "closed",
                "created_date": "2024-01-01T00:00:00Z",
                "updated_date": "2024-01-02T00:00:00Z"
            })),
            issue(json!({
                "number": 2,
                "state": "open",
                "created_date": "2024-01-01T00:00:00Z",
                "updated_date": "2024-01-02T00:00:00Z"
            })),
            issue(json!({
                "number": 3,
                "state": "CLOSED",
                "created_date": "2024-01-01T00:00:00Z",
                "updated_date": "2024-01-01T00:45:36Z"
            })),
        ];

        let result = resolution_times(&issues);
        assert_eq!(result.hours.get(&IssueNumber::Known(1)), Some(&24.0));
        assert!(!result.hours.contains_key(&IssueNumber::Known(2)));
        assert_eq!(result.hours.get(&IssueNumber::Known(3)), Some(&0.76));
        assert!(result.unavailable.is_empty());
    }

    #[test]
    fn test_closed_without_dates_is_unavailable() {
        let issues = vec![
            issue(json!({"number": 4, "state": "closed", "updated_date": "2024-01-02T00:00:00Z"})),
            issue(json!({"number": 5, "state": "closed", "created_date": "2024-01-02T00:00:00Z"})),
            issue(json!({"number": 6, "state": "open"})),
        ];

        let result = resolution_times(&issues);
        assert!(result.hours.is_empty());
        assert_eq!(
            result.unavailable,
            vec![IssueNumber::Known(4), IssueNumber::Known(5)]
        );
    }

    #[test]
    fn test_unknown_numbers_share_a_key() {
        let issues = vec![
            issue(json!({
                "number": "x",
                "state": "closed",
                "created_date": "2024-01-01T00:00:00Z",
                "updated_date": "2024-01-01T01:00:00Z"
            })),
            issue(json!({
                "state": "closed",
                "created_date": "2024-01-01T00:00:00Z",
                "updated_date": "2024-01-01T02:00:00Z"
            })),
        ];

        let result = resolution_times(&issues);
        assert_eq!(result.hours.len(), 1);
        assert_eq!(result.hours.get(&IssueNumber::Unknown), Some(&2.0));
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let issues = sample_issues();
        assert_eq!(first_response_times(&issues), first_response_times(&issues));
        assert_eq!(resolution_times(&issues), resolution_times(&issues));
    }

    #[test]
    fn test_empty_input() {
        assert!(first_response_times(&[]).is_empty());
        assert_eq!(resolution_times(&[]), ResolutionTimes::default());
    }

    #[test]
    fn test_analyze_sample_corpus() {
        let ctx = sample_context();
        let report = analyze(&ctx);

        assert_eq!(report.title, TITLE);

        let Some(SectionBody::Hours(response)) = report.find("Response Times (hrs)") else {
            panic!("missing response section");
        };
        assert_eq!(response.get(&IssueNumber::Known(101)), Some(&2.0));
        assert_eq!(response.get(&IssueNumber::Known(102)), Some(&1.0));
        assert_eq!(response.get(&IssueNumber::Known(104)), Some(&0.5));
        assert_eq!(response.len(), 3);

        let Some(SectionBody::Hours(resolution)) = report.find("Resolution Times (hrs)") else {
            panic!("missing resolution section");
        };
        assert_eq!(resolution.get(&IssueNumber::Known(102)), Some(&36.0));
        assert_eq!(resolution.get(&IssueNumber::Unknown), Some(&30.0));

        assert_eq!(
            report.find("Resolution Time Unavailable"),
            Some(&SectionBody::Issues(vec![IssueNumber::Known(103)]))
        );

        let Some(SectionBody::Summary(SummaryStats::Summary { count, median, .. })) =
            report.find("Response Time Statistics")
        else {
            panic!("missing response statistics");
        };
        assert_eq!(*count, 3);
        assert_eq!(*median, 1.0);

        let kinds: Vec<ChartKind> = report.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Histogram, ChartKind::Scatter]);
        // Only 102 has both a response and a resolution time.
        assert_eq!(report.charts[1].points.len(), 1);
    }
}
