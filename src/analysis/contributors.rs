//! Contributor activity.
//!
//! Counts open issues per assignee and breaks each assignee's issues
//! down by `kind/` label.

use super::labels::kind_tokens;
use crate::context::AnalysisContext;
use crate::models::{Issue, State};
use crate::report::charts::{bar_chart, ranked_bars, stacked_bar_chart};
use crate::report::{FeatureReport, SectionBody};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const TITLE: &str = "Contributor Activity Report";

/// Activity of a single contributor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContributorSummary {
    pub active_issues: u64,
    pub issue_type_distribution: BTreeMap<String, u64>,
}

/// Number of open issues assigned to each login.
pub fn active_issues_per_contributor(issues: &[Issue]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();

    for issue in issues.iter().filter(|i| i.state == State::Open) {
        for assignee in &issue.assignees {
            *counts.entry(assignee.clone()).or_insert(0) += 1;
        }
    }

    counts
}

/// For each login, how many of their issues carry each `kind/` token.
pub fn issue_type_distribution(issues: &[Issue]) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut distribution: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for issue in issues {
        let kinds: Vec<&str> = kind_tokens(&issue.labels).collect();
        if kinds.is_empty() {
            continue;
        }

        for assignee in &issue.assignees {
            let per_kind = distribution.entry(assignee.clone()).or_default();
            for kind in &kinds {
                *per_kind.entry(kind.to_string()).or_insert(0) += 1;
            }
        }
    }

    distribution
}

pub fn contributor_summary(issues: &[Issue], login: &str) -> ContributorSummary {
    ContributorSummary {
        active_issues: active_issues_per_contributor(issues)
            .get(login)
            .copied()
            .unwrap_or(0),
        issue_type_distribution: issue_type_distribution(issues)
            .remove(login)
            .unwrap_or_default(),
    }
}

/// Resolve `name` case-insensitively to a login present in the issue-type
/// distribution.
pub fn find_contributor(issues: &[Issue], name: &str) -> Option<String> {
    let wanted = name.trim().to_lowercase();
    issue_type_distribution(issues)
        .into_keys()
        .find(|login| login.to_lowercase() == wanted)
}

/// Build the contributor feature report, optionally focused on one login.
pub fn analyze(ctx: &AnalysisContext, contributor: Option<&str>) -> FeatureReport {
    let issues = ctx.issues();
    let active = active_issues_per_contributor(issues);
    let distribution = issue_type_distribution(issues);

    info!(
        "{} contributors with active issues, {} with typed issues",
        active.len(),
        distribution.len()
    );

    let mut report = FeatureReport::new(TITLE);
    report.section(
        "Active Issues per Contributor",
        SectionBody::Counts(active.clone()),
    );
    report.section(
        "Issue Type Distribution per Contributor",
        SectionBody::Nested(distribution.clone()),
    );

    if let Some(name) = contributor {
        match find_contributor(issues, name) {
            Some(login) => {
                let summary = contributor_summary(issues, &login);
                report.section(
                    "Contributor Summary",
                    SectionBody::Contributor { login, summary },
                );
            }
            None => {
                info!("No data found for contributor '{}'", name);
                report.section(
                    "Contributor Summary",
                    SectionBody::Notes(vec![format!("No data found for contributor '{}'.", name)]),
                );
            }
        }
    }

    if active.is_empty() {
        info!("No active issues, skipping activity chart");
    } else {
        report.charts.push(bar_chart(
            "Active Issues per Contributor",
            "Contributors",
            "Number of Active Issues",
            &ranked_bars(&active),
        ));
    }

    if distribution.is_empty() {
        info!("No typed issues, skipping issue type chart");
    } else {
        report.charts.push(stacked_bar_chart(
            "Issue Type Distribution per Contributor",
            "Number of Issues",
            "Contributors",
            &distribution,
        ));
    }

    report
}
