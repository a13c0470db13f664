//! Issue selection by date range, label and state.

use crate::models::{Issue, State};
use chrono::NaiveDate;
use serde::Serialize;

/// Criteria an issue must satisfy to be analyzed.
///
/// Date bounds are inclusive calendar days (UTC) checked against
/// `created_date`; once a bound is set, issues without a creation date
/// are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub state: Option<State>,
}

impl IssueFilter {
    /// True when the filter accepts every issue.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.label.is_none()
            && self.state.is_none()
    }

    /// Check a single issue against every criterion.
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(state) = self.state {
            if issue.state != state {
                return false;
            }
        }

        if let Some(ref label) = self.label {
            if !issue.labels.iter().any(|l| l == label) {
                return false;
            }
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(created) = issue.created_date else {
                return false;
            };
            let day = created.date_naive();
            if self.start_date.is_some_and(|start| day < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| day > end) {
                return false;
            }
        }

        true
    }

    /// Keep the issues that match, preserving order.
    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if self.is_empty() {
            return issues;
        }
        issues.into_iter().filter(|i| self.matches(i)).collect()
    }

    /// Human-readable description of each active criterion.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(start) = self.start_date {
            parts.push(format!("created on or after {}", start));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("created on or before {}", end));
        }
        if let Some(ref label) = self.label {
            parts.push(format!("label = {}", label));
        }
        if let Some(state) = self.state {
            parts.push(format!("state = {}", state));
        }
        parts
    }
}
