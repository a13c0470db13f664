//! Chart data preparation.
//!
//! Charts are described as data (a kind, axis labels and points) rather
//! than images; the generator renders them as text bars. Everything here
//! is a pure function of the aggregated data.

use crate::models::IssueNumber;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the synthetic slice that absorbs small pie slices.
pub const OTHER_BUCKET: &str = "Other";

/// Slices below this share of the total are folded into [`OTHER_BUCKET`].
pub const SMALL_SLICE_THRESHOLD: f64 = 0.03;

/// Default response-time histogram edges, in hours.
pub const DEFAULT_HISTOGRAM_EDGES: &[f64] = &[1.0, 6.0, 24.0, 72.0, 168.0, 336.0, 720.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Pie,
    Histogram,
    Scatter,
    WordCloud,
}

/// One plotted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Series name for stacked bars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Second coordinate for scatter plots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            group: None,
            y: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

/// A histogram bucket `[lower, upper)`; the last bucket is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Entries sorted by descending count, ties by key.
pub fn ranked_bars(counts: &BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // BTreeMap iteration is key-ordered and the sort is stable.
    entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    entries
}

/// Fold slices below [`SMALL_SLICE_THRESHOLD`] of the total into "Other".
pub fn group_small_slices(counts: &BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    let mut other = 0;

    for (label, count) in ranked_bars(counts) {
        if (count as f64 / total as f64) < SMALL_SLICE_THRESHOLD {
            other += count;
        } else {
            slices.push((label, count));
        }
    }

    if other > 0 {
        slices.push((OTHER_BUCKET.to_string(), other));
    }

    slices
}

/// Count values into buckets delimited by `edges`. Values outside are ignored.
pub fn histogram<I>(values: I, edges: &[f64]) -> Vec<HistogramBin>
where
    I: IntoIterator<Item = f64>,
{
    if edges.len() < 2 {
        return Vec::new();
    }

    let mut bins: Vec<HistogramBin> = edges
        .windows(2)
        .map(|w| HistogramBin {
            lower: w[0],
            upper: w[1],
            count: 0,
        })
        .collect();
    let last = bins.len() - 1;

    for value in values {
        let slot = bins.iter().position(|b| value >= b.lower && value < b.upper);
        match slot {
            Some(i) => bins[i].count += 1,
            None if value == bins[last].upper => bins[last].count += 1,
            None => {}
        }
    }

    bins
}

/// `(issue, response, resolution)` for issues present in both mappings.
pub fn scatter_pairs(
    response: &BTreeMap<IssueNumber, f64>,
    resolution: &BTreeMap<IssueNumber, f64>,
) -> Vec<(IssueNumber, f64, f64)> {
    response
        .iter()
        .filter_map(|(number, r)| resolution.get(number).map(|res| (*number, *r, *res)))
        .collect()
}

pub fn bar_chart(title: &str, x_label: &str, y_label: &str, entries: &[(String, u64)]) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::Bar,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points: entries
            .iter()
            .map(|(label, count)| ChartPoint::new(label.clone(), *count as f64))
            .collect(),
    }
}

pub fn pie_chart(title: &str, counts: &BTreeMap<String, u64>) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::Pie,
        x_label: String::new(),
        y_label: String::new(),
        points: group_small_slices(counts)
            .into_iter()
            .map(|(label, count)| ChartPoint::new(label, count as f64))
            .collect(),
    }
}

/// Stacked bars: one bar per outer key, one segment per inner key.
pub fn stacked_bar_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    distribution: &BTreeMap<String, BTreeMap<String, u64>>,
) -> Chart {
    let points = distribution
        .iter()
        .flat_map(|(outer, inner)| {
            inner.iter().map(move |(group, count)| ChartPoint {
                label: outer.clone(),
                value: *count as f64,
                group: Some(group.clone()),
                y: None,
            })
        })
        .collect();

    Chart {
        title: title.to_string(),
        kind: ChartKind::StackedBar,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points,
    }
}

pub fn histogram_chart(title: &str, x_label: &str, bins: &[HistogramBin]) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::Histogram,
        x_label: x_label.to_string(),
        y_label: "Number of Issues".to_string(),
        points: bins
            .iter()
            .map(|b| ChartPoint::new(format!("{}-{}", b.lower, b.upper), b.count as f64))
            .collect(),
    }
}

pub fn scatter_chart(title: &str, x_label: &str, y_label: &str, pairs: &[(IssueNumber, f64, f64)]) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::Scatter,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points: pairs
            .iter()
            .map(|(number, x, y)| ChartPoint {
                label: number.to_string(),
                value: *x,
                group: None,
                y: Some(*y),
            })
            .collect(),
    }
}

/// Word weights for a word cloud, taken from ranked keyword counts.
pub fn word_cloud(title: &str, keywords: &[(String, u64)]) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::WordCloud,
        x_label: String::new(),
        y_label: String::new(),
        points: keywords
            .iter()
            .map(|(word, count)| ChartPoint::new(word.clone(), *count as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_ranked_bars_ties_by_key() {
        let ranked = ranked_bars(&counts(&[("b", 2), ("a", 2), ("c", 5)]));
        assert_eq!(
            ranked,
            vec![("c".to_string(), 5), ("a".to_string(), 2), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn test_small_slices_grouped_into_other() {
        let mut data = counts(&[("kind/large", 960)]);
        for name in ["kind/a", "kind/b", "kind/c", "kind/d"] {
            data.insert(name.to_string(), 10);
        }

        let slices = group_small_slices(&data);
        assert_eq!(
            slices,
            vec![("kind/large".to_string(), 960), ("Other".to_string(), 40)]
        );
    }

    #[test]
    fn test_no_other_bucket_when_nothing_small() {
        let slices = group_small_slices(&counts(&[("kind/large", 70), ("kind/a", 5), ("kind/b", 25)]));
        assert_eq!(slices.len(), 3);
        assert!(slices.iter().all(|(label, _)| label != OTHER_BUCKET));
    }

    #[test]
    fn test_small_slices_empty() {
        assert!(group_small_slices(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_histogram_buckets() {
        let bins = histogram(vec![0.5, 1.0, 5.9, 6.0, 720.0, 1000.0], DEFAULT_HISTOGRAM_EDGES);
        let counts: Vec<u64> = bins.iter().map(|b| b.count).collect();
        // 0.5 and 1000 fall outside, 720 lands in the closed last bucket.
        assert_eq!(counts, vec![2, 1, 0, 0, 0, 1]);
        assert!(histogram(vec![1.0], &[1.0]).is_empty());
    }

    #[test]
    fn test_scatter_pairs_only_common_issues() {
        let response: BTreeMap<_, _> =
            [(IssueNumber::Known(1), 2.0), (IssueNumber::Known(2), 3.0)].into_iter().collect();
        let resolution: BTreeMap<_, _> =
            [(IssueNumber::Known(2), 30.0), (IssueNumber::Known(3), 1.0)].into_iter().collect();

        assert_eq!(
            scatter_pairs(&response, &resolution),
            vec![(IssueNumber::Known(2), 3.0, 30.0)]
        );
    }

    #[test]
    fn test_stacked_bar_points() {
        let mut distribution = BTreeMap::new();
        distribution.insert("alice".to_string(), counts(&[("bug", 2), ("docs", 1)]));

        let chart = stacked_bar_chart("Kinds", "Issues", "Contributors", &distribution);
        assert_eq!(chart.kind, ChartKind::StackedBar);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].group.as_deref(), Some("bug"));
        assert_eq!(chart.points[0].label, "alice");
    }
}
