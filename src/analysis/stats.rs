//! Summary statistics over hour-valued metrics.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const NO_DATA_MESSAGE: &str = "No data available.";

/// Count, mean, median, min and max of a set of hour values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryStats {
    /// No values to summarize.
    NoData,
    Summary {
        count: usize,
        mean: f64,
        median: f64,
        min: f64,
        max: f64,
    },
}

/// Summarize values. Statistics are rounded to two decimals.
pub fn summarize<'a, I>(values: I) -> SummaryStats
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().copied().collect();
    if sorted.is_empty() {
        return SummaryStats::NoData;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };

    SummaryStats::Summary {
        count,
        mean: round2(mean),
        median: round2(median),
        min: round2(sorted[0]),
        max: round2(sorted[count - 1]),
    }
}

impl SummaryStats {
    /// The presentation mapping: fixed metric names to display values.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        match *self {
            SummaryStats::NoData => vec![("Info", NO_DATA_MESSAGE.to_string())],
            SummaryStats::Summary {
                count,
                mean,
                median,
                min,
                max,
            } => vec![
                ("Count", count.to_string()),
                ("Mean (hrs)", format!("{:.2}", mean)),
                ("Median (hrs)", format!("{:.2}", median)),
                ("Min (hrs)", format!("{:.2}", min)),
                ("Max (hrs)", format!("{:.2}", max)),
            ],
        }
    }
}

impl Serialize for SummaryStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            SummaryStats::NoData => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Info", NO_DATA_MESSAGE)?;
                map.end()
            }
            SummaryStats::Summary {
                count,
                mean,
                median,
                min,
                max,
            } => {
                let mut map = serializer.serialize_map(Some(5))?;
                map.serialize_entry("Count", &count)?;
                map.serialize_entry("Mean (hrs)", &mean)?;
                map.serialize_entry("Median (hrs)", &median)?;
                map.serialize_entry("Min (hrs)", &min)?;
                map.serialize_entry("Max (hrs)", &max)?;
                map.end()
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
