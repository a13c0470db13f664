//! Data models for issue-tracker records.
//!
//! Raw records arrive as loosely-typed JSON objects. This module converts
//! them into one canonical shape at load time, so the analysis code never
//! sees the raw representation: timestamps become `DateTime<Utc>`,
//! assignees become plain login strings, and unparseable fields become
//! explicit absent values instead of errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fields probed, in order, when an assignee or author is a structured object.
const LOGIN_FIELDS: &[&str] = &["login", "username", "name"];

/// Timestamp layouts accepted after RFC 3339 fails. Naive values are taken as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reasons a raw record cannot become an [`Issue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no state")]
    MissingState,
    #[error("unrecognized state '{0}'")]
    InvalidState(String),
}

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Open,
    Closed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Open => write!(f, "open"),
            State::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for State {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(State::Open),
            "closed" => Ok(State::Closed),
            _ => Err(RecordError::InvalidState(s.to_string())),
        }
    }
}

impl State {
    /// Resolve the `state` field of a raw record. Absence is an error.
    pub fn from_value(value: Option<&Value>) -> Result<Self, RecordError> {
        match value {
            None | Some(Value::Null) => Err(RecordError::MissingState),
            Some(Value::String(s)) => s.parse(),
            Some(other) => Err(RecordError::InvalidState(other.to_string())),
        }
    }
}

/// Issue identifier, or the sentinel used when the raw number is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueNumber {
    Unknown,
    Known(i64),
}

impl IssueNumber {
    /// Accepts an integer or a string of digits; anything else is `Unknown`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(IssueNumber::Known)
                .unwrap_or(IssueNumber::Unknown),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(IssueNumber::Known)
                .unwrap_or(IssueNumber::Unknown),
            _ => IssueNumber::Unknown,
        }
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueNumber::Known(n) => write!(f, "{}", n),
            IssueNumber::Unknown => write!(f, "unknown"),
        }
    }
}

// Serialized as a bare integer (or "unknown") so it can key JSON maps.
impl Serialize for IssueNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IssueNumber::Known(n) => serializer.serialize_i64(*n),
            IssueNumber::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// A single timestamped occurrence on an issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Event kind, e.g. "commented" or "labeled". Case varies in exports.
    pub event_type: Option<String>,
    pub author: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    /// Label name for labeling events.
    pub label: Option<String>,
    pub comment: Option<String>,
}

impl Event {
    /// Build an event from a raw sub-object. Never fails.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::default();
        };

        Self {
            event_type: string_field(obj, "event_type"),
            author: obj.get("author").and_then(login_of),
            event_date: parse_timestamp(obj.get("event_date")),
            label: string_field(obj, "label"),
            comment: string_field(obj, "comment"),
        }
    }

    /// Whether this is a comment event. Events without a type are not.
    pub fn is_comment(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("commented"))
    }
}

/// One tracked issue with its events.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub url: Option<String>,
    pub creator: Option<String>,
    pub title: Option<String>,
    /// Free-text body.
    pub text: Option<String>,
    pub timeline_url: Option<String>,
    pub number: IssueNumber,
    /// Label names in input order. Prefix conventions are not enforced here.
    pub labels: Vec<String>,
    /// Assignee logins, already normalized from whatever shape the export used.
    pub assignees: Vec<String>,
    pub state: State,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    pub events: Vec<Event>,
}

impl Issue {
    /// Build an issue from a raw record.
    ///
    /// Every field falls back to an absent value except `state`, whose
    /// absence or invalidity rejects the record.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;
        let state = State::from_value(obj.get("state"))?;

        let events = obj
            .get("events")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().map(|e| Event::from_value(Some(e))).collect())
            .unwrap_or_default();

        Ok(Self {
            url: string_field(obj, "url"),
            creator: obj.get("creator").and_then(login_of),
            title: string_field(obj, "title"),
            text: string_field(obj, "text"),
            timeline_url: string_field(obj, "timeline_url"),
            number: IssueNumber::from_value(obj.get("number")),
            labels: string_list(obj.get("labels"), label_name),
            assignees: string_list(obj.get("assignees"), login_of),
            state,
            created_date: parse_timestamp(obj.get("created_date")),
            updated_date: parse_timestamp(obj.get("updated_date")),
            events,
        })
    }

    /// Text body, or empty when absent.
    pub fn body(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Parse an ISO-8601-like timestamp. Anything unusable yields `None`.
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A login from either a plain string or an object exposing a login-like field.
fn login_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => LOGIN_FIELDS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

fn label_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn string_list(value: Option<&Value>, extract: fn(&Value) -> Option<String>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(extract).collect())
        .unwrap_or_default()
}
