//! Retrieval request parsing and normalization.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalError;

/// Lines returned when a request names neither a count nor a time bound.
pub const DEFAULT_TAIL_LINES: usize = 100;

/// Response encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    JsonPretty,
    Csv,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Json, Self::JsonPretty, Self::Csv, Self::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonPretty => "jsonpretty",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                RetrievalError::Validation(
                    "Invalid format. Must be one of: json, jsonpretty, csv, text".to_string(),
                )
            })
    }
}

/// Raw query-string parameters. Every value arrives as text; empty values
/// count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub last_lines: Option<String>,
    pub last_minutes: Option<String>,
    pub format: Option<String>,
}

/// A retrieval request as received, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_lines: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_minutes: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Which lines to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The most recent `n` lines, oldest first.
    Tail(usize),
    /// Lines whose timestamp lies within `[from, to]`; `to` open when absent.
    Range {
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub selection: Selection,
    pub format: OutputFormat,
}

impl LogQuery {
    /// Parse query-string parameters. Times are RFC 3339.
    pub fn from_params(params: &QueryParams) -> Result<Self, RetrievalError> {
        Ok(Self {
            from_time: parse_param(&params.from_time, parse_time, "Invalid from_time format. Use RFC3339")?,
            to_time: parse_param(&params.to_time, parse_time, "Invalid to_time format. Use RFC3339")?,
            last_lines: parse_param(
                &params.last_lines,
                |v| v.parse().ok(),
                "Invalid last_lines format. Must be a number",
            )?,
            last_minutes: parse_param(
                &params.last_minutes,
                |v| v.parse().ok(),
                "Invalid last_minutes format. Must be a number",
            )?,
            format: params.format.clone().filter(|f| !f.is_empty()),
        })
    }

    /// Resolve defaults and overrides against `now`.
    ///
    /// Applied in order: `last_minutes` replaces both bounds with
    /// `[now - m, now]`; a request with no count and no bound becomes a tail
    /// of the last 100 lines; an upper bound alone gets a lower bound one
    /// hour earlier. Once any bound is in effect `last_lines` is ignored.
    pub fn normalize(&self, now: DateTime<Utc>) -> Result<NormalizedQuery, RetrievalError> {
        let format = match self.format.as_deref() {
            None | Some("") => OutputFormat::default(),
            Some(name) => name.parse()?,
        };

        let last_lines = self
            .last_lines
            .map(|n| positive(n, "last_lines"))
            .transpose()?;
        let last_minutes = self
            .last_minutes
            .map(|n| positive(n, "last_minutes"))
            .transpose()?;

        let (mut from, mut to) = (self.from_time, self.to_time);
        if let Some(minutes) = last_minutes {
            let start = i64::try_from(minutes)
                .ok()
                .and_then(TimeDelta::try_minutes)
                .and_then(|window| now.checked_sub_signed(window))
                .ok_or_else(|| too_large("last_minutes"))?;
            from = Some(start);
            to = Some(now);
        }

        if from.is_none() {
            if let Some(upper) = to {
                let start = upper
                    .checked_sub_signed(TimeDelta::hours(1))
                    .ok_or_else(|| too_large("to_time"))?;
                from = Some(start);
            }
        }

        let selection = match from {
            Some(from) => Selection::Range { from, to },
            None => Selection::Tail(last_lines.unwrap_or(DEFAULT_TAIL_LINES)),
        };
        Ok(NormalizedQuery { selection, format })
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_param<T>(
    raw: &Option<String>,
    parse: impl Fn(&str) -> Option<T>,
    message: &str,
) -> Result<Option<T>, RetrievalError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| RetrievalError::Validation(message.to_string())),
    }
}

fn positive(value: i64, name: &str) -> Result<usize, RetrievalError> {
    if value <= 0 {
        return Err(RetrievalError::Validation(format!(
            "Invalid {}. Must be a positive number",
            name
        )));
    }
    usize::try_from(value).map_err(|_| too_large(name))
}

fn too_large(name: &str) -> RetrievalError {
    RetrievalError::Validation(format!("Invalid {}. Value too large", name))
}
