//! Declarative entry filters.
//!
//! # Responsibilities
//! - Describe which entries a delivery sink wants
//! - Evaluate an entry against every non-empty dimension
//!
//! # Design Decisions
//! - An empty dimension never excludes anything; an all-empty filter matches all
//! - `contains` is a conjunction, `levels` and `sources` are disjunctions
//! - Evaluation short-circuits on the first failing dimension

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::Entry;

/// Predicate over entries held by a delivery sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Accepted level names, compared case-insensitively.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<String>,

    /// Substrings of the call-site source; any one must occur.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// Substrings that must all occur in the message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,

    /// Entries strictly before this instant are excluded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Entries strictly after this instant are excluded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Fields that must be present with exactly these values.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_match: BTreeMap<String, Value>,
}

impl Filter {
    /// Whether every dimension is empty.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
            && self.sources.is_empty()
            && self.contains.is_empty()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.field_match.is_empty()
    }

    /// Evaluate `entry` against this filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.levels.is_empty() && !self.levels.iter().any(|l| entry.level.eq_name(l)) {
            return false;
        }

        if !self.sources.is_empty() {
            let source = entry.source.as_deref().unwrap_or_default();
            if !self.sources.iter().any(|s| source.contains(s.as_str())) {
                return false;
            }
        }

        if !self.contains.iter().all(|s| entry.message.contains(s.as_str())) {
            return false;
        }

        if matches!(self.start_time, Some(start) if entry.timestamp < start) {
            return false;
        }
        if matches!(self.end_time, Some(end) if entry.timestamp > end) {
            return false;
        }

        self.field_match
            .iter()
            .all(|(key, expected)| entry.fields.get(key) == Some(expected))
    }
}
