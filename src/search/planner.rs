//! Turns a search request into a boolean query plan.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SEARCH_LIMIT;
use crate::error::{NotesError, Result};
use crate::frontmatter::parse_timestamp;
use crate::frontmatter::types::DATE_FORMAT;

/// Maximum edit distance for fuzzy term matching
pub const FUZZY_DISTANCE: u8 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    #[default]
    Created,
    Updated,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::Created => "created",
            DateField::Updated => "updated",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateField {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(DateField::Created),
            "updated" => Ok(DateField::Updated),
            other => Err(NotesError::Query(format!(
                "unknown date field '{}' (expected created or updated)",
                other
            ))),
        }
    }
}

/// Date filter as typed by the user; parsed by the planner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeInput {
    pub start: String,
    /// Without an end the range covers the whole start day
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub field: DateField,
}

impl DateRangeInput {
    pub fn new(start: impl Into<String>, end: Option<&str>, field: DateField) -> Self {
        Self {
            start: start.into(),
            end: end.map(str::to_string),
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Each entry may hold several comma-separated tags
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date_range: Option<DateRangeInput>,
    pub limit: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            text: None,
            tags: Vec::new(),
            date_range: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags.push(tags.into());
        self
    }

    pub fn date_range(mut self, range: DateRangeInput) -> Self {
        self.date_range = Some(range);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Lowercased text; matches a title or body token by prefix or within
    /// [`FUZZY_DISTANCE`] edits.
    Text(String),
    /// Lowercased tag that must be present.
    Tag(String),
    /// Inclusive on both ends.
    DateRange {
        field: DateField,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Conjunction of clauses; no clauses matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    pub clauses: Vec<QueryClause>,
}

impl QueryPlan {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Split comma-separated tag input into trimmed, lowercased, non-empty tags
pub fn split_tags(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|input| input.split(','))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_bound(raw: &str, which: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| {
        NotesError::Query(format!(
            "invalid {} date '{}' (use YYYY-MM-DD, YYYY-MM-DD HH:MM or RFC3339)",
            which, raw
        ))
    })
}

fn end_of_day(day_start: DateTime<Utc>) -> DateTime<Utc> {
    day_start + Duration::hours(24) - Duration::nanoseconds(1)
}

fn is_date_only(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).is_ok()
}

fn plan_date_range(input: &DateRangeInput) -> Result<QueryClause> {
    let start = parse_bound(&input.start, "start")?;
    // A bare end date includes that whole day; an end with a time is exact
    let end = match input.end.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(raw) if is_date_only(raw) => end_of_day(parse_bound(raw, "end")?),
        Some(raw) => parse_bound(raw, "end")?,
        None => end_of_day(start),
    };

    if end < start {
        return Err(NotesError::Query(format!(
            "date range ends ({}) before it starts ({})",
            end, start
        )));
    }

    Ok(QueryClause::DateRange {
        field: input.field,
        start,
        end,
    })
}

/// Build the query plan for a request. Any invalid input fails the whole request.
pub fn plan(request: &SearchRequest) -> Result<QueryPlan> {
    if request.limit == 0 {
        return Err(NotesError::Query("limit must be a positive integer".to_string()));
    }

    let mut clauses = Vec::new();

    if let Some(text) = request.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        clauses.push(QueryClause::Text(text.to_lowercase()));
    }

    for tag in split_tags(&request.tags) {
        clauses.push(QueryClause::Tag(tag));
    }

    if let Some(range) = &request.date_range {
        clauses.push(plan_date_range(range)?);
    }

    Ok(QueryPlan { clauses })
}
