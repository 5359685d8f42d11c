// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Issue records and the validated in-memory table consumed by the analyses.
//!
//! Loaders hand over [`IssueRecord`] values whose timestamps are still raw
//! strings. [`IssueTable::from_records`] parses every timestamp before any
//! metric runs, so corrupted input fails the run as a whole instead of being
//! skipped row by row. Tables are never mutated after construction; filtering
//! and label explosion produce fresh values.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const DATE_FORMAT: &str = "%Y-%m-%d";
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Lifecycle state of an issue.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash,)]
#[serde(rename_all = "snake_case")]
pub enum IssueState
{
    /// The issue is still open.
    #[serde(alias = "OPEN", alias = "Open")]
    Open,
    /// The issue has been closed.
    #[serde(alias = "CLOSED", alias = "Closed")]
    Closed,
}

impl IssueState
{
    /// Returns the lowercase name used in reports and chart categories.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.write_str(self.as_str(),)
    }
}

/// Field that decides whether an issue of a given table counts as closed.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq,)]
#[serde(rename_all = "snake_case")]
pub enum ClosedSource
{
    /// Every record carried an explicit `state`; `closed_at` is advisory.
    State,
    /// No record carried `state`; a present `closed_at` means closed.
    ClosedAt,
}

/// Raw issue row as produced by a [`DataLoader`](crate::DataLoader).
///
/// # Examples
///
/// ```
/// use issue_insight::IssueRecord;
///
/// let json = r#"{"creator":"octocat","labels":[{"name":"bug"}],"created_at":"2024-01-01"}"#;
/// let record: IssueRecord = serde_json::from_str(json,).expect("valid record",);
/// assert_eq!(record.labels.as_deref(), Some(&["bug".to_owned()][..]));
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct IssueRecord
{
    /// Login of the account that opened the issue.
    #[serde(alias = "user", alias = "author")]
    pub creator: String,

    /// Labels attached to the issue, `None` when the export omitted them.
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub labels: Option<Vec<String,>,>,

    /// Explicit lifecycle state, when the export provides one.
    #[serde(default)]
    pub state: Option<IssueState,>,

    /// Creation timestamp in one of the supported textual forms.
    #[serde(alias = "created_date")]
    pub created_at: String,

    /// Close timestamp; absent or empty for open issues.
    #[serde(default, alias = "closed_date")]
    pub closed_at: Option<String,>,
}

impl IssueRecord
{
    /// Creates an unlabeled record without state or close time.
    pub fn new(creator: impl Into<String,>, created_at: impl Into<String,>,) -> Self
    {
        Self {
            creator:    creator.into(),
            labels:     None,
            state:      None,
            created_at: created_at.into(),
            closed_at:  None,
        }
    }

    /// Replaces the labels of the record.
    #[must_use]
    pub fn with_labels<I, S,>(mut self, labels: I,) -> Self
    where
        I: IntoIterator<Item = S,>,
        S: Into<String,>,
    {
        self.labels = Some(labels.into_iter().map(Into::into,).collect(),);
        self
    }

    /// Sets the explicit lifecycle state.
    #[must_use]
    pub fn with_state(mut self, state: IssueState,) -> Self
    {
        self.state = Some(state,);
        self
    }

    /// Sets the close timestamp.
    #[must_use]
    pub fn with_closed_at(mut self, closed_at: impl Into<String,>,) -> Self
    {
        self.closed_at = Some(closed_at.into(),);
        self
    }
}

/// Validated issue row with parsed timestamps and a resolved state.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Issue
{
    /// Login of the account that opened the issue.
    pub creator:    String,
    /// Labels attached to the issue, `None` when absent.
    pub labels:     Option<Vec<String,>,>,
    /// State resolved from the table's [`ClosedSource`].
    pub state:      IssueState,
    /// Creation time.
    pub created_at: DateTime<Utc,>,
    /// Close time, if any.
    pub closed_at:  Option<DateTime<Utc,>,>,
}

impl Issue
{
    /// Returns `true` when the issue counts as closed.
    pub fn is_closed(&self,) -> bool
    {
        self.state == IssueState::Closed
    }

    /// Returns `true` when the issue carries at least one label.
    pub fn has_labels(&self,) -> bool
    {
        self.labels.as_ref().is_some_and(|labels| !labels.is_empty(),)
    }

    /// Labels of the issue as a slice; empty when absent.
    pub fn label_slice(&self,) -> &[String]
    {
        self.labels.as_deref().unwrap_or_default()
    }

    /// Fractional days between creation and close.
    ///
    /// Returns `None` for open issues and for closed issues without a close
    /// timestamp.
    pub fn close_duration_days(&self,) -> Option<f64,>
    {
        if !self.is_closed() {
            return None;
        }
        let closed_at = self.closed_at?;
        let seconds = closed_at.signed_duration_since(self.created_at,).num_seconds();
        Some(seconds as f64 / SECONDS_PER_DAY,)
    }
}

/// One row of the exploded-label view: an issue paired with one of its
/// labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct LabeledIssue<'table,>
{
    /// The label contributed by this row.
    pub label: &'table str,
    /// The issue the label belongs to.
    pub issue: &'table Issue,
}

/// Ordered, validated collection of issues.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct IssueTable
{
    issues:        Vec<Issue,>,
    closed_source: ClosedSource,
}

impl Default for IssueTable
{
    fn default() -> Self
    {
        Self::empty(ClosedSource::ClosedAt,)
    }
}

impl IssueTable
{
    /// Creates an empty table that resolves state from `closed_source`.
    pub fn empty(closed_source: ClosedSource,) -> Self
    {
        Self {
            issues: Vec::new(), closed_source,
        }
    }

    /// Builds a table from raw loader records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTimestamp`] when a `created_at` or a
    /// non-empty `closed_at` does not parse, and [`Error::Validation`] when
    /// the records mix the explicit-state and `closed_at` conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_insight::{IssueRecord, IssueTable};
    ///
    /// let records = vec![IssueRecord::new("octocat", "not a date",)];
    /// let error = IssueTable::from_records(records,).expect_err("must fail",);
    /// assert!(error.is_malformed_input());
    /// ```
    pub fn from_records(records: Vec<IssueRecord,>,) -> Result<Self, Error,>
    {
        let with_state = records.iter().filter(|record| record.state.is_some(),).count();
        let closed_source = if with_state == 0 {
            ClosedSource::ClosedAt
        } else if with_state == records.len() {
            ClosedSource::State
        } else {
            return Err(Error::validation(format!(
                "{with_state} of {} issues carry an explicit state; a table must use one \
                 convention",
                records.len()
            ),),);
        };

        let mut issues = Vec::with_capacity(records.len(),);
        for (row, record,) in records.into_iter().enumerate() {
            issues.push(validate_record(row, record, closed_source,)?,);
        }

        Ok(Self {
            issues, closed_source,
        },)
    }

    /// Builds a table from already validated issues.
    pub fn from_issues(issues: Vec<Issue,>, closed_source: ClosedSource,) -> Self
    {
        Self {
            issues, closed_source,
        }
    }

    /// Number of issues in the table.
    pub fn len(&self,) -> usize
    {
        self.issues.len()
    }

    /// Returns `true` when the table holds no issues.
    pub fn is_empty(&self,) -> bool
    {
        self.issues.is_empty()
    }

    /// Iterates over the issues in table order.
    pub fn iter(&self,) -> std::slice::Iter<'_, Issue,>
    {
        self.issues.iter()
    }

    /// Issues in table order.
    pub fn issues(&self,) -> &[Issue]
    {
        &self.issues
    }

    /// Field that decided the state of every issue in this table.
    pub fn closed_source(&self,) -> ClosedSource
    {
        self.closed_source
    }

    /// Distinct creators in first-seen order.
    pub fn creators(&self,) -> Vec<&str,>
    {
        let mut seen = HashSet::with_capacity(self.issues.len(),);
        self.issues
            .iter()
            .map(|issue| issue.creator.as_str(),)
            .filter(|creator| seen.insert(*creator,),)
            .collect()
    }

    /// Exploded-label view: one row per label of every issue, in table order.
    ///
    /// Issues without labels contribute no rows.
    pub fn exploded_labels(&self,) -> Vec<LabeledIssue<'_,>,>
    {
        self.issues
            .iter()
            .flat_map(|issue| {
                issue.label_slice().iter().map(move |label| LabeledIssue {
                    label: label.as_str(),
                    issue,
                },)
            },)
            .collect()
    }
}

impl<'table,> IntoIterator for &'table IssueTable
{
    type IntoIter = std::slice::Iter<'table, Issue,>;
    type Item = &'table Issue;

    fn into_iter(self,) -> Self::IntoIter
    {
        self.issues.iter()
    }
}

/// Parses a timestamp in one of the supported textual forms.
///
/// RFC 3339 values keep their offset and are converted to UTC. Naive date
/// times and bare dates are interpreted as UTC.
///
/// # Examples
///
/// ```
/// use issue_insight::parse_timestamp;
///
/// let parsed = parse_timestamp("2024-10-15",).expect("date",);
/// assert_eq!(parsed.to_rfc3339(), "2024-10-15T00:00:00+00:00");
/// assert!(parse_timestamp("invalid_date",).is_none());
/// ```
pub fn parse_timestamp(raw: &str,) -> Option<DateTime<Utc,>,>
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value,) = DateTime::parse_from_rfc3339(trimmed,) {
        return Some(value.with_timezone(&Utc,),);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(value,) = NaiveDateTime::parse_from_str(trimmed, format,) {
            return Some(value.and_utc(),);
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT,)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0,),)
        .map(|value| value.and_utc(),)
}

fn validate_record(
    row: usize,
    record: IssueRecord,
    closed_source: ClosedSource,
) -> Result<Issue, Error,>
{
    let created_at = parse_timestamp(&record.created_at,).ok_or_else(|| {
        Error::MalformedTimestamp {
            row,
            field: "created_at",
            value: record.created_at.clone(),
        }
    },)?;

    let closed_at = match record.closed_at.as_deref().map(str::trim,) {
        None | Some("",) => None,
        Some(raw,) => Some(parse_timestamp(raw,).ok_or_else(|| Error::MalformedTimestamp {
            row,
            field: "closed_at",
            value: raw.to_owned(),
        },)?,),
    };

    let state = match (closed_source, record.state,) {
        (ClosedSource::State, Some(state,),) => state,
        _ if closed_at.is_some() => IssueState::Closed,
        _ => IssueState::Open,
    };

    Ok(Issue {
        creator: record.creator,
        labels: record.labels,
        state,
        created_at,
        closed_at,
    },)
}

#[derive(Deserialize,)]
#[serde(untagged)]
enum LabelEntry
{
    Name(String,),
    Object
    {
        name: String,
    },
}

fn deserialize_labels<'de, D,>(deserializer: D,) -> Result<Option<Vec<String,>,>, D::Error,>
where
    D: Deserializer<'de,>,
{
    let value: Option<Vec<LabelEntry,>,> = Option::deserialize(deserializer,)?;
    Ok(value.map(|entries| {
        entries
            .into_iter()
            .map(|entry| match entry {
                LabelEntry::Name(name,) | LabelEntry::Object {
                    name,
                } => name,
            },)
            .collect()
    },),)
}
