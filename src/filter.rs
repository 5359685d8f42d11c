// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Creator and label selection over an [`IssueTable`].

use serde::{Deserialize, Serialize};

use crate::model::{Issue, IssueTable};

/// Selection criteria combined with logical AND.
///
/// # Examples
///
/// ```
/// use issue_insight::IssueFilter;
///
/// let filter = IssueFilter::new().creator("dbrtly",).label("kind/bug",);
/// assert!(!filter.is_identity());
/// assert!(IssueFilter::new().is_identity());
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct IssueFilter
{
    /// Exact creator login to keep.
    #[serde(default)]
    pub creator: Option<String,>,

    /// Label that must be present on a kept issue.
    #[serde(default)]
    pub label: Option<String,>,
}

impl IssueFilter
{
    /// Creates a filter that keeps every issue.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Restricts the selection to issues opened by `creator`.
    #[must_use]
    pub fn creator(mut self, creator: impl Into<String,>,) -> Self
    {
        self.creator = Some(creator.into(),);
        self
    }

    /// Restricts the selection to issues carrying `label`.
    #[must_use]
    pub fn label(mut self, label: impl Into<String,>,) -> Self
    {
        self.label = Some(label.into(),);
        self
    }

    /// Returns `true` when the filter has no criteria.
    pub fn is_identity(&self,) -> bool
    {
        self.creator.is_none() && self.label.is_none()
    }
}

/// Applies `filter` to `table` and returns a fresh table.
///
/// With a label criterion the result is the exploded-label view restricted to
/// that label: each matching occurrence becomes one row whose `labels` holds
/// only the matched label. Without one, kept rows are copied unchanged.
/// No matches yield an empty table.
///
/// # Examples
///
/// ```
/// use issue_insight::{IssueFilter, IssueRecord, IssueTable, filter_issues};
///
/// let table = IssueTable::from_records(vec![
///     IssueRecord::new("dbrtly", "2024-10-15",).with_labels(["kind/bug", "status/triage",],),
///     IssueRecord::new("srittau", "2024-10-19",).with_labels(["area/docs",],),
/// ],)?;
///
/// let bugs = filter_issues(&table, &IssueFilter::new().label("kind/bug",),);
/// assert_eq!(bugs.len(), 1);
/// assert_eq!(bugs.issues()[0].label_slice(), ["kind/bug"]);
/// # Ok::<(), issue_insight::Error>(())
/// ```
pub fn filter_issues(table: &IssueTable, filter: &IssueFilter,) -> IssueTable
{
    if filter.is_identity() {
        return table.clone();
    }

    let by_creator = |issue: &&Issue| {
        filter.creator.as_deref().is_none_or(|creator| issue.creator == creator,)
    };

    let issues = match filter.label.as_deref() {
        Some(label,) => table
            .iter()
            .filter(by_creator,)
            .flat_map(|issue| {
                issue
                    .label_slice()
                    .iter()
                    .filter(move |candidate| candidate.as_str() == label,)
                    .map(move |matched| Issue {
                        labels: Some(vec![matched.clone()],),
                        ..issue.clone()
                    },)
            },)
            .collect(),
        None => table.iter().filter(by_creator,).cloned().collect(),
    };

    IssueTable::from_issues(issues, table.closed_source(),)
}
