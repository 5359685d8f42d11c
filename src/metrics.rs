// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Scalar and grouped metrics over a validated [`IssueTable`].
//!
//! Every metric inspects its input before computing and returns
//! [`Metric::NotComputable`] when the data cannot support it. Metrics never
//! fail: malformed timestamps are rejected earlier, when the table is built.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use chrono::Datelike;
use serde::Serialize;

use crate::model::{IssueState, IssueTable};

/// Reason a metric could not be computed.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash,)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable
{
    /// The table holds no issues at all.
    NoIssues,
    /// No issue is closed with a known close time.
    NoClosedIssues,
    /// No issue carries a label.
    NoLabels,
}

/// Tagged outcome of a single metric.
#[derive(Debug, Serialize, Clone, PartialEq,)]
#[serde(rename_all = "snake_case")]
pub enum Metric<T,>
{
    /// The metric was computed from the available data.
    Computable(T,),
    /// The data does not support the metric.
    NotComputable(Unavailable,),
}

impl<T,> Metric<T,>
{
    /// Returns `true` when a value is present.
    pub fn is_computable(&self,) -> bool
    {
        matches!(self, Self::Computable(_))
    }

    /// Converts into the computed value, discarding the reason otherwise.
    pub fn computable(self,) -> Option<T,>
    {
        match self {
            Self::Computable(value,) => Some(value,),
            Self::NotComputable(_,) => None,
        }
    }

    /// Returns the reason when the metric is not computable.
    pub fn unavailable(&self,) -> Option<Unavailable,>
    {
        match self {
            Self::Computable(_,) => None,
            Self::NotComputable(reason,) => Some(*reason,),
        }
    }

    /// Borrows the computed value.
    pub fn as_ref(&self,) -> Metric<&T,>
    {
        match self {
            Self::Computable(value,) => Metric::Computable(value,),
            Self::NotComputable(reason,) => Metric::NotComputable(*reason,),
        }
    }

    /// Maps the computed value, leaving the reason untouched.
    pub fn map<U, F,>(self, f: F,) -> Metric<U,>
    where
        F: FnOnce(T,) -> U,
    {
        match self {
            Self::Computable(value,) => Metric::Computable(f(value,),),
            Self::NotComputable(reason,) => Metric::NotComputable(reason,),
        }
    }
}

/// Average close time of the closed issues carrying one label.
#[derive(Debug, Serialize, Clone, PartialEq,)]
pub struct LabelAverage
{
    /// Label the average belongs to.
    pub label:        String,
    /// Mean close time in fractional days.
    pub average_days: f64,
    /// Number of closed occurrences averaged.
    pub closed_count: usize,
}

/// Number of occurrences of one label in the exploded-label view.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct LabelCount
{
    /// Label name.
    pub label: String,
    /// Occurrences of the label.
    pub count: usize,
}

/// Calendar month bucket; ordering is chronological.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,)]
pub struct MonthKey
{
    /// Calendar year.
    pub year:  i32,
    /// Month of the year, `1..=12`.
    pub month: u32,
}

impl MonthKey
{
    /// Month bucket containing `timestamp`.
    pub fn of<T: Datelike,>(timestamp: &T,) -> Self
    {
        Self {
            year: timestamp.year(), month: timestamp.month(),
        }
    }
}

impl fmt::Display for MonthKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Opened and closed issue counts per calendar month.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct MonthlyCounts
{
    /// Issues grouped by the month of `created_at`.
    pub opened: BTreeMap<MonthKey, usize,>,
    /// Closed issues grouped by the month of `closed_at`.
    pub closed: BTreeMap<MonthKey, usize,>,
}

/// Issue counts per state.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq,)]
pub struct StateCounts
{
    /// Issues that are still open.
    pub open:   usize,
    /// Issues that count as closed.
    pub closed: usize,
}

impl StateCounts
{
    /// Total number of issues counted.
    pub fn total(&self,) -> usize
    {
        self.open + self.closed
    }

    /// Count for a specific state.
    pub fn count(&self, state: IssueState,) -> usize
    {
        match state {
            IssueState::Open => self.open,
            IssueState::Closed => self.closed,
        }
    }

    /// Share of `state` in percent; `0.0` for an empty distribution.
    pub fn percentage(&self, state: IssueState,) -> f64
    {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(state,) as f64 * 100.0 / total as f64
    }
}

/// Formats a day count with the two decimals used by every report line.
pub fn format_days(value: f64,) -> String
{
    format!("{value:.2}")
}

/// Mean close time in fractional days over closed issues with a close time.
///
/// # Examples
///
/// ```
/// use issue_insight::{IssueRecord, IssueTable, Metric, average_close_time};
///
/// let table = IssueTable::from_records(vec![
///     IssueRecord::new("a", "2024-01-01",).with_closed_at("2024-01-05",),
///     IssueRecord::new("b", "2024-01-02",),
/// ],)?;
/// assert_eq!(average_close_time(&table,), Metric::Computable(4.0));
/// # Ok::<(), issue_insight::Error>(())
/// ```
pub fn average_close_time(table: &IssueTable,) -> Metric<f64,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let durations: Vec<f64,> = table.iter().filter_map(|issue| issue.close_duration_days(),).collect();
    mean(&durations,)
        .map_or(Metric::NotComputable(Unavailable::NoClosedIssues,), Metric::Computable,)
}

/// Mean close time per label over the closed part of the exploded-label view.
///
/// Labels appear in first-seen order. Labels without a closed occurrence are
/// omitted.
pub fn average_close_time_by_label(table: &IssueTable,) -> Metric<Vec<LabelAverage,>,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let closed_rows = table.exploded_labels().into_iter().filter_map(|row| {
        row.issue.close_duration_days().map(|days| (row.label, days,),)
    },);
    let groups = group_in_first_seen_order(closed_rows,);

    if groups.is_empty() {
        let any_closed = table.iter().any(|issue| issue.close_duration_days().is_some(),);
        let reason = if any_closed { Unavailable::NoLabels } else { Unavailable::NoClosedIssues };
        return Metric::NotComputable(reason,);
    }

    Metric::Computable(
        groups
            .into_iter()
            .filter_map(|(label, durations,)| {
                mean(&durations,).map(|average_days| LabelAverage {
                    label: label.to_owned(),
                    average_days,
                    closed_count: durations.len(),
                },)
            },)
            .collect(),
    )
}

/// Opened and closed counts per calendar month.
///
/// Buckets are keyed by year and month so data spanning several years never
/// collides.
pub fn monthly_counts(table: &IssueTable,) -> Metric<MonthlyCounts,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let mut counts = MonthlyCounts::default();
    for issue in table {
        *counts.opened.entry(MonthKey::of(&issue.created_at,),).or_insert(0,) += 1;
        if issue.is_closed()
            && let Some(closed_at,) = issue.closed_at.as_ref()
        {
            *counts.closed.entry(MonthKey::of(closed_at,),).or_insert(0,) += 1;
        }
    }

    Metric::Computable(counts,)
}

/// Label occurrence counts, by descending count with ties in first-seen order.
pub fn label_distribution(table: &IssueTable,) -> Metric<Vec<LabelCount,>,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let groups =
        group_in_first_seen_order(table.exploded_labels().into_iter().map(|row| (row.label, (),),),);
    if groups.is_empty() {
        return Metric::NotComputable(Unavailable::NoLabels,);
    }

    let mut counts: Vec<LabelCount,> = groups
        .into_iter()
        .map(|(label, occurrences,)| LabelCount {
            label: label.to_owned(), count: occurrences.len(),
        },)
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count,),);

    Metric::Computable(counts,)
}

/// The `limit` most frequent labels.
pub fn top_labels(table: &IssueTable, limit: usize,) -> Metric<Vec<LabelCount,>,>
{
    label_distribution(table,).map(|mut counts| {
        counts.truncate(limit,);
        counts
    },)
}

/// Issue counts per state.
pub fn state_distribution(table: &IssueTable,) -> Metric<StateCounts,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let closed = table.iter().filter(|issue| issue.is_closed(),).count();
    Metric::Computable(StateCounts {
        open: table.len() - closed,
        closed,
    },)
}

/// Whole days from creation to close for every closed issue with a close time.
pub fn resolution_days(table: &IssueTable,) -> Metric<Vec<i64,>,>
{
    if table.is_empty() {
        return Metric::NotComputable(Unavailable::NoIssues,);
    }

    let days: Vec<i64,> = table
        .iter()
        .filter(|issue| issue.is_closed(),)
        .filter_map(|issue| {
            issue.closed_at.map(|closed_at| closed_at.signed_duration_since(issue.created_at,),)
        },)
        .map(|duration| duration.num_days(),)
        .collect();

    if days.is_empty() {
        Metric::NotComputable(Unavailable::NoClosedIssues,)
    } else {
        Metric::Computable(days,)
    }
}

fn mean(values: &[f64],) -> Option<f64,>
{
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64,)
}

fn group_in_first_seen_order<'a, T, I,>(rows: I,) -> Vec<(&'a str, Vec<T,>,),>
where
    I: IntoIterator<Item = (&'a str, T,),>,
{
    let mut index: HashMap<&'a str, usize,> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<T,>,),> = Vec::new();

    for (key, value,) in rows {
        let position = *index.entry(key,).or_insert_with(|| {
            groups.push((key, Vec::new(),),);
            groups.len() - 1
        },);
        groups[position].1.push(value,);
    }

    groups
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;
    use crate::model::IssueRecord;

    fn table(records: Vec<IssueRecord,>,) -> IssueTable
    {
        IssueTable::from_records(records,).expect("valid table",)
    }

    fn closed_issue(created: &str, closed: &str, labels: &[&str],) -> IssueRecord
    {
        IssueRecord::new("user", created,)
            .with_labels(labels.iter().copied(),)
            .with_state(IssueState::Closed,)
            .with_closed_at(closed,)
    }

    fn open_issue(created: &str, labels: &[&str],) -> IssueRecord
    {
        IssueRecord::new("user", created,)
            .with_labels(labels.iter().copied(),)
            .with_state(IssueState::Open,)
    }

    #[test]
    fn average_close_time_over_three_four_day_issues()
    {
        let issues = table(vec![
            closed_issue("2024-01-01", "2024-01-05", &["bug"],),
            closed_issue("2024-01-02", "2024-01-06", &["feature"],),
            closed_issue("2024-01-03", "2024-01-07", &["bug"],),
        ],);

        let average = average_close_time(&issues,).computable().expect("computable",);
        assert_eq!(format_days(average,), "4.00");
    }

    #[test]
    fn average_close_time_distinguishes_missing_from_zero()
    {
        let all_open = table(vec![open_issue("2024-01-01", &[],), open_issue("2024-01-02", &[],)],);
        assert_eq!(
            average_close_time(&all_open,),
            Metric::NotComputable(Unavailable::NoClosedIssues)
        );

        let same_day = table(vec![closed_issue("2024-01-01", "2024-01-01", &[],)],);
        assert_eq!(average_close_time(&same_day,), Metric::Computable(0.0));

        assert_eq!(
            average_close_time(&IssueTable::default(),),
            Metric::NotComputable(Unavailable::NoIssues)
        );
    }

    #[test]
    fn per_label_average_follows_first_seen_order()
    {
        let issues = table(vec![
            closed_issue("2024-01-01", "2024-01-05", &["bug", "enhancement"],),
            closed_issue("2024-01-02", "2024-01-04", &["bug"],),
            closed_issue("2024-01-03", "2024-01-09", &["feature", "enhancement"],),
        ],);

        let averages = average_close_time_by_label(&issues,).computable().expect("computable",);
        let summary: Vec<(&str, f64, usize,),> = averages
            .iter()
            .map(|entry| (entry.label.as_str(), entry.average_days, entry.closed_count,),)
            .collect();
        assert_eq!(summary, vec![
            ("bug", 3.0, 2),
            ("enhancement", 5.0, 2),
            ("feature", 6.0, 1)
        ]);
    }

    #[test]
    fn per_label_average_omits_labels_without_closed_issues()
    {
        let issues = table(vec![
            closed_issue("2024-01-01", "2024-01-05", &["bug"],),
            open_issue("2024-01-03", &["bug", "question"],),
        ],);

        let averages = average_close_time_by_label(&issues,).computable().expect("computable",);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].label, "bug");
        assert_eq!(averages[0].closed_count, 1);
    }

    #[test]
    fn per_label_average_reports_reason()
    {
        let unlabeled = table(vec![closed_issue("2024-01-01", "2024-01-05", &[],)],);
        assert_eq!(
            average_close_time_by_label(&unlabeled,).unavailable(),
            Some(Unavailable::NoLabels)
        );

        let all_open = table(vec![open_issue("2024-01-01", &["bug"],)],);
        assert_eq!(
            average_close_time_by_label(&all_open,).unavailable(),
            Some(Unavailable::NoClosedIssues)
        );
    }

    #[test]
    fn monthly_counts_use_created_and_closed_months()
    {
        let issues = table(vec![
            closed_issue("2023-01-15", "2023-01-25", &[],),
            open_issue("2023-02-20", &[],),
        ],);

        let counts = monthly_counts(&issues,).computable().expect("computable",);
        let opened: Vec<(String, usize,),> =
            counts.opened.iter().map(|(key, count,)| (key.to_string(), *count,),).collect();
        let closed: Vec<(String, usize,),> =
            counts.closed.iter().map(|(key, count,)| (key.to_string(), *count,),).collect();

        assert_eq!(opened, vec![("2023-01".to_owned(), 1), ("2023-02".to_owned(), 1)]);
        assert_eq!(closed, vec![("2023-01".to_owned(), 1)]);
    }

    #[test]
    fn monthly_counts_keep_years_apart()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2023-03-01",),
            IssueRecord::new("b", "2024-03-01",),
        ],);

        let counts = monthly_counts(&issues,).computable().expect("computable",);
        assert_eq!(counts.opened.len(), 2);
        assert!(counts.closed.is_empty());
    }

    #[test]
    fn monthly_counts_skip_reopened_issues_with_stale_close_time()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2023-03-01",)
                .with_closed_at("2023-03-04",)
                .with_state(IssueState::Open,),
        ],);

        let counts = monthly_counts(&issues,).computable().expect("computable",);
        assert!(counts.closed.is_empty());
    }

    #[test]
    fn label_distribution_orders_by_count_then_first_seen()
    {
        let issues = table(vec![
            open_issue("2023-01-01", &["docs", "bug"],),
            open_issue("2023-02-01", &["enhancement"],),
            open_issue("2023-03-01", &["bug"],),
        ],);

        let counts = label_distribution(&issues,).computable().expect("computable",);
        let summary: Vec<(&str, usize,),> =
            counts.iter().map(|entry| (entry.label.as_str(), entry.count,),).collect();
        assert_eq!(summary, vec![("bug", 2), ("docs", 1), ("enhancement", 1)]);
    }

    #[test]
    fn label_distribution_without_labels_is_not_computable()
    {
        let issues = table(vec![IssueRecord::new("new_user", "2024-10-20",)],);
        assert_eq!(label_distribution(&issues,).unavailable(), Some(Unavailable::NoLabels));
    }

    #[test]
    fn top_labels_truncates_distribution()
    {
        let issues = table(vec![
            open_issue("2023-01-01", &["bug", "docs", "ci"],),
            open_issue("2023-02-01", &["bug"],),
        ],);

        let top = top_labels(&issues, 2,).computable().expect("computable",);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "bug");
    }

    #[test]
    fn state_distribution_counts_each_state()
    {
        let issues = table(vec![
            open_issue("2023-01-01", &["bug"],),
            closed_issue("2023-02-01", "2023-02-10", &["enhancement"],),
            closed_issue("2023-03-01", "2023-03-15", &["bug"],),
        ],);

        let states = state_distribution(&issues,).computable().expect("computable",);
        assert_eq!(states, StateCounts {
            open: 1, closed: 2,
        });
        assert_eq!(format!("{:.1}", states.percentage(IssueState::Closed)), "66.7");
    }

    #[test]
    fn resolution_days_are_whole_days()
    {
        let issues = table(vec![
            open_issue("2023-01-01", &["bug"],),
            closed_issue("2023-02-01", "2023-02-10", &["enhancement"],),
            closed_issue("2023-03-01", "2023-03-15T23:00:00Z", &["bug"],),
        ],);

        assert_eq!(resolution_days(&issues,), Metric::Computable(vec![9, 14]));
    }

    #[test]
    fn metric_helpers_preserve_reason()
    {
        let metric: Metric<u32,> = Metric::NotComputable(Unavailable::NoLabels,);
        assert!(!metric.is_computable());
        assert_eq!(metric.as_ref().map(|value| value + 1,).unavailable(), Some(Unavailable::NoLabels));
        assert_eq!(Metric::Computable(2,).map(|value: u32| value * 2,), Metric::Computable(4));
    }

    #[test]
    fn month_key_display_is_zero_padded()
    {
        let key = MonthKey {
            year: 2024, month: 3,
        };
        assert_eq!(key.to_string(), "2024-03");
    }

    fn arbitrary_table() -> impl Strategy<Value = IssueTable,>
    {
        let row = (1u32..=12, 1u32..=28, prop::option::of(0i64..40,),);
        prop::collection::vec(row, 0..20,).prop_map(|rows| {
            let records = rows
                .into_iter()
                .map(|(month, day, close_after,)| {
                    let created = chrono::NaiveDate::from_ymd_opt(2023, month, day,)
                        .expect("valid generated date",);
                    let labels: &[&str] = if day % 2 == 0 { &["bug"] } else { &[] };
                    let record = IssueRecord::new("user", created.format("%Y-%m-%d",).to_string(),)
                        .with_labels(labels.iter().copied(),);
                    match close_after {
                        Some(days,) => record.with_closed_at(
                            (created + chrono::Duration::days(days,)).format("%Y-%m-%d",).to_string(),
                        ),
                        None => record,
                    }
                },)
                .collect();
            IssueTable::from_records(records,).expect("generated records are valid",)
        },)
    }

    proptest! {
        #[test]
        fn opened_buckets_partition_all_issues(issues in arbitrary_table()) {
            match monthly_counts(&issues) {
                Metric::Computable(counts) => {
                    prop_assert_eq!(counts.opened.values().sum::<usize>(), issues.len());
                }
                Metric::NotComputable(reason) => {
                    prop_assert!(issues.is_empty());
                    prop_assert_eq!(reason, Unavailable::NoIssues);
                }
            }
        }

        #[test]
        fn average_matches_mean_of_closed_durations(issues in arbitrary_table()) {
            let durations: Vec<i64> = issues
                .iter()
                .filter_map(|issue| issue.closed_at.map(|closed| (closed - issue.created_at).num_days()))
                .collect();

            match average_close_time(&issues) {
                Metric::Computable(average) => {
                    let expected = durations.iter().sum::<i64>() as f64 / durations.len() as f64;
                    prop_assert!((average - expected).abs() < 1e-9);
                }
                Metric::NotComputable(_) => prop_assert!(durations.is_empty()),
            }
        }

        #[test]
        fn per_label_output_only_has_closed_labels(issues in arbitrary_table()) {
            if let Metric::Computable(averages) = average_close_time_by_label(&issues) {
                prop_assert!(averages.iter().all(|entry| entry.closed_count > 0));
            }
        }
    }
}
