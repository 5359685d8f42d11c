// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Analyses that turn an issue table into report lines and charts.
//!
//! Each analysis checks data availability first, then evaluates the metrics
//! that remain computable. A metric that cannot be computed contributes a
//! single explanatory line instead of a value; only malformed input and sink
//! failures abort a run. Charts are handed to the [`Plotter`] after every
//! line has been produced, and never for a skipped run.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::Error,
    filter::{IssueFilter, filter_issues},
    loader::DataLoader,
    metrics::{
        LabelAverage, LabelCount, Metric, MonthKey, StateCounts, Unavailable, average_close_time,
        average_close_time_by_label, format_days, label_distribution, monthly_counts,
        resolution_days, state_distribution, top_labels,
    },
    model::{IssueState, IssueTable},
    plot::{Chart, ChartKind, Plotter},
};

/// Emitted when both the filtered and the base table are empty.
pub const NO_MATCHING_ISSUES: &str =
    "No issues found for the specified label and/or creator. Analysis and visualization skipped.";
/// Emitted when a filter selects nothing from a non-empty table.
pub const NO_SELECTED_ISSUES: &str = "No issues found for the specified label and/or creator.";
/// Emitted when no issue has a usable close time.
pub const NO_CLOSED_ISSUES: &str =
    "No closed issues found. Average time to close cannot be calculated.";
/// Emitted when a month-based or overall analysis receives no issues.
pub const NO_ISSUES: &str = "No issues found to analyze.";

const NO_CLOSED_MONTHS: &str = "No closed issues found. Closed-per-month histogram skipped.";
const NO_RESOLUTION: &str = "No closed issues found. Time-to-resolution histogram skipped.";
const NO_TOP_LABELS: &str = "No labels found in the analyzed issues. Top labels chart skipped.";

/// Whether an analysis ran to completion or stopped at its first guard.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq,)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus
{
    /// Every applicable metric was evaluated.
    Completed,
    /// The run stopped at its first guard.
    Skipped,
}

/// Outcome of one analysis run.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct RunReport
{
    /// How far the run progressed.
    pub status: RunStatus,
    /// Report lines in emission order.
    pub lines:  Vec<String,>,
    /// Names of the charts handed to the plotter.
    pub charts: Vec<String,>,
}

impl RunReport
{
    /// Returns `true` when the run stopped before computing any metric.
    pub fn is_skipped(&self,) -> bool
    {
        self.status == RunStatus::Skipped
    }
}

/// Analysis selected for a run.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq,)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind
{
    /// Close times and label breakdown of a filtered selection.
    Labels,
    /// Opened and closed issues per month.
    Monthly,
    /// Overall and per-label average close time.
    CloseTime,
    /// State split, top labels and time to resolution.
    Overall,
}

/// Fully resolved parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct AnalysisRequest
{
    /// Analysis to run.
    pub kind:       AnalysisKind,
    /// Target user handed to the loader.
    pub user:       Option<String,>,
    /// Selection applied after loading.
    pub filter:     IssueFilter,
    /// Number of labels shown by [`AnalysisKind::Overall`].
    pub top_labels: usize,
}

impl AnalysisRequest
{
    /// Creates a request without user, filter or custom label limit.
    pub fn new(kind: AnalysisKind,) -> Self
    {
        Self {
            kind,
            user: None,
            filter: IssueFilter::default(),
            top_labels: crate::config::DEFAULT_TOP_LABELS,
        }
    }
}

/// Lines and charts accumulated while an analysis runs.
struct ReportBuilder
{
    lines:  Vec<String,>,
    charts: Vec<Chart,>,
}

impl ReportBuilder
{
    fn new() -> Self
    {
        Self {
            lines: Vec::new(), charts: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<String,>,)
    {
        let line = line.into();
        info!("{}", line);
        self.lines.push(line,);
    }

    fn chart(&mut self, chart: Chart,)
    {
        self.charts.push(chart,);
    }

    fn skipped(mut self, line: &str,) -> RunReport
    {
        self.line(line,);
        RunReport {
            status: RunStatus::Skipped,
            lines:  self.lines,
            charts: Vec::new(),
        }
    }

    fn finish<P,>(self, plotter: &mut P,) -> Result<RunReport, Error,>
    where
        P: Plotter + ?Sized,
    {
        let mut names = Vec::with_capacity(self.charts.len(),);
        for chart in &self.charts {
            debug!("Rendering chart {}", chart.name);
            plotter.render(chart,)?;
            names.push(chart.name.clone(),);
        }

        Ok(RunReport {
            status: RunStatus::Completed,
            lines:  self.lines,
            charts: names,
        },)
    }
}

/// Label and creator analysis over a filtered selection.
///
/// `base` is the table the selection was taken from; the run is skipped only
/// when both are empty. An empty selection of a non-empty base completes with
/// a single line. Month histograms are not part of this analysis; they are
/// reported by [`monthly`].
///
/// # Errors
///
/// Propagates plotter failures.
///
/// # Examples
///
/// ```
/// use issue_insight::{IssueFilter, IssueRecord, IssueTable, RecordingPlotter, analyze, filter_issues};
///
/// let base = IssueTable::from_records(vec![
///     IssueRecord::new("dbrtly", "2024-10-15",)
///         .with_labels(["kind/bug",],)
///         .with_closed_at("2024-10-20",),
/// ],)?;
/// let filtered = filter_issues(&base, &IssueFilter::new().label("kind/bug",),);
///
/// let mut plotter = RecordingPlotter::new();
/// let report = analyze(&filtered, &base, &mut plotter,)?;
/// assert_eq!(report.lines[0], "Average time to close (days): 5.00");
/// # Ok::<(), issue_insight::Error>(())
/// ```
pub fn analyze<P,>(filtered: &IssueTable, base: &IssueTable, plotter: &mut P,) -> Result<RunReport, Error,>
where
    P: Plotter + ?Sized,
{
    let mut report = ReportBuilder::new();
    if filtered.is_empty() && base.is_empty() {
        return Ok(report.skipped(NO_MATCHING_ISSUES,),);
    }
    if filtered.is_empty() {
        report.line(NO_SELECTED_ISSUES,);
        return report.finish(plotter,);
    }

    push_close_times(&mut report, filtered,);

    for creator in unlabeled_creators(filtered,) {
        report.line(format!("No labels found for user '{creator}'."),);
    }

    if let Metric::Computable(counts,) = label_distribution(filtered,) {
        report.line(format!("Label distribution: {}", join_label_counts(&counts)),);
        report.chart(label_chart("label_distribution", "Label distribution", &counts,),);
    }

    if let Metric::Computable(states,) = state_distribution(filtered,) {
        push_states(&mut report, states,);
    }

    report.finish(plotter,)
}

/// Opened and closed issues per calendar month.
///
/// # Errors
///
/// Propagates plotter failures.
pub fn monthly<P,>(table: &IssueTable, plotter: &mut P,) -> Result<RunReport, Error,>
where
    P: Plotter + ?Sized,
{
    let mut report = ReportBuilder::new();
    let Metric::Computable(counts,) = monthly_counts(table,) else {
        return Ok(report.skipped(NO_ISSUES,),);
    };

    report.line(format!("Issues opened per month: {}", join_months(&counts.opened)),);
    report.chart(month_chart("issues_opened_per_month", "Issues opened per month", &counts.opened,),);

    if counts.closed.is_empty() {
        report.line(NO_CLOSED_MONTHS,);
    } else {
        report.line(format!("Issues closed per month: {}", join_months(&counts.closed)),);
        report.chart(month_chart(
            "issues_closed_per_month",
            "Issues closed per month",
            &counts.closed,
        ),);
    }

    report.finish(plotter,)
}

/// Overall and per-label average close time.
///
/// # Errors
///
/// Propagates plotter failures.
pub fn close_time<P,>(table: &IssueTable, plotter: &mut P,) -> Result<RunReport, Error,>
where
    P: Plotter + ?Sized,
{
    let mut report = ReportBuilder::new();
    if table.is_empty() {
        return Ok(report.skipped(NO_ISSUES,),);
    }

    push_close_times(&mut report, table,);
    report.finish(plotter,)
}

/// State split, the `top` most frequent labels and time to resolution.
///
/// # Errors
///
/// Propagates plotter failures.
pub fn overall<P,>(table: &IssueTable, plotter: &mut P, top: usize,) -> Result<RunReport, Error,>
where
    P: Plotter + ?Sized,
{
    let mut report = ReportBuilder::new();
    let Metric::Computable(states,) = state_distribution(table,) else {
        return Ok(report.skipped(NO_ISSUES,),);
    };

    push_states(&mut report, states,);

    match top_labels(table, top,) {
        Metric::Computable(counts,) => {
            report.line(format!("Top labels: {}", join_label_counts(&counts)),);
            report.chart(label_chart("top_labels", "Top labels", &counts,),);
        }
        Metric::NotComputable(_,) => report.line(NO_TOP_LABELS,),
    }

    match resolution_days(table,) {
        Metric::Computable(days,) => {
            let min = days.iter().copied().min().unwrap_or_default();
            let max = days.iter().copied().max().unwrap_or_default();
            let mean = days.iter().sum::<i64>() as f64 / days.len() as f64;
            report.line(format!(
                "Time to resolution (days): min {min}, max {max}, mean {}",
                format_days(mean)
            ),);
            report.chart(resolution_chart(&days,),);
        }
        Metric::NotComputable(_,) => report.line(NO_RESOLUTION,),
    }

    report.finish(plotter,)
}

/// Loads, validates, filters and analyzes issues as described by `request`.
///
/// # Errors
///
/// Returns [`Error`] when loading fails, a record carries a malformed
/// timestamp, or the plotter fails. No partial report is produced in that
/// case.
pub fn run<L, P,>(loader: &L, request: &AnalysisRequest, plotter: &mut P,) -> Result<RunReport, Error,>
where
    L: DataLoader + ?Sized,
    P: Plotter + ?Sized,
{
    debug!("Starting {:?} analysis", request.kind);
    let records = loader.load_issues(request.user.as_deref(),)?;
    let base = IssueTable::from_records(records,)?;
    let filtered = filter_issues(&base, &request.filter,);
    debug!("{} of {} issues selected", filtered.len(), base.len());

    match request.kind {
        AnalysisKind::Labels => analyze(&filtered, &base, plotter,),
        AnalysisKind::Monthly => monthly(&filtered, plotter,),
        AnalysisKind::CloseTime => close_time(&filtered, plotter,),
        AnalysisKind::Overall => overall(&filtered, plotter, request.top_labels,),
    }
}

fn push_close_times(report: &mut ReportBuilder, table: &IssueTable,)
{
    match average_close_time(table,) {
        Metric::Computable(days,) => {
            report.line(format!("Average time to close (days): {}", format_days(days)),);
        }
        Metric::NotComputable(Unavailable::NoClosedIssues,) => {
            report.line(NO_CLOSED_ISSUES,);
            return;
        }
        Metric::NotComputable(_,) => return,
    }

    if let Metric::Computable(averages,) = average_close_time_by_label(table,) {
        for average in &averages {
            report.line(format!(
                "Average Close Time for label '{}': {}",
                average.label,
                format_days(average.average_days)
            ),);
        }
        report.chart(average_chart(&averages,),);
    }
}

fn push_states(report: &mut ReportBuilder, states: StateCounts,)
{
    report.line(format!(
        "State distribution: open {} ({:.1}%), closed {} ({:.1}%)",
        states.open,
        states.percentage(IssueState::Open),
        states.closed,
        states.percentage(IssueState::Closed)
    ),);
    report.chart(
        Chart::new("state_distribution", "State distribution", ChartKind::Pie,).with_points([
            (IssueState::Open.as_str(), states.open as f64,),
            (IssueState::Closed.as_str(), states.closed as f64,),
        ],),
    );
}

/// Creators whose every row in `table` lacks labels, in first-seen order.
fn unlabeled_creators(table: &IssueTable,) -> Vec<&str,>
{
    table
        .creators()
        .into_iter()
        .filter(|creator| {
            table.iter().filter(|issue| issue.creator == *creator,).all(|issue| !issue.has_labels(),)
        },)
        .collect()
}

fn join_label_counts(counts: &[LabelCount],) -> String
{
    counts
        .iter()
        .map(|entry| format!("{} ({})", entry.label, entry.count),)
        .collect::<Vec<_,>>()
        .join(", ",)
}

fn join_months(counts: &BTreeMap<MonthKey, usize,>,) -> String
{
    counts.iter().map(|(month, count,)| format!("{month} ({count})"),).collect::<Vec<_,>>().join(", ",)
}

fn average_chart(averages: &[LabelAverage],) -> Chart
{
    Chart::new("average_close_time_by_label", "Average close time by label", ChartKind::Bar,)
        .with_axes("Label", "Days",)
        .with_points(averages.iter().map(|average| (average.label.as_str(), average.average_days,),),)
}

fn label_chart(name: &str, title: &str, counts: &[LabelCount],) -> Chart
{
    Chart::new(name, title, ChartKind::Bar,)
        .with_axes("Label", "Issues",)
        .with_points(counts.iter().map(|entry| (entry.label.as_str(), entry.count as f64,),),)
}

fn month_chart(name: &str, title: &str, counts: &BTreeMap<MonthKey, usize,>,) -> Chart
{
    Chart::new(name, title, ChartKind::Histogram,)
        .with_axes("Month", "Issues",)
        .with_points(counts.iter().map(|(month, count,)| (month.to_string(), *count as f64,),),)
}

fn resolution_chart(days: &[i64],) -> Chart
{
    let mut buckets: BTreeMap<i64, usize,> = BTreeMap::new();
    for day in days {
        *buckets.entry(*day,).or_insert(0,) += 1;
    }

    Chart::new("time_to_resolution", "Time to resolution", ChartKind::Histogram,)
        .with_axes("Days", "Issues",)
        .with_points(buckets.into_iter().map(|(day, count,)| (day.to_string(), count as f64,),),)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{loader::StaticLoader, model::IssueRecord};

    struct FailingPlotter;

    impl Plotter for FailingPlotter
    {
        fn render(&mut self, _chart: &Chart,) -> Result<(), Error,>
        {
            Err(Error::service("plotting backend unavailable",),)
        }
    }

    fn typeshed_records() -> Vec<IssueRecord,>
    {
        vec![
            IssueRecord::new("dbrtly", "2024-10-15",)
                .with_labels(["kind/bug", "status/triage",],)
                .with_closed_at("2024-10-20",),
            IssueRecord::new("srittau", "2024-10-19",).with_labels(["status/triage", "area/docs",],),
        ]
    }

    fn table(records: Vec<IssueRecord,>,) -> IssueTable
    {
        IssueTable::from_records(records,).expect("valid table",)
    }

    #[test]
    fn label_filter_scenario_reports_bug_close_time()
    {
        let base = table(typeshed_records(),);
        let filtered = filter_issues(&base, &IssueFilter::new().label("kind/bug",),);
        assert_eq!(filtered.len(), 1);

        let mut plotter = crate::plot::RecordingPlotter::new();
        let report = analyze(&filtered, &base, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(
            report.lines,
            [
                "Average time to close (days): 5.00",
                "Average Close Time for label 'kind/bug': 5.00",
                "Label distribution: kind/bug (1)",
                "State distribution: open 0 (0.0%), closed 1 (100.0%)",
            ]
        );
        assert_eq!(
            report.charts,
            ["average_close_time_by_label", "label_distribution", "state_distribution"]
        );
        assert_eq!(plotter.charts().len(), 3);
    }

    #[test]
    fn empty_tables_skip_without_rendering()
    {
        let empty = IssueTable::default();
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&empty, &empty, &mut plotter,).expect("analysis succeeds",);

        assert!(report.is_skipped());
        assert_eq!(report.lines, [NO_MATCHING_ISSUES]);
        assert!(report.charts.is_empty());
        assert!(plotter.charts().is_empty());
    }

    #[test]
    fn empty_selection_of_non_empty_base_still_completes()
    {
        let base = table(typeshed_records(),);
        let filtered = filter_issues(&base, &IssueFilter::new().label("missing",),);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&filtered, &base, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.lines, [NO_SELECTED_ISSUES]);
        assert!(report.charts.is_empty());
        assert!(plotter.charts().is_empty());
    }

    #[test]
    fn unknown_creator_reports_empty_selection()
    {
        let base = table(vec![IssueRecord::new("dbrtly", "2024-10-15",).with_closed_at("2024-10-20",)],);
        let filtered = filter_issues(&base, &IssueFilter::new().creator("ghost",),);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&filtered, &base, &mut plotter,).expect("analysis succeeds",);

        assert!(!report.is_skipped());
        assert_eq!(report.lines, [NO_SELECTED_ISSUES]);
        assert!(plotter.charts().is_empty());
    }

    #[test]
    fn all_open_issues_report_missing_close_time_and_labels()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2024-03-01",).with_labels(["bug",],),
            IssueRecord::new("b", "2024-03-02",).with_labels(["bug", "docs",],),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&issues, &issues, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(
            report.lines,
            [
                NO_CLOSED_ISSUES,
                "Label distribution: bug (2), docs (1)",
                "State distribution: open 2 (100.0%), closed 0 (0.0%)",
            ]
        );
        assert!(plotter.chart("average_close_time_by_label").is_none());
        assert!(plotter.chart("label_distribution").is_some());
    }

    #[test]
    fn three_four_day_issues_average_four_days()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2024-01-01",).with_closed_at("2024-01-05",),
            IssueRecord::new("a", "2024-01-02",).with_closed_at("2024-01-06",),
            IssueRecord::new("a", "2024-01-03",).with_closed_at("2024-01-07",),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = close_time(&issues, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(report.lines, ["Average time to close (days): 4.00"]);
        assert!(report.charts.is_empty());
    }

    #[test]
    fn malformed_timestamp_aborts_run()
    {
        let loader = StaticLoader::new(vec![
            IssueRecord::new("a", "2024-01-01",),
            IssueRecord::new("b", "not-a-date",),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let error = run(&loader, &AnalysisRequest::new(AnalysisKind::Labels,), &mut plotter,)
            .expect_err("expected malformed input",);

        assert!(error.is_malformed_input());
        assert!(matches!(error, Error::MalformedTimestamp { row: 1, .. }));
        assert!(plotter.charts().is_empty());
    }

    #[test]
    fn unlabeled_user_skips_label_distribution()
    {
        let issues = table(vec![
            IssueRecord::new("octocat", "2024-05-01",).with_closed_at("2024-05-03",),
            IssueRecord::new("octocat", "2024-05-02",),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&issues, &issues, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(
            report.lines,
            [
                "Average time to close (days): 2.00",
                "No labels found for user 'octocat'.",
                "State distribution: open 1 (50.0%), closed 1 (50.0%)",
            ]
        );
        assert!(plotter.chart("label_distribution").is_none());
        assert_eq!(report.charts, ["state_distribution"]);
    }

    #[test]
    fn unlabeled_creator_does_not_hide_other_labels()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2024-05-01",),
            IssueRecord::new("b", "2024-05-02",).with_labels(["docs",],),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = analyze(&issues, &issues, &mut plotter,).expect("analysis succeeds",);

        assert!(report.lines.contains(&"No labels found for user 'a'.".to_owned()));
        assert!(report.lines.contains(&"Label distribution: docs (1)".to_owned()));
    }

    #[test]
    fn monthly_reports_both_histograms()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2023-12-30",).with_closed_at("2024-01-02",),
            IssueRecord::new("a", "2024-01-10",),
            IssueRecord::new("b", "2024-01-11",).with_closed_at("2024-02-01",),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = monthly(&issues, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(
            report.lines,
            [
                "Issues opened per month: 2023-12 (1), 2024-01 (2)",
                "Issues closed per month: 2024-01 (1), 2024-02 (1)",
            ]
        );
        let opened = plotter.chart("issues_opened_per_month",).expect("opened chart",);
        assert_eq!(opened.kind, ChartKind::Histogram);
        assert_eq!(opened.points[1], ("2024-01".to_owned(), 2.0));
    }

    #[test]
    fn monthly_without_closed_issues_skips_closed_histogram()
    {
        let issues = table(vec![IssueRecord::new("a", "2024-01-10",)],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = monthly(&issues, &mut plotter,).expect("analysis succeeds",);

        assert_eq!(report.lines[1], NO_CLOSED_MONTHS);
        assert_eq!(report.charts, ["issues_opened_per_month"]);
    }

    #[test]
    fn monthly_and_overall_stop_on_empty_table()
    {
        let empty = IssueTable::default();
        let mut plotter = crate::plot::RecordingPlotter::new();

        let months = monthly(&empty, &mut plotter,).expect("analysis succeeds",);
        let summary = overall(&empty, &mut plotter, 10,).expect("analysis succeeds",);
        let times = close_time(&empty, &mut plotter,).expect("analysis succeeds",);

        for report in [months, summary, times] {
            assert!(report.is_skipped());
            assert_eq!(report.lines, [NO_ISSUES]);
        }
        assert!(plotter.charts().is_empty());
    }

    #[test]
    fn overall_reports_states_top_labels_and_resolution()
    {
        let issues = table(vec![
            IssueRecord::new("a", "2024-01-01",)
                .with_labels(["bug", "docs",],)
                .with_closed_at("2024-01-10",),
            IssueRecord::new("b", "2024-01-01",)
                .with_labels(["bug",],)
                .with_closed_at("2024-01-15T12:00:00Z",),
            IssueRecord::new("c", "2024-01-02",).with_labels(["ci",],),
        ],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = overall(&issues, &mut plotter, 1,).expect("analysis succeeds",);

        assert_eq!(
            report.lines,
            [
                "State distribution: open 1 (33.3%), closed 2 (66.7%)",
                "Top labels: bug (2)",
                "Time to resolution (days): min 9, max 14, mean 11.50",
            ]
        );
        assert_eq!(report.charts, ["state_distribution", "top_labels", "time_to_resolution"]);
    }

    #[test]
    fn overall_without_labels_or_closed_issues_reports_skips()
    {
        let issues = table(vec![IssueRecord::new("a", "2024-01-01",)],);
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = overall(&issues, &mut plotter, 10,).expect("analysis succeeds",);

        assert_eq!(report.lines[1..], [NO_TOP_LABELS, NO_RESOLUTION]);
        assert_eq!(report.charts, ["state_distribution"]);
    }

    #[test]
    fn run_passes_user_to_loader_and_applies_filter()
    {
        let loader = StaticLoader::new(typeshed_records(),);
        let request = AnalysisRequest {
            kind:       AnalysisKind::Labels,
            user:       Some("dbrtly".to_owned(),),
            filter:     IssueFilter::new().label("status/triage",),
            top_labels: 10,
        };
        let mut plotter = crate::plot::RecordingPlotter::new();

        let report = run(&loader, &request, &mut plotter,).expect("run succeeds",);

        assert_eq!(report.lines[0], "Average time to close (days): 5.00");
        assert_eq!(report.lines[1], "Average Close Time for label 'status/triage': 5.00");
    }

    #[test]
    fn plotter_failure_aborts_run()
    {
        let issues = table(typeshed_records(),);
        let error = analyze(&issues, &issues, &mut FailingPlotter,).expect_err("expected failure",);
        assert!(matches!(error, Error::Service { .. }));
    }
}
