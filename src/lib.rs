// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Aggregate metrics over issue-tracker records.
//!
//! Raw records from a [`DataLoader`] are validated into an [`IssueTable`],
//! optionally narrowed with an [`IssueFilter`], and summarized by the metric
//! functions. The report functions decide which metrics the data supports,
//! produce one line per metric, and hand chart series to a [`Plotter`].
//! Metrics that lack data return [`Metric::NotComputable`]; malformed input is
//! an [`Error`].
//!
//! ```
//! use issue_insight::{AnalysisKind, AnalysisRequest, IssueRecord, RecordingPlotter, StaticLoader, run};
//!
//! let loader = StaticLoader::new(vec![
//!     IssueRecord::new("a", "2024-01-01",).with_closed_at("2024-01-05",),
//!     IssueRecord::new("a", "2024-01-02",).with_closed_at("2024-01-06",),
//! ],);
//! let mut plotter = RecordingPlotter::new();
//! let report = run(&loader, &AnalysisRequest::new(AnalysisKind::CloseTime,), &mut plotter,)?;
//! assert_eq!(report.lines, ["Average time to close (days): 4.00"]);
//! # Ok::<(), issue_insight::Error>(())
//! ```

mod config;
mod error;
mod filter;
mod github;
mod loader;
mod metrics;
mod model;
mod plot;
mod report;
mod svg;

pub mod retry;

pub use config::{
    load_config, parse_config, top_labels_in_range, AnalysisConfig, SourceConfig, DEFAULT_TOP_LABELS,
    MAX_TOP_LABELS,
};
pub use error::{chart_io_error, io_error, Error};
pub use filter::{filter_issues, IssueFilter};
pub use github::GitHubLoader;
pub use loader::{parse_records, DataLoader, JsonFileLoader, StaticLoader};
pub use metrics::{
    average_close_time, average_close_time_by_label, format_days, label_distribution,
    monthly_counts, resolution_days, state_distribution, top_labels, LabelAverage, LabelCount,
    Metric, MonthKey, MonthlyCounts, StateCounts, Unavailable,
};
pub use model::{
    parse_timestamp, ClosedSource, Issue, IssueRecord, IssueState, IssueTable, LabeledIssue,
};
pub use plot::{Chart, ChartKind, Plotter, RecordingPlotter};
pub use report::{
    analyze, close_time, monthly, overall, run, AnalysisKind, AnalysisRequest, RunReport,
    RunStatus, NO_CLOSED_ISSUES, NO_ISSUES, NO_MATCHING_ISSUES, NO_SELECTED_ISSUES,
};
pub use retry::RetryConfig;
pub use svg::SvgPlotter;
