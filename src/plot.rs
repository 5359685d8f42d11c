// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Chart descriptions handed to a plotting sink.
//!
//! The analyses only produce named numeric series. How they are drawn is the
//! concern of a [`Plotter`] implementation such as
//! [`SvgPlotter`](crate::SvgPlotter) or the in-memory [`RecordingPlotter`].

use serde::Serialize;

use crate::error::Error;

/// Presentation requested for a series.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash,)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind
{
    /// Adjacent bars over ordered buckets.
    Histogram,
    /// Separate bars per category.
    Bar,
    /// Proportional slices of a whole.
    Pie,
}

/// Named series of `(category, value)` points.
#[derive(Debug, Serialize, Clone, PartialEq,)]
pub struct Chart
{
    /// Stable identifier, also used as the artifact file stem.
    pub name:    String,
    /// Human readable title.
    pub title:   String,
    /// Presentation of the series.
    pub kind:    ChartKind,
    /// Caption of the category axis; empty when unset.
    pub x_label: String,
    /// Caption of the value axis; empty when unset.
    pub y_label: String,
    /// Points in presentation order.
    pub points:  Vec<(String, f64,),>,
}

impl Chart
{
    /// Creates a chart without points.
    pub fn new(name: impl Into<String,>, title: impl Into<String,>, kind: ChartKind,) -> Self
    {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            x_label: String::new(),
            y_label: String::new(),
            points: Vec::new(),
        }
    }

    /// Sets the axis captions.
    #[must_use]
    pub fn with_axes(mut self, x_label: impl Into<String,>, y_label: impl Into<String,>,) -> Self
    {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Replaces the points of the chart.
    #[must_use]
    pub fn with_points<I, K,>(mut self, points: I,) -> Self
    where
        I: IntoIterator<Item = (K, f64,),>,
        K: Into<String,>,
    {
        self.points = points.into_iter().map(|(key, value,)| (key.into(), value,),).collect();
        self
    }

    /// Largest value of the series, `0.0` when empty.
    pub fn max_value(&self,) -> f64
    {
        self.points.iter().map(|(_, value,)| *value,).fold(0.0, f64::max,)
    }
}

/// Sink that renders computed series.
pub trait Plotter
{
    /// Renders one chart.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error`] when the chart cannot be produced.
    fn render(&mut self, chart: &Chart,) -> Result<(), Error,>;
}

/// Plotter that keeps every chart in memory.
#[derive(Debug, Clone, Default,)]
pub struct RecordingPlotter
{
    charts: Vec<Chart,>,
}

impl RecordingPlotter
{
    /// Creates an empty recorder.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Charts rendered so far, in order.
    pub fn charts(&self,) -> &[Chart]
    {
        &self.charts
    }

    /// Looks up a rendered chart by name.
    pub fn chart(&self, name: &str,) -> Option<&Chart,>
    {
        self.charts.iter().find(|chart| chart.name == name,)
    }
}

impl Plotter for RecordingPlotter
{
    fn render(&mut self, chart: &Chart,) -> Result<(), Error,>
    {
        self.charts.push(chart.clone(),);
        Ok((),)
    }
}
