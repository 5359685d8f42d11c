// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! SVG chart rendering.
//!
//! Every chart becomes a deterministic `<name>.svg` next to a `<name>.json`
//! manifest holding the plotted series, so regenerated artifacts only differ
//! when the data does.

use std::{
    borrow::Cow,
    f64::consts::PI,
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use tracing::debug;

use crate::{
    error::{self, Error},
    plot::{Chart, ChartKind, Plotter}
};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const MARGIN: f64 = 48.0;
const FONT: &str = "'Segoe UI', 'SF Pro Display', sans-serif";
const PALETTE: &[&str] = &[
    "#1f883d", "#0969da", "#8250df", "#bf3989", "#cf222e", "#bc4c00", "#4d2d00", "#57606a"
];

/// Plotter writing SVG artifacts into a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgPlotter {
    output_dir: PathBuf,
    written:    Vec<PathBuf>
}

impl SvgPlotter {
    /// Creates a plotter that writes into `output_dir`.
    ///
    /// The directory is created on the first render.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written:    Vec::new()
        }
    }

    /// Directory receiving the artifacts.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// SVG files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Plotter for SvgPlotter {
    /// Writes `<name>.svg` and `<name>.json` for the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChartIo`](Error::ChartIo) when the directory or files
    /// cannot be created and [`Error::Decode`](Error::Decode) if the manifest
    /// cannot be encoded.
    fn render(&mut self, chart: &Chart) -> Result<(), Error> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|source| error::chart_io_error(&self.output_dir, source))?;

        let svg_path = self.output_dir.join(format!("{}.svg", chart.name));
        let manifest_path = self.output_dir.join(format!("{}.json", chart.name));

        write_file(&svg_path, build_svg_content(chart).as_bytes())?;
        write_manifest(&manifest_path, chart)?;

        debug!("Rendered chart {} to {}", chart.name, svg_path.display());
        self.written.push(svg_path);
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::chart_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .map_err(|source| error::chart_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::chart_io_error(path, source))
}

fn write_manifest(path: &Path, chart: &Chart) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::chart_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, chart)?;
    writer
        .write_all(b"\n")
        .map_err(|source| error::chart_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::chart_io_error(path, source))
}

fn build_svg_content(chart: &Chart) -> String {
    let mut buffer = String::with_capacity(1024);
    let title = escape_xml(&chart.title);

    let _ = writeln!(
        buffer,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-label=\"{title}\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">",
    );
    let _ = writeln!(
        buffer,
        "  <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>\n  <text x=\"{}\" y=\"28\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"18\" fill=\"#24292f\">{title}</text>",
        WIDTH / 2.0,
    );

    match chart.kind {
        ChartKind::Histogram | ChartKind::Bar => push_bars(&mut buffer, chart),
        ChartKind::Pie => push_pie(&mut buffer, chart)
    }

    buffer.push_str("</svg>\n");
    buffer
}

fn push_bars(buffer: &mut String, chart: &Chart) {
    let plot_width = WIDTH - 2.0 * MARGIN;
    let plot_height = HEIGHT - 2.0 * MARGIN;
    let baseline = HEIGHT - MARGIN;
    let max = chart.max_value();
    let slot = plot_width / chart.points.len().max(1) as f64;
    let gap = if chart.kind == ChartKind::Histogram { 1.0 } else { slot * 0.2 };

    let _ = writeln!(
        buffer,
        "  <line x1=\"{MARGIN}\" y1=\"{baseline}\" x2=\"{}\" y2=\"{baseline}\" stroke=\"#57606a\"/>",
        WIDTH - MARGIN,
    );

    for (index, (category, value)) in chart.points.iter().enumerate() {
        let height = if max > 0.0 { value / max * plot_height } else { 0.0 };
        let x = MARGIN + index as f64 * slot + gap / 2.0;
        let y = baseline - height;
        let color = PALETTE[index % PALETTE.len()];
        let center = x + (slot - gap) / 2.0;
        let category = escape_xml(category);

        let _ = writeln!(
            buffer,
            "  <rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{height:.2}\" fill=\"{color}\"><title>{category}: {value}</title></rect>",
            slot - gap,
        );
        let _ = writeln!(
            buffer,
            "  <text x=\"{center:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"10\" fill=\"#57606a\">{category}</text>",
            baseline + 14.0,
        );
    }

    push_axis_labels(buffer, chart);
}

fn push_axis_labels(buffer: &mut String, chart: &Chart) {
    if !chart.x_label.is_empty() {
        let _ = writeln!(
            buffer,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"12\" fill=\"#24292f\">{}</text>",
            WIDTH / 2.0,
            HEIGHT - 10.0,
            escape_xml(&chart.x_label),
        );
    }
    if !chart.y_label.is_empty() {
        let _ = writeln!(
            buffer,
            "  <text x=\"16\" y=\"{}\" transform=\"rotate(-90 16 {})\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"12\" fill=\"#24292f\">{}</text>",
            HEIGHT / 2.0,
            HEIGHT / 2.0,
            escape_xml(&chart.y_label),
        );
    }
}

fn push_pie(buffer: &mut String, chart: &Chart) {
    let total: f64 = chart.points.iter().map(|(_, value)| value.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }

    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0 + 12.0;
    let radius = HEIGHT / 2.0 - MARGIN;
    let mut start = -PI / 2.0;

    for (index, (category, value)) in chart.points.iter().enumerate() {
        let share = value.max(0.0) / total;
        if share <= 0.0 {
            continue;
        }
        let color = PALETTE[index % PALETTE.len()];
        let category = escape_xml(category);
        let percent = share * 100.0;

        if share >= 1.0 {
            let _ = writeln!(
                buffer,
                "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" fill=\"{color}\"><title>{category}: {percent:.1}%</title></circle>",
            );
            break;
        }

        let end = start + share * 2.0 * PI;
        let large_arc = u8::from(share > 0.5);
        let (x1, y1) = (cx + radius * start.cos(), cy + radius * start.sin());
        let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
        let _ = writeln!(
            buffer,
            "  <path d=\"M {cx} {cy} L {x1:.2} {y1:.2} A {radius} {radius} 0 {large_arc} 1 {x2:.2} {y2:.2} Z\" fill=\"{color}\"><title>{category}: {percent:.1}%</title></path>",
        );

        let middle = (start + end) / 2.0;
        let _ = writeln!(
            buffer,
            "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"12\" fill=\"#ffffff\">{category} {percent:.1}%</text>",
            cx + radius * 0.6 * middle.cos(),
            cy + radius * 0.6 * middle.sin(),
        );
        start = end;
    }
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
