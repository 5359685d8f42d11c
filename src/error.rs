#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the analytics crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only hard failures live here. Insufficient data for a single metric is not
//! an error and is modelled by [`Metric`](crate::Metric) instead.

use std::path::{Path, PathBuf};

/// Unified error type returned by loaders, the table builder, and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading issue exports or config.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps JSON decoding errors for issue exports.
    #[error("failed to decode issues: {source}")]
    Decode {
        /// Source decoding error from serde_json.
        source: serde_json::Error
    },
    /// Wraps YAML decoding errors for analysis configuration.
    #[error("failed to parse configuration: {source}")]
    Config {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// A required timestamp could not be parsed. Aborts the run.
    #[error("record at index {row}: {field} '{value}' is not a valid timestamp")]
    MalformedTimestamp {
        /// Zero-based position of the offending record.
        row:   usize,
        /// Name of the field, `created_at` or `closed_at`.
        field: &'static str,
        /// Raw value as supplied by the loader.
        value: String
    },
    /// Returned when input or configuration violates invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps I/O errors that occur while writing chart artifacts.
    #[error("failed to write chart at {path:?}: {source}")]
    ChartIo {
        /// Location of the chart being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Returns `true` for failures caused by corrupted input data.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedTimestamp { .. } | Self::Validation { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Decode {
            source
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Config {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::ChartIo`] variant capturing the failing path and
/// source.
///
/// # Parameters
///
/// * `path` - Location of the chart artifact that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn chart_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::ChartIo {
        path: path.to_path_buf(),
        source
    }
}
