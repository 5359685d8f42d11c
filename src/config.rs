// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration document describing where issues come from and how they are
//! analyzed.
//!
//! Every value is optional so command-line flags can fill or override it. The
//! resolved values are passed explicitly into the report driver; nothing here
//! is consulted as process-wide state.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Number of labels shown by the overall analysis when not configured.
pub const DEFAULT_TOP_LABELS: usize = 10;
/// Largest accepted number of labels in the top-labels chart.
pub const MAX_TOP_LABELS: usize = 50;

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use issue_insight::{AnalysisConfig, SourceConfig};
///
/// let yaml = r#"
/// source:
///   github:
///     owner: python
///     repository: typeshed
/// user: srittau
/// top_labels: 5
/// "#;
/// let config = issue_insight::parse_config(yaml,).expect("valid configuration",);
/// assert!(matches!(config.source, Some(SourceConfig::Github { .. })));
/// assert_eq!(config.resolved_top_labels(), 5);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig
{
    /// Where issue records are loaded from.
    #[serde(default)]
    pub source: Option<SourceConfig,>,

    /// Target user handed to the loader.
    #[serde(default, alias = "target_user", alias = "target-user")]
    pub user: Option<String,>,

    /// Creator filter applied after loading.
    #[serde(default)]
    pub creator: Option<String,>,

    /// Label filter applied after loading.
    #[serde(default)]
    pub label: Option<String,>,

    /// Directory receiving SVG charts; charts are skipped when unset.
    #[serde(default, alias = "charts-dir", alias = "chartsDir")]
    pub charts_dir: Option<PathBuf,>,

    /// Number of labels in the overall top-labels chart, `1..=50`.
    #[serde(default, alias = "top-labels", deserialize_with = "deserialize_optional_top_labels")]
    pub top_labels: Option<usize,>,
}

/// Issue source selected in the configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig
{
    /// JSON export on disk.
    Json(PathBuf,),
    /// GitHub repository fetched through the API.
    Github
    {
        /// Account owning the repository.
        owner:      String,
        /// Repository name.
        #[serde(alias = "repo")]
        repository: String,
    },
}

impl AnalysisConfig
{
    /// Number of labels for the top-labels chart.
    pub fn resolved_top_labels(&self,) -> usize
    {
        self.top_labels.unwrap_or(DEFAULT_TOP_LABELS,)
    }

    fn validate(&self,) -> Result<(), Error,>
    {
        for (name, value,) in
            [("user", &self.user,), ("creator", &self.creator,), ("label", &self.label,),]
        {
            if value.as_deref().is_some_and(|value| value.trim().is_empty(),) {
                return Err(Error::validation(format!("{name} must not be empty"),),);
            }
        }

        if let Some(SourceConfig::Github {
            owner,
            repository,
        },) = self.source.as_ref()
            && (owner.trim().is_empty() || repository.trim().is_empty())
        {
            return Err(Error::validation("github source requires owner and repository",),);
        }

        Ok((),)
    }
}

/// Loads the configuration from a YAML file.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// decoded, or values violate invariants.
pub fn load_config(path: &Path,) -> Result<AnalysisConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses the configuration from a YAML document string.
///
/// An empty document yields the default configuration.
///
/// # Errors
///
/// Propagates [`Error::Config`](Error::Config) when the YAML cannot be
/// decoded and [`Error::Validation`](Error::Validation) for invalid values.
pub fn parse_config(contents: &str,) -> Result<AnalysisConfig, Error,>
{
    if contents.trim().is_empty() {
        return Ok(AnalysisConfig::default(),);
    }

    let config: AnalysisConfig = serde_yaml::from_str(contents,)?;
    config.validate()?;
    Ok(config,)
}

/// Returns `true` when `count` is an accepted top-labels limit, `1..=50`.
pub fn top_labels_in_range(count: usize,) -> bool
{
    (1..=MAX_TOP_LABELS).contains(&count,)
}

fn deserialize_optional_top_labels<'de, D,>(deserializer: D,) -> Result<Option<usize,>, D::Error,>
where
    D: serde::Deserializer<'de,>,
{
    let value: Option<usize,> = Option::deserialize(deserializer,)?;
    if let Some(count,) = value
        && !top_labels_in_range(count,)
    {
        return Err(serde::de::Error::custom(format!(
            "top_labels must be between 1 and {MAX_TOP_LABELS}"
        ),),);
    }
    Ok(value,)
}
