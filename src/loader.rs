// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Sources of raw issue records.
//!
//! A [`DataLoader`] returns records for an optional target user; the analyses
//! never learn how the data was fetched.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    error::{self, Error},
    model::IssueRecord,
};

/// Input collaborator producing raw issue records.
pub trait DataLoader
{
    /// Loads all records, restricted to issues opened by `user` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the underlying source cannot be read or decoded.
    fn load_issues(&self, user: Option<&str,>,) -> Result<Vec<IssueRecord,>, Error,>;
}

/// Loads a JSON array of issue records from disk.
///
/// # Example
///
/// ```no_run
/// use issue_insight::{DataLoader, JsonFileLoader};
///
/// # fn example() -> Result<(), issue_insight::Error> {
/// let loader = JsonFileLoader::new("data/issues.json",);
/// let records = loader.load_issues(Some("octocat",),)?;
/// println!("{} issues", records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct JsonFileLoader
{
    path: PathBuf,
}

impl JsonFileLoader
{
    /// Creates a loader reading from `path`.
    pub fn new(path: impl Into<PathBuf,>,) -> Self
    {
        Self {
            path: path.into(),
        }
    }

    /// Location of the export.
    pub fn path(&self,) -> &Path
    {
        &self.path
    }
}

impl DataLoader for JsonFileLoader
{
    fn load_issues(&self, user: Option<&str,>,) -> Result<Vec<IssueRecord,>, Error,>
    {
        debug!("Reading issues from {}", self.path.display());
        let contents =
            fs::read_to_string(&self.path,).map_err(|source| error::io_error(&self.path, source,),)?;
        let records = parse_records(&contents,)?;
        let records = retain_user(records, user,);
        info!("Loaded {} issues from {}", records.len(), self.path.display());
        Ok(records,)
    }
}

/// Loader over records already held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct StaticLoader
{
    records: Vec<IssueRecord,>,
}

impl StaticLoader
{
    /// Wraps `records`.
    pub fn new(records: Vec<IssueRecord,>,) -> Self
    {
        Self {
            records,
        }
    }
}

impl DataLoader for StaticLoader
{
    fn load_issues(&self, user: Option<&str,>,) -> Result<Vec<IssueRecord,>, Error,>
    {
        Ok(retain_user(self.records.clone(), user,),)
    }
}

/// Decodes a JSON array of issue records.
///
/// # Errors
///
/// Returns [`Error::Decode`](Error::Decode) when the document is not an array
/// of records.
pub fn parse_records(contents: &str,) -> Result<Vec<IssueRecord,>, Error,>
{
    Ok(serde_json::from_str(contents,)?,)
}

pub(crate) fn retain_user(records: Vec<IssueRecord,>, user: Option<&str,>,) -> Vec<IssueRecord,>
{
    match user {
        Some(user,) => records.into_iter().filter(|record| record.creator == user,).collect(),
        None => records,
    }
}
