// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Loads issues of a GitHub repository through the REST API.
///
/// Pull requests returned by the issues endpoint are skipped. Pages are
/// fetched sequentially with retries; the async client runs on a private
/// current-thread runtime so callers stay synchronous.
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use masterror::AppError;
use octocrab::{Octocrab, Page, models, params};
use tracing::{debug, info};

use crate::{
    error::Error,
    loader::DataLoader,
    model::{IssueRecord, IssueState},
    retry::{RetryConfig, retry_with_backoff},
};

const PER_PAGE: u8 = 100;
const DEFAULT_MAX_PAGES: u32 = 50;

/// [`DataLoader`] backed by the GitHub issues API.
#[derive(Debug, Clone,)]
pub struct GitHubLoader
{
    owner:      String,
    repository: String,
    token:      Option<String,>,
    retry:      RetryConfig,
    max_pages:  u32,
}

impl GitHubLoader
{
    /// Creates an anonymous loader for `owner/repository`.
    pub fn new(owner: impl Into<String,>, repository: impl Into<String,>,) -> Self
    {
        Self {
            owner:      owner.into(),
            repository: repository.into(),
            token:      None,
            retry:      RetryConfig::default(),
            max_pages:  DEFAULT_MAX_PAGES,
        }
    }

    /// Parses an `owner/repository` slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when either part is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_insight::GitHubLoader;
    ///
    /// let loader = GitHubLoader::from_slug("python/typeshed",)?;
    /// assert_eq!(loader.slug(), "python/typeshed");
    /// assert!(GitHubLoader::from_slug("typeshed",).is_err());
    /// # Ok::<(), issue_insight::Error>(())
    /// ```
    pub fn from_slug(slug: &str,) -> Result<Self, Error,>
    {
        match slug.trim().split_once('/',) {
            Some((owner, repository,),)
                if !owner.is_empty() && !repository.is_empty() && !repository.contains('/',) =>
            {
                Ok(Self::new(owner, repository,),)
            }
            _ => Err(Error::validation(format!(
                "repository '{slug}' must use the owner/repository form"
            ),),),
        }
    }

    /// Authenticates requests with a personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String,>,) -> Self
    {
        self.token = Some(token.into(),);
        self
    }

    /// Overrides the retry policy for page requests.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig,) -> Self
    {
        self.retry = retry;
        self
    }

    /// Limits the number of pages fetched.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32,) -> Self
    {
        self.max_pages = max_pages.max(1,);
        self
    }

    /// Repository in `owner/repository` form.
    pub fn slug(&self,) -> String
    {
        format!("{}/{}", self.owner, self.repository)
    }

    async fn fetch(&self, user: Option<&str,>,) -> Result<Vec<IssueRecord,>, AppError,>
    {
        let mut builder = Octocrab::builder();
        if let Some(token,) = self.token.as_ref() {
            builder = builder.personal_token(token.clone(),);
        }
        let octocrab = builder.build().map_err(|e| {
            AppError::unauthorized(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
                .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
        );

        let slug = self.slug();
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            pb.set_message(format!("Fetching issues page {page} of {slug}..."),);
            debug!("Fetching issues page {} of {}", page, slug);

            let issues: Page<models::issues::Issue,> = retry_with_backoff(
                &self.retry,
                &format!("issues page {page} of {slug}"),
                || {
                    let octocrab = octocrab.clone();
                    let owner = self.owner.clone();
                    let repository = self.repository.clone();
                    let creator = user.map(str::to_owned,);
                    async move {
                        let handler = octocrab.issues(owner, repository,);
                        let mut request =
                            handler.list().state(params::State::All,).per_page(PER_PAGE,).page(page,);
                        if let Some(creator,) = creator {
                            request = request.creator(creator,);
                        }
                        request.send().await.map_err(|e| {
                            AppError::service(format!("GitHub issue listing failed: {e}"),)
                        },)
                    }
                },
            )
            .await?;

            let has_next = issues.next.is_some();
            let fetched = issues.items.len();
            records.extend(issues.items.iter().filter_map(record_from_issue,),);

            if fetched == 0 || !has_next || page >= self.max_pages {
                break;
            }
            page += 1;
        }

        pb.finish_and_clear();
        info!("Fetched {} issues from {}", records.len(), slug);
        Ok(records,)
    }
}

impl DataLoader for GitHubLoader
{
    fn load_issues(&self, user: Option<&str,>,) -> Result<Vec<IssueRecord,>, Error,>
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::service(format!("failed to start async runtime: {e}"),),)?;

        Ok(runtime.block_on(self.fetch(user,),)?,)
    }
}

fn record_from_issue(issue: &models::issues::Issue,) -> Option<IssueRecord,>
{
    if issue.pull_request.is_some() {
        return None;
    }

    let closed = matches!(issue.state, models::IssueState::Closed);
    Some(build_record(
        &issue.user.login,
        issue.labels.iter().map(|label| label.name.as_str(),),
        closed,
        issue.created_at,
        issue.closed_at,
    ),)
}

fn build_record<'a,>(
    creator: &str,
    labels: impl Iterator<Item = &'a str,>,
    closed: bool,
    created_at: DateTime<Utc,>,
    closed_at: Option<DateTime<Utc,>,>,
) -> IssueRecord
{
    IssueRecord {
        creator:    creator.to_owned(),
        labels:     Some(labels.map(str::to_owned,).collect(),),
        state:      Some(if closed { IssueState::Closed } else { IssueState::Open },),
        created_at: created_at.to_rfc3339(),
        closed_at:  closed_at.map(|value| value.to_rfc3339(),),
    }
}
