//! Pull request listing and search.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    error::ForgeError,
    forge::{Forge, PullRequestQuery, StateFilter},
    labels::has_all_labels,
    pagination::Paginator,
    types::{ChangedFile, PullRequest, Repo},
};

/// Number of items returned by the listing helpers when the caller has no
/// preference.
pub const DEFAULT_LIMIT: usize = 100;

/// Lists pull requests in provider order.
pub async fn list_pull_requests<F>(
    forge: &F,
    repo: &Repo,
    query: &PullRequestQuery,
    limit: usize,
) -> Result<Vec<PullRequest>>
where
    F: Forge + ?Sized,
{
    Paginator::new(limit)
        .collect(move |page| forge.list_pull_requests(repo, query, page))
        .await
}

/// Lists pull requests carrying every one of `labels`.
///
/// Fails before any request when `labels` is empty.
pub async fn find_pull_requests_by_labels<F>(
    forge: &F,
    repo: &Repo,
    labels: &[String],
    query: &PullRequestQuery,
    limit: usize,
) -> Result<Vec<PullRequest>>
where
    F: Forge + ?Sized,
{
    if labels.is_empty() {
        return Err(ForgeError::validation(
            "At least one label is required to find pull requests by label",
        )
        .into());
    }

    Paginator::new(limit)
        .collect_filtered(
            move |page| forge.list_pull_requests(repo, query, page),
            |pr: &PullRequest| has_all_labels(&pr.labels, labels),
        )
        .await
}

/// Client-side criteria for [`search_pull_requests`]. Every criterion that
/// is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestCriteria {
    /// Provider-side state filter; not a criterion on its own.
    pub state: StateFilter,
    pub labels: Vec<String>,
    /// Exact login match.
    pub author: Option<String>,
    pub title_contains: Option<String>,
    pub body_contains: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub draft: Option<bool>,
}

impl PullRequestCriteria {
    pub fn with_state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_title_containing(mut self, text: impl Into<String>) -> Self {
        self.title_contains = Some(text.into());
        self
    }

    pub fn with_body_containing(mut self, text: impl Into<String>) -> Self {
        self.body_contains = Some(text.into());
        self
    }

    pub fn created_after(mut self, instant: DateTime<Utc>) -> Self {
        self.created_after = Some(instant);
        self
    }

    pub fn created_before(mut self, instant: DateTime<Utc>) -> Self {
        self.created_before = Some(instant);
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.author.is_none()
            && self.title_contains.is_none()
            && self.body_contains.is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
            && self.draft.is_none()
    }

    pub fn matches(&self, pr: &PullRequest) -> bool {
        if !has_all_labels(&pr.labels, &self.labels) {
            return false;
        }
        if self.author.as_ref().is_some_and(|author| &pr.author != author) {
            return false;
        }
        if let Some(text) = &self.title_contains
            && !pr.title.contains(text.as_str())
        {
            return false;
        }
        if let Some(text) = &self.body_contains
            && !pr.body.contains(text.as_str())
        {
            return false;
        }
        if self.created_after.is_some_and(|after| pr.created_at <= after) {
            return false;
        }
        if self.created_before.is_some_and(|before| pr.created_at >= before) {
            return false;
        }
        self.draft.is_none_or(|draft| pr.draft == draft)
    }
}

/// Lists pull requests matching all of `criteria`.
///
/// Fails before any request when no criterion is set.
pub async fn search_pull_requests<F>(
    forge: &F,
    repo: &Repo,
    criteria: &PullRequestCriteria,
    limit: usize,
) -> Result<Vec<PullRequest>>
where
    F: Forge + ?Sized,
{
    if criteria.is_empty() {
        return Err(ForgeError::validation(
            "At least one search criterion is required to search pull requests",
        )
        .into());
    }

    let query = PullRequestQuery::default().with_state(criteria.state);
    let query = &query;
    Paginator::new(limit)
        .collect_filtered(
            move |page| forge.list_pull_requests(repo, query, page),
            |pr: &PullRequest| criteria.matches(pr),
        )
        .await
}

/// Finds the open pull request whose head branch is `branch`.
pub async fn find_pull_request_for_branch<F>(
    forge: &F,
    repo: &Repo,
    branch: &str,
) -> Result<Option<PullRequest>>
where
    F: Forge + ?Sized,
{
    let query = PullRequestQuery::default().with_head(format!("{}:{}", repo.owner(), branch));
    let query = &query;
    let mut found = Paginator::single_page(1)
        .collect_filtered(
            move |page| forge.list_pull_requests(repo, query, page),
            |pr: &PullRequest| pr.head_ref == branch,
        )
        .await?;
    Ok(found.pop())
}

pub async fn get_pull_request<F>(forge: &F, repo: &Repo, number: u64) -> Result<PullRequest>
where
    F: Forge + ?Sized,
{
    forge.get_pull_request(repo, number).await
}

/// Files changed by a pull request, from a single request.
pub async fn list_changed_files<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    limit: usize,
) -> Result<Vec<ChangedFile>>
where
    F: Forge + ?Sized,
{
    Paginator::single_page(limit)
        .collect(move |page| forge.list_pull_request_files(repo, number, page))
        .await
}
