//! Issue and pull request comments, including sticky comments.
//!
//! A sticky comment carries an invisible marker derived from a key. Updating
//! a sticky comment edits the existing comment in place instead of posting a
//! new one, so a workflow that runs on every push keeps a single status
//! comment on the pull request.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ForgeError,
    forge::Forge,
    markdown::hidden_comment,
    pagination::{MAX_PAGE_SIZE, Paginator},
    types::{Comment, Repo},
};

/// Lists comments in creation order.
pub async fn list_comments<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    limit: usize,
) -> Result<Vec<Comment>>
where
    F: Forge + ?Sized,
{
    Paginator::new(limit)
        .collect(move |page| forge.list_issue_comments(repo, number, page))
        .await
}

/// Client-side comment filter. Every field that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub author: Option<String>,
    pub body_contains: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl CommentFilter {
    pub fn by_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    pub fn containing(text: impl Into<String>) -> Self {
        Self {
            body_contains: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.author
            .as_ref()
            .is_none_or(|author| &comment.author == author)
            && self
                .body_contains
                .as_ref()
                .is_none_or(|text| comment.body.contains(text.as_str()))
            && self
                .created_after
                .is_none_or(|after| comment.created_at > after)
            && self
                .created_before
                .is_none_or(|before| comment.created_at < before)
    }
}

/// Comments matching `filter`, looking at the first page only.
pub async fn search_comments<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    filter: &CommentFilter,
    limit: usize,
) -> Result<Vec<Comment>>
where
    F: Forge + ?Sized,
{
    Paginator::single_page(limit)
        .collect_filtered(
            move |page| forge.list_issue_comments(repo, number, page),
            |comment: &Comment| filter.matches(comment),
        )
        .await
}

pub async fn create_comment<F>(forge: &F, repo: &Repo, number: u64, body: &str) -> Result<Comment>
where
    F: Forge + ?Sized,
{
    forge.create_comment(repo, number, body).await
}

pub async fn update_comment<F>(
    forge: &F,
    repo: &Repo,
    comment_id: u64,
    body: &str,
) -> Result<Comment>
where
    F: Forge + ?Sized,
{
    forge.update_comment(repo, comment_id, body).await
}

pub async fn delete_comment<F>(forge: &F, repo: &Repo, comment_id: u64) -> Result<()>
where
    F: Forge + ?Sized,
{
    forge.delete_comment(repo, comment_id).await
}

/// The invisible marker identifying the sticky comment for `key`.
pub fn sticky_marker(key: &str) -> String {
    hidden_comment(&format!("ghkit:sticky:{key}"))
}

fn sticky_body(marker: &str, body: &str) -> String {
    format!("{marker}\n{body}")
}

fn require_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ForgeError::validation("Sticky comment key must not be empty").into());
    }
    Ok(())
}

/// Finds the oldest comment carrying the sticky marker for `key`.
pub async fn find_sticky_comment<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    key: &str,
) -> Result<Option<Comment>>
where
    F: Forge + ?Sized,
{
    require_key(key)?;
    let marker = sticky_marker(key);
    let found = Paginator::new(1)
        .with_page_size(MAX_PAGE_SIZE)
        .collect_filtered(
            move |page| forge.list_issue_comments(repo, number, page),
            |comment: &Comment| comment.body.contains(&marker),
        )
        .await?;
    debug!(number, key, found = !found.is_empty(), "Sticky comment lookup");
    Ok(found.into_iter().next())
}

/// What [`upsert_sticky_comment`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "comment", rename_all = "lowercase")]
pub enum StickyOutcome {
    Created(Comment),
    Updated(Comment),
    /// The existing comment already had this body; nothing was written.
    Unchanged(Comment),
}

impl StickyOutcome {
    pub fn comment(&self) -> &Comment {
        match self {
            StickyOutcome::Created(comment)
            | StickyOutcome::Updated(comment)
            | StickyOutcome::Unchanged(comment) => comment,
        }
    }
}

/// Creates or updates the sticky comment for `key` so that its body is
/// `body` preceded by the marker.
pub async fn upsert_sticky_comment<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    key: &str,
    body: &str,
) -> Result<StickyOutcome>
where
    F: Forge + ?Sized,
{
    let full_body = sticky_body(&sticky_marker(key), body);

    match find_sticky_comment(forge, repo, number, key).await? {
        Some(existing) if existing.body == full_body => Ok(StickyOutcome::Unchanged(existing)),
        Some(existing) => {
            let updated = forge.update_comment(repo, existing.id, &full_body).await?;
            Ok(StickyOutcome::Updated(updated))
        }
        None => {
            let created = forge.create_comment(repo, number, &full_body).await?;
            Ok(StickyOutcome::Created(created))
        }
    }
}

/// Deletes the sticky comment for `key`, returning whether one existed.
pub async fn delete_sticky_comment<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    key: &str,
) -> Result<bool>
where
    F: Forge + ?Sized,
{
    match find_sticky_comment(forge, repo, number, key).await? {
        Some(existing) => {
            forge.delete_comment(repo, existing.id).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
