//! REST payload shapes and their projection into the crate's records.
//!
//! Only the fields the helpers use are deserialised; everything else in the
//! provider's response is ignored.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    forge::{BranchQuery, DeploymentQuery, PullRequestQuery, SortDirection, SortKey, StateFilter},
    pagination::PageRequest,
    types::{
        Branch, ChangedFile, Comment, Deployment, DeploymentState, DeploymentStatus, FileStatus,
        PullRequest, PullRequestState,
    },
};

const GHOST_USER: &str = "ghost";

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

fn login(user: Option<ApiUser>) -> String {
    user.map_or_else(|| GHOST_USER.to_string(), |user| user.login)
}

#[derive(Debug, Deserialize)]
pub struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiGitRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: Option<ApiUser>,
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    pub head: ApiGitRef,
    pub base: ApiGitRef,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(pr: ApiPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            author: login(pr.user),
            state: if pr.state == "closed" {
                PullRequestState::Closed
            } else {
                PullRequestState::Open
            },
            draft: pr.draft,
            labels: pr.labels.into_iter().map(|label| label.name).collect(),
            head_ref: pr.head.git_ref,
            base_ref: pr.base.git_ref,
            url: pr.html_url,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiComment {
    pub id: u64,
    pub body: Option<String>,
    pub user: Option<ApiUser>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ApiComment> for Comment {
    fn from(comment: ApiComment) -> Self {
        Comment {
            id: comment.id,
            body: comment.body.unwrap_or_default(),
            author: login(comment.user),
            url: comment.html_url,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiCommitRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiBranch {
    pub name: String,
    pub commit: ApiCommitRef,
    #[serde(default)]
    pub protected: bool,
}

impl From<ApiBranch> for Branch {
    fn from(branch: ApiBranch) -> Self {
        Branch {
            name: branch.name,
            sha: branch.commit.sha,
            protected: branch.protected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiDeployment {
    pub id: u64,
    pub environment: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
    pub task: String,
    pub description: Option<String>,
    pub creator: Option<ApiUser>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiDeployment> for Deployment {
    fn from(deployment: ApiDeployment) -> Self {
        Deployment {
            id: deployment.id,
            environment: deployment.environment,
            git_ref: deployment.git_ref,
            sha: deployment.sha,
            task: deployment.task,
            description: deployment.description.filter(|d| !d.is_empty()),
            creator: login(deployment.creator),
            created_at: deployment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiDeploymentStatus {
    pub id: u64,
    pub state: String,
    pub description: Option<String>,
    pub environment_url: Option<String>,
    pub log_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ApiDeploymentStatus> for DeploymentStatus {
    type Error = anyhow::Error;

    fn try_from(status: ApiDeploymentStatus) -> Result<Self> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Ok(DeploymentStatus {
            id: status.id,
            state: status.state.parse::<DeploymentState>()?,
            description: non_empty(status.description),
            environment_url: non_empty(status.environment_url),
            log_url: non_empty(status.log_url),
            created_at: status.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiChangedFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    pub previous_filename: Option<String>,
}

impl From<ApiChangedFile> for ChangedFile {
    fn from(file: ApiChangedFile) -> Self {
        let status = match file.status.as_str() {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Removed,
            "renamed" => FileStatus::Renamed,
            "copied" => FileStatus::Copied,
            "changed" => FileStatus::Changed,
            "unchanged" => FileStatus::Unchanged,
            _ => FileStatus::Modified,
        };
        ChangedFile {
            filename: file.filename,
            status,
            additions: file.additions,
            deletions: file.deletions,
            changes: file.changes,
            previous_filename: file.previous_filename,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageParams {
    pub page: u32,
    pub per_page: u8,
}

impl From<PageRequest> for PageParams {
    fn from(request: PageRequest) -> Self {
        PageParams {
            page: request.page,
            per_page: request.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestParams<'a> {
    pub state: StateFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<&'a str>,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u8,
}

impl<'a> PullRequestParams<'a> {
    pub fn new(query: &'a PullRequestQuery, page: PageRequest) -> Self {
        PullRequestParams {
            state: query.state,
            base: query.base.as_deref(),
            head: query.head.as_deref(),
            sort: query.sort,
            direction: query.direction,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BranchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    pub page: u32,
    pub per_page: u8,
}

impl BranchParams {
    pub fn new(query: &BranchQuery, page: PageRequest) -> Self {
        BranchParams {
            protected: query.protected,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeploymentParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<&'a str>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<&'a str>,
    pub page: u32,
    pub per_page: u8,
}

impl<'a> DeploymentParams<'a> {
    pub fn new(query: &'a DeploymentQuery, page: PageRequest) -> Self {
        DeploymentParams {
            environment: query.environment.as_deref(),
            git_ref: query.git_ref.as_deref(),
            sha: query.sha.as_deref(),
            task: query.task.as_deref(),
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LabelsBody<'a> {
    pub labels: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_pull_request_payload() {
        let payload = serde_json::json!({
            "number": 7,
            "title": "Add widgets",
            "body": null,
            "user": null,
            "state": "closed",
            "labels": [{ "name": "bug" }, { "name": "ready" }],
            "head": { "ref": "feature/widgets" },
            "base": { "ref": "main" },
            "html_url": "https://github.com/octo/widgets/pull/7",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z",
            "merged_at": "2025-01-02T00:00:00Z"
        });
        let pr: PullRequest = serde_json::from_value::<ApiPullRequest>(payload)
            .unwrap()
            .into();

        assert_eq!(pr.body, "");
        assert_eq!(pr.author, "ghost");
        assert_eq!(pr.state, PullRequestState::Closed);
        assert!(!pr.draft);
        assert_eq!(pr.labels, vec!["bug", "ready"]);
        assert_eq!(pr.head_ref, "feature/widgets");
        assert!(pr.is_merged());
    }

    #[test]
    fn unknown_file_status_reads_as_modified() {
        let file: ChangedFile = serde_json::from_value::<ApiChangedFile>(serde_json::json!({
            "filename": "src/lib.rs",
            "status": "mystery"
        }))
        .unwrap()
        .into();
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.changes, 0);
    }

    #[test]
    fn deployment_status_rejects_unknown_state() {
        let status = serde_json::from_value::<ApiDeploymentStatus>(serde_json::json!({
            "id": 1,
            "state": "exploded",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(DeploymentStatus::try_from(status).is_err());
    }
}
