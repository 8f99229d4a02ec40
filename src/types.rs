use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Reasons a repository identifier is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
    #[error("invalid character in '{0}' (only letters, digits, '.', '-' and '_' allowed)")]
    InvalidCharacter(String),
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
    #[error("not a GitHub repository URL: '{0}'")]
    InvalidUrl(String),
}

/// A repository on the forge, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();

        if owner.is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.is_empty() {
            return Err(RepoError::EmptyName);
        }
        for part in [&owner, &name] {
            if !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            {
                return Err(RepoError::InvalidCharacter(part.clone()));
            }
        }

        Ok(Self { owner, name })
    }

    /// Parses `owner/repo`.
    pub fn parse(value: &str) -> Result<Self, RepoError> {
        let Some((owner, name)) = value.trim().split_once('/') else {
            return Err(RepoError::InvalidFormat(value.to_string()));
        };
        if name.contains('/') {
            return Err(RepoError::InvalidFormat(value.to_string()));
        }
        Self::new(owner, name)
    }

    /// Parses a repository or pull request URL such as
    /// `https://github.com/owner/repo/pull/123`, returning the pull request
    /// number when the URL names one.
    pub fn parse_url(value: &str) -> Result<(Self, Option<u64>), RepoError> {
        let invalid = || RepoError::InvalidUrl(value.to_string());
        let url = url::Url::parse(value).map_err(|_| invalid())?;
        if url.host_str().is_none() {
            return Err(invalid());
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [owner, name] => Ok((Self::new(*owner, *name)?, None)),
            [owner, name, "pull" | "issues", number, ..] => {
                let number = number.parse().map_err(|_| invalid())?;
                Ok((Self::new(*owner, *name)?, Some(number)))
            }
            [owner, name, ..] => Ok((Self::new(*owner, *name)?, None)),
            _ => Err(invalid()),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repo {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
        }
    }
}

/// Pull request fields the helpers work with, projected from the provider
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub state: PullRequestState,
    pub draft: bool,
    pub labels: Vec<String>,
    pub head_ref: String,
    pub base_ref: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

/// An issue or pull request conversation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub sha: String,
    pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub id: u64,
    pub environment: String,
    pub git_ref: String,
    pub sha: String,
    pub task: String,
    pub description: Option<String>,
    pub creator: String,
    pub created_at: DateTime<Utc>,
}

/// States a deployment status can be set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    Pending,
    Success,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Error => "error",
            DeploymentState::Failure => "failure",
            DeploymentState::Inactive => "inactive",
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Queued => "queued",
            DeploymentState::Pending => "pending",
            DeploymentState::Success => "success",
        }
    }

    /// Whether no further transition is expected from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Error
                | DeploymentState::Failure
                | DeploymentState::Inactive
                | DeploymentState::Success
        )
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "error" => Ok(DeploymentState::Error),
            "failure" => Ok(DeploymentState::Failure),
            "inactive" => Ok(DeploymentState::Inactive),
            "in_progress" => Ok(DeploymentState::InProgress),
            "queued" => Ok(DeploymentState::Queued),
            "pending" => Ok(DeploymentState::Pending),
            "success" => Ok(DeploymentState::Success),
            _ => anyhow::bail!(
                "Unknown deployment state '{}'. Expected one of: error, failure, inactive, in_progress, queued, pending, success",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentStatus {
    pub id: u64,
    pub state: DeploymentState,
    pub description: Option<String>,
    pub environment_url: Option<String>,
    pub log_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Removed => "removed",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        }
    }
}

/// A file touched by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub previous_filename: Option<String>,
}
