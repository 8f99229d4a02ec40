use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    pagination::PageRequest,
    types::{
        Branch, ChangedFile, Comment, Deployment, DeploymentState, DeploymentStatus, PullRequest,
        Repo,
    },
};

/// Abstraction over the hosting forge's REST API.
///
/// Listing methods return a single page; the helpers in this crate drive
/// them with a [`Paginator`](crate::Paginator). Implementations perform no
/// retries and no caching.
#[async_trait]
pub trait Forge: Send + Sync {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        query: &PullRequestQuery,
        page: PageRequest,
    ) -> Result<Vec<PullRequest>>;

    async fn get_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequest>;

    async fn list_pull_request_files(
        &self,
        repo: &Repo,
        number: u64,
        page: PageRequest,
    ) -> Result<Vec<ChangedFile>>;

    async fn list_issue_comments(
        &self,
        repo: &Repo,
        number: u64,
        page: PageRequest,
    ) -> Result<Vec<Comment>>;

    async fn create_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<Comment>;

    async fn update_comment(&self, repo: &Repo, comment_id: u64, body: &str) -> Result<Comment>;

    async fn delete_comment(&self, repo: &Repo, comment_id: u64) -> Result<()>;

    /// Adds labels and returns every label now on the issue.
    async fn add_labels(&self, repo: &Repo, number: u64, labels: &[String]) -> Result<Vec<String>>;

    /// Removes one label; fails with a not-found error when it is absent.
    async fn remove_label(&self, repo: &Repo, number: u64, label: &str) -> Result<()>;

    async fn list_branches(
        &self,
        repo: &Repo,
        query: &BranchQuery,
        page: PageRequest,
    ) -> Result<Vec<Branch>>;

    async fn get_branch(&self, repo: &Repo, name: &str) -> Result<Branch>;

    async fn list_deployments(
        &self,
        repo: &Repo,
        query: &DeploymentQuery,
        page: PageRequest,
    ) -> Result<Vec<Deployment>>;

    async fn create_deployment(&self, repo: &Repo, request: &NewDeployment) -> Result<Deployment>;

    /// Statuses are returned newest first.
    async fn list_deployment_statuses(
        &self,
        repo: &Repo,
        deployment_id: u64,
        page: PageRequest,
    ) -> Result<Vec<DeploymentStatus>>;

    async fn create_deployment_status(
        &self,
        repo: &Repo,
        deployment_id: u64,
        status: &NewDeploymentStatus,
    ) -> Result<DeploymentStatus>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Created,
    Updated,
    Popularity,
    LongRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Fixed parameters of a pull request listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestQuery {
    pub state: StateFilter,
    /// Base branch name.
    pub base: Option<String>,
    /// Head in `owner:branch` form.
    pub head: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl PullRequestQuery {
    pub fn with_state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    pub fn sorted_by(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchQuery {
    /// Restrict to protected (`Some(true)`) or unprotected branches.
    pub protected: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentQuery {
    pub environment: Option<String>,
    pub git_ref: Option<String>,
    pub sha: Option<String>,
    pub task: Option<String>,
}

impl DeploymentQuery {
    pub fn for_environment(environment: impl Into<String>) -> Self {
        Self {
            environment: Some(environment.into()),
            ..Self::default()
        }
    }
}

/// Body of a deployment creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDeployment {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub environment: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub auto_merge: bool,
    /// `None` keeps the provider default (all contexts required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_contexts: Option<Vec<String>>,
    pub transient_environment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_environment: Option<bool>,
}

impl NewDeployment {
    pub fn new(git_ref: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            environment: environment.into(),
            task: "deploy".to_string(),
            description: None,
            auto_merge: false,
            required_contexts: None,
            transient_environment: false,
            production_environment: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required_contexts(mut self, contexts: Vec<String>) -> Self {
        self.required_contexts = Some(contexts);
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient_environment = true;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.production_environment = Some(production);
        self
    }
}

/// Body of a deployment status creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDeploymentStatus {
    pub state: DeploymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_inactive: Option<bool>,
}

impl NewDeploymentStatus {
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state,
            description: None,
            environment_url: None,
            log_url: None,
            auto_inactive: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_environment_url(mut self, url: impl Into<String>) -> Self {
        self.environment_url = Some(url.into());
        self
    }

    pub fn with_log_url(mut self, url: impl Into<String>) -> Self {
        self.log_url = Some(url.into());
        self
    }

    pub fn with_auto_inactive(mut self, auto_inactive: bool) -> Self {
        self.auto_inactive = Some(auto_inactive);
        self
    }
}
