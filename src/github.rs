use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, models::CommentId};
use tracing::debug;

use crate::{
    error::map_octocrab_error,
    forge::{
        BranchQuery, DeploymentQuery, Forge, NewDeployment, NewDeploymentStatus, PullRequestQuery,
    },
    pagination::PageRequest,
    rest::{
        ApiBranch, ApiChangedFile, ApiComment, ApiDeployment, ApiDeploymentStatus, ApiLabel,
        ApiPullRequest, BranchParams, CommentBody, DeploymentParams, LabelsBody, PageParams,
        PullRequestParams,
    },
    types::{Branch, ChangedFile, Comment, Deployment, DeploymentStatus, PullRequest, Repo},
};

/// Looks up a token in `GITHUB_TOKEN`, then `GH_TOKEN`, then `gh auth token`.
pub fn get_github_token() -> Result<String> {
    // Environment first: Actions runners set GITHUB_TOKEN and have no gh login.
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(var)
            && !token.trim().is_empty()
        {
            return Ok(token);
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("No GITHUB_TOKEN or GH_TOKEN set and the gh CLI could not be run")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// [`Forge`] implementation backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a client for `token`, optionally against a non-default API
    /// base such as a GitHub Enterprise `https://host/api/v3`.
    pub fn with_token(token: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(base_url) = base_url {
            builder = builder
                .base_uri(base_url.trim_end_matches('/').to_string())
                .with_context(|| format!("Invalid GitHub API URL: '{}'", base_url))?;
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        Ok(Self::new(client))
    }

    /// Creates an authenticated client from the environment, honouring
    /// `GITHUB_API_URL`.
    pub fn from_env() -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        let base_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self::with_token(token, base_url.as_deref())
    }

    async fn get_page<T, P>(&self, operation: &str, route: String, params: &P) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
        P: serde::Serialize + Sync,
    {
        debug!(operation, %route, "GET");
        self.client
            .get::<Vec<T>, _, _>(route, Some(params))
            .await
            .map_err(|error| map_octocrab_error(operation, error))
    }

    async fn get_one<T>(&self, operation: &str, route: String) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(operation, %route, "GET");
        self.client
            .get::<T, _, _>(route, None::<&()>)
            .await
            .map_err(|error| map_octocrab_error(operation, error))
    }

    async fn post_json<T, B>(&self, operation: &str, route: String, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        debug!(operation, %route, "POST");
        let created: Result<T, octocrab::Error> = self.client.post(route, Some(body)).await;
        created.map_err(|error| map_octocrab_error(operation, error))
    }
}

fn repo_route(repo: &Repo, rest: &str) -> String {
    format!("/repos/{}/{}/{}", repo.owner(), repo.name(), rest)
}

#[async_trait]
impl Forge for GitHub {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        query: &PullRequestQuery,
        page: PageRequest,
    ) -> Result<Vec<PullRequest>> {
        let pulls: Vec<ApiPullRequest> = self
            .get_page(
                "list pull requests",
                repo_route(repo, "pulls"),
                &PullRequestParams::new(query, page),
            )
            .await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn get_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequest> {
        let operation = format!("pull request #{number} in {repo}");
        let pull: ApiPullRequest = self
            .get_one(&operation, repo_route(repo, &format!("pulls/{number}")))
            .await?;
        Ok(pull.into())
    }

    async fn list_pull_request_files(
        &self,
        repo: &Repo,
        number: u64,
        page: PageRequest,
    ) -> Result<Vec<ChangedFile>> {
        let files: Vec<ApiChangedFile> = self
            .get_page(
                "list pull request files",
                repo_route(repo, &format!("pulls/{number}/files")),
                &PageParams::from(page),
            )
            .await?;
        Ok(files.into_iter().map(ChangedFile::from).collect())
    }

    async fn list_issue_comments(
        &self,
        repo: &Repo,
        number: u64,
        page: PageRequest,
    ) -> Result<Vec<Comment>> {
        let comments: Vec<ApiComment> = self
            .get_page(
                "list issue comments",
                repo_route(repo, &format!("issues/{number}/comments")),
                &PageParams::from(page),
            )
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    async fn create_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<Comment> {
        let comment: ApiComment = self
            .post_json(
                "create comment",
                repo_route(repo, &format!("issues/{number}/comments")),
                &CommentBody { body },
            )
            .await?;
        Ok(comment.into())
    }

    async fn update_comment(&self, repo: &Repo, comment_id: u64, body: &str) -> Result<Comment> {
        let route = repo_route(repo, &format!("issues/comments/{comment_id}"));
        debug!(operation = "update comment", %route, "PATCH");
        let comment: ApiComment = self
            .client
            .patch(route, Some(&CommentBody { body }))
            .await
            .map_err(|error| map_octocrab_error(&format!("comment {comment_id}"), error))?;
        Ok(comment.into())
    }

    async fn delete_comment(&self, repo: &Repo, comment_id: u64) -> Result<()> {
        debug!(operation = "delete comment", comment_id, %repo, "DELETE");
        self.client
            .issues(repo.owner(), repo.name())
            .delete_comment(CommentId(comment_id))
            .await
            .map_err(|error| map_octocrab_error(&format!("comment {comment_id}"), error))
    }

    async fn add_labels(&self, repo: &Repo, number: u64, labels: &[String]) -> Result<Vec<String>> {
        let current: Vec<ApiLabel> = self
            .post_json(
                "add labels",
                repo_route(repo, &format!("issues/{number}/labels")),
                &LabelsBody { labels },
            )
            .await?;
        Ok(current.into_iter().map(|label| label.name).collect())
    }

    async fn remove_label(&self, repo: &Repo, number: u64, label: &str) -> Result<()> {
        debug!(operation = "remove label", number, label, %repo, "DELETE");
        self.client
            .issues(repo.owner(), repo.name())
            .remove_label(number, label)
            .await
            .map(|_| ())
            .map_err(|error| map_octocrab_error(&format!("label '{label}' on #{number}"), error))
    }

    async fn list_branches(
        &self,
        repo: &Repo,
        query: &BranchQuery,
        page: PageRequest,
    ) -> Result<Vec<Branch>> {
        let branches: Vec<ApiBranch> = self
            .get_page(
                "list branches",
                repo_route(repo, "branches"),
                &BranchParams::new(query, page),
            )
            .await?;
        Ok(branches.into_iter().map(Branch::from).collect())
    }

    async fn get_branch(&self, repo: &Repo, name: &str) -> Result<Branch> {
        let branch: ApiBranch = self
            .get_one(
                &format!("branch '{name}' in {repo}"),
                repo_route(repo, &format!("branches/{}", urlencoding::encode(name))),
            )
            .await?;
        Ok(branch.into())
    }

    async fn list_deployments(
        &self,
        repo: &Repo,
        query: &DeploymentQuery,
        page: PageRequest,
    ) -> Result<Vec<Deployment>> {
        let deployments: Vec<ApiDeployment> = self
            .get_page(
                "list deployments",
                repo_route(repo, "deployments"),
                &DeploymentParams::new(query, page),
            )
            .await?;
        Ok(deployments.into_iter().map(Deployment::from).collect())
    }

    async fn create_deployment(&self, repo: &Repo, request: &NewDeployment) -> Result<Deployment> {
        let deployment: ApiDeployment = self
            .post_json("create deployment", repo_route(repo, "deployments"), request)
            .await?;
        Ok(deployment.into())
    }

    async fn list_deployment_statuses(
        &self,
        repo: &Repo,
        deployment_id: u64,
        page: PageRequest,
    ) -> Result<Vec<DeploymentStatus>> {
        let statuses: Vec<ApiDeploymentStatus> = self
            .get_page(
                "list deployment statuses",
                repo_route(repo, &format!("deployments/{deployment_id}/statuses")),
                &PageParams::from(page),
            )
            .await?;
        statuses.into_iter().map(DeploymentStatus::try_from).collect()
    }

    async fn create_deployment_status(
        &self,
        repo: &Repo,
        deployment_id: u64,
        status: &NewDeploymentStatus,
    ) -> Result<DeploymentStatus> {
        let created: ApiDeploymentStatus = self
            .post_json(
                "create deployment status",
                repo_route(repo, &format!("deployments/{deployment_id}/statuses")),
                status,
            )
            .await?;
        created.try_into()
    }
}
