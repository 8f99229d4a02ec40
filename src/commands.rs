//! Runs a resolved [`Command`] against a [`Forge`].

use anyhow::Result;
use serde::Serialize;

use crate::{
    branches, comments,
    cli::{Command, PullRequestSelection},
    comments::StickyOutcome,
    deployments,
    forge::Forge,
    labels::{self, LabelRemoval},
    pulls,
    types::{Branch, ChangedFile, Comment, Deployment, DeploymentStatus, PullRequest, Repo},
};

/// What a command produced. Serialises to the bare payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    PullRequests(Vec<PullRequest>),
    Files(Vec<ChangedFile>),
    Comments(Vec<Comment>),
    Sticky(StickyOutcome),
    StickyDeleted { deleted: bool },
    Labels { labels: Vec<String> },
    LabelRemoval(LabelRemoval),
    Branches(Vec<Branch>),
    BranchExists { name: String, exists: bool },
    Deployments(Vec<Deployment>),
    DeploymentStatus(Option<DeploymentStatus>),
}

async fn select_pull_requests<F>(
    forge: &F,
    repo: &Repo,
    selection: &PullRequestSelection,
    limit: usize,
) -> Result<Vec<PullRequest>>
where
    F: Forge + ?Sized,
{
    match selection {
        PullRequestSelection::All(query) => {
            pulls::list_pull_requests(forge, repo, query, limit).await
        }
        PullRequestSelection::WithLabels(labels, query) => {
            pulls::find_pull_requests_by_labels(forge, repo, labels, query, limit).await
        }
        PullRequestSelection::Matching(criteria) => {
            pulls::search_pull_requests(forge, repo, criteria, limit).await
        }
        PullRequestSelection::ForBranch(branch) => Ok(pulls::find_pull_request_for_branch(
            forge, repo, branch,
        )
        .await?
        .into_iter()
        .collect()),
    }
}

pub async fn execute<F>(command: &Command, forge: &F) -> Result<CommandOutput>
where
    F: Forge + ?Sized,
{
    let output = match command {
        Command::PullRequests {
            repo,
            selection,
            limit,
        } => CommandOutput::PullRequests(
            select_pull_requests(forge, repo, selection, *limit).await?,
        ),
        Command::Files {
            repo,
            number,
            limit,
        } => CommandOutput::Files(pulls::list_changed_files(forge, repo, *number, *limit).await?),
        Command::Comments {
            repo,
            number,
            filter,
            limit,
        } => {
            let found = if *filter == comments::CommentFilter::default() {
                comments::list_comments(forge, repo, *number, *limit).await?
            } else {
                comments::search_comments(forge, repo, *number, filter, *limit).await?
            };
            CommandOutput::Comments(found)
        }
        Command::UpsertSticky {
            repo,
            number,
            key,
            body,
        } => CommandOutput::Sticky(
            comments::upsert_sticky_comment(forge, repo, *number, key, body).await?,
        ),
        Command::DeleteSticky { repo, number, key } => CommandOutput::StickyDeleted {
            deleted: comments::delete_sticky_comment(forge, repo, *number, key).await?,
        },
        Command::AddLabels {
            repo,
            number,
            labels,
        } => CommandOutput::Labels {
            labels: labels::add_labels(forge, repo, *number, labels).await?,
        },
        Command::RemoveLabels {
            repo,
            number,
            labels,
        } => CommandOutput::LabelRemoval(
            labels::remove_labels(forge, repo, *number, labels).await?,
        ),
        Command::Branches {
            repo,
            query,
            prefix,
            limit,
        } => {
            let found = match prefix {
                Some(prefix) => {
                    branches::list_branches_with_prefix(forge, repo, query, prefix, *limit).await?
                }
                None => branches::list_branches(forge, repo, query, *limit).await?,
            };
            CommandOutput::Branches(found)
        }
        Command::BranchExists { repo, name } => CommandOutput::BranchExists {
            name: name.clone(),
            exists: branches::branch_exists(forge, repo, name).await?,
        },
        Command::Deployments { repo, query, limit } => CommandOutput::Deployments(
            deployments::list_deployments(forge, repo, query, *limit).await?,
        ),
        Command::LatestDeploymentStatus {
            repo,
            deployment_id,
        } => CommandOutput::DeploymentStatus(
            deployments::latest_deployment_status(forge, repo, *deployment_id).await?,
        ),
        Command::SetDeploymentStatus {
            repo,
            deployment_id,
            status,
        } => CommandOutput::DeploymentStatus(Some(
            deployments::set_deployment_status(forge, repo, *deployment_id, status).await?,
        )),
    };

    Ok(output)
}
