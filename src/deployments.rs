//! Deployments and their status transitions.

use anyhow::Result;
use tracing::debug;

use crate::{
    error::ForgeError,
    forge::{DeploymentQuery, Forge, NewDeployment, NewDeploymentStatus},
    pagination::Paginator,
    types::{Deployment, DeploymentState, DeploymentStatus, Repo},
};

/// Lists deployments, newest first.
pub async fn list_deployments<F>(
    forge: &F,
    repo: &Repo,
    query: &DeploymentQuery,
    limit: usize,
) -> Result<Vec<Deployment>>
where
    F: Forge + ?Sized,
{
    Paginator::new(limit)
        .collect(move |page| forge.list_deployments(repo, query, page))
        .await
}

pub async fn create_deployment<F>(
    forge: &F,
    repo: &Repo,
    request: &NewDeployment,
) -> Result<Deployment>
where
    F: Forge + ?Sized,
{
    if request.environment.trim().is_empty() {
        return Err(ForgeError::validation("Deployment environment must not be empty").into());
    }
    forge.create_deployment(repo, request).await
}

pub async fn set_deployment_status<F>(
    forge: &F,
    repo: &Repo,
    deployment_id: u64,
    status: &NewDeploymentStatus,
) -> Result<DeploymentStatus>
where
    F: Forge + ?Sized,
{
    debug!(%repo, deployment_id, state = %status.state, "Setting deployment status");
    forge
        .create_deployment_status(repo, deployment_id, status)
        .await
}

/// The most recent status of a deployment, if any.
pub async fn latest_deployment_status<F>(
    forge: &F,
    repo: &Repo,
    deployment_id: u64,
) -> Result<Option<DeploymentStatus>>
where
    F: Forge + ?Sized,
{
    let mut statuses = Paginator::single_page(1)
        .collect(move |page| forge.list_deployment_statuses(repo, deployment_id, page))
        .await?;
    Ok(statuses.pop())
}

/// Marks every deployment to `environment` except `keep` as inactive and
/// returns the ids that were transitioned.
///
/// Deployments are processed one at a time; the first failure stops the
/// batch.
pub async fn deactivate_deployments<F>(
    forge: &F,
    repo: &Repo,
    environment: &str,
    keep: Option<u64>,
    limit: usize,
) -> Result<Vec<u64>>
where
    F: Forge + ?Sized,
{
    if environment.trim().is_empty() {
        return Err(ForgeError::validation("Deployment environment must not be empty").into());
    }

    let query = DeploymentQuery::for_environment(environment);
    let query = &query;
    let stale = Paginator::new(limit)
        .collect_filtered(
            move |page| forge.list_deployments(repo, query, page),
            |deployment: &Deployment| Some(deployment.id) != keep,
        )
        .await?;

    let inactive = NewDeploymentStatus::new(DeploymentState::Inactive);
    let mut deactivated = Vec::with_capacity(stale.len());
    for deployment in stale {
        forge
            .create_deployment_status(repo, deployment.id, &inactive)
            .await?;
        deactivated.push(deployment.id);
    }

    debug!(%repo, environment, count = deactivated.len(), "Deactivated deployments");
    Ok(deactivated)
}
