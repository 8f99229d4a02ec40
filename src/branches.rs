use anyhow::Result;

use crate::{
    error::is_not_found,
    forge::{BranchQuery, Forge},
    pagination::Paginator,
    types::{Branch, Repo},
};

pub async fn list_branches<F>(
    forge: &F,
    repo: &Repo,
    query: &BranchQuery,
    limit: usize,
) -> Result<Vec<Branch>>
where
    F: Forge + ?Sized,
{
    Paginator::new(limit)
        .collect(move |page| forge.list_branches(repo, query, page))
        .await
}

/// Branches whose name starts with `prefix`, e.g. `release/`.
pub async fn list_branches_with_prefix<F>(
    forge: &F,
    repo: &Repo,
    query: &BranchQuery,
    prefix: &str,
    limit: usize,
) -> Result<Vec<Branch>>
where
    F: Forge + ?Sized,
{
    Paginator::new(limit)
        .collect_filtered(
            move |page| forge.list_branches(repo, query, page),
            |branch: &Branch| branch.name.starts_with(prefix),
        )
        .await
}

/// Whether `name` exists; any failure other than not-found is returned.
pub async fn branch_exists<F>(forge: &F, repo: &Repo, name: &str) -> Result<bool>
where
    F: Forge + ?Sized,
{
    match forge.get_branch(repo, name).await {
        Ok(_) => Ok(true),
        Err(error) if is_not_found(&error) => Ok(false),
        Err(error) => Err(error),
    }
}

/// Whether `name` has branch protection enabled. A missing branch is an
/// error.
pub async fn is_branch_protected<F>(forge: &F, repo: &Repo, name: &str) -> Result<bool>
where
    F: Forge + ?Sized,
{
    Ok(forge.get_branch(repo, name).await?.protected)
}
