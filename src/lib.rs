//! ghkit: GitHub REST helpers for automation scripts.
//!
//! Every listing goes through one bounded page collector, the
//! [`Paginator`], which requests fixed-size pages from a [`Forge`], applies
//! an optional client-side predicate and stops at the requested limit or at
//! the end of the data. On top of it sit helpers for pull requests,
//! comments (including sticky comments), labels, branches and deployments,
//! plus formatting utilities and the CI run context.

pub mod branches;
pub mod cli;
pub mod commands;
pub mod comments;
pub mod context;
pub mod dates;
pub mod deployments;
pub mod error;
pub mod forge;
pub mod github;
pub mod labels;
pub mod markdown;
pub mod pagination;
pub mod pulls;
mod rest;
pub mod text;
pub mod types;

pub use cli::{Command, Invocation, OutputFormat, PullRequestSelection, parse_args};
pub use commands::{CommandOutput, execute};
pub use comments::{CommentFilter, StickyOutcome};
pub use context::RunContext;
pub use error::{ForgeError, is_not_found, is_validation};
pub use forge::{
    BranchQuery, DeploymentQuery, Forge, NewDeployment, NewDeploymentStatus, PullRequestQuery,
    SortDirection, SortKey, StateFilter,
};
pub use github::GitHub;
pub use labels::LabelRemoval;
pub use pagination::{MAX_PAGE_SIZE, PageRequest, Paginator};
pub use pulls::PullRequestCriteria;
pub use types::{
    Branch, ChangedFile, Comment, Deployment, DeploymentState, DeploymentStatus, FileStatus,
    PullRequest, PullRequestState, Repo, RepoError,
};
