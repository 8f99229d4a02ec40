use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    comments::CommentFilter,
    context::RunContext,
    dates::parse_date,
    forge::{BranchQuery, DeploymentQuery, NewDeploymentStatus, PullRequestQuery, StateFilter},
    pulls::PullRequestCriteria,
    types::{DeploymentState, Repo},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");
const DEFAULT_LIMIT: &str = "30";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum StateArg {
    #[default]
    Open,
    Closed,
    All,
}

impl From<StateArg> for StateFilter {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Open => StateFilter::Open,
            StateArg::Closed => StateFilter::Closed,
            StateArg::All => StateFilter::All,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct PrArg {
    /// Pull request (defaults to the pull request of the current workflow run)
    #[arg(short = 'p', long = "pr", value_name = "PR-NUMBER|PR-URL")]
    pub pr: Option<String>,
}

#[derive(Subcommand, Debug)]
enum LabelsCommand {
    /// Add labels to a pull request or issue
    Add {
        #[command(flatten)]
        target: PrArg,

        #[arg(required = true, value_name = "LABEL")]
        labels: Vec<String>,
    },

    /// Remove labels; labels that are not present are skipped
    Remove {
        #[command(flatten)]
        target: PrArg,

        #[arg(required = true, value_name = "LABEL")]
        labels: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// List pull requests
    Prs {
        #[arg(long, value_enum, default_value_t)]
        state: StateArg,

        /// Has label (can specify multiple; all must match)
        #[arg(long, value_name = "NAME")]
        label: Vec<String>,

        /// Exact author match
        #[arg(short = 'a', long, value_name = "USERNAME")]
        author: Option<String>,

        /// Title contains (case-sensitive)
        #[arg(short = 't', long, value_name = "TEXT")]
        title: Option<String>,

        /// Created after (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_name = "DATE", value_parser = parse_date)]
        since: Option<DateTime<Utc>>,

        /// Only draft pull requests
        #[arg(long, conflicts_with = "ready")]
        draft: bool,

        /// Only pull requests ready for review
        #[arg(long)]
        ready: bool,

        /// The open pull request for this head branch
        #[arg(
            long,
            value_name = "BRANCH",
            conflicts_with_all = ["label", "author", "title", "since", "draft", "ready"]
        )]
        head: Option<String>,

        #[arg(short = 'L', long, default_value = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },

    /// List files changed by a pull request
    Files {
        #[command(flatten)]
        target: PrArg,

        #[arg(short = 'L', long, default_value = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },

    /// List comments on a pull request or issue
    Comments {
        #[command(flatten)]
        target: PrArg,

        /// Exact author match
        #[arg(short = 'a', long, value_name = "USERNAME")]
        author: Option<String>,

        /// Body contains (case-sensitive)
        #[arg(long, value_name = "TEXT")]
        contains: Option<String>,

        #[arg(short = 'L', long, default_value = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },

    /// Create, update or delete the sticky comment identified by KEY
    Sticky {
        #[command(flatten)]
        target: PrArg,

        key: String,

        /// Comment body
        #[arg(short = 'b', long, required_unless_present = "delete")]
        body: Option<String>,

        /// Delete the sticky comment instead
        #[arg(long, conflicts_with = "body")]
        delete: bool,
    },

    /// Add or remove labels
    Labels {
        #[command(subcommand)]
        action: LabelsCommand,
    },

    /// List branches
    Branches {
        /// Branch name prefix, e.g. release/
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Only protected branches
        #[arg(long)]
        protected: bool,

        #[arg(short = 'L', long, default_value = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },

    /// Print whether a branch exists
    BranchExists { name: String },

    /// List deployments
    Deployments {
        #[arg(short = 'e', long, value_name = "ENVIRONMENT")]
        environment: Option<String>,

        #[arg(short = 'L', long, default_value = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },

    /// Show the latest status of a deployment, or set a new one with --state
    DeploymentStatus {
        #[arg(value_name = "DEPLOYMENT-ID")]
        id: u64,

        /// error, failure, inactive, in_progress, queued, pending or success
        #[arg(long, value_parser = parse_deployment_state)]
        state: Option<DeploymentState>,

        #[arg(long, requires = "state", value_name = "TEXT")]
        description: Option<String>,

        #[arg(long = "environment-url", requires = "state", value_name = "URL")]
        environment_url: Option<String>,

        #[arg(long = "log-url", requires = "state", value_name = "URL")]
        log_url: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "ghkit",
    about = "GitHub REST helpers for workflow scripts: pull requests, comments, labels, branches and deployments"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub repository in format 'owner/repo' (defaults to GITHUB_REPOSITORY)
    #[arg(short = 'r', long = "repo", global = true, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    #[arg(
        short = 'o',
        long,
        global = true,
        value_enum,
        default_value_t,
        env = "GHKIT_OUTPUT"
    )]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: CliCommand,
}

fn parse_deployment_state(value: &str) -> Result<DeploymentState> {
    value.parse()
}

/// Which pull requests `prs` lists.
#[derive(Debug, Clone, PartialEq)]
pub enum PullRequestSelection {
    All(PullRequestQuery),
    WithLabels(Vec<String>, PullRequestQuery),
    Matching(PullRequestCriteria),
    ForBranch(String),
}

/// A fully resolved command: repository and pull request are known.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PullRequests {
        repo: Repo,
        selection: PullRequestSelection,
        limit: usize,
    },
    Files {
        repo: Repo,
        number: u64,
        limit: usize,
    },
    Comments {
        repo: Repo,
        number: u64,
        filter: CommentFilter,
        limit: usize,
    },
    UpsertSticky {
        repo: Repo,
        number: u64,
        key: String,
        body: String,
    },
    DeleteSticky {
        repo: Repo,
        number: u64,
        key: String,
    },
    AddLabels {
        repo: Repo,
        number: u64,
        labels: Vec<String>,
    },
    RemoveLabels {
        repo: Repo,
        number: u64,
        labels: Vec<String>,
    },
    Branches {
        repo: Repo,
        query: BranchQuery,
        prefix: Option<String>,
        limit: usize,
    },
    BranchExists {
        repo: Repo,
        name: String,
    },
    Deployments {
        repo: Repo,
        query: DeploymentQuery,
        limit: usize,
    },
    LatestDeploymentStatus {
        repo: Repo,
        deployment_id: u64,
    },
    SetDeploymentStatus {
        repo: Repo,
        deployment_id: u64,
        status: NewDeploymentStatus,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub output: OutputFormat,
}

fn parse_repo(value: &str) -> Result<Repo> {
    Repo::parse(value).map_err(|e| anyhow!("Invalid repository format '{}': {}", value, e))
}

fn resolve_repo(explicit: Option<Repo>, context: Option<&RunContext>) -> Result<Repo> {
    match explicit {
        Some(repo) => Ok(repo),
        None => context
            .map(|ctx| ctx.repo().clone())
            .context("No repository given; pass --repo or set GITHUB_REPOSITORY"),
    }
}

fn resolve_target(
    repo: Option<&str>,
    target: &PrArg,
    context: Option<&RunContext>,
) -> Result<(Repo, u64)> {
    let explicit = repo.map(parse_repo).transpose()?;

    match target.pr.as_deref().map(str::trim) {
        Some(pr) if pr.starts_with("https://") => {
            let (url_repo, number) = Repo::parse_url(pr)?;
            let number =
                number.ok_or_else(|| anyhow!("URL must contain '/pull/' or '/issues/' in the path"))?;
            if let Some(expected) = &explicit
                && expected != &url_repo
            {
                bail!(
                    "PR URL {} is from {} but --repo specifies {}",
                    pr,
                    url_repo,
                    expected
                );
            }
            Ok((url_repo, number))
        }
        Some(pr) => {
            let number: u64 = pr
                .parse()
                .with_context(|| format!("Invalid PR number: '{}'", pr))?;
            Ok((resolve_repo(explicit, context)?, number))
        }
        None => {
            let repo = resolve_repo(explicit, context)?;
            let number = context.and_then(RunContext::issue_number).context(
                "No pull request given; pass --pr or run from a pull request or issue event",
            )?;
            Ok((repo, number))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn pull_request_selection(
    state: StateArg,
    labels: Vec<String>,
    author: Option<String>,
    title: Option<String>,
    since: Option<DateTime<Utc>>,
    draft: bool,
    ready: bool,
    head: Option<String>,
) -> PullRequestSelection {
    if let Some(branch) = head {
        return PullRequestSelection::ForBranch(branch);
    }

    let query = PullRequestQuery::default().with_state(state.into());
    let draft = match (draft, ready) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    if author.is_none() && title.is_none() && since.is_none() && draft.is_none() {
        return if labels.is_empty() {
            PullRequestSelection::All(query)
        } else {
            PullRequestSelection::WithLabels(labels, query)
        };
    }

    PullRequestSelection::Matching(PullRequestCriteria {
        state: state.into(),
        labels,
        author,
        title_contains: title,
        created_after: since,
        draft,
        ..PullRequestCriteria::default()
    })
}

fn resolve_command(cli: CliArgs, context: Option<&RunContext>) -> Result<Command> {
    let repo_arg = cli.repo.as_deref();
    let repo = || -> Result<Repo> {
        resolve_repo(repo_arg.map(parse_repo).transpose()?, context)
    };

    let command = match cli.command {
        CliCommand::Prs {
            state,
            label,
            author,
            title,
            since,
            draft,
            ready,
            head,
            limit,
        } => Command::PullRequests {
            repo: repo()?,
            selection: pull_request_selection(
                state, label, author, title, since, draft, ready, head,
            ),
            limit,
        },
        CliCommand::Files { target, limit } => {
            let (repo, number) = resolve_target(repo_arg, &target, context)?;
            Command::Files {
                repo,
                number,
                limit,
            }
        }
        CliCommand::Comments {
            target,
            author,
            contains,
            limit,
        } => {
            let (repo, number) = resolve_target(repo_arg, &target, context)?;
            Command::Comments {
                repo,
                number,
                filter: CommentFilter {
                    author,
                    body_contains: contains,
                    ..CommentFilter::default()
                },
                limit,
            }
        }
        CliCommand::Sticky {
            target,
            key,
            body,
            delete,
        } => {
            let (repo, number) = resolve_target(repo_arg, &target, context)?;
            match body {
                Some(body) if !delete => Command::UpsertSticky {
                    repo,
                    number,
                    key,
                    body,
                },
                _ => Command::DeleteSticky { repo, number, key },
            }
        }
        CliCommand::Labels { action } => match action {
            LabelsCommand::Add { target, labels } => {
                let (repo, number) = resolve_target(repo_arg, &target, context)?;
                Command::AddLabels {
                    repo,
                    number,
                    labels,
                }
            }
            LabelsCommand::Remove { target, labels } => {
                let (repo, number) = resolve_target(repo_arg, &target, context)?;
                Command::RemoveLabels {
                    repo,
                    number,
                    labels,
                }
            }
        },
        CliCommand::Branches {
            prefix,
            protected,
            limit,
        } => Command::Branches {
            repo: repo()?,
            query: BranchQuery {
                protected: protected.then_some(true),
            },
            prefix: prefix.filter(|p| !p.is_empty()),
            limit,
        },
        CliCommand::BranchExists { name } => Command::BranchExists {
            repo: repo()?,
            name,
        },
        CliCommand::Deployments { environment, limit } => Command::Deployments {
            repo: repo()?,
            query: DeploymentQuery {
                environment,
                ..DeploymentQuery::default()
            },
            limit,
        },
        CliCommand::DeploymentStatus {
            id,
            state,
            description,
            environment_url,
            log_url,
        } => match state {
            None => Command::LatestDeploymentStatus {
                repo: repo()?,
                deployment_id: id,
            },
            Some(state) => Command::SetDeploymentStatus {
                repo: repo()?,
                deployment_id: id,
                status: NewDeploymentStatus {
                    state,
                    description,
                    environment_url,
                    log_url,
                    auto_inactive: None,
                },
            },
        },
    };

    Ok(command)
}

/// Parses command-line arguments into a resolved command.
///
/// `--repo` falls back to the run context's repository and `--pr` to the
/// pull request or issue the run was triggered by. Usage errors are
/// returned as `clap::Error` so the caller can choose the exit code.
pub fn parse_args<I, T>(args: I, context: Option<&RunContext>) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    let output = cli.output;
    let command = resolve_command(cli, context)?;
    Ok(Invocation { command, output })
}
