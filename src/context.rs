//! The CI run context, read from the environment a GitHub Actions runner
//! provides.
//!
//! `GITHUB_REPOSITORY` is required; every other variable is optional so the
//! helpers also work when a script is run by hand with only that set.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::types::Repo;

const DEFAULT_SERVER_URL: &str = "https://github.com";

#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    repo: Repo,
    event_name: Option<String>,
    sha: Option<String>,
    git_ref: Option<String>,
    head_ref: Option<String>,
    base_ref: Option<String>,
    actor: Option<String>,
    run_id: Option<u64>,
    server_url: String,
    event: Value,
}

impl RunContext {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the context from an arbitrary variable source.
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let repository = var("GITHUB_REPOSITORY").context("GITHUB_REPOSITORY is not set")?;
        let repo = Repo::parse(&repository)
            .with_context(|| format!("Invalid GITHUB_REPOSITORY '{}'", repository))?;

        let run_id = var("GITHUB_RUN_ID")
            .map(|id| {
                id.parse::<u64>()
                    .with_context(|| format!("Invalid GITHUB_RUN_ID '{}'", id))
            })
            .transpose()?;

        let event = match var("GITHUB_EVENT_PATH") {
            Some(path) => load_event(Path::new(&path))?,
            None => Value::Null,
        };

        Ok(Self {
            repo,
            event_name: var("GITHUB_EVENT_NAME"),
            sha: var("GITHUB_SHA"),
            git_ref: var("GITHUB_REF"),
            head_ref: var("GITHUB_HEAD_REF"),
            base_ref: var("GITHUB_BASE_REF"),
            actor: var("GITHUB_ACTOR"),
            run_id,
            server_url: var("GITHUB_SERVER_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            event,
        })
    }

    /// Replaces the event payload.
    pub fn with_event(mut self, event: Value) -> Self {
        self.event = event;
        self
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// The full ref, e.g. `refs/heads/main`.
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn run_id(&self) -> Option<u64> {
        self.run_id
    }

    /// The raw event payload, `Null` when none was loaded.
    pub fn event(&self) -> &Value {
        &self.event
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(
            self.event_name.as_deref(),
            Some("pull_request" | "pull_request_target" | "pull_request_review")
        ) || self.event.get("pull_request").is_some()
    }

    /// The issue or pull request the event is about.
    pub fn issue_number(&self) -> Option<u64> {
        ["pull_request", "issue"]
            .iter()
            .find_map(|key| self.event.get(key)?.get("number")?.as_u64())
            .or_else(|| self.event.get("number")?.as_u64())
    }

    /// The pull request's head branch.
    pub fn head_ref(&self) -> Option<&str> {
        self.head_ref
            .as_deref()
            .or_else(|| self.pull_request_ref("head"))
    }

    /// The pull request's base branch.
    pub fn base_ref(&self) -> Option<&str> {
        self.base_ref
            .as_deref()
            .or_else(|| self.pull_request_ref("base"))
    }

    fn pull_request_ref(&self, side: &str) -> Option<&str> {
        self.event
            .get("pull_request")?
            .get(side)?
            .get("ref")?
            .as_str()
    }

    /// The short branch name when the run's ref is a branch.
    pub fn branch(&self) -> Option<&str> {
        self.git_ref.as_deref()?.strip_prefix("refs/heads/")
    }

    /// The short tag name when the run's ref is a tag.
    pub fn tag(&self) -> Option<&str> {
        self.git_ref.as_deref()?.strip_prefix("refs/tags/")
    }

    /// Link to the workflow run page.
    pub fn run_url(&self) -> Option<String> {
        self.run_id.map(|id| {
            format!(
                "{}/{}/{}/actions/runs/{}",
                self.server_url,
                self.repo.owner(),
                self.repo.name(),
                id
            )
        })
    }
}

fn load_event(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse event payload '{}'", path.display()))
}
