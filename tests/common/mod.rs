#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ghkit::{
    Branch, BranchQuery, ChangedFile, Comment, Deployment, DeploymentQuery, DeploymentStatus,
    FileStatus, Forge, ForgeError, NewDeployment, NewDeploymentStatus, PageRequest, PullRequest,
    PullRequestQuery, PullRequestState, Repo, StateFilter,
};

/// One request seen by [`MockForge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Page(&'static str, PageRequest),
    Get(&'static str),
    Write(&'static str),
}

/// In-memory forge. Build a fresh one per test.
#[derive(Default)]
pub struct MockForge {
    pub pull_requests: Vec<PullRequest>,
    pub files: Vec<ChangedFile>,
    pub comments: Mutex<Vec<Comment>>,
    pub labels: Mutex<Vec<String>>,
    pub branches: Vec<Branch>,
    pub deployments: Mutex<Vec<Deployment>>,
    /// Newest first, per deployment.
    pub statuses: Mutex<HashMap<u64, Vec<DeploymentStatus>>>,
    /// Listing requests for this page number fail with a 502.
    pub fail_on_page: Option<u32>,
    /// Removing this label fails with a 500.
    pub fail_label: Option<String>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
}

impl MockForge {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Self::default()
        }
    }

    pub fn with_pull_requests(mut self, prs: Vec<PullRequest>) -> Self {
        self.pull_requests = prs;
        self
    }

    pub fn with_files(mut self, files: Vec<ChangedFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        *self.comments.lock().unwrap() = comments;
        self
    }

    pub fn with_labels(self, labels: &[&str]) -> Self {
        *self.labels.lock().unwrap() = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_deployments(self, deployments: Vec<Deployment>) -> Self {
        *self.deployments.lock().unwrap() = deployments;
        self
    }

    pub fn with_statuses(self, deployment_id: u64, statuses: Vec<DeploymentStatus>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(deployment_id, statuses);
        self
    }

    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub fn failing_label(mut self, label: &str) -> Self {
        self.fail_label = Some(label.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Page(_, page) => Some(page),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Write(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn current_labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn current_comments(&self) -> Vec<Comment> {
        self.comments.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn page<T: Clone>(&self, endpoint: &'static str, items: &[T], page: PageRequest) -> Result<Vec<T>> {
        self.record(Call::Page(endpoint, page));
        if self.fail_on_page == Some(page.page) {
            return Err(ForgeError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            }
            .into());
        }
        let per_page = usize::from(page.per_page);
        let skip = (page.page as usize - 1) * per_page;
        Ok(items.iter().skip(skip).take(per_page).cloned().collect())
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Forge for MockForge {
    async fn list_pull_requests(
        &self,
        _repo: &Repo,
        query: &PullRequestQuery,
        page: PageRequest,
    ) -> Result<Vec<PullRequest>> {
        let head_branch = query
            .head
            .as_deref()
            .map(|head| head.split_once(':').map_or(head, |(_, branch)| branch));
        let matching: Vec<PullRequest> = self
            .pull_requests
            .iter()
            .filter(|pr| match query.state {
                StateFilter::Open => pr.state == PullRequestState::Open,
                StateFilter::Closed => pr.state == PullRequestState::Closed,
                StateFilter::All => true,
            })
            .filter(|pr| head_branch.is_none_or(|branch| pr.head_ref == branch))
            .filter(|pr| query.base.as_ref().is_none_or(|base| &pr.base_ref == base))
            .cloned()
            .collect();
        self.page("pulls", &matching, page)
    }

    async fn get_pull_request(&self, _repo: &Repo, number: u64) -> Result<PullRequest> {
        self.record(Call::Get("pull"));
        self.pull_requests
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| ForgeError::not_found(format!("pull request #{number}")).into())
    }

    async fn list_pull_request_files(
        &self,
        _repo: &Repo,
        _number: u64,
        page: PageRequest,
    ) -> Result<Vec<ChangedFile>> {
        self.page("files", &self.files, page)
    }

    async fn list_issue_comments(
        &self,
        _repo: &Repo,
        _number: u64,
        page: PageRequest,
    ) -> Result<Vec<Comment>> {
        let comments = self.current_comments();
        self.page("comments", &comments, page)
    }

    async fn create_comment(&self, _repo: &Repo, _number: u64, body: &str) -> Result<Comment> {
        self.record(Call::Write("create_comment"));
        let id = self.next_id();
        let created = comment(id, "ghkit-bot", body);
        self.comments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_comment(&self, _repo: &Repo, comment_id: u64, body: &str) -> Result<Comment> {
        self.record(Call::Write("update_comment"));
        let mut comments = self.comments.lock().unwrap();
        let existing = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| ForgeError::not_found(format!("comment {comment_id}")))?;
        existing.body = body.to_string();
        existing.updated_at = Some(at(30));
        Ok(existing.clone())
    }

    async fn delete_comment(&self, _repo: &Repo, comment_id: u64) -> Result<()> {
        self.record(Call::Write("delete_comment"));
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != comment_id);
        if comments.len() == before {
            return Err(ForgeError::not_found(format!("comment {comment_id}")).into());
        }
        Ok(())
    }

    async fn add_labels(&self, _repo: &Repo, _number: u64, labels: &[String]) -> Result<Vec<String>> {
        self.record(Call::Write("add_labels"));
        let mut current = self.labels.lock().unwrap();
        for label in labels {
            if !current.contains(label) {
                current.push(label.clone());
            }
        }
        Ok(current.clone())
    }

    async fn remove_label(&self, _repo: &Repo, _number: u64, label: &str) -> Result<()> {
        self.record(Call::Write("remove_label"));
        if self.fail_label.as_deref() == Some(label) {
            return Err(ForgeError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            }
            .into());
        }
        let mut current = self.labels.lock().unwrap();
        match current.iter().position(|l| l == label) {
            Some(index) => {
                current.remove(index);
                Ok(())
            }
            None => Err(ForgeError::not_found(format!("label '{label}'")).into()),
        }
    }

    async fn list_branches(
        &self,
        _repo: &Repo,
        query: &BranchQuery,
        page: PageRequest,
    ) -> Result<Vec<Branch>> {
        let matching: Vec<Branch> = self
            .branches
            .iter()
            .filter(|b| query.protected.is_none_or(|protected| b.protected == protected))
            .cloned()
            .collect();
        self.page("branches", &matching, page)
    }

    async fn get_branch(&self, _repo: &Repo, name: &str) -> Result<Branch> {
        self.record(Call::Get("branch"));
        self.branches
            .iter()
            .find(|b| b.name == name)
            .cloned()
            .ok_or_else(|| ForgeError::not_found(format!("branch '{name}'")).into())
    }

    async fn list_deployments(
        &self,
        _repo: &Repo,
        query: &DeploymentQuery,
        page: PageRequest,
    ) -> Result<Vec<Deployment>> {
        let matching: Vec<Deployment> = self
            .deployments
            .lock()
            .unwrap()
            .iter()
            .filter(|d| {
                query
                    .environment
                    .as_ref()
                    .is_none_or(|env| &d.environment == env)
            })
            .cloned()
            .collect();
        self.page("deployments", &matching, page)
    }

    async fn create_deployment(&self, _repo: &Repo, request: &NewDeployment) -> Result<Deployment> {
        self.record(Call::Write("create_deployment"));
        let created = Deployment {
            id: self.next_id(),
            environment: request.environment.clone(),
            git_ref: request.git_ref.clone(),
            sha: "0123456789abcdef".to_string(),
            task: request.task.clone(),
            description: request.description.clone(),
            creator: "ghkit-bot".to_string(),
            created_at: at(30),
        };
        self.deployments.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn list_deployment_statuses(
        &self,
        _repo: &Repo,
        deployment_id: u64,
        page: PageRequest,
    ) -> Result<Vec<DeploymentStatus>> {
        let statuses = self
            .statuses
            .lock()
            .unwrap()
            .get(&deployment_id)
            .cloned()
            .unwrap_or_default();
        self.page("deployment_statuses", &statuses, page)
    }

    async fn create_deployment_status(
        &self,
        _repo: &Repo,
        deployment_id: u64,
        status: &NewDeploymentStatus,
    ) -> Result<DeploymentStatus> {
        self.record(Call::Write("create_deployment_status"));
        let known = self
            .deployments
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.id == deployment_id);
        if !known {
            return Err(ForgeError::not_found(format!("deployment {deployment_id}")).into());
        }
        let created = DeploymentStatus {
            id: self.next_id(),
            state: status.state,
            description: status.description.clone(),
            environment_url: status.environment_url.clone(),
            log_url: status.log_url.clone(),
            created_at: at(30),
        };
        self.statuses
            .lock()
            .unwrap()
            .entry(deployment_id)
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }
}

pub fn repo() -> Repo {
    Repo::new("owner", "repo").unwrap()
}

/// Midnight UTC on 2025-01-01 plus `days`.
pub fn at(days: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)
}

pub fn pr(number: u64, title: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: String::new(),
        author: "alice".to_string(),
        state: PullRequestState::Open,
        draft: false,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        head_ref: format!("branch-{number}"),
        base_ref: "main".to_string(),
        url: format!("https://github.com/owner/repo/pull/{number}"),
        created_at: at(number as i64 % 28),
        updated_at: at(number as i64 % 28),
        merged_at: None,
    }
}

/// `count` open pull requests numbered from 1.
pub fn prs(count: u64) -> Vec<PullRequest> {
    (1..=count).map(|n| pr(n, &format!("PR {n}"), &[])).collect()
}

pub fn comment(id: u64, author: &str, body: &str) -> Comment {
    Comment {
        id,
        body: body.to_string(),
        author: author.to_string(),
        url: format!("https://github.com/owner/repo/pull/1#issuecomment-{id}"),
        created_at: at(id as i64 % 28),
        updated_at: None,
    }
}

pub fn changed_file(name: &str) -> ChangedFile {
    ChangedFile {
        filename: name.to_string(),
        status: FileStatus::Modified,
        additions: 3,
        deletions: 1,
        changes: 4,
        previous_filename: None,
    }
}

pub fn branch(name: &str, protected: bool) -> Branch {
    Branch {
        name: name.to_string(),
        sha: "0123456789abcdef".to_string(),
        protected,
    }
}

pub fn deployment(id: u64, environment: &str) -> Deployment {
    Deployment {
        id,
        environment: environment.to_string(),
        git_ref: "main".to_string(),
        sha: "0123456789abcdef".to_string(),
        task: "deploy".to_string(),
        description: None,
        creator: "alice".to_string(),
        created_at: at(id as i64 % 28),
    }
}

pub fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
