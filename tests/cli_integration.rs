mod common;

use std::collections::HashMap;

use anyhow::Result;
use common::{MockForge, branch, comment, pr, prs, repo};
use ghkit::{
    Command, CommandOutput, Invocation, OutputFormat, RunContext, StickyOutcome, execute,
    parse_args,
};
use serde_json::json;

fn parse(raw_args: &[&str], context: Option<&RunContext>) -> Result<Invocation> {
    parse_args(std::iter::once("ghkit").chain(raw_args.iter().copied()), context)
}

/// Parses and runs against `forge`.
async fn run(raw_args: &[&str], forge: &MockForge) -> Result<CommandOutput> {
    let invocation = parse(raw_args, None)?;
    execute(&invocation.command, forge).await
}

fn pull_request_context(number: u64) -> RunContext {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("GITHUB_REPOSITORY", "owner/repo"),
        ("GITHUB_EVENT_NAME", "pull_request"),
    ]);
    RunContext::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .unwrap()
        .with_event(json!({ "pull_request": { "number": number } }))
}

fn numbers(output: &CommandOutput) -> Vec<u64> {
    match output {
        CommandOutput::PullRequests(prs) => prs.iter().map(|p| p.number).collect(),
        other => panic!("expected pull requests, got {other:?}"),
    }
}

#[tokio::test]
async fn test_prs_respects_limit() {
    let forge = MockForge::new().with_pull_requests(prs(50));

    let output = run(&["prs", "--repo", "owner/repo", "-L", "5"], &forge)
        .await
        .unwrap();

    assert_eq!(numbers(&output), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_prs_label_filter() {
    let forge = MockForge::new().with_pull_requests(vec![
        pr(1, "one", &["bug"]),
        pr(2, "two", &["bug", "ready"]),
        pr(3, "three", &["ready"]),
    ]);

    let output = run(
        &["prs", "-r", "owner/repo", "--label", "bug", "--label", "ready"],
        &forge,
    )
    .await
    .unwrap();

    assert_eq!(numbers(&output), vec![2]);
}

#[tokio::test]
async fn test_prs_for_head_branch() {
    let forge = MockForge::new().with_pull_requests(prs(3));

    let output = run(&["prs", "-r", "owner/repo", "--head", "branch-3"], &forge)
        .await
        .unwrap();

    assert_eq!(numbers(&output), vec![3]);
}

#[test]
fn test_repo_falls_back_to_run_context() {
    let context = pull_request_context(12);

    let invocation = parse(&["files"], Some(&context)).unwrap();

    assert_eq!(
        invocation.command,
        Command::Files {
            repo: repo(),
            number: 12,
            limit: 30,
        }
    );
    assert_eq!(invocation.output, OutputFormat::Table);
}

#[test]
fn test_pr_url_supplies_repository() {
    let invocation = parse(
        &[
            "comments",
            "--pr",
            "https://github.com/octo/widgets/pull/4",
            "-o",
            "json",
        ],
        None,
    )
    .unwrap();

    let Command::Comments { repo, number, .. } = invocation.command else {
        panic!("expected a comments command");
    };
    assert_eq!(repo.to_string(), "octo/widgets");
    assert_eq!(number, 4);
    assert_eq!(invocation.output, OutputFormat::Json);
}

#[test]
fn test_pr_url_must_match_repo() {
    let err = parse(
        &[
            "files",
            "-r",
            "owner/repo",
            "--pr",
            "https://github.com/octo/widgets/pull/4",
        ],
        None,
    )
    .unwrap_err();

    assert!(err.to_string().contains("--repo specifies owner/repo"));
}

#[test]
fn test_missing_repository_is_reported() {
    let err = parse(&["branches"], None).unwrap_err();

    assert!(err.downcast_ref::<clap::Error>().is_none());
    assert!(err.to_string().contains("--repo"));
}

#[test]
fn test_missing_pull_request_is_reported() {
    let err = parse(&["files", "-r", "owner/repo"], None).unwrap_err();

    assert!(err.to_string().contains("--pr"));
}

#[test]
fn test_invalid_pr_number() {
    let err = parse(&["files", "-r", "owner/repo", "--pr", "abc"], None).unwrap_err();

    assert!(err.to_string().contains("Invalid PR number: 'abc'"));
}

#[test]
fn test_sticky_requires_body_or_delete() {
    let err = parse(&["sticky", "-r", "owner/repo", "--pr", "1", "coverage"], None).unwrap_err();

    assert!(err.downcast_ref::<clap::Error>().is_some());
}

#[tokio::test]
async fn test_sticky_round_trip_through_commands() {
    let forge = MockForge::new().with_comments(vec![comment(1, "alice", "hello")]);
    let args = [
        "sticky", "-r", "owner/repo", "--pr", "1", "coverage", "--body", "80%",
    ];

    let first = run(&args, &forge).await.unwrap();
    let second = run(&args, &forge).await.unwrap();

    assert!(matches!(
        first,
        CommandOutput::Sticky(StickyOutcome::Created(_))
    ));
    assert!(matches!(
        second,
        CommandOutput::Sticky(StickyOutcome::Unchanged(_))
    ));

    let deleted = run(
        &["sticky", "-r", "owner/repo", "--pr", "1", "coverage", "--delete"],
        &forge,
    )
    .await
    .unwrap();
    assert_eq!(deleted, CommandOutput::StickyDeleted { deleted: true });
}

#[tokio::test]
async fn test_labels_remove_reports_absent_labels() {
    let forge = MockForge::new().with_labels(&["bug"]);

    let output = run(
        &["labels", "remove", "-r", "owner/repo", "--pr", "1", "bug", "stale"],
        &forge,
    )
    .await
    .unwrap();

    let CommandOutput::LabelRemoval(removal) = output else {
        panic!("expected a label removal");
    };
    assert_eq!(removal.removed, vec!["bug".to_string()]);
    assert_eq!(removal.absent, vec!["stale".to_string()]);
}

#[tokio::test]
async fn test_branch_exists_command() {
    let forge = MockForge::new().with_branches(vec![branch("main", true)]);

    let output = run(&["branch-exists", "-r", "owner/repo", "develop"], &forge)
        .await
        .unwrap();

    assert_eq!(
        output,
        CommandOutput::BranchExists {
            name: "develop".to_string(),
            exists: false,
        }
    );
}

#[tokio::test]
async fn test_json_output_serialises_payload_only() {
    let forge = MockForge::new().with_branches(vec![branch("main", true)]);

    let output = run(&["branches", "-r", "owner/repo", "--protected"], &forge)
        .await
        .unwrap();

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(
        value,
        json!([{ "name": "main", "sha": "0123456789abcdef", "protected": true }])
    );
}
