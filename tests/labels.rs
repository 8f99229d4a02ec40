mod common;

use common::{MockForge, labels, repo};
use ghkit::labels::{add_labels, remove_labels};
use tracing_test::traced_test;

#[tokio::test]
async fn test_add_labels_returns_all_labels() {
    let forge = MockForge::new().with_labels(&["bug"]);

    let current = add_labels(&forge, &repo(), 1, &labels(&["ready", "bug"]))
        .await
        .unwrap();

    assert_eq!(current, labels(&["bug", "ready"]));
}

#[tokio::test]
async fn test_add_no_labels_makes_no_request() {
    let forge = MockForge::new().with_labels(&["bug"]);

    let current = add_labels(&forge, &repo(), 1, &[]).await.unwrap();

    assert!(current.is_empty());
    assert!(forge.calls().is_empty());
}

#[tokio::test]
async fn test_remove_labels() {
    let forge = MockForge::new().with_labels(&["bug", "ready", "wip"]);

    let outcome = remove_labels(&forge, &repo(), 1, &labels(&["wip", "bug"]))
        .await
        .unwrap();

    assert_eq!(outcome.removed, labels(&["wip", "bug"]));
    assert!(outcome.absent.is_empty());
    assert_eq!(forge.current_labels(), labels(&["ready"]));
}

#[tokio::test]
#[traced_test]
async fn test_absent_label_is_logged_and_skipped() {
    let forge = MockForge::new().with_labels(&["ready"]);

    let outcome = remove_labels(&forge, &repo(), 1, &labels(&["missing", "ready"]))
        .await
        .unwrap();

    assert_eq!(outcome.removed, labels(&["ready"]));
    assert_eq!(outcome.absent, labels(&["missing"]));
    assert_eq!(forge.writes(), vec!["remove_label", "remove_label"]);

    logs_assert(|lines: &[&str]| {
        let entries: Vec<&&str> = lines
            .iter()
            .filter(|line| line.contains("Label not present"))
            .collect();
        match entries.as_slice() {
            [entry] if entry.contains("INFO") && entry.contains("missing") => Ok(()),
            other => Err(format!("expected one info entry for 'missing', got {other:?}")),
        }
    });
}

#[tokio::test]
async fn test_other_removal_failures_stop_the_batch() {
    let forge = MockForge::new()
        .with_labels(&["a", "b", "c"])
        .failing_label("b");

    let error = remove_labels(&forge, &repo(), 1, &labels(&["a", "b", "c"]))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("500"));
    assert_eq!(forge.writes().len(), 2);
    assert_eq!(forge.current_labels(), labels(&["b", "c"]));
}
