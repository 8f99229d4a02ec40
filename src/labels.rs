//! Adding and removing issue labels.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::{error::is_not_found, forge::Forge, types::Repo};

/// True when every label in `required` is present in `labels`.
pub fn has_all_labels(labels: &[String], required: &[String]) -> bool {
    required.iter().all(|wanted| labels.contains(wanted))
}

pub fn has_any_label(labels: &[String], candidates: &[String]) -> bool {
    candidates.iter().any(|wanted| labels.contains(wanted))
}

/// Adds `labels` to an issue or pull request and returns every label now on
/// it. No request is made when `labels` is empty.
pub async fn add_labels<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    labels: &[String],
) -> Result<Vec<String>>
where
    F: Forge + ?Sized,
{
    if labels.is_empty() {
        return Ok(Vec::new());
    }
    forge.add_labels(repo, number, labels).await
}

/// Outcome of [`remove_labels`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelRemoval {
    pub removed: Vec<String>,
    /// Labels that were not on the issue.
    pub absent: Vec<String>,
}

/// Removes each label in turn.
///
/// A label that is not on the issue is recorded in
/// [`LabelRemoval::absent`] and does not stop the remaining removals. Any
/// other failure is returned immediately.
pub async fn remove_labels<F>(
    forge: &F,
    repo: &Repo,
    number: u64,
    labels: &[String],
) -> Result<LabelRemoval>
where
    F: Forge + ?Sized,
{
    let mut outcome = LabelRemoval::default();

    for label in labels {
        match forge.remove_label(repo, number, label).await {
            Ok(()) => outcome.removed.push(label.clone()),
            Err(error) if is_not_found(&error) => {
                info!(%repo, number, label = %label, "Label not present, nothing to remove");
                outcome.absent.push(label.clone());
            }
            Err(error) => return Err(error),
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn all_labels_must_be_present() {
        let labels = names(&["bug", "ready", "backend"]);
        assert!(has_all_labels(&labels, &names(&["bug", "ready"])));
        assert!(!has_all_labels(&labels, &names(&["bug", "frontend"])));
        assert!(has_all_labels(&labels, &[]));
    }

    #[test]
    fn label_names_are_case_sensitive() {
        let labels = names(&["Bug"]);
        assert!(!has_all_labels(&labels, &names(&["bug"])));
        assert!(!has_any_label(&labels, &names(&["bug"])));
        assert!(has_any_label(&labels, &names(&["bug", "Bug"])));
    }
}
