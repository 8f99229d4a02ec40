use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use chrono::Utc;
use ghkit::{
    Branch, ChangedFile, Comment, CommandOutput, Deployment, DeploymentStatus, LabelRemoval,
    OutputFormat, PullRequest, StickyOutcome,
    dates::format_relative,
    text::{pluralize, truncate},
};

const COLUMN_SEPARATOR: &str = "  ";
const MIN_LAST_COLUMN_WIDTH: usize = 10;
const SHORT_SHA_LEN: usize = 7;

fn get_terminal_width() -> usize {
    if io::stdout().is_terminal() {
        terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(usize::MAX)
    } else {
        usize::MAX
    }
}

/// A plain-text table whose last column is truncated to fit the terminal.
struct Table {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &'static [&'static str], rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }
        widths
    }

    fn fit_last_column(&mut self, widths: &mut [usize], terminal_width: usize) {
        let Some(last) = widths.len().checked_sub(1) else {
            return;
        };
        if terminal_width == usize::MAX {
            return;
        }

        let used: usize =
            widths[..last].iter().sum::<usize>() + COLUMN_SEPARATOR.len() * last;
        if used >= terminal_width {
            return;
        }

        let available = terminal_width - used;
        if widths[last] > available && available >= MIN_LAST_COLUMN_WIDTH {
            widths[last] = available;
            for row in &mut self.rows {
                if let Some(cell) = row.get_mut(last) {
                    *cell = truncate(cell, available);
                }
            }
        }
    }

    fn write_line<W: Write>(cells: &[String], widths: &[usize], writer: &mut W) -> Result<()> {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push_str(COLUMN_SEPARATOR);
            }
            if i + 1 == cells.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$}", cell, width = widths[i]));
            }
        }
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn render<W: Write>(mut self, terminal_width: usize, writer: &mut W) -> Result<()> {
        let mut widths = self.column_widths();
        self.fit_last_column(&mut widths, terminal_width);

        let headers: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        Self::write_line(&headers, &widths, writer)?;
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        Self::write_line(&separator, &widths, writer)?;
        for row in &self.rows {
            Self::write_line(row, &widths, writer)?;
        }
        Ok(())
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

fn pull_request_table(prs: &[PullRequest]) -> Table {
    let now = Utc::now();
    let rows = prs
        .iter()
        .map(|pr| {
            let state = if pr.is_merged() {
                "merged"
            } else if pr.draft {
                "draft"
            } else {
                pr.state.as_str()
            };
            vec![
                pr.number.to_string(),
                state.to_string(),
                pr.author.clone(),
                pr.labels.join(","),
                format_relative(&pr.created_at, &now),
                pr.title.clone(),
            ]
        })
        .collect();
    Table::new(
        &["NUMBER", "STATE", "AUTHOR", "LABELS", "CREATED", "TITLE"],
        rows,
    )
}

fn file_table(files: &[ChangedFile]) -> Table {
    let rows = files
        .iter()
        .map(|file| {
            let name = match &file.previous_filename {
                Some(previous) => format!("{} -> {}", previous, file.filename),
                None => file.filename.clone(),
            };
            vec![
                file.status.as_str().to_string(),
                format!("+{}", file.additions),
                format!("-{}", file.deletions),
                name,
            ]
        })
        .collect();
    Table::new(&["STATUS", "ADDED", "DELETED", "FILE"], rows)
}

fn comment_table(comments: &[Comment]) -> Table {
    let now = Utc::now();
    let rows = comments
        .iter()
        .map(|comment| {
            vec![
                comment.id.to_string(),
                comment.author.clone(),
                format_relative(&comment.created_at, &now),
                first_line(&comment.body).to_string(),
            ]
        })
        .collect();
    Table::new(&["ID", "AUTHOR", "CREATED", "BODY"], rows)
}

fn branch_table(branches: &[Branch]) -> Table {
    let rows = branches
        .iter()
        .map(|branch| {
            vec![
                short_sha(&branch.sha).to_string(),
                if branch.protected { "yes" } else { "no" }.to_string(),
                branch.name.clone(),
            ]
        })
        .collect();
    Table::new(&["SHA", "PROTECTED", "NAME"], rows)
}

fn deployment_table(deployments: &[Deployment]) -> Table {
    let now = Utc::now();
    let rows = deployments
        .iter()
        .map(|deployment| {
            vec![
                deployment.id.to_string(),
                deployment.environment.clone(),
                deployment.git_ref.clone(),
                short_sha(&deployment.sha).to_string(),
                deployment.creator.clone(),
                format_relative(&deployment.created_at, &now),
                deployment.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    Table::new(
        &[
            "ID",
            "ENVIRONMENT",
            "REF",
            "SHA",
            "CREATOR",
            "CREATED",
            "DESCRIPTION",
        ],
        rows,
    )
}

fn write_sticky<W: Write>(outcome: &StickyOutcome, writer: &mut W) -> Result<()> {
    let verb = match outcome {
        StickyOutcome::Created(_) => "Created",
        StickyOutcome::Updated(_) => "Updated",
        StickyOutcome::Unchanged(_) => "Unchanged",
    };
    let comment = outcome.comment();
    writeln!(writer, "{verb} comment {} {}", comment.id, comment.url)?;
    Ok(())
}

fn write_label_removal<W: Write>(removal: &LabelRemoval, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "Removed {}",
        pluralize(removal.removed.len(), "label")
    )?;
    if !removal.absent.is_empty() {
        writeln!(writer, "Not present: {}", removal.absent.join(", "))?;
    }
    Ok(())
}

fn write_deployment_status<W: Write>(
    status: Option<&DeploymentStatus>,
    writer: &mut W,
) -> Result<()> {
    match status {
        Some(status) => {
            write!(writer, "{} {}", status.id, status.state)?;
            if let Some(url) = status.environment_url.as_deref().or(status.log_url.as_deref()) {
                write!(writer, " {url}")?;
            }
            writeln!(writer)?;
        }
        None => writeln!(writer, "No deployment status")?,
    }
    Ok(())
}

fn render_text<W: Write>(
    output: &CommandOutput,
    terminal_width: usize,
    writer: &mut W,
) -> Result<()> {
    match output {
        CommandOutput::PullRequests(prs) => pull_request_table(prs).render(terminal_width, writer),
        CommandOutput::Files(files) => file_table(files).render(terminal_width, writer),
        CommandOutput::Comments(comments) => comment_table(comments).render(terminal_width, writer),
        CommandOutput::Branches(branches) => branch_table(branches).render(terminal_width, writer),
        CommandOutput::Deployments(deployments) => {
            deployment_table(deployments).render(terminal_width, writer)
        }
        CommandOutput::Sticky(outcome) => write_sticky(outcome, writer),
        CommandOutput::StickyDeleted { deleted } => {
            let message = if *deleted {
                "Deleted sticky comment"
            } else {
                "No sticky comment found"
            };
            writeln!(writer, "{message}")?;
            Ok(())
        }
        CommandOutput::Labels { labels } => {
            writeln!(writer, "{}", labels.join(", "))?;
            Ok(())
        }
        CommandOutput::LabelRemoval(removal) => write_label_removal(removal, writer),
        CommandOutput::BranchExists { exists, .. } => {
            writeln!(writer, "{exists}")?;
            Ok(())
        }
        CommandOutput::DeploymentStatus(status) => write_deployment_status(status.as_ref(), writer),
    }
}

/// Writes `output` as a table or as JSON.
pub fn render<W: Write>(output: &CommandOutput, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, output)?;
            writeln!(writer)?;
            Ok(())
        }
        OutputFormat::Table => render_text(output, get_terminal_width(), writer),
    }
}
