//! GitHub-flavoured markdown builders for comment bodies.

use std::sync::LazyLock;

use regex::Regex;

static BACKTICK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("`+").expect("Failed to compile backtick pattern"));

const SPECIAL: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '!', '|', '<', '>', '~',
];

/// Backslash-escapes characters markdown would otherwise interpret.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn longest_backtick_run(text: &str) -> usize {
    BACKTICK_RUN
        .find_iter(text)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}

pub fn inline_code(code: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(code) + 1);
    // A space keeps a leading or trailing backtick from joining the fence.
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// A fenced code block whose fence is longer than any backtick run inside
/// `code`.
pub fn code_block(code: &str, lang: &str) -> String {
    let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
    let code = code.strip_suffix('\n').unwrap_or(code);
    format!("{fence}{lang}\n{code}\n{fence}")
}

pub fn link(text: &str, url: &str) -> String {
    format!("[{}]({})", escape(text), url.replace(' ', "%20"))
}

pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

fn table_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

fn table_row<S: AsRef<str>>(cells: &[S], width: usize) -> String {
    let mut row = String::from("|");
    for i in 0..width {
        let cell = cells.get(i).map(|c| table_cell(c.as_ref())).unwrap_or_default();
        row.push(' ');
        row.push_str(&cell);
        row.push_str(" |");
    }
    row
}

/// A pipe table. Rows shorter than `headers` are padded with empty cells;
/// extra cells are dropped.
pub fn table<H, R>(headers: &[H], rows: &[Vec<R>]) -> String
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    let width = headers.len();
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(table_row(headers, width));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows.iter().map(|row| table_row(row, width)));
    lines.join("\n")
}

pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A checklist; each item is `(text, checked)`.
pub fn task_list<S: AsRef<str>>(items: &[(S, bool)]) -> String {
    items
        .iter()
        .map(|(text, checked)| {
            let mark = if *checked { 'x' } else { ' ' };
            format!("- [{mark}] {}", text.as_ref())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A collapsible section.
pub fn details(summary: &str, body: &str) -> String {
    format!("<details>\n<summary>{summary}</summary>\n\n{body}\n\n</details>")
}

/// An HTML comment, invisible in rendered markdown. Any `-->` inside `text`
/// is broken up so it cannot close the comment early.
pub fn hidden_comment(text: &str) -> String {
    format!("<!-- {} -->", text.replace("-->", "-- >"))
}
