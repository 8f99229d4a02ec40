//! Identifier case conversion and small string helpers.

use std::sync::LazyLock;

use regex::Regex;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Failed to compile word separator"));

/// Splits an identifier or phrase into words.
///
/// Any run of characters that is not a letter or digit separates words, and
/// so do case changes: `fooBar` gives `foo`, `Bar` and `HTTPServer` gives
/// `HTTP`, `Server`. Digits stay attached to the preceding word.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in SEPARATORS.split(input).filter(|chunk| !chunk.is_empty()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_word(word: &str) -> String {
    capitalize(&word.to_lowercase())
}

pub fn to_camel_case(input: &str) -> String {
    split_words(input)
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i == 0 {
                word.to_lowercase()
            } else {
                title_word(word)
            }
        })
        .collect()
}

pub fn to_pascal_case(input: &str) -> String {
    split_words(input).iter().map(|w| title_word(w)).collect()
}

pub fn to_snake_case(input: &str) -> String {
    join_lower(input, "_")
}

pub fn to_kebab_case(input: &str) -> String {
    join_lower(input, "-")
}

pub fn to_constant_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub fn to_title_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|w| title_word(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_lower(input: &str, separator: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Shortens `input` to at most `max_chars` characters, ending with `…` when
/// anything was cut.
pub fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = input.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// `"1 file"`, `"3 files"`, `"2 branches"`.
pub fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        return format!("{count} {word}");
    }
    format!("{count} {}", plural_of(word))
}

fn plural_of(word: &str) -> String {
    let lower = word.to_lowercase();
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let vowel_before = stem
            .chars()
            .last()
            .is_some_and(|c| "aeiouAEIOU".contains(c));
        if !stem.is_empty() && !vowel_before {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_separators_and_case_changes() {
        assert_eq!(split_words("fooBar"), ["foo", "Bar"]);
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("XMLHttpRequest"), ["XML", "Http", "Request"]);
        assert_eq!(split_words("release/v2.1-rc"), ["release", "v2", "1", "rc"]);
        assert_eq!(split_words("  snake_case--and kebab "), ["snake", "case", "and", "kebab"]);
        assert_eq!(split_words("version2Beta"), ["version2", "Beta"]);
        assert!(split_words("---").is_empty());
    }

    #[test]
    fn converts_between_cases() {
        assert_eq!(to_camel_case("deploy status_url"), "deployStatusUrl");
        assert_eq!(to_pascal_case("deploy-status"), "DeployStatus");
        assert_eq!(to_snake_case("DeployStatusURL"), "deploy_status_url");
        assert_eq!(to_kebab_case("PullRequestFiles"), "pull-request-files");
        assert_eq!(to_constant_case("maxPageSize"), "MAX_PAGE_SIZE");
        assert_eq!(to_title_case("needs-review"), "Needs Review");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn capitalize_keeps_the_tail() {
        assert_eq!(capitalize("gitHub"), "GitHub");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("Fix the flaky test", 8), "Fix the…");
        assert_eq!(truncate("日本語のタイトル", 4), "日本語…");
        assert_eq!(truncate("anything", 0), "");
        assert_eq!(truncate("ab", 1), "…");
    }

    #[test]
    fn pluralizes_common_english_nouns() {
        assert_eq!(pluralize(1, "file"), "1 file");
        assert_eq!(pluralize(0, "file"), "0 files");
        assert_eq!(pluralize(2, "branch"), "2 branches");
        assert_eq!(pluralize(3, "dependency"), "3 dependencies");
        assert_eq!(pluralize(4, "day"), "4 days");
        assert_eq!(pluralize(5, "status"), "5 statuses");
    }
}
