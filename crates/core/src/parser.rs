//! Agent Output Parsing
//!
//! The reasoning service answers in free text, so every record the pipeline
//! needs is recovered here. Each parser returns `Ok(record)` or a
//! [`ParseFailure`] carrying the reason and the raw text; malformed output is
//! an expected outcome, never a panic.

use crate::error::ParseFailure;
use crate::models::{Module, ProjectIdea, Resource};
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Fewest modules a curriculum may have before it counts as unusable.
pub const MIN_MODULES: usize = 3;
/// Most modules kept from a curriculum answer.
pub const MAX_MODULES: usize = 7;
/// Most resources kept per module.
pub const MAX_RESOURCES: usize = 3;

const MAX_TITLE_CHARS: usize = 100;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)```").expect("valid regex"));

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[*_#>]+\s*)*(?:module\s+)?(\d{1,2})\s*[.):]\s*(.*)$")
        .expect("valid regex")
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•+]|\d{1,2}[.)])\s*").expect("valid regex"));

static FIELD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(title|resource|name|url|link|source)\s*:\s*").expect("valid regex")
});

static NOTE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:why|rationale|reason|note|description|summary)\s*:\s*(.*)$")
        .expect("valid regex")
});

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\((https?://[^\s)]+)\)").expect("valid regex")
});

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("valid regex"));

static PROJECT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:project\s+(?:title|name)|capstone\s+project|capstone|project|title)\s*:\s*(.*)$",
    )
    .expect("valid regex")
});

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

static OBJECT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"));

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:'(\w+)'|"(\w+)")\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
    )
    .expect("valid regex")
});

static DESCRIPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^description\s*:\s*").expect("valid regex"));

/// Returns the body of the first fenced code block, or the whole text.
fn unfence(raw: &str) -> &str {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim()
}

/// Strips markdown emphasis, code ticks and wrapping quotes.
fn clean_fragment(s: &str) -> String {
    let without_markup = s.replace("**", "").replace("__", "").replace('`', "");
    without_markup
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Trims separator punctuation left over after cutting a line apart.
fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | '|'))
}

fn split_title_description(body: &str) -> (String, String) {
    let cleaned = clean_fragment(body);
    let split_at = [" - ", " – ", " — ", ": "]
        .iter()
        .filter_map(|sep| cleaned.find(sep).map(|pos| (pos, sep.len())))
        .min_by_key(|(pos, _)| *pos);

    match split_at {
        Some((pos, len)) => (
            clean_fragment(&cleaned[..pos]),
            clean_fragment(&cleaned[pos + len..]),
        ),
        None => (clean_fragment(&cleaned), String::new()),
    }
}

fn truncate_title(s: &str) -> String {
    if s.chars().count() <= MAX_TITLE_CHARS {
        return s.to_string();
    }
    let cut: String = s.chars().take(MAX_TITLE_CHARS).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > MAX_TITLE_CHARS / 2 => cut[..pos].to_string(),
        _ => cut,
    };
    format!("{}…", cut.trim_end())
}

/// Undoes the escapes a quoted string literal may carry.
fn unescape_literal(s: &str) -> String {
    s.replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\n", " ")
        .replace("\\\\", "\\")
}

fn json_array_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

// --- Curriculum ---

/// Parses a curriculum answer into modules indexed `1..=N`.
///
/// Accepts numbered lines (`1. Title - description`, `Module 2: ...`) and the
/// array-of-strings form. Fewer than [`MIN_MODULES`] usable items is a
/// failure; anything beyond [`MAX_MODULES`] is dropped.
pub fn parse_modules(raw: &str) -> Result<Vec<Module>, ParseFailure> {
    let text = unfence(raw);
    if text.is_empty() {
        return Err(ParseFailure::new("empty response", raw));
    }

    let from_lines = modules_from_lines(text);
    let mut items = match string_array(text) {
        Some(entries) if entries.len() > from_lines.len() => {
            entries.iter().map(|e| module_from_entry(e)).collect()
        }
        _ => from_lines,
    };

    items.retain(|(title, _)| !title.is_empty());

    if items.len() < MIN_MODULES {
        return Err(ParseFailure::new(
            format!(
                "expected at least {} modules, recovered {}",
                MIN_MODULES,
                items.len()
            ),
            raw,
        ));
    }
    if items.len() > MAX_MODULES {
        warn!(
            recovered = items.len(),
            kept = MAX_MODULES,
            "Curriculum answer had too many modules, truncating"
        );
        items.truncate(MAX_MODULES);
    }

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, (title, description))| Module {
            index: i + 1,
            title: truncate_title(&title),
            description,
        })
        .collect())
}

/// Reads a bracketed list of strings, JSON or single-quoted.
fn string_array(text: &str) -> Option<Vec<String>> {
    let slice = json_array_slice(text)?;
    match serde_json::from_str::<Vec<String>>(slice) {
        Ok(entries) => Some(entries),
        Err(e) => {
            debug!(error = %e, "Curriculum array is not JSON, reading quoted items");
            let entries: Vec<String> = STRING_LITERAL
                .captures_iter(slice)
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
                .map(|m| unescape_literal(m.as_str()))
                .collect();
            (!entries.is_empty()).then_some(entries)
        }
    }
}

fn module_from_entry(entry: &str) -> (String, String) {
    match NUMBERED_ITEM.captures(entry) {
        Some(caps) => split_title_description(&caps[2]),
        None => split_title_description(entry),
    }
}

fn modules_from_lines(text: &str) -> Vec<(String, String)> {
    let mut items: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = NUMBERED_ITEM.captures(line) {
            items.push(split_title_description(&caps[2]));
            continue;
        }
        // An indented or bulleted line right after an item describes it.
        let is_continuation = line.starts_with(char::is_whitespace)
            || line.trim_start().starts_with(['-', '*', '•']);
        if !is_continuation {
            continue;
        }
        if let Some((_, description)) = items.last_mut() {
            if description.is_empty() {
                let rest = LIST_MARKER.replace(line, "");
                *description = clean_fragment(&rest);
            }
        }
    }
    items
}

// --- Resources ---

#[derive(Debug, Default, Deserialize)]
struct RawResource {
    #[serde(default, alias = "name")]
    title: Option<String>,
    #[serde(default, alias = "link")]
    url: Option<String>,
    #[serde(
        default,
        alias = "rationale",
        alias = "reason",
        alias = "description",
        alias = "why"
    )]
    note: Option<String>,
}

impl RawResource {
    /// Stores `value` under whichever field `key` names; unknown keys are ignored.
    fn set(&mut self, key: &str, value: String) {
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" | "name" => &mut self.title,
            "url" | "link" => &mut self.url,
            "note" | "rationale" | "reason" | "description" | "why" => &mut self.note,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut raw = Self::default();
        for (key, field) in object {
            if let Some(text) = field.as_str() {
                raw.set(key, text.to_string());
            }
        }
        Some(raw)
    }

    fn from_literal(object: &str) -> Self {
        let mut raw = Self::default();
        for caps in KEY_VALUE.captures_iter(object) {
            let key = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            let value = caps.get(3).or_else(|| caps.get(4)).map(|m| m.as_str());
            if let (Some(key), Some(value)) = (key, value) {
                raw.set(key, unescape_literal(value));
            }
        }
        raw
    }
}

/// Returns the URL normalised if it has an http(s) scheme and a host.
fn valid_url(candidate: &str) -> Option<String> {
    let candidate = candidate.trim().trim_end_matches(['.', ',', ';', ':']);
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(candidate.to_string()),
        _ => None,
    }
}

fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Parses a resource-finder answer into at most [`MAX_RESOURCES`] resources.
///
/// Accepts an array of `{title, url, note}` objects (JSON, or single-quoted
/// dicts with `None` values) or URL-bearing lines. Zero valid URLs is a
/// failure.
pub fn parse_resources(raw: &str) -> Result<Vec<Resource>, ParseFailure> {
    let text = unfence(raw);
    if text.is_empty() {
        return Err(ParseFailure::new("empty response", raw));
    }

    let mut resources = match json_array_slice(text).and_then(raw_resources) {
        Some(entries) => resources_from_raw(entries),
        None => resources_from_lines(text),
    };

    if resources.is_empty() {
        return Err(ParseFailure::new("no valid resource URLs found", raw));
    }
    resources.truncate(MAX_RESOURCES);
    Ok(resources)
}

/// Reads the objects of a bracketed array, or `None` if it holds none.
///
/// Typed JSON first; then loosely typed JSON; then quoted key/value pairs, which
/// covers single-quoted dicts.
fn raw_resources(slice: &str) -> Option<Vec<RawResource>> {
    let entries = match serde_json::from_str::<Vec<RawResource>>(slice) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "Resource array is not typed JSON, reading objects field by field");
            match serde_json::from_str::<Vec<Value>>(slice) {
                Ok(values) => values.iter().filter_map(RawResource::from_value).collect(),
                Err(_) => OBJECT_LITERAL
                    .find_iter(slice)
                    .map(|m| RawResource::from_literal(m.as_str()))
                    .filter(|raw| raw.url.is_some())
                    .collect(),
            }
        }
    };
    (!entries.is_empty()).then_some(entries)
}

fn resources_from_raw(entries: Vec<RawResource>) -> Vec<Resource> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let url = valid_url(entry.url.as_deref()?)?;
            let title = match clean_fragment(entry.title.as_deref().unwrap_or_default()) {
                t if t.is_empty() => host_of(&url),
                t => t,
            };
            Some(Resource {
                title,
                url,
                note: clean_fragment(entry.note.as_deref().unwrap_or_default()),
            })
        })
        .collect()
}

fn clean_resource_title(s: &str) -> String {
    let s = LIST_MARKER.replace(s, "");
    let s = clean_fragment(&s);
    let s = FIELD_LABEL.replace(&s, "");
    clean_fragment(trim_separators(&s))
}

fn resources_from_lines(text: &str) -> Vec<Resource> {
    let mut resources: Vec<Resource> = Vec::new();
    let mut pending_title: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let found = if let Some(caps) = MARKDOWN_LINK.captures(line) {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(line.len());
            Some((
                clean_resource_title(&caps[1]),
                caps[2].to_string(),
                line[whole..].to_string(),
            ))
        } else {
            BARE_URL.find(line).map(|m| {
                (
                    clean_resource_title(&line[..m.start()]),
                    m.as_str().to_string(),
                    line[m.end()..].to_string(),
                )
            })
        };

        match found {
            Some((title, url, rest)) => {
                let Some(url) = valid_url(&url) else {
                    continue;
                };
                let title = if !title.is_empty() {
                    title
                } else {
                    pending_title.take().unwrap_or_else(|| host_of(&url))
                };
                pending_title = None;
                resources.push(Resource {
                    title,
                    url,
                    note: clean_fragment(trim_separators(&rest)),
                });
            }
            None => {
                let stripped = LIST_MARKER.replace(line, "");
                if let Some(caps) = NOTE_LABEL.captures(&stripped) {
                    if let Some(last) = resources.last_mut() {
                        if last.note.is_empty() {
                            last.note = clean_fragment(&caps[1]);
                        }
                    }
                    continue;
                }
                let candidate = clean_resource_title(line);
                if !candidate.is_empty() {
                    pending_title = Some(candidate);
                }
            }
        }
    }
    resources
}

// --- Project ---

/// Parses a project-planner answer into a single idea.
///
/// Prefers an explicit title line. Without one, the first sentence becomes the
/// title and the whole answer the description. Only blank output fails.
pub fn parse_project(raw: &str) -> Result<ProjectIdea, ParseFailure> {
    let text = unfence(raw);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(first) = lines.first() else {
        return Err(ParseFailure::new("empty response", raw));
    };
    let rest = join_description(&lines[1..]);

    if let Some(title) = explicit_title(first, lines.len() > 1) {
        let description = if rest.is_empty() { title.clone() } else { rest };
        return Ok(ProjectIdea {
            title: truncate_title(&title),
            description,
        });
    }

    let description = clean_fragment(&lines.join(" "));
    let title = first_sentence(&description);
    Ok(ProjectIdea {
        title: truncate_title(&title),
        description,
    })
}

fn explicit_title(first: &str, has_more: bool) -> Option<String> {
    let unmarked = first.trim_start_matches('#').trim();
    let plain = clean_fragment(unmarked);

    if let Some(caps) = PROJECT_LABEL.captures(&plain) {
        let title = clean_fragment(&caps[1]);
        return (!title.is_empty()).then_some(title);
    }
    if plain.is_empty() {
        return None;
    }
    let is_heading = first.starts_with('#');
    let is_bold_line = first.starts_with("**") && first.trim_end_matches(':').ends_with("**");
    let is_short_line = has_more
        && plain.chars().count() <= MAX_TITLE_CHARS
        && !plain.ends_with(['.', '!', '?']);

    if is_heading || is_bold_line || is_short_line {
        Some(plain.trim_end_matches(':').trim().to_string())
    } else {
        None
    }
}

fn join_description(lines: &[&str]) -> String {
    let joined = lines.join(" ");
    let joined = DESCRIPTION_LABEL.replace(joined.trim(), "");
    clean_fragment(&joined)
}

fn first_sentence(text: &str) -> String {
    let end = [". ", "! ", "? "]
        .iter()
        .filter_map(|sep| text.find(sep))
        .min()
        .unwrap_or(text.len());
    text[..end]
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_modules_with_descriptions() {
        let raw = "Here is your curriculum:\n\
                   1. Python Basics - Syntax, variables and data types\n\
                   2. NumPy Fundamentals - Arrays and vectorized math\n\
                   3) Pandas DataFrames: Loading, cleaning and reshaping data\n\
                   4. Data Visualization — Matplotlib and Seaborn\n\
                   5. Exploratory Analysis - Asking questions of a dataset\n";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules.len(), 5);
        assert_eq!(
            modules.iter().map(|m| m.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(modules[0].title, "Python Basics");
        assert_eq!(modules[0].description, "Syntax, variables and data types");
        assert_eq!(modules[2].title, "Pandas DataFrames");
        assert_eq!(modules[3].description, "Matplotlib and Seaborn");
    }

    #[test]
    fn test_parse_modules_accepts_string_array() {
        let raw = r#"["1. Python Basics (Syntax, Variables, Data Types)", "2. Control Flow (Loops, Conditionals)", "3. Functions and Scope", "4. Data Structures"]"#;
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules.len(), 4);
        assert_eq!(modules[0].title, "Python Basics (Syntax, Variables, Data Types)");
        assert_eq!(modules[0].description, "");
        assert_eq!(modules[3].index, 4);
    }

    #[test]
    fn test_parse_modules_accepts_single_quoted_list() {
        let raw = r#"['1. Python Basics (Syntax)', '2. Control Flow', "3. Python's Standard Library", '4. Data Structures']"#;
        let modules = parse_modules(raw).unwrap();
        assert_eq!(
            modules.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(),
            vec![
                "Python Basics (Syntax)",
                "Control Flow",
                "Python's Standard Library",
                "Data Structures"
            ]
        );
        assert_eq!(modules[3].index, 4);
    }

    #[test]
    fn test_parse_modules_finds_array_after_prose() {
        let raw = r#"Here is your curriculum: ["1. A", "2. B", "3. C"]"#;
        let modules = parse_modules(raw).unwrap();
        assert_eq!(
            modules.iter().map(|m| (m.index, m.title.as_str())).collect::<Vec<_>>(),
            vec![(1, "A"), (2, "B"), (3, "C")]
        );

        let raw = "Sure!\n```python\n[\n  'Ownership',\n  'Borrowing',\n  'Lifetimes',\n]\n```";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules.len(), 3);
        assert_eq!(modules[2].title, "Lifetimes");
    }

    #[test]
    fn test_parse_modules_ignores_brackets_inside_numbered_lines() {
        let raw = "1. Basics - see ['intro']\n2. Traits - Shared behaviour\n3. Macros - [advanced]";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules.len(), 3);
        assert_eq!(modules[0].title, "Basics");
        assert_eq!(modules[2].title, "Macros");
    }

    #[test]
    fn test_parse_modules_handles_markdown_and_fences() {
        let raw = "```markdown\n**1. Ownership** - Moves and borrows\n**Module 2:** Traits - Shared behaviour\n### 3. Error Handling - Result and ?\n```";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules.len(), 3);
        assert_eq!(modules[0].title, "Ownership");
        assert_eq!(modules[1].title, "Traits");
        assert_eq!(modules[1].description, "Shared behaviour");
        assert_eq!(modules[2].title, "Error Handling");
    }

    #[test]
    fn test_parse_modules_reads_indented_descriptions() {
        let raw = "1. Basics\n   Syntax and types\n2. Collections\n   - Vectors and maps\n3. Closures\nThanks!";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(modules[0].description, "Syntax and types");
        assert_eq!(modules[1].description, "Vectors and maps");
        assert_eq!(modules[2].description, "");
    }

    #[test]
    fn test_parse_modules_renumbers_contiguously() {
        let raw = "3. A - a\n7. B - b\n1. C - c";
        let modules = parse_modules(raw).unwrap();
        assert_eq!(
            modules.iter().map(|m| (m.index, m.title.as_str())).collect::<Vec<_>>(),
            vec![(1, "A"), (2, "B"), (3, "C")]
        );
    }

    #[test]
    fn test_too_few_modules_is_a_failure() {
        let raw = "1. Only one\n2.   \n3. Two";
        let err = parse_modules(raw).unwrap_err();
        assert!(err.reason.contains("at least 3"));
        assert_eq!(err.raw_text, raw);
    }

    #[test]
    fn test_prose_without_markers_is_a_failure() {
        assert!(parse_modules("I'm sorry, I can't help with that.").is_err());
        assert!(parse_modules("   ").is_err());
    }

    #[test]
    fn test_more_than_seven_modules_are_truncated() {
        let raw = (1..=9)
            .map(|i| format!("{i}. Module {i} - d"))
            .collect::<Vec<_>>()
            .join("\n");
        let modules = parse_modules(&raw).unwrap();
        assert_eq!(modules.len(), MAX_MODULES);
        assert_eq!(modules.last().unwrap().title, "Module 7");
    }

    #[test]
    fn test_parse_resources_from_fenced_json() {
        let raw = "```json\n[{\"title\": \"Introducing Hooks\", \"url\": \"https://react.dev/reference/react/hooks\", \"rationale\": \"Official docs.\"}, {\"title\": \"Hooks Tutorial\", \"url\": \"https://www.youtube.com/watch?v=abc\"}]\n```";
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "Introducing Hooks");
        assert_eq!(resources[0].note, "Official docs.");
        assert_eq!(resources[1].note, "");
    }

    #[test]
    fn test_parse_resources_drops_invalid_urls_from_json() {
        let raw = r#"Sure! [{"title": "Bad", "url": "not a url"}, {"title": "", "url": "https://pandas.pydata.org/docs/"}, {"title": "FTP", "url": "ftp://example.com/x"}]"#;
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].title, "pandas.pydata.org");
    }

    #[test]
    fn test_parse_resources_tolerates_null_and_missing_fields() {
        let raw = r#"[{"title":"A guide","url":"https://a.com/x","note":null},{"title":null,"url":"https://b.com/y"},{"title":"No link","note":"x"}]"#;
        let resources = parse_resources(raw).unwrap();
        assert_eq!(
            resources,
            vec![
                Resource {
                    title: "A guide".to_string(),
                    url: "https://a.com/x".to_string(),
                    note: String::new(),
                },
                Resource {
                    title: "b.com".to_string(),
                    url: "https://b.com/y".to_string(),
                    note: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_resources_reads_loosely_typed_json() {
        let raw = r#"[{"title": "Course", "url": "https://example.com/course", "note": 5, "rank": 1}, {"name": "Docs", "link": "https://example.com/docs", "why": "Reference."}]"#;
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "Course");
        assert_eq!(resources[0].note, "");
        assert_eq!(resources[1].title, "Docs");
        assert_eq!(resources[1].url, "https://example.com/docs");
        assert_eq!(resources[1].note, "Reference.");
    }

    #[test]
    fn test_parse_resources_reads_single_quoted_dicts() {
        let raw = r#"Resources: [{'title': 'Pandas Guide', 'url': 'https://pandas.pydata.org/docs/', 'note': None}, {'title': "Kaggle's Course", 'url': 'https://www.kaggle.com/learn/pandas', 'rationale': 'Hands-on.'}]"#;
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "Pandas Guide");
        assert_eq!(resources[0].note, "");
        assert_eq!(resources[1].title, "Kaggle's Course");
        assert_eq!(resources[1].url, "https://www.kaggle.com/learn/pandas");
        assert_eq!(resources[1].note, "Hands-on.");
    }

    #[test]
    fn test_parse_resources_from_lines() {
        let raw = "1. The Rust Book - https://doc.rust-lang.org/book/ - The canonical introduction.\n\
                   2. [Rust by Example](https://doc.rust-lang.org/rust-by-example/) - Learn through runnable code.\n\
                   - Rustlings: https://github.com/rust-lang/rustlings, small exercises";
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].title, "The Rust Book");
        assert_eq!(resources[0].url, "https://doc.rust-lang.org/book/");
        assert_eq!(resources[0].note, "The canonical introduction.");
        assert_eq!(resources[1].title, "Rust by Example");
        assert_eq!(resources[1].note, "Learn through runnable code.");
        assert_eq!(resources[2].title, "Rustlings");
        assert_eq!(resources[2].url, "https://github.com/rust-lang/rustlings");
    }

    #[test]
    fn test_parse_resources_from_labelled_blocks() {
        let raw = "Title: Pandas User Guide\nURL: https://pandas.pydata.org/docs/user_guide/\nWhy: Covers every DataFrame operation.\n\n\
                   Title: Kaggle Pandas Course\nURL: https://www.kaggle.com/learn/pandas\nRationale: Hands-on exercises.";
        let resources = parse_resources(raw).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "Pandas User Guide");
        assert_eq!(resources[0].note, "Covers every DataFrame operation.");
        assert_eq!(resources[1].title, "Kaggle Pandas Course");
        assert_eq!(resources[1].note, "Hands-on exercises.");
    }

    #[test]
    fn test_parse_resources_caps_at_three_in_agent_order() {
        let raw = (1..=5)
            .map(|i| format!("Site {i} - https://example{i}.com/"))
            .collect::<Vec<_>>()
            .join("\n");
        let resources = parse_resources(&raw).unwrap();
        assert_eq!(
            resources.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["Site 1", "Site 2", "Site 3"]
        );
    }

    #[test]
    fn test_parse_resources_without_urls_fails() {
        let err = parse_resources("I could not find anything useful, sorry.").unwrap_err();
        assert_eq!(err.reason, "no valid resource URLs found");
    }

    #[test]
    fn test_parse_project_with_title_label() {
        let raw = "Title: Personal Finance Dashboard\nDescription: Load your bank exports with pandas and chart monthly spending.";
        let idea = parse_project(raw).unwrap();
        assert_eq!(idea.title, "Personal Finance Dashboard");
        assert_eq!(
            idea.description,
            "Load your bank exports with pandas and chart monthly spending."
        );
    }

    #[test]
    fn test_parse_project_with_heading() {
        let raw = "## **Weather Trend Explorer**\n\nFetch a public weather dataset.\nClean it and plot trends.";
        let idea = parse_project(raw).unwrap();
        assert_eq!(idea.title, "Weather Trend Explorer");
        assert_eq!(idea.description, "Fetch a public weather dataset. Clean it and plot trends.");
    }

    #[test]
    fn test_parse_project_falls_back_to_first_sentence() {
        let raw = "Build a \"Personal Portfolio Website\". This project is perfect because it needs HTML, CSS and JavaScript.";
        let idea = parse_project(raw).unwrap();
        assert_eq!(idea.title, "Build a \"Personal Portfolio Website\"");
        assert_eq!(idea.description, raw);
    }

    #[test]
    fn test_parse_project_title_is_bounded() {
        let raw = "word ".repeat(60);
        let idea = parse_project(&raw).unwrap();
        assert!(idea.title.chars().count() <= MAX_TITLE_CHARS + 1);
        assert!(idea.title.ends_with('…'));
    }

    #[test]
    fn test_parse_project_empty_fails() {
        assert!(parse_project("  \n ").is_err());
    }
}
