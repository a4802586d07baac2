//! Markdown building blocks shared by every renderer.
//!
//! All helpers return owned strings ending in the newlines the block needs, so
//! callers can simply concatenate them.

use regex::Regex;
use std::sync::OnceLock;

/// Header of the given level followed by a blank line
pub fn header(level: usize, text: &str) -> String {
    format!("{} {}\n\n", "#".repeat(level.max(1)), text)
}

/// `[text](href)`
pub fn link(text: &str, href: &str) -> String {
    format!("[{}]({})", text, href)
}

/// `![desc](src)`
pub fn image(desc: &str, src: &str) -> String {
    format!("![{}]({})", desc, src)
}

/// Bulleted list item
pub fn list_item(text: &str) -> String {
    format!("* {}\n", text)
}

/// Paragraph followed by a blank line; empty text renders nothing
pub fn paragraph(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", text)
    }
}

/// `> text` followed by a blank line
pub fn block_quote(text: &str) -> String {
    format!("> {}\n\n", text)
}

/// Fenced code block
pub fn code_block(language: &str, content: &str) -> String {
    format!("```{}\n{}\n```\n", language, content)
}

/// Wrap a value in backticks; empty values stay empty.
pub fn inline_code(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("`{}`", value)
    }
}

/// Indent every non-empty line by the given number of spaces.
pub fn indent(text: &str, spaces: usize) -> String {
    let padding = " ".repeat(spaces);
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", padding, line)
            }
        })
        .collect()
}

/// Escape pipe characters so a value cannot break a table row.
pub fn escape_pipes(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Header and separator rows of a pipe table
pub fn table_head(headers: &[&str]) -> String {
    format!(
        "| {} |\n|{}\n",
        headers.join(" | "),
        "---|".repeat(headers.len())
    )
}

/// One pipe table row with escaped cells
pub fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<String> = cells.iter().map(|cell| escape_pipes(cell.as_ref())).collect();
    format!("| {} |\n", cells.join(" | "))
}

/// Full pipe table
pub fn table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut out = table_head(headers);
    for row in rows {
        out.push_str(&table_row(row));
    }
    out
}

fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\[([^\]]+)\]\(").ok())
        .as_ref()
}

/// Text of a Markdown link (`[title](url)`), or the input itself.
pub fn get_title(value: &str) -> &str {
    title_pattern()
        .and_then(|pattern| pattern.captures(value))
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str())
        .unwrap_or(value)
}

fn slug_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"</?[^>]{1,100}>",
            r#"[|$&`~=\\/@+*!?({\[\]})<>.,;:'"^]"#,
            r"[。？！，、；：【】（）〔〕［］﹃﹄“ ”‘’﹁﹂—…－～《》〈〉「」]",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Anchor for a heading, the way Markdown renderers derive it.
pub fn slugify(value: &str) -> String {
    let mut slug = get_title(value)
        .to_lowercase()
        .replace(' ', "-")
        .replace('\t', "--");
    for pattern in slug_patterns() {
        slug = pattern.replace_all(&slug, "").into_owned();
    }
    slug
}
