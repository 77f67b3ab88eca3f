use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("bold pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").expect("italic pattern"));

const PARAGRAPH_BREAK: &str = "<br><br>";

/// Renders the agent's markdown-ish reply as HTML paragraphs.
///
/// Bullet lines (starting with `*` or `-`) each become their own `• item`
/// paragraph, blank lines end a paragraph, and the remaining lines of a
/// paragraph are joined with spaces.
pub fn format_message_for_display(text: &str) -> String {
    let text = escape_html(text);
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");

    let mut paragraphs: Vec<String> = vec![];
    let mut current: Vec<&str> = vec![];

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            flush(&mut current, &mut paragraphs);
        } else if line.starts_with('*') || line.starts_with('-') {
            flush(&mut current, &mut paragraphs);
            let item = line.trim_start_matches(['*', '-']).trim();
            paragraphs.push(format!("• {}", item));
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs.join(PARAGRAPH_BREAK)
}

fn flush(current: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
        current.clear();
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
