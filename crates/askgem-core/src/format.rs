//! Markdown-flavored model output to displayable HTML.
//!
//! Not a markdown parser: it only recognizes fenced code
//! blocks and inline code spans, then normalizes paragraph and line breaks.
//! The passes run in a fixed order and each one scans the output of the
//! previous one:
//!
//! 1. Fenced blocks become `<pre class="language-{lang} line-numbers">`
//!    with escaped content (`text` when the fence has no language tag).
//! 2. Inline spans become `<code class="inline-code">`, content verbatim.
//! 3. Runs of two or more newlines become `</p><p>`.
//! 4. Remaining newlines become `<br>`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Language class used when a fence carries no tag.
pub const DEFAULT_LANGUAGE: &str = "text";

// ASCII-only tag; `\w` would also accept Unicode letters.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([A-Za-z0-9_]+)?\n([\s\S]*?)\n```").expect("fenced block pattern is valid")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern is valid"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("paragraph pattern is valid"));

/// Converts raw model text into HTML.
///
/// Never fails. Unterminated fences stay literal text; only the newline
/// passes touch them.
pub fn format_response(text: &str) -> String {
    let with_blocks = FENCED_BLOCK.replace_all(text, |caps: &Captures<'_>| {
        let language = caps.get(1).map_or(DEFAULT_LANGUAGE, |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str());
        format!(
            r#"<pre class="language-{language} line-numbers"><code>{}</code></pre>"#,
            escape_html(code)
        )
    });

    let with_inline =
        INLINE_CODE.replace_all(&with_blocks, r#"<code class="inline-code">${1}</code>"#);

    let with_paragraphs = PARAGRAPH_BREAK.replace_all(&with_inline, "</p><p>");

    with_paragraphs.replace('\n', "<br>")
}

/// Escapes the five HTML-significant characters.
///
/// `&` goes first so the entities introduced by the later substitutions are
/// not escaped a second time.
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
