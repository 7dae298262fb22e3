//! Standalone HTML page around a formatted answer.
//!
//! The page pulls Prism from a CDN and highlights the response container on
//! the next animation frame. Line numbers and the copy button come from
//! Prism plugins keyed off the classes `format_response` emits.

use chrono::{DateTime, Local};

use crate::format::escape_html;
use crate::theme::Theme;

const PRISM_CDN: &str = "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0";

/// Languages loaded on top of Prism core.
const PRISM_COMPONENTS: &[&str] = &["json", "bash", "javascript", "typescript"];

const STYLE: &str = r#"
:root { --bg: #ffffff; --fg: #1f2328; --muted: #656d76; --card: #f6f8fa; --accent: #0969da; --error: #cf222e; }
[data-theme="dark"] { --bg: #0d1117; --fg: #e6edf3; --muted: #8d96a0; --card: #161b22; --accent: #4493f8; --error: #f85149; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
header, main, footer { max-width: 52rem; margin: 0 auto; padding: 1rem; }
.subtitle, .ai-footer, .disclaimer { color: var(--muted); }
.response { background: var(--card); border-radius: 8px; padding: 1rem 1.5rem; }
.ai-branding { display: flex; align-items: center; gap: 0.5rem; }
.inline-code { background: var(--bg); padding: 0 0.25rem; border-radius: 4px; }
.error { color: var(--error); font-weight: 600; }
a { color: var(--accent); }
"#;

/// A successful answer ready to be rendered.
#[derive(Debug, Clone)]
pub struct ResponsePage<'a> {
    /// The question as typed; escaped on output.
    pub prompt: &'a str,
    /// Output of `format_response`, inserted as-is.
    pub body_html: &'a str,
    pub theme: Theme,
    pub generated_at: DateTime<Local>,
}

pub fn render_response(page: &ResponsePage<'_>) -> String {
    let content = format!(
        r#"<div class="response">
  <div class="ai-branding">
    <span class="ai-icon">🤖</span>
    <h2 class="response-heading">AI Response</h2>
  </div>
  <h3 class="response-sub-heading">{prompt}</h3>
  <div class="response-body"><p>{body}</p></div>
  <div class="ai-footer">
    <small>Response generated by AI at {time}</small>
  </div>
</div>"#,
        prompt = escape_html(page.prompt),
        body = page.body_html,
        time = page.generated_at.format("%H:%M:%S"),
    );
    document(page.theme, &content)
}

/// Page shown when the request failed.
pub fn render_error(message: &str, theme: Theme) -> String {
    document(theme, &error_block(message))
}

/// The alert element on its own, for fragment output.
pub fn error_block(message: &str) -> String {
    format!(
        r#"<div class="error" role="alert" aria-live="assertive">Error: {}</div>"#,
        escape_html(message)
    )
}

fn document(theme: Theme, content: &str) -> String {
    let components: String = PRISM_COMPONENTS
        .iter()
        .map(|lang| {
            format!(
                "  <script src=\"{PRISM_CDN}/components/prism-{lang}.min.js\"></script>\n"
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme="{theme}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>AI Assistant</title>
  <link rel="stylesheet" href="{PRISM_CDN}/themes/prism.min.css">
  <link rel="stylesheet" href="{PRISM_CDN}/plugins/line-numbers/prism-line-numbers.min.css">
  <link rel="stylesheet" href="{PRISM_CDN}/plugins/toolbar/prism-toolbar.min.css">
  <style>{STYLE}</style>
</head>
<body>
<header>
  <h1>AI Assistant</h1>
  <p class="subtitle">Powered by Gemini AI - Ask me anything!</p>
</header>
<main id="main-content" class="main-content">
<div id="response-container">
{content}
</div>
</main>
<footer class="disclaimer">
  <p><small>Note: This AI assistant may occasionally generate incorrect information. Verify important facts.</small></p>
  <p><small>&copy; 2025. All rights reserved. Visit us at
    <a href="http://preprince.co.za" target="_blank" rel="noopener noreferrer">preprince.co.za</a>.</small></p>
</footer>
  <script src="{PRISM_CDN}/prism.min.js"></script>
{components}  <script src="{PRISM_CDN}/plugins/line-numbers/prism-line-numbers.min.js"></script>
  <script src="{PRISM_CDN}/plugins/toolbar/prism-toolbar.min.js"></script>
  <script src="{PRISM_CDN}/plugins/copy-to-clipboard/prism-copy-to-clipboard.min.js"></script>
  <script>
    requestAnimationFrame(() => Prism.highlightAllUnder(document.getElementById("response-container")));
  </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::format::format_response;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn test_response_page_contains_formatted_body() {
        let body = format_response("Sure:\n\nRed\nGreen\nBlue");
        let html = render_response(&ResponsePage {
            prompt: "List three colors",
            body_html: &body,
            theme: Theme::Dark,
            generated_at: fixed_time(),
        });

        assert!(html.contains(r#"<html lang="en" data-theme="dark">"#));
        assert!(html.contains(
            r#"<h3 class="response-sub-heading">List three colors</h3>"#
        ));
        assert!(html.contains("<p>Sure:</p><p>Red<br>Green<br>Blue</p>"));
        assert!(html.contains("Response generated by AI at 09:26:53"));
    }

    #[test]
    fn test_prompt_is_escaped() {
        let html = render_response(&ResponsePage {
            prompt: "<script>alert(1)</script>",
            body_html: "",
            theme: Theme::Light,
            generated_at: fixed_time(),
        });
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_page_loads_highlighter() {
        let html = render_error("boom", Theme::Light);
        assert!(html.contains("prism-json.min.js"));
        assert!(html.contains("prism-copy-to-clipboard.min.js"));
        assert!(html.contains("Prism.highlightAllUnder"));
    }

    #[test]
    fn test_footer_carries_disclaimer_and_copyright() {
        let html = render_error("boom", Theme::Light);
        assert!(html.contains("Verify important facts."));
        assert!(html.contains("&copy; 2025. All rights reserved."));
        assert!(html.contains(
            r#"<a href="http://preprince.co.za" target="_blank" rel="noopener noreferrer">preprince.co.za</a>"#
        ));
    }

    #[test]
    fn test_error_block() {
        assert_eq!(
            error_block("HTTP 429: <quota>"),
            r#"<div class="error" role="alert" aria-live="assertive">Error: HTTP 429: &lt;quota&gt;</div>"#
        );
    }
}
