//! Prompt in, raw reply text out.
//!
//! `Requester` performs exactly one call to its generator per prompt. No
//! retries, no timeout handling, no caching. When `prewrap_code` is on it
//! wraps every code span of the reply in `<pre><code>` before returning,
//! unescaped. `format::format_response` later re-processes the same spans,
//! so a fenced block ends up wrapped twice. Pre-wrapping is on by default.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;

use crate::providers::{GeminiClient, ProviderResult};

// Fenced blocks (lazy, across newlines) or inline spans without a backtick.
static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(```[\s\S]*?```|`[^`]+`)").expect("code span pattern is valid")
});

/// Anything that can turn a prompt into reply text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = ProviderResult<String>> + Send;
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        self.generate_content(prompt).await
    }
}

pub struct Requester<G> {
    generator: G,
    prewrap_code: bool,
}

impl<G: TextGenerator> Requester<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prewrap_code: true,
        }
    }

    #[must_use]
    pub fn with_prewrap(mut self, prewrap_code: bool) -> Self {
        self.prewrap_code = prewrap_code;
        self
    }

    /// Returns the generator's reply, pre-wrapped when enabled.
    ///
    /// # Errors
    /// Returns the generator's error unchanged.
    pub async fn generate_response(&self, prompt: &str) -> ProviderResult<String> {
        let text = self.generator.generate(prompt).await?;
        tracing::debug!(chars = text.len(), "received reply");
        if self.prewrap_code {
            Ok(wrap_code_spans(&text))
        } else {
            Ok(text)
        }
    }
}

/// Wraps each fenced block or inline span in `<pre><code>`, verbatim.
pub fn wrap_code_spans(text: &str) -> String {
    CODE_SPAN
        .replace_all(text, "<pre><code>${1}</code></pre>")
        .into_owned()
}
