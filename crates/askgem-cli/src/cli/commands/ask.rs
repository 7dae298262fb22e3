//! Ask command handler.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use askgem_core::config::Config;
use askgem_core::page::{self, ResponsePage};
use askgem_core::providers::GeminiClient;
use askgem_core::requester::Requester;
use askgem_core::submit::{SubmitError, Submission};

use crate::interrupt;

pub struct AskOptions<'a> {
    pub prompt: &'a str,
    pub config: &'a Config,
    pub model_override: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub open: bool,
    pub fragment: bool,
    pub no_prewrap: bool,
}

pub async fn run(options: AskOptions<'_>) -> Result<()> {
    let config = options.config;
    let model = options.model_override.unwrap_or(&config.model);
    let theme = config.effective_theme();

    if options.prompt.trim().is_empty() {
        return Err(SubmitError::EmptyPrompt.into());
    }

    let client = GeminiClient::new(config.gemini_config(model).context("configure Gemini")?);
    tracing::info!(model = client.model(), "asking");
    let requester = Requester::new(client).with_prewrap(config.prewrap_code && !options.no_prewrap);
    let submission = Submission::new();

    let result = tokio::select! {
        result = submission.submit(&requester, options.prompt) => result,
        () = interrupt::wait_for_interrupt() => {
            return Err(interrupt::InterruptedError.into());
        }
    };

    match result {
        Ok(body) => {
            let html = if options.fragment {
                body
            } else {
                page::render_response(&ResponsePage {
                    prompt: options.prompt.trim(),
                    body_html: &body,
                    theme,
                    generated_at: chrono::Local::now(),
                })
            };
            emit(&options, &html)
        }
        Err(SubmitError::Provider(err)) => {
            if options.output.is_some() {
                let html = if options.fragment {
                    page::error_block(&err.message)
                } else {
                    page::render_error(&err.message, theme)
                };
                emit(&options, &html)?;
            }
            Err(err).context("request failed")
        }
        Err(err) => Err(err.into()),
    }
}

fn emit(options: &AskOptions<'_>, html: &str) -> Result<()> {
    let Some(path) = options.output else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(html.as_bytes())
            .and_then(|()| stdout.write_all(b"\n"))
            .context("write to stdout")?;
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    eprintln!("Wrote {}", path.display());

    if options.open {
        open::that(path).with_context(|| format!("open {}", path.display()))?;
    }
    Ok(())
}
