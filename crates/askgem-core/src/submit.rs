//! Submission state: idle -> busy -> idle | failed.
//!
//! A second submission while one is pending is refused, not queued. The
//! guard returned by [`Submission::begin`] leaves the busy state on drop, so
//! every exit path (success, error, early return) re-enables submission.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::format::format_response;
use crate::providers::ProviderError;
use crate::requester::{Requester, TextGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Busy,
    /// Last request failed; submission is enabled again.
    Failed(String),
}

impl RequestState {
    pub fn is_busy(&self) -> bool {
        matches!(self, RequestState::Busy)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("A request is already in progress")]
    Busy,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Default)]
pub struct Submission {
    state: Mutex<RequestState>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RequestState {
        self.lock().clone()
    }

    /// Validates the prompt and enters the busy state.
    ///
    /// Returns the trimmed prompt with the guard.
    ///
    /// # Errors
    /// `EmptyPrompt` for blank input, `Busy` while another request is pending.
    pub fn begin<'a>(&'a self, prompt: &str) -> Result<(String, BusyGuard<'a>), SubmitError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }

        let mut state = self.lock();
        if state.is_busy() {
            return Err(SubmitError::Busy);
        }
        *state = RequestState::Busy;
        drop(state);

        Ok((
            prompt.to_string(),
            BusyGuard {
                submission: self,
                failure: None,
            },
        ))
    }

    /// Runs one prompt through the requester and formats the reply.
    ///
    /// # Errors
    /// Propagates validation and provider failures; the state records the latter.
    pub async fn submit<G: TextGenerator>(
        &self,
        requester: &Requester<G>,
        prompt: &str,
    ) -> Result<String, SubmitError> {
        let (prompt, mut guard) = self.begin(prompt)?;
        match requester.generate_response(&prompt).await {
            Ok(text) => Ok(format_response(&text)),
            Err(err) => {
                tracing::warn!(error = %err, "request failed");
                guard.fail(err.to_string());
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the busy state; restores `Idle` (or `Failed`) when dropped.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    submission: &'a Submission,
    failure: Option<String>,
}

impl BusyGuard<'_> {
    pub fn fail(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.submission.lock() = match self.failure.take() {
            Some(message) => RequestState::Failed(message),
            None => RequestState::Idle,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderResult;

    struct Reply(&'static str);

    impl TextGenerator for Reply {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unauthorized;

    impl TextGenerator for Unauthorized {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            Err(ProviderError::http_status(
                403,
                r#"{"error":{"message":"Permission denied"}}"#,
            ))
        }
    }

    #[test]
    fn test_blank_prompt_is_rejected() {
        let submission = Submission::new();
        assert!(matches!(
            submission.begin("   \n"),
            Err(SubmitError::EmptyPrompt)
        ));
        assert_eq!(submission.state(), RequestState::Idle);
    }

    #[test]
    fn test_second_begin_while_busy_fails() {
        let submission = Submission::new();
        let (prompt, _guard) = submission.begin("  hi  ").unwrap();
        assert_eq!(prompt, "hi");
        assert!(submission.state().is_busy());
        assert!(matches!(submission.begin("again"), Err(SubmitError::Busy)));
    }

    #[test]
    fn test_guard_drop_restores_idle() {
        let submission = Submission::new();
        {
            let _guard = submission.begin("hi").unwrap();
        }
        assert_eq!(submission.state(), RequestState::Idle);
        assert!(submission.begin("next").is_ok());
    }

    #[test]
    fn test_failed_state_allows_resubmission() {
        let submission = Submission::new();
        {
            let (_, mut guard) = submission.begin("hi").unwrap();
            guard.fail("boom");
        }
        assert_eq!(submission.state(), RequestState::Failed("boom".to_string()));
        assert!(submission.begin("retry").is_ok());
    }

    #[tokio::test]
    async fn test_submit_formats_reply() {
        let submission = Submission::new();
        let requester = Requester::new(Reply("Sure:\n\nRed\nGreen\nBlue"));
        let html = submission
            .submit(&requester, "List three colors")
            .await
            .unwrap();
        assert_eq!(html, "Sure:</p><p>Red<br>Green<br>Blue");
        assert_eq!(submission.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_submit_records_failure() {
        let submission = Submission::new();
        let requester = Requester::new(Unauthorized);
        let err = submission.submit(&requester, "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 403: Permission denied");
        assert_eq!(
            submission.state(),
            RequestState::Failed("HTTP 403: Permission denied".to_string())
        );
    }
}
