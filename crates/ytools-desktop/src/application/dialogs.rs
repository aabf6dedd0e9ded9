//! Message and prompt helpers over the host dialog surface.
//!
//! Messages are fire-and-forget toasts with a default title and a duration
//! that depends on severity.  Prompts are modal:
//!
//! - [`Dialogs::confirm`] maps OK to `true`; Cancel *and* dismissal to `false`.
//! - [`Dialogs::ask`] keeps dismissal apart and returns `None` for it.
//!
//! Surface failures are not caught here; they propagate to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use ytools_core::{MessageKind, PromptKind, PromptRequest, PromptResponse};

/// Error type for dialog surface operations.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("dialog surface unavailable: {0}")]
    Unavailable(String),

    #[error("dialog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host capability that renders toasts and modal prompts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogSurface: Send + Sync {
    async fn show_message(
        &self,
        kind: MessageKind,
        title: &str,
        text: &str,
        duration: Duration,
    ) -> Result<(), DialogError>;

    async fn prompt(&self, request: PromptRequest) -> Result<PromptResponse, DialogError>;
}

/// Dialog helpers used by the views.
#[derive(Clone)]
pub struct Dialogs {
    surface: Arc<dyn DialogSurface>,
}

impl Dialogs {
    pub fn new(surface: Arc<dyn DialogSurface>) -> Self {
        Self { surface }
    }

    async fn message(
        &self,
        kind: MessageKind,
        text: &str,
        title: Option<&str>,
    ) -> Result<(), DialogError> {
        let title = title.unwrap_or(kind.default_title());
        self.surface
            .show_message(kind, title, text, kind.display_duration())
            .await
    }

    pub async fn info(&self, text: &str, title: Option<&str>) -> Result<(), DialogError> {
        self.message(MessageKind::Info, text, title).await
    }

    pub async fn success(&self, text: &str, title: Option<&str>) -> Result<(), DialogError> {
        self.message(MessageKind::Success, text, title).await
    }

    pub async fn warning(&self, text: &str, title: Option<&str>) -> Result<(), DialogError> {
        self.message(MessageKind::Warning, text, title).await
    }

    pub async fn error(&self, text: &str, title: Option<&str>) -> Result<(), DialogError> {
        self.message(MessageKind::Error, text, title).await
    }

    /// OK / Cancel prompt.  Anything but OK is `false`.
    pub async fn confirm(&self, text: &str, title: Option<&str>) -> Result<bool, DialogError> {
        let request = PromptRequest::new(PromptKind::Confirm, text, title);
        let response = self.surface.prompt(request).await?;
        Ok(response == PromptResponse::Positive)
    }

    /// Yes / No prompt.  Returns `None` when closed without an answer.
    pub async fn ask(&self, text: &str, title: Option<&str>) -> Result<Option<bool>, DialogError> {
        let request = PromptRequest::new(PromptKind::Ask, text, title);
        Ok(match self.surface.prompt(request).await? {
            PromptResponse::Positive => Some(true),
            PromptResponse::Negative => Some(false),
            PromptResponse::Dismissed => None,
        })
    }
}
