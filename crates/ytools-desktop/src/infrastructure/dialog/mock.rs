//! Scripted dialog surface for tests.
//!
//! Records every message shown and answers prompts from a queue.  An empty
//! queue answers [`PromptResponse::Dismissed`].

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use ytools_core::{MessageKind, PromptRequest, PromptResponse};

use crate::application::dialogs::{DialogError, DialogSurface};

/// A message as it reached the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownMessage {
    pub kind: MessageKind,
    pub title: String,
    pub text: String,
    pub duration: Duration,
}

#[derive(Default)]
pub struct ScriptedDialogSurface {
    answers: Mutex<VecDeque<PromptResponse>>,
    messages: Mutex<Vec<ShownMessage>>,
    prompts: Mutex<Vec<PromptRequest>>,
    should_fail: bool,
}

impl ScriptedDialogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that answers prompts with `answers`, in order.
    pub fn answering(answers: impl IntoIterator<Item = PromptResponse>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Surface on which every call fails with [`DialogError::Unavailable`].
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<ShownMessage> {
        self.messages.lock().expect("lock poisoned").clone()
    }

    pub fn prompts(&self) -> Vec<PromptRequest> {
        self.prompts.lock().expect("lock poisoned").clone()
    }

    fn check_available(&self) -> Result<(), DialogError> {
        if self.should_fail {
            Err(DialogError::Unavailable("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DialogSurface for ScriptedDialogSurface {
    async fn show_message(
        &self,
        kind: MessageKind,
        title: &str,
        text: &str,
        duration: Duration,
    ) -> Result<(), DialogError> {
        self.check_available()?;
        self.messages
            .lock()
            .expect("lock poisoned")
            .push(ShownMessage {
                kind,
                title: title.to_string(),
                text: text.to_string(),
                duration,
            });
        Ok(())
    }

    async fn prompt(&self, request: PromptRequest) -> Result<PromptResponse, DialogError> {
        self.check_available()?;
        self.prompts.lock().expect("lock poisoned").push(request);
        Ok(self
            .answers
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or(PromptResponse::Dismissed))
    }
}
