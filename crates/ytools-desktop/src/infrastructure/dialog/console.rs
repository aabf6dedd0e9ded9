//! Terminal dialog surface.
//!
//! Messages are written to stderr and logged; prompts read one line from
//! stdin.  An empty line or end of input counts as closing the prompt.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use ytools_core::{MessageKind, PromptRequest, PromptResponse};

use crate::application::dialogs::{DialogError, DialogSurface};

type Input = Box<dyn AsyncBufRead + Send + Unpin>;
type Output = Box<dyn AsyncWrite + Send + Unpin>;

pub struct ConsoleDialogSurface {
    input: Mutex<Input>,
    output: Mutex<Output>,
}

impl ConsoleDialogSurface {
    /// Surface over the process's stdin and stderr.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(BufReader::new(tokio::io::stdin())),
            Box::new(tokio::io::stderr()),
        )
    }

    pub fn new(input: Input, output: Output) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), DialogError> {
        let mut output = self.output.lock().await;
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl DialogSurface for ConsoleDialogSurface {
    async fn show_message(
        &self,
        kind: MessageKind,
        title: &str,
        text: &str,
        _duration: Duration,
    ) -> Result<(), DialogError> {
        match kind {
            MessageKind::Info | MessageKind::Success => info!("{title}: {text}"),
            MessageKind::Warning => warn!("{title}: {text}"),
            MessageKind::Error => error!("{title}: {text}"),
        }
        self.write_line(&format!("[{title}] {text}")).await
    }

    async fn prompt(&self, request: PromptRequest) -> Result<PromptResponse, DialogError> {
        self.write_line(&format!(
            "[{}] {} ({}/{})",
            request.title, request.content, request.positive_text, request.negative_text
        ))
        .await?;

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Ok(PromptResponse::Dismissed);
        }
        Ok(parse_answer(&line, &request))
    }
}

fn parse_answer(line: &str, request: &PromptRequest) -> PromptResponse {
    let answer = line.trim();
    if answer.is_empty() {
        return PromptResponse::Dismissed;
    }
    let is_label = |label: &str| {
        answer.eq_ignore_ascii_case(label)
            || answer
                .chars()
                .next()
                .zip(label.chars().next())
                .is_some_and(|(a, l)| answer.len() == 1 && a.eq_ignore_ascii_case(&l))
    };
    if is_label(&request.positive_text) {
        PromptResponse::Positive
    } else if is_label(&request.negative_text) {
        PromptResponse::Negative
    } else {
        PromptResponse::Dismissed
    }
}

#[cfg(test)]
mod tests {
    use ytools_core::PromptKind;

    use super::*;

    fn surface_with_input(input: &'static str) -> ConsoleDialogSurface {
        ConsoleDialogSurface::new(
            Box::new(BufReader::new(input.as_bytes())),
            Box::new(tokio::io::sink()),
        )
    }

    #[tokio::test]
    async fn test_full_and_initial_answers_are_accepted() {
        let surface = surface_with_input("yes\nn\n");
        let ask = PromptRequest::new(PromptKind::Ask, "Keep?", None);

        assert_eq!(surface.prompt(ask.clone()).await.unwrap(), PromptResponse::Positive);
        assert_eq!(surface.prompt(ask).await.unwrap(), PromptResponse::Negative);
    }

    #[tokio::test]
    async fn test_empty_line_and_eof_are_dismissals() {
        let surface = surface_with_input("\n");
        let confirm = PromptRequest::new(PromptKind::Confirm, "Reset?", None);

        assert_eq!(
            surface.prompt(confirm.clone()).await.unwrap(),
            PromptResponse::Dismissed
        );
        assert_eq!(surface.prompt(confirm).await.unwrap(), PromptResponse::Dismissed);
    }

    #[tokio::test]
    async fn test_confirm_accepts_ok_and_cancel() {
        let surface = surface_with_input("OK\ncancel\n");
        let confirm = PromptRequest::new(PromptKind::Confirm, "Reset?", None);

        assert_eq!(
            surface.prompt(confirm.clone()).await.unwrap(),
            PromptResponse::Positive
        );
        assert_eq!(surface.prompt(confirm).await.unwrap(), PromptResponse::Negative);
    }

    #[tokio::test]
    async fn test_show_message_writes_to_output() {
        let surface = surface_with_input("");
        let result = surface
            .show_message(MessageKind::Success, "Success", "Saved", Duration::ZERO)
            .await;
        assert!(result.is_ok());
    }
}
