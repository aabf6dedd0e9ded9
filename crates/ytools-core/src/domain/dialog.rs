//! Vocabulary shared by the dialog helpers and the host dialog surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Severity of a transient message toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageKind {
    /// Title used when the caller does not supply one.
    pub fn default_title(self) -> &'static str {
        match self {
            MessageKind::Info => "Notice",
            MessageKind::Success => "Success",
            MessageKind::Warning => "Warning",
            MessageKind::Error => "Error",
        }
    }

    /// How long the toast stays on screen.
    pub fn display_duration(self) -> Duration {
        match self {
            MessageKind::Info | MessageKind::Success => Duration::from_millis(2500),
            MessageKind::Warning | MessageKind::Error => Duration::from_millis(3000),
        }
    }
}

/// Which kind of modal prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    /// OK / Cancel.
    Confirm,
    /// Yes / No, closable without answering.
    Ask,
}

impl PromptKind {
    pub fn default_title(self) -> &'static str {
        match self {
            PromptKind::Confirm => "Confirm",
            PromptKind::Ask => "Question",
        }
    }

    /// Labels of the (positive, negative) buttons.
    pub fn button_labels(self) -> (&'static str, &'static str) {
        match self {
            PromptKind::Confirm => ("OK", "Cancel"),
            PromptKind::Ask => ("Yes", "No"),
        }
    }
}

/// A modal prompt handed to the host dialog surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub title: String,
    pub content: String,
    pub positive_text: String,
    pub negative_text: String,
}

impl PromptRequest {
    pub fn new(kind: PromptKind, content: &str, title: Option<&str>) -> Self {
        let (positive, negative) = kind.button_labels();
        Self {
            kind,
            title: title.unwrap_or(kind.default_title()).to_string(),
            content: content.to_string(),
            positive_text: positive.to_string(),
            negative_text: negative.to_string(),
        }
    }
}

/// How the user left a modal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptResponse {
    Positive,
    Negative,
    /// Closed without choosing (close button, Escape, click outside).
    Dismissed,
}
