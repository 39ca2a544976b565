//! Agent service resource models.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role of a thread message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Lifecycle status of a thread message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageStatus {
    InProgress,
    Incomplete,
    Completed,
    /// A value this crate does not model, kept as sent.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

/// Lifecycle status of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
    /// A value this crate does not model, kept as sent.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStepType {
    MessageCreation,
    ToolCalls,
    /// A value this crate does not model, kept as sent.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStepStatus {
    InProgress,
    Cancelled,
    Failed,
    Completed,
    Expired,
    /// A value this crate does not model, kept as sent.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

/// Options for creating an agent.
#[derive(Debug, Clone, Builder, Serialize)]
pub struct CreateAgentOptions {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDeletionStatus {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentThread {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Text body of a message content part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageTextDetails {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageFileDetails {
    pub file_id: String,
}

/// One content part of a complete thread message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: MessageTextDetails },
    ImageFile { image_file: ImageFileDetails },
    /// Any other part, kept as the raw JSON object.
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadMessage {
    pub id: String,
    pub thread_id: String,
    pub status: MessageStatus,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl ThreadMessage {
    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A page of messages, newest first unless requested otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadMessages {
    pub data: Vec<ThreadMessage>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadRun {
    pub id: String,
    pub thread_id: String,
    pub assistant_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub last_error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: RunStepType,
    pub status: RunStepStatus,
    pub run_id: String,
    pub thread_id: String,
    #[serde(default)]
    pub step_details: Option<serde_json::Value>,
}

/// Incremental text of a delta content part. `value` may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageDeltaTextDetails {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

/// One content part of a message delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageDeltaContent {
    Text {
        index: u32,
        #[serde(default)]
        text: Option<MessageDeltaTextDetails>,
    },
    ImageFile {
        index: u32,
        #[serde(default)]
        image_file: Option<ImageFileDetails>,
    },
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageDelta {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Vec<MessageDeltaContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageDeltaChunk {
    pub id: String,
    pub delta: MessageDelta,
}

impl MessageDeltaChunk {
    /// Text carried by the chunk's text parts, in part order.
    pub fn text(&self) -> String {
        self.delta
            .content
            .iter()
            .filter_map(|part| match part {
                MessageDeltaContent::Text {
                    text: Some(MessageDeltaTextDetails { value: Some(v), .. }),
                    ..
                } => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }
}
