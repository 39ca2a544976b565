//! Run stream events.

use serde::de::DeserializeOwned;

use super::types::{MessageDeltaChunk, RunStep, ThreadMessage, ThreadRun};

/// A decoded server-sent event from an agent run.
///
/// Event names follow the service's `thread.*` families. Anything the
/// decoder does not model, or cannot decode, arrives as [`StreamEvent::Unhandled`]
/// with the original tag and payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `thread.message.delta`
    MessageDelta(MessageDeltaChunk),
    /// `thread.message.{created,in_progress,completed,incomplete}`
    ThreadMessage(ThreadMessage),
    /// `thread.run.*`
    ThreadRun(ThreadRun),
    /// `thread.run.step.*` except deltas
    RunStep(RunStep),
    /// `error`; the raw payload is kept as data.
    Error(String),
    /// `done`
    Done,
    Unhandled { event_type: String, data: String },
}

impl StreamEvent {
    /// Decode one SSE frame. Never fails.
    pub fn from_sse(event_type: &str, data: &str) -> Self {
        match event_type {
            "done" => Self::Done,
            "error" => Self::Error(data.to_string()),
            "thread.message.delta" => decode(event_type, data, Self::MessageDelta),
            "thread.message.created"
            | "thread.message.in_progress"
            | "thread.message.completed"
            | "thread.message.incomplete" => decode(event_type, data, Self::ThreadMessage),
            "thread.run.step.delta" => unhandled(event_type, data),
            t if t.starts_with("thread.run.step.") => decode(event_type, data, Self::RunStep),
            t if t.starts_with("thread.run.") => decode(event_type, data, Self::ThreadRun),
            _ => unhandled(event_type, data),
        }
    }

    /// Name of the variant, for logging.
    pub fn kind(&self) -> &str {
        match self {
            Self::MessageDelta(_) => "message_delta",
            Self::ThreadMessage(_) => "thread_message",
            Self::ThreadRun(_) => "thread_run",
            Self::RunStep(_) => "run_step",
            Self::Error(_) => "error",
            Self::Done => "done",
            Self::Unhandled { event_type, .. } => event_type,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

fn unhandled(event_type: &str, data: &str) -> StreamEvent {
    StreamEvent::Unhandled {
        event_type: event_type.to_string(),
        data: data.to_string(),
    }
}

fn decode<T, F>(event_type: &str, data: &str, wrap: F) -> StreamEvent
where
    T: DeserializeOwned,
    F: FnOnce(T) -> StreamEvent,
{
    match serde_json::from_str::<T>(data) {
        Ok(payload) => wrap(payload),
        Err(e) => {
            tracing::debug!(event_type, error = %e, "Undecodable run event payload");
            unhandled(event_type, data)
        }
    }
}
