//! Event handler callbacks and dispatch.

use std::io::{self, Write};

use super::events::StreamEvent;
use super::types::{MessageDeltaChunk, MessageDeltaContent, RunStep, ThreadMessage, ThreadRun};
use crate::error::FoundryError;

/// Callbacks invoked for each run event, one per event kind.
///
/// Every method defaults to doing nothing. Returning an error stops
/// dispatch and the error is propagated to the caller of
/// [`AgentRunStream::until_done`](super::AgentRunStream::until_done).
pub trait AgentEventHandler: Send {
    fn on_message_delta(&mut self, _delta: &MessageDeltaChunk) -> Result<(), FoundryError> {
        Ok(())
    }

    fn on_thread_message(&mut self, _message: &ThreadMessage) -> Result<(), FoundryError> {
        Ok(())
    }

    fn on_thread_run(&mut self, _run: &ThreadRun) -> Result<(), FoundryError> {
        Ok(())
    }

    fn on_run_step(&mut self, _step: &RunStep) -> Result<(), FoundryError> {
        Ok(())
    }

    /// An `error` event from the service. This is data, not a fault.
    fn on_error(&mut self, _data: &str) -> Result<(), FoundryError> {
        Ok(())
    }

    fn on_done(&mut self) -> Result<(), FoundryError> {
        Ok(())
    }

    fn on_unhandled_event(&mut self, _event_type: &str, _data: &str) -> Result<(), FoundryError> {
        Ok(())
    }
}

/// Whether dispatch continues after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFlow {
    Continue,
    Stop,
}

/// Route one event to exactly one handler method.
pub fn dispatch<H>(event: &StreamEvent, handler: &mut H) -> Result<DispatchFlow, FoundryError>
where
    H: AgentEventHandler + ?Sized,
{
    match event {
        StreamEvent::MessageDelta(delta) => handler.on_message_delta(delta)?,
        StreamEvent::ThreadMessage(message) => handler.on_thread_message(message)?,
        StreamEvent::ThreadRun(run) => handler.on_thread_run(run)?,
        StreamEvent::RunStep(step) => handler.on_run_step(step)?,
        StreamEvent::Error(data) => handler.on_error(data)?,
        StreamEvent::Done => {
            handler.on_done()?;
            return Ok(DispatchFlow::Stop);
        }
        StreamEvent::Unhandled { event_type, data } => handler.on_unhandled_event(event_type, data)?,
    }
    Ok(DispatchFlow::Continue)
}

/// Prints one line per event.
pub struct ConsoleEventHandler<W = io::Stdout> {
    out: W,
}

impl ConsoleEventHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleEventHandler<io::Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write + Send> ConsoleEventHandler<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> Result<(), FoundryError> {
        self.out.write_fmt(text)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> AgentEventHandler for ConsoleEventHandler<W> {
    fn on_message_delta(&mut self, delta: &MessageDeltaChunk) -> Result<(), FoundryError> {
        for part in &delta.delta.content {
            if let MessageDeltaContent::Text { text, .. } = part {
                let value = text
                    .as_ref()
                    .and_then(|t| t.value.as_deref())
                    .unwrap_or("No text");
                self.line(format_args!("Text delta received: {value}"))?;
            }
        }
        Ok(())
    }

    fn on_thread_message(&mut self, message: &ThreadMessage) -> Result<(), FoundryError> {
        match message.content.first() {
            Some(first) => {
                let content = serde_json::to_string(first)?;
                self.line(format_args!(
                    "ThreadMessage created. ID: {}, Status: {}, Content: {content}",
                    message.id, message.status
                ))
            }
            None => self.line(format_args!(
                "ThreadMessage created. ID: {}, Status: {}",
                message.id, message.status
            )),
        }
    }

    fn on_thread_run(&mut self, run: &ThreadRun) -> Result<(), FoundryError> {
        self.line(format_args!("ThreadRun status: {}", run.status))
    }

    fn on_run_step(&mut self, step: &RunStep) -> Result<(), FoundryError> {
        self.line(format_args!(
            "RunStep type: {}, Status: {}",
            step.step_type, step.status
        ))
    }

    fn on_error(&mut self, data: &str) -> Result<(), FoundryError> {
        self.line(format_args!("An error occurred. Data: {data}"))
    }

    fn on_done(&mut self) -> Result<(), FoundryError> {
        self.line(format_args!("Stream completed."))
    }

    fn on_unhandled_event(&mut self, event_type: &str, data: &str) -> Result<(), FoundryError> {
        self.line(format_args!("Unhandled Event Type: {event_type}, Data: {data}"))
    }
}
