//! Open run streams and the dispatch loop.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest_eventsource::{Event, EventSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::events::StreamEvent;
use super::handler::{dispatch, AgentEventHandler, DispatchFlow};
use crate::error::FoundryError;
use crate::http::status_to_error;

/// Dispatch state of a run stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    /// A `done` event was received.
    Done,
    /// Closed by the caller, cancelled, failed, or ended without `done`.
    Closed,
}

/// An open event stream for one run.
///
/// The underlying connection is released as soon as the stream reaches
/// [`StreamState::Done`] or [`StreamState::Closed`], and on drop.
pub struct AgentRunStream {
    inner: Option<BoxStream<'static, Result<StreamEvent, FoundryError>>>,
    state: StreamState,
    cancel: Option<CancellationToken>,
}

impl AgentRunStream {
    /// Wrap any stream of decoded events.
    pub fn from_events<S>(events: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, FoundryError>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(events)),
            state: StreamState::Streaming,
            cancel: None,
        }
    }

    pub(crate) fn from_event_source(mut source: EventSource) -> Self {
        let events = async_stream::stream! {
            while let Some(item) = source.next().await {
                match item {
                    Ok(Event::Open) => debug!("Run stream opened"),
                    Ok(Event::Message(message)) => {
                        trace!(event = %message.event, "Run stream frame");
                        yield Ok(StreamEvent::from_sse(&message.event, &message.data));
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(e) => {
                        yield Err(transport_error(e).await);
                        break;
                    }
                }
            }
            source.close();
        };
        Self::from_events(events)
    }

    /// Stop reading when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Release the connection. No further events are read.
    pub fn close(&mut self) {
        self.inner = None;
        if self.state == StreamState::Streaming {
            self.state = StreamState::Closed;
        }
    }

    /// Pull the next event. Returns `None` once the stream is done or closed.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, FoundryError>> {
        let item = {
            let inner = self.inner.as_mut()?;
            match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Run stream cancelled");
                        None
                    }
                    item = inner.next() => item,
                },
                None => inner.next().await,
            }
        };

        match item {
            Some(Ok(event)) => {
                if event.is_done() {
                    self.inner = None;
                    self.state = StreamState::Done;
                }
                Some(Ok(event))
            }
            Some(Err(e)) => {
                self.close();
                Some(Err(e))
            }
            None => {
                self.close();
                None
            }
        }
    }

    /// Dispatch every event to `handler` until `done`, closure, or an error.
    pub async fn until_done<H>(&mut self, handler: &mut H) -> Result<(), FoundryError>
    where
        H: AgentEventHandler + ?Sized,
    {
        while let Some(item) = self.next_event().await {
            let event = item?;
            trace!(kind = event.kind(), "Dispatching run event");
            match dispatch(&event, handler) {
                Ok(DispatchFlow::Continue) => {}
                Ok(DispatchFlow::Stop) => break,
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

async fn transport_error(error: reqwest_eventsource::Error) -> FoundryError {
    use reqwest_eventsource::Error;

    match error {
        Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            status_to_error(status.as_u16(), &body)
        }
        Error::InvalidContentType(content_type, _) => FoundryError::Stream(format!(
            "expected text/event-stream, got {}",
            content_type.to_str().unwrap_or("<binary>")
        )),
        Error::Transport(e) => FoundryError::Network(e),
        other => FoundryError::Stream(other.to_string()),
    }
}
