//! Run stream dispatch through the public handler API.

mod common;

use common::RecordingHandler;
use foundry_kit::agents::{AgentEventHandler, AgentRunStream, ConsoleEventHandler, StreamEvent, StreamState};
use foundry_kit::error::FoundryError;
use pretty_assertions::assert_eq;

const MESSAGE_CREATED: &str = r#"{"id":"msg_1","thread_id":"thread_1","status":"in_progress","role":"assistant","created_at":1700000000,"content":[]}"#;
const MESSAGE_COMPLETED: &str = r#"{"id":"msg_1","thread_id":"thread_1","status":"completed","role":"assistant","created_at":1700000000,"content":[{"type":"text","text":{"value":"Why did the chicken cross the road?","annotations":[]}}]}"#;
const RUN_QUEUED: &str = r#"{"id":"run_1","thread_id":"thread_1","assistant_id":"asst_1","status":"queued"}"#;
const RUN_COMPLETED: &str = r#"{"id":"run_1","thread_id":"thread_1","assistant_id":"asst_1","status":"completed"}"#;
const STEP_CREATED: &str = r#"{"id":"step_1","type":"message_creation","status":"in_progress","run_id":"run_1","thread_id":"thread_1"}"#;

fn delta(parts: &str) -> String {
    format!(r#"{{"id":"msg_1","delta":{{"content":[{parts}]}}}}"#)
}

fn stream_of(frames: Vec<(&str, String)>) -> AgentRunStream {
    let events: Vec<Result<StreamEvent, FoundryError>> = frames
        .into_iter()
        .map(|(event_type, data)| Ok(StreamEvent::from_sse(event_type, &data)))
        .collect();
    AgentRunStream::from_events(futures::stream::iter(events))
}

async fn console_output(frames: Vec<(&str, String)>) -> String {
    let mut stream = stream_of(frames);
    let mut handler = ConsoleEventHandler::new(Vec::new());
    stream.until_done(&mut handler).await.unwrap();
    String::from_utf8(handler.into_inner()).unwrap()
}

#[tokio::test]
async fn full_run_prints_every_event_in_order() {
    let output = console_output(vec![
        ("thread.run.created", RUN_QUEUED.to_string()),
        ("thread.run.step.created", STEP_CREATED.to_string()),
        ("thread.message.created", MESSAGE_CREATED.to_string()),
        (
            "thread.message.delta",
            delta(r#"{"index":0,"type":"text","text":{"value":"Why did"}}"#),
        ),
        ("thread.message.completed", MESSAGE_COMPLETED.to_string()),
        ("thread.run.completed", RUN_COMPLETED.to_string()),
        ("done", "[DONE]".to_string()),
    ])
    .await;

    assert_eq!(
        output,
        "ThreadRun status: queued\n\
         RunStep type: message_creation, Status: in_progress\n\
         ThreadMessage created. ID: msg_1, Status: in_progress\n\
         Text delta received: Why did\n\
         ThreadMessage created. ID: msg_1, Status: completed, Content: \
         {\"type\":\"text\",\"text\":{\"value\":\"Why did the chicken cross the road?\",\"annotations\":[]}}\n\
         ThreadRun status: completed\n\
         Stream completed.\n"
    );
}

#[tokio::test]
async fn delta_with_n_text_parts_prints_n_lines() {
    let parts = r#"{"index":0,"type":"text","text":{"value":"a"}},
                   {"index":1,"type":"text","text":{"value":"b"}},
                   {"index":2,"type":"text"}"#;
    let output = console_output(vec![("thread.message.delta", delta(parts))]).await;
    assert_eq!(output.lines().count(), 3);
    assert_eq!(
        output,
        "Text delta received: a\nText delta received: b\nText delta received: No text\n"
    );
}

#[tokio::test]
async fn delta_without_text_parts_prints_nothing() {
    let output = console_output(vec![(
        "thread.message.delta",
        delta(r#"{"index":0,"type":"image_file","image_file":{"file_id":"file_1"}}"#),
    )])
    .await;
    assert_eq!(output, "");
}

#[tokio::test]
async fn nothing_is_dispatched_after_done() {
    let mut stream = stream_of(vec![
        ("thread.run.created", RUN_QUEUED.to_string()),
        ("done", "[DONE]".to_string()),
        ("thread.run.completed", RUN_COMPLETED.to_string()),
        ("error", "late".to_string()),
    ]);
    let mut handler = RecordingHandler::default();
    stream.until_done(&mut handler).await.unwrap();

    assert_eq!(handler.calls, vec!["run:queued", "done"]);
    assert_eq!(stream.state(), StreamState::Done);
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn unknown_and_malformed_events_are_forwarded_verbatim() {
    let output = console_output(vec![
        ("thread.run.step.delta", r#"{"id":"step_1","delta":{}}"#.to_string()),
        ("thread.custom.event", "raw payload".to_string()),
        ("thread.run.created", "{not json".to_string()),
    ])
    .await;
    assert_eq!(
        output,
        "Unhandled Event Type: thread.run.step.delta, Data: {\"id\":\"step_1\",\"delta\":{}}\n\
         Unhandled Event Type: thread.custom.event, Data: raw payload\n\
         Unhandled Event Type: thread.run.created, Data: {not json\n"
    );
}

#[tokio::test]
async fn error_event_is_data_and_dispatch_continues() {
    let mut stream = stream_of(vec![
        ("error", r#"{"message":"rate limited"}"#.to_string()),
        ("thread.run.completed", RUN_COMPLETED.to_string()),
        ("done", "[DONE]".to_string()),
    ]);
    let mut handler = RecordingHandler::default();
    stream.until_done(&mut handler).await.unwrap();
    assert_eq!(
        handler.calls,
        vec![r#"error:{"message":"rate limited"}"#, "run:completed", "done"]
    );
}

#[tokio::test]
async fn handler_failure_closes_stream_and_propagates() {
    struct FailOnRun(usize);
    impl AgentEventHandler for FailOnRun {
        fn on_thread_run(&mut self, _run: &foundry_kit::agents::ThreadRun) -> Result<(), FoundryError> {
            self.0 += 1;
            Err(FoundryError::InvalidState("handler gave up".into()))
        }
    }

    let mut stream = stream_of(vec![
        ("thread.run.created", RUN_QUEUED.to_string()),
        ("thread.run.completed", RUN_COMPLETED.to_string()),
        ("done", "[DONE]".to_string()),
    ]);
    let mut handler = FailOnRun(0);
    let err = stream.until_done(&mut handler).await.unwrap_err();

    assert!(matches!(err, FoundryError::InvalidState(_)));
    assert_eq!(handler.0, 1);
    assert_eq!(stream.state(), StreamState::Closed);
}

#[tokio::test]
async fn stream_ending_without_done_is_closed() {
    let mut stream = stream_of(vec![("thread.run.created", RUN_QUEUED.to_string())]);
    let mut handler = RecordingHandler::default();
    stream.until_done(&mut handler).await.unwrap();
    assert_eq!(handler.calls, vec!["run:queued"]);
    assert_eq!(stream.state(), StreamState::Closed);
}

#[tokio::test]
async fn transport_error_mid_stream_is_returned() {
    let events: Vec<Result<StreamEvent, FoundryError>> = vec![
        Ok(StreamEvent::from_sse("thread.run.created", RUN_QUEUED)),
        Err(FoundryError::Stream("connection reset".into())),
        Ok(StreamEvent::Done),
    ];
    let mut stream = AgentRunStream::from_events(futures::stream::iter(events));
    let mut handler = RecordingHandler::default();

    let err = stream.until_done(&mut handler).await.unwrap_err();
    assert!(matches!(err, FoundryError::Stream(_)));
    assert_eq!(handler.calls, vec!["run:queued"]);
    assert_eq!(stream.state(), StreamState::Closed);
}
