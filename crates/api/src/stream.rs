//! Incremental decoding of the runner's event stream.
//!
//! The runner writes one JSON envelope per message. Both newline-delimited JSON
//! and Server-Sent Events framing (`data:` lines separated by a blank line) are
//! accepted, in any chunking. [`pump_events`] turns the envelopes into
//! [`RunEvent`]s and forwards them in arrival order until the run ends.

use std::fmt::Display;
use std::ops::ControlFlow;
use std::pin::pin;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use vlei_types::{RunEnvelope, RunEvent, TerminalEnvelope};

use crate::BridgeError;

/// SSE fields that carry no payload for us.
const IGNORED_SSE_FIELDS: &[&str] = &["event:", "id:", "retry:"];

/// Splits raw bytes into message payloads.
#[derive(Debug, Default)]
pub(crate) struct FrameDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
    data_lines: Vec<String>,
}

impl FrameDecoder {
    /// Buffers `chunk` and returns every payload completed by it.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(found) = self.buffer[self.scanned..].iter().position(|byte| *byte == b'\n') {
            let end = self.scanned + found;
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.scanned = 0;
            self.accept_line(&line[..end], &mut payloads);
        }
        self.scanned = self.buffer.len();
        payloads
    }

    /// Flushes a trailing unterminated line and any pending SSE frame.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if !rest.is_empty() {
            self.accept_line(&rest, &mut payloads);
        }
        self.flush_frame(&mut payloads);
        payloads
    }

    fn accept_line(&mut self, raw: &[u8], payloads: &mut Vec<String>) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end_matches('\r');

        if line.trim().is_empty() {
            self.flush_frame(payloads);
        } else if line.starts_with(':') {
            // comment / keep-alive
        } else if let Some(rest) = line.strip_prefix("data:") {
            self.data_lines.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else if IGNORED_SSE_FIELDS.iter().any(|field| line.starts_with(field)) {
            debug!(target: "vlei_bridge", line, "ignoring SSE field");
        } else {
            self.flush_frame(payloads);
            payloads.push(line.trim().to_string());
        }
    }

    fn flush_frame(&mut self, payloads: &mut Vec<String>) {
        if self.data_lines.is_empty() {
            return;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        if !data.trim().is_empty() {
            payloads.push(data);
        }
    }
}

/// Decodes one payload into a wire envelope.
pub fn decode_envelope(payload: &str) -> Result<RunEnvelope, BridgeError> {
    serde_json::from_str(payload).map_err(|error| BridgeError::Decode(error.to_string()))
}

/// Tracks delivery state for one run.
struct EventPump {
    run_id: String,
    sender: UnboundedSender<RunEvent>,
    next_index: usize,
}

impl EventPump {
    fn deliver(&mut self, payload: &str) -> ControlFlow<()> {
        let envelope = match decode_envelope(payload) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(target: "vlei_bridge", run_id = %self.run_id, error = %error, payload, "skipping undecodable envelope");
                return ControlFlow::Continue(());
            }
        };

        let event = match envelope {
            RunEnvelope::Progress { step, workflow_state } => {
                self.next_index += 1;
                RunEvent::Step {
                    run_id: self.run_id.clone(),
                    index: self.next_index - 1,
                    step,
                    workflow_state,
                }
            }
            RunEnvelope::Terminal(TerminalEnvelope::Complete { result }) => RunEvent::Completed {
                run_id: self.run_id.clone(),
                result,
            },
            RunEnvelope::Terminal(TerminalEnvelope::Error { error }) => RunEvent::Failed {
                run_id: self.run_id.clone(),
                error,
            },
        };
        self.send(event)
    }

    fn transport_lost(&mut self, error: BridgeError) {
        warn!(target: "vlei_bridge", run_id = %self.run_id, error = %error, "run stream ended without a terminal event");
        let _ = self.send(RunEvent::TransportLost {
            run_id: self.run_id.clone(),
            message: error.to_string(),
        });
    }

    /// Breaks after a terminal event or once the receiver has gone away.
    fn send(&mut self, event: RunEvent) -> ControlFlow<()> {
        let terminal = event.is_terminal();
        if self.sender.send(event).is_err() {
            debug!(target: "vlei_bridge", run_id = %self.run_id, "run abandoned by caller");
            return ControlFlow::Break(());
        }
        if terminal { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    }
}

/// Forwards the events of one run from a byte stream to `sender`.
///
/// Exactly one terminal event is sent: `Completed` or `Failed` when the runner
/// reports one, otherwise a single `TransportLost` when the stream errors or
/// ends first. Nothing is sent after it. Dropping the receiving side stops the
/// pump right away, even while the stream is idle, which in turn drops the stream.
pub async fn pump_events<S, B, E>(stream: S, run_id: String, sender: UnboundedSender<RunEvent>)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = pin!(stream);
    let mut decoder = FrameDecoder::default();
    let mut pump = EventPump {
        run_id,
        sender,
        next_index: 0,
    };

    loop {
        let chunk = tokio::select! {
            chunk = stream.next() => chunk,
            () = pump.sender.closed() => {
                debug!(target: "vlei_bridge", run_id = %pump.run_id, "run abandoned by caller; closing stream");
                return;
            }
        };
        let Some(chunk) = chunk else {
            break;
        };
        match chunk {
            Ok(bytes) => {
                for payload in decoder.push(bytes.as_ref()) {
                    if pump.deliver(&payload).is_break() {
                        return;
                    }
                }
            }
            Err(error) => {
                pump.transport_lost(BridgeError::Transport(error.to_string()));
                return;
            }
        }
    }

    for payload in decoder.finish() {
        if pump.deliver(&payload).is_break() {
            return;
        }
    }
    pump.transport_lost(BridgeError::Transport("stream ended before the run finished".to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;
    use tokio::sync::mpsc;

    async fn pump_chunks(chunks: Vec<Result<&'static str, String>>) -> Vec<RunEvent> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        pump_events(stream::iter(chunks), "run-1".to_string(), sender).await;
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn sse_frames_split_across_chunks() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.push(b": keep-alive\n\ndata: {\"step\":").is_empty());
        assert_eq!(decoder.push(b"1}\n"), Vec::<String>::new());
        assert_eq!(decoder.push(b"\r\n"), vec!["{\"step\":1}".to_string()]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn long_line_across_many_chunks_is_scanned_once() {
        let mut decoder = FrameDecoder::default();
        let line = format!("{{\"step\":{{}},\"workflowState\":{{\"blob\":\"{}\"}}}}", "x".repeat(4096));
        for chunk in line.as_bytes().chunks(64) {
            assert!(decoder.push(chunk).is_empty());
            assert_eq!(decoder.scanned, decoder.buffer.len());
        }
        assert_eq!(decoder.push(b"\n{\"a\""), vec![line]);
        assert_eq!(decoder.scanned, 4);
        assert_eq!(decoder.push(b":1}\n"), vec!["{\"a\":1}".to_string()]);
        assert_eq!(decoder.scanned, 0);
    }

    #[test]
    fn ndjson_lines_and_trailing_line() {
        let mut decoder = FrameDecoder::default();
        assert_eq!(decoder.push(b"{\"a\":1}\n{\"b\":"), vec!["{\"a\":1}".to_string()]);
        assert_eq!(decoder.finish(), vec!["{\"b\":".to_string()]);
    }

    #[tokio::test]
    async fn progress_then_completion_in_order() {
        let events = pump_chunks(vec![
            Ok("data: {\"step\":{\"id\":\"a\"},\"workflowState\":{\"n\":1}}\n\n"),
            Ok("data: {\"step\":{\"id\":\"b\"},\"workflowState\":{\"n\":2}}\n\n"),
            Ok("data: {\"type\":\"complete\",\"result\":true}\n\n"),
        ])
        .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], RunEvent::Step { index: 0, step, .. } if step == &json!({"id": "a"})));
        assert!(matches!(&events[1], RunEvent::Step { index: 1, workflow_state, .. } if workflow_state == &json!({"n": 2})));
        assert_eq!(
            events[2],
            RunEvent::Completed {
                run_id: "run-1".into(),
                result: json!(true)
            }
        );
        assert!(events.iter().all(|event| event.run_id() == "run-1"));
    }

    #[tokio::test]
    async fn runner_error_is_forwarded_verbatim() {
        let events = pump_chunks(vec![Ok("{\"type\":\"error\",\"error\":\"agent 'gleif' unreachable\"}\n")]).await;
        assert_eq!(
            events,
            vec![RunEvent::Failed {
                run_id: "run-1".into(),
                error: "agent 'gleif' unreachable".into()
            }]
        );
    }

    #[tokio::test]
    async fn nothing_is_delivered_after_a_terminal_event() {
        let events = pump_chunks(vec![
            Ok("{\"type\":\"complete\",\"result\":null}\n{\"step\":{},\"workflowState\":{}}\n"),
            Err("reset".to_string()),
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_runner_terminal());
    }

    #[tokio::test]
    async fn stream_end_without_terminal_reports_transport_loss() {
        let events = pump_chunks(vec![Ok("data: {\"step\":{},\"workflowState\":{}}\n\n")]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], RunEvent::TransportLost { .. }));
    }

    #[tokio::test]
    async fn stream_error_reports_transport_loss_once() {
        let events = pump_chunks(vec![Ok("data: {\"step\":{},\"workflowState\":{}}\n\n"), Err("connection reset".to_string())]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], RunEvent::TransportLost { message, .. } if message.contains("connection reset")));
    }

    #[tokio::test]
    async fn undecodable_lines_are_skipped() {
        let events = pump_chunks(vec![Ok("not json\n{\"type\":\"paused\"}\n\n{\"type\":\"complete\",\"result\":1}")]).await;
        assert_eq!(
            events,
            vec![RunEvent::Completed {
                run_id: "run-1".into(),
                result: json!(1)
            }]
        );
    }

    #[tokio::test]
    async fn dropped_receiver_stops_the_pump() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let chunks: Vec<Result<&str, String>> = vec![Ok("{\"step\":{},\"workflowState\":{}}\n")];
        pump_events(stream::iter(chunks), "run-2".to_string(), sender).await;
    }

    #[tokio::test]
    async fn dropping_the_receiver_closes_an_idle_stream() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let chunks: Vec<Result<&str, String>> = vec![Ok("{\"step\":{},\"workflowState\":{}}\n")];
        let pump = tokio::spawn(pump_events(
            stream::iter(chunks).chain(stream::pending()),
            "run-3".to_string(),
            sender,
        ));

        assert!(matches!(receiver.recv().await, Some(RunEvent::Step { index: 0, .. })));
        drop(receiver);

        tokio::time::timeout(std::time::Duration::from_secs(2), pump)
            .await
            .expect("pump should stop once the receiver is gone")
            .expect("pump task");
    }
}
