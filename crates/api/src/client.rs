use std::env;

use futures_util::Stream;
use reqwest::{Client, header};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};
use uuid::Uuid;
use vlei_types::{Configuration, RunEvent, RunSubmission, WorkflowDocument};

use crate::stream::pump_events;
use crate::{BridgeError, RunnerSettings};

/// Accepted response encodings, in preference order.
const ACCEPT_EVENT_STREAM: &str = "text/event-stream, application/x-ndjson;q=0.9";

/// HTTP client for the external workflow runner.
#[derive(Debug, Clone)]
pub struct RunnerClient {
    settings: RunnerSettings,
    http: Client,
    user_agent: String,
}

impl RunnerClient {
    pub fn new(settings: RunnerSettings) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(BridgeError::Client)?;
        Ok(Self {
            settings,
            http,
            user_agent: format!("vlei-explorer/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Submits a run and starts streaming its events.
    ///
    /// Returns once the runner has accepted the submission; progress and the
    /// terminal outcome arrive on the returned [`RunHandle`]. Each call gets a
    /// fresh run id, so concurrent runs never share events.
    pub async fn submit(&self, workflow: &WorkflowDocument, config: &Configuration) -> Result<RunHandle, BridgeError> {
        let url = self.settings.run_url()?;
        let run_id = Uuid::new_v4().to_string();
        let submission = RunSubmission {
            workflow: workflow.clone(),
            config: config.clone(),
        };
        debug!(target: "vlei_bridge", %url, %run_id, "submitting workflow run");

        let response = self
            .http
            .post(url.clone())
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, ACCEPT_EVENT_STREAM)
            .json(&submission)
            .send()
            .await
            .map_err(|source| BridgeError::Send {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        info!(target: "vlei_bridge", %run_id, "run accepted");
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(pump_events(response.bytes_stream(), run_id.clone(), sender));
        Ok(RunHandle { run_id, receiver })
    }
}

/// Prefers the `error` field of a JSON error body over the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(JsonValue::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Receiving end of one run.
///
/// Dropping the handle abandons the run locally: the pump stops and the
/// connection is closed. Nothing is sent to the runner.
#[derive(Debug)]
pub struct RunHandle {
    run_id: String,
    receiver: UnboundedReceiver<RunEvent>,
}

impl RunHandle {
    pub fn new(run_id: String, receiver: UnboundedReceiver<RunEvent>) -> Self {
        Self { run_id, receiver }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Next event of the run; `None` after the terminal event has been taken.
    pub async fn next(&mut self) -> Option<RunEvent> {
        self.receiver.recv().await
    }

    pub fn into_stream(self) -> impl Stream<Item = RunEvent> {
        futures_util::stream::unfold(self.receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_json_error_field() {
        assert_eq!(error_message(r#"{"error":"Workflow and config are required"}"#), "Workflow and config are required");
        assert_eq!(error_message(" Bad Gateway \n"), "Bad Gateway");
    }

    #[tokio::test]
    async fn handle_yields_events_in_send_order() {
        use futures_util::StreamExt;

        let (sender, receiver) = mpsc::unbounded_channel();
        for result in [1, 2] {
            sender
                .send(RunEvent::Completed {
                    run_id: "r".into(),
                    result: result.into(),
                })
                .expect("send");
        }
        drop(sender);

        let events: Vec<_> = RunHandle::new("r".into(), receiver).into_stream().collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], RunEvent::Completed { result, .. } if result == &JsonValue::from(1)));
    }
}
