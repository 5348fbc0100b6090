use thiserror::Error;

/// Failures surfaced while talking to the workflow runner.
///
/// Problems that happen after a run has started are not returned as errors;
/// they reach the caller as a `TransportLost` event on the run's channel.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid runner URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to submit workflow to {url}: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("runner rejected the submission with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport interrupted: {0}")]
    Transport(String),
    #[error("undecodable envelope: {0}")]
    Decode(String),
}
