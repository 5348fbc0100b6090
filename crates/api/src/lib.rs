//! Workflow runner client for the vLEI explorer.
//!
//! A run is submitted with [`RunnerClient::submit`], which posts the workflow
//! and configuration to `<base>/run-workflow` and hands back a [`RunHandle`].
//! The runner streams JSON envelopes back; a background task decodes them
//! into [`vlei_types::RunEvent`]s, each stamped with the run's id.
//!
//! # Example
//!
//! ```ignore
//! use vlei_api::{RunnerClient, RunnerSettings};
//! use vlei_util::ExplorerConfig;
//!
//! let settings = RunnerSettings::resolve(None, &ExplorerConfig::load()?)?;
//! let mut run = RunnerClient::new(settings)?.submit(&workflow, &config).await?;
//! while let Some(event) = run.next().await {
//!     println!("{event:?}");
//! }
//! ```
//!
//! Runs are never retried. A stream that ends or fails before the runner
//! reports an outcome yields a single `TransportLost` event.

mod client;
mod error;
mod settings;
mod stream;

pub use client::{RunHandle, RunnerClient};
pub use error::BridgeError;
pub use settings::{DEFAULT_RUNNER_URL, RUN_WORKFLOW_PATH, RUNNER_URL_ENV, RunnerSettings};
pub use stream::{decode_envelope, pump_events};
