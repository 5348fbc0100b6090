//! # vLEI Explorer Engine
//!
//! Turns a workflow document and an environment configuration into a
//! positioned, typed graph, and maps an interactively edited builder graph back
//! into the two documents.
//!
//! ## Usage
//!
//! ```rust
//! use vlei_engine::{derive_graph_seeded, parse_configuration_str, parse_workflow_str};
//!
//! let workflow = parse_workflow_str(r#"
//! workflow:
//!   steps:
//!     S1:
//!       type: issue_credential
//!       issuer_aid: A
//!       issuee_aid: B
//!       credential: cred1
//! "#, "flow.yaml")?;
//! let config = parse_configuration_str(r#"{"identifiers": {"A": {}, "B": {}}}"#, "config.json")?;
//!
//! let graph = derive_graph_seeded(&workflow, &config, 7);
//! assert_eq!(graph.nodes.len(), 3);
//! assert_eq!(graph.edges.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`derive`**: step filtering, cross-reference resolvers, node extraction, layout, edges
//! - **`builder`**: builder graph edits and export back to documents
//! - **`document`**: YAML/JSON ingestion
//! - **`export`**: YAML/JSON artifact export
//! - **`session`**: upload-order independent session state

pub mod builder;
pub mod derive;
pub mod document;
pub mod export;
pub mod session;

pub use builder::{
    ConnectOutcome, DEFAULT_SCHEMA, NodeUpdate, add_node, connect, graph_to_builder, promote_target_to_multisig, remove_edge,
    remove_node, set_edge_kind, to_documents, update_node,
};
pub use derive::{LayoutParams, LayoutRng, derive_graph, derive_graph_seeded};
pub use document::{
    DocumentError, load_configuration_file, load_workflow_file, parse_configuration_str, parse_workflow_str, require_steps,
};
pub use export::{ExportBundle, export_documents};
pub use session::{ExplorerSession, LoadedDocument};
