/// graphlink protocol definitions
///
/// Message types and the gRPC client and server stubs for the
/// `graphlink.protocol.GraphLink` service. The modules mirror the packages
/// under `proto/` one to one and are kept in the shape `tonic-build` emits;
/// build with the `generate` feature to regenerate them.

pub mod answer;
pub mod concept;
pub mod database;
pub mod options;
pub mod query;
pub mod session;
pub mod transaction;

#[path = "graphlink.protocol.rs"]
mod protocol;

pub use protocol::{graph_link_client, graph_link_server};

pub use options::Options;
