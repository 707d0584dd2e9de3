/// GraphLink gRPC Client Library
///
/// This crate provides a blocking Rust client for GraphLink graph database
/// servers. Each transaction multiplexes its queries over one bidirectional
/// stream; see `glink-core` for the multiplexing layer.

pub mod answer;
pub mod client;
pub mod concept;
mod connection;
mod convert;
pub mod database;
pub mod error;
pub mod message;
pub mod options;
pub mod query;
mod runtime;
pub mod session;
pub mod transaction;

// Re-export key types
pub use answer::{ConceptMap, Numeric};
pub use client::Client;
pub use concept::{Attribute, AttributeType, Concept, RoleType, Thing, ThingType, Value, ValueType};
pub use database::DatabaseManager;
pub use error::{ClientError, Result};
pub use glink_core::ClientConfig;
pub use options::{Options, SessionType, TransactionType};
pub use query::{AnswerStream, QueryManager};
pub use session::Session;
pub use transaction::Transaction;
