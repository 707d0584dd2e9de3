/// GraphLink core: transaction multiplexing
///
/// Everything here is transport-agnostic and blocking. A transport binding
/// supplies a [`FrameSink`] per transaction and drives inbound events into
/// the stream's [`ResponseListener`]; the rest of the client talks to a
/// [`TransactionStream`].

pub mod batcher;
pub mod collector;
pub mod config;
pub mod error;
pub mod id;
pub mod iterator;
pub mod message;
pub mod metrics;
pub mod transaction_stream;
pub mod transport;

pub use batcher::{Executor, RequestBatcher};
pub use collector::{CollectorKind, CollectorTable, ResponseCollector};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use id::RequestId;
pub use iterator::{IteratorState, ResultIterator};
pub use message::{Metadata, Request, RequestBody, Response, ResponseBody};
pub use transaction_stream::{CallOptions, DispatchMode, PendingResponse, TransactionStream};
pub use transport::{FrameSink, ResponseListener};
