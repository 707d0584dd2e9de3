/// Seams between the multiplexer and the wire.
///
/// A transport binding opens one bidirectional stream per transaction. The
/// outbound half is handed to the multiplexer as a [`FrameSink`]; the binding
/// then drives every inbound event into the [`ResponseListener`] obtained
/// from the transaction stream.

use crate::error::{Error, Result};
use crate::message::{Request, Response};

/// Outbound half of a transaction's bidirectional stream.
pub trait FrameSink<Q>: Send + Sync {
    /// Write one frame carrying `requests` in order.
    fn send(&self, requests: Vec<Request<Q>>) -> Result<()>;

    /// Half-close the outbound side. Called at most once per stream.
    fn close(&self);
}

/// Inbound event handler of a transaction's bidirectional stream.
///
/// Events for one stream must be delivered from a single thread, in the
/// order the transport received them.
pub trait ResponseListener<P>: Send + Sync {
    fn on_message(&self, response: Response<P>);

    /// The stream failed. No further events follow.
    fn on_error(&self, cause: Error);

    /// The server ended the stream. No further events follow.
    fn on_completed(&self);
}
