/// Request and response envelopes exchanged on a transaction stream
///
/// The multiplexer is generic over the request payload `Q` and the response
/// payload `P`. It only ever inspects the envelope: the id used for routing
/// and the body kind used to detect the end of a response sequence.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::id::RequestId;

/// String key/value pairs attached to a request, used to carry tracing
/// context to the server explicitly.
pub type Metadata = HashMap<String, String>;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody<Q> {
    /// A request defined by the layer above.
    Payload(Q),
    /// Asks the server for the next page of a streamed result.
    Continue,
}

/// An outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<Q> {
    pub id: RequestId,
    pub metadata: Metadata,
    pub body: RequestBody<Q>,
}

impl<Q> Request<Q> {
    pub fn new(id: RequestId, payload: Q) -> Self {
        Self {
            id,
            metadata: Metadata::new(),
            body: RequestBody::Payload(payload),
        }
    }

    /// A continuation for the streamed result identified by `id`.
    pub fn continuation(id: RequestId) -> Self {
        Self {
            id,
            metadata: Metadata::new(),
            body: RequestBody::Continue,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self.body, RequestBody::Continue)
    }
}

/// Body of an inbound response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody<P> {
    /// A successful response or one page of a streamed result.
    Ok(P),
    /// The server failed the request. Terminal.
    Error(Error),
    /// The server paused a streamed result and waits for a continuation.
    StreamContinue,
    /// The streamed result is exhausted. Terminal.
    StreamDone,
}

impl<P> ResponseBody<P> {
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseBody::Error(_))
    }

    /// Resolve the body of a request that expects exactly one answer.
    pub fn into_unary(self) -> Result<P> {
        match self {
            ResponseBody::Ok(payload) => Ok(payload),
            ResponseBody::Error(err) => Err(err),
            ResponseBody::StreamContinue => Err(Error::UnexpectedResponse(
                "stream continuation received for a single-response request".to_string(),
            )),
            ResponseBody::StreamDone => Err(Error::UnexpectedResponse(
                "stream completion received for a single-response request".to_string(),
            )),
        }
    }
}

/// An inbound response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<P> {
    pub id: RequestId,
    pub body: ResponseBody<P>,
}

impl<P> Response<P> {
    pub fn ok(id: RequestId, payload: P) -> Self {
        Self {
            id,
            body: ResponseBody::Ok(payload),
        }
    }

    pub fn error(id: RequestId, error: Error) -> Self {
        Self {
            id,
            body: ResponseBody::Error(error),
        }
    }

    pub fn stream_continue(id: RequestId) -> Self {
        Self {
            id,
            body: ResponseBody::StreamContinue,
        }
    }

    pub fn stream_done(id: RequestId) -> Self {
        Self {
            id,
            body: ResponseBody::StreamDone,
        }
    }
}
