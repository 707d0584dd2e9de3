/// Response collectors
///
/// A collector is the rendezvous point between the thread that receives
/// responses from the transport and the caller waiting for them. Responses
/// are buffered in arrival order and handed out one at a time. A collector
/// becomes *done* once a terminal response has been added; responses added
/// afterwards are still buffered but do not change that state.
///
/// The [`CollectorTable`] maps in-flight request ids of one transaction to
/// their collectors.

use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::id::RequestId;
use crate::message::ResponseBody;
use crate::metrics;

/// Decides whether a response ends its request's response sequence.
pub type TerminalPredicate<P> = Box<dyn Fn(&ResponseBody<P>) -> bool + Send + Sync>;

/// Shape of the response sequence a collector expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorKind {
    /// Exactly one response; the first one is terminal.
    Single,
    /// Any number of pages ending with `StreamDone` or `Error`.
    Multiple,
}

impl CollectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorKind::Single => "single",
            CollectorKind::Multiple => "multiple",
        }
    }
}

struct CollectorState<P> {
    buffer: VecDeque<ResponseBody<P>>,
    done: bool,
}

/// Thread-safe FIFO of responses for one request.
pub struct ResponseCollector<P> {
    id: RequestId,
    kind: CollectorKind,
    is_terminal: TerminalPredicate<P>,
    state: Mutex<CollectorState<P>>,
    available: Condvar,
}

impl<P> ResponseCollector<P> {
    /// Create a collector with a custom terminal predicate.
    pub fn new(id: RequestId, kind: CollectorKind, is_terminal: TerminalPredicate<P>) -> Self {
        Self {
            id,
            kind,
            is_terminal,
            state: Mutex::new(CollectorState {
                buffer: VecDeque::new(),
                done: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Collector for a request answered by exactly one response.
    pub fn single(id: RequestId) -> Self {
        Self::new(id, CollectorKind::Single, Box::new(|_| true))
    }

    /// Collector for a streamed result.
    pub fn multiple(id: RequestId) -> Self {
        Self::new(
            id,
            CollectorKind::Multiple,
            Box::new(|body| matches!(body, ResponseBody::StreamDone | ResponseBody::Error(_))),
        )
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> CollectorKind {
        self.kind
    }

    /// Buffer a response and wake a waiting consumer.
    ///
    /// Returns true if this response moved the collector to done.
    pub fn add(&self, body: ResponseBody<P>) -> bool {
        let mut state = self.state.lock();
        let completes = !state.done && (self.is_terminal)(&body);
        if completes {
            state.done = true;
        }
        state.buffer.push_back(body);
        drop(state);
        self.available.notify_all();
        completes
    }

    /// Block until a response is available and return the oldest one.
    pub fn take(&self) -> ResponseBody<P> {
        let mut state = self.state.lock();
        loop {
            if let Some(body) = state.buffer.pop_front() {
                return body;
            }
            self.available.wait(&mut state);
        }
    }

    /// Like [`take`](Self::take) but gives up after `timeout`.
    ///
    /// A timeout leaves the collector untouched: a response that arrives
    /// later is returned by the next call.
    pub fn take_timeout(&self, timeout: Duration) -> Result<ResponseBody<P>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(body) = state.buffer.pop_front() {
                return Ok(body);
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return state.buffer.pop_front().ok_or(Error::Timeout(timeout));
            }
        }
    }

    /// Return the oldest buffered response without blocking.
    pub fn try_take(&self) -> Option<ResponseBody<P>> {
        self.state.lock().buffer.pop_front()
    }

    pub fn is_done(&self) -> bool {
        self.state.lock().done
    }

    /// Number of responses buffered and not yet taken.
    pub fn buffered(&self) -> usize {
        self.state.lock().buffer.len()
    }
}

struct TableState<P> {
    collectors: HashMap<RequestId, Arc<ResponseCollector<P>>>,
    closed: Option<Error>,
}

/// In-flight collectors of one transaction, keyed by request id.
///
/// Once closed the table rejects new registrations with the close error, so
/// a caller racing a close can never register a collector that nobody will
/// complete.
pub struct CollectorTable<P> {
    state: Mutex<TableState<P>>,
}

impl<P> CollectorTable<P> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                collectors: HashMap::new(),
                closed: None,
            }),
        }
    }

    /// Register a collector under its request id.
    pub fn insert(&self, collector: Arc<ResponseCollector<P>>) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(err) = &state.closed {
            return Err(err.clone());
        }
        let id = collector.id();
        if state.collectors.contains_key(&id) {
            return Err(Error::DuplicateRequestId(id));
        }
        state.collectors.insert(id, collector);
        metrics::INFLIGHT_REQUESTS.inc();
        Ok(())
    }

    pub fn get(&self, id: &RequestId) -> Option<Arc<ResponseCollector<P>>> {
        self.state.lock().collectors.get(id).cloned()
    }

    pub fn remove(&self, id: &RequestId) -> Option<Arc<ResponseCollector<P>>> {
        let removed = self.state.lock().collectors.remove(id);
        if removed.is_some() {
            metrics::INFLIGHT_REQUESTS.dec();
        }
        removed
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.state.lock().collectors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the table and hand back every collector still registered.
    ///
    /// Only the first call drains; later calls return an empty list.
    pub fn close(&self, error: Error) -> Vec<Arc<ResponseCollector<P>>> {
        let mut state = self.state.lock();
        if state.closed.is_some() {
            return Vec::new();
        }
        state.closed = Some(error);
        let drained: Vec<_> = state.collectors.drain().map(|(_, c)| c).collect();
        metrics::INFLIGHT_REQUESTS.sub(drained.len() as i64);
        drained
    }
}

impl<P> Default for CollectorTable<P> {
    fn default() -> Self {
        Self::new()
    }
}
