/// Transaction streams
///
/// A [`TransactionStream`] multiplexes many logical request/response
/// exchanges over one bidirectional transport stream. Every request is
/// tagged with a fresh [`RequestId`] and gets a [`ResponseCollector`];
/// inbound responses are routed to the collector registered under their id.
/// Responses for different requests may arrive in any order, responses for
/// the same request arrive in server order.
///
/// Collectors are removed by the inbound side as soon as their terminal
/// response has been buffered. A caller that stops waiting (a timeout, an
/// abandoned iterator) therefore never turns a late response into an
/// unknown-id failure.
///
/// Closing a stream is idempotent. Whatever the cause, the first close
/// completes every outstanding collector with the close error, half-closes
/// the transport exactly once and runs the registered close callbacks.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

use crate::batcher::{Dispatch, Dispatcher, Executor, RequestBatcher};
use crate::collector::{CollectorTable, ResponseCollector};
use crate::error::{Error, Result};
use crate::id::RequestId;
use crate::iterator::ResultIterator;
use crate::message::{Metadata, Request, Response, ResponseBody};
use crate::metrics;
use crate::transport::{FrameSink, ResponseListener};

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// How a request reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Queue for the stream's batch worker.
    #[default]
    Batched,
    /// Flush the stream's queue on the calling thread.
    Immediate,
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub dispatch: DispatchMode,
    pub metadata: Metadata,
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn immediate(mut self) -> Self {
        self.dispatch = DispatchMode::Immediate;
        self
    }

    pub fn batched(mut self) -> Self {
        self.dispatch = DispatchMode::Batched;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply `timeout` unless the call already carries one.
    pub fn or_timeout(mut self, timeout: Option<Duration>) -> Self {
        if self.timeout.is_none() {
            self.timeout = timeout;
        }
        self
    }
}

#[derive(Debug, Clone)]
enum CloseReason {
    Requested,
    RemoteCompleted,
    RemoteError(Error),
    UnknownRequestId(RequestId),
    WorkerShutdown(Error),
}

impl CloseReason {
    fn label(&self) -> &'static str {
        match self {
            CloseReason::Requested => "requested",
            CloseReason::RemoteCompleted => "remote_completed",
            CloseReason::RemoteError(_) => "remote_error",
            CloseReason::UnknownRequestId(_) => "unknown_request_id",
            CloseReason::WorkerShutdown(_) => "worker_shutdown",
        }
    }

    fn error(&self) -> Error {
        match self {
            CloseReason::Requested | CloseReason::RemoteCompleted => Error::TransactionClosed,
            CloseReason::RemoteError(cause) => Error::TransactionClosedWithErrors(cause.to_string()),
            CloseReason::UnknownRequestId(id) => Error::UnknownRequestId(*id),
            CloseReason::WorkerShutdown(cause) => cause.clone(),
        }
    }
}

type CloseCallback = Box<dyn FnOnce(&Error) + Send>;

struct CloseState {
    error: Option<Error>,
    callbacks: Vec<CloseCallback>,
}

struct StreamShared<Q, P> {
    id: u64,
    collectors: CollectorTable<P>,
    dispatcher: Dispatcher<Q>,
    is_open: AtomicBool,
    close_state: Mutex<CloseState>,
}

impl<Q, P> StreamShared<Q, P> {
    fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    fn close_error(&self) -> Error {
        self.close_state
            .lock()
            .error
            .clone()
            .unwrap_or(Error::TransactionClosed)
    }

    fn on_response(&self, response: Response<P>) {
        if !self.is_open() {
            trace!(stream = self.id, request_id = %response.id, "Dropping response for closed transaction");
            return;
        }

        let id = response.id;
        match self.collectors.get(&id) {
            Some(collector) => {
                if collector.add(response.body) {
                    self.collectors.remove(&id);
                }
            }
            None => {
                if !self.is_open() {
                    return;
                }
                error!(
                    stream = self.id,
                    request_id = %id,
                    "Received a response with unknown request id, closing transaction"
                );
                self.shutdown(CloseReason::UnknownRequestId(id));
            }
        }
    }

    fn shutdown(&self, reason: CloseReason) {
        if self
            .is_open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let error = reason.error();

        if matches!(reason, CloseReason::Requested) {
            if let Err(err) = self.dispatcher.flush() {
                debug!(stream = self.id, error = %err, "Failed to flush queued requests on close");
            }
        }

        let outstanding = self.collectors.close(error.clone());
        for collector in &outstanding {
            collector.add(ResponseBody::Error(error.clone()));
        }

        self.dispatcher.close_sink();
        self.dispatcher.executor().deregister(self.id);

        metrics::OPEN_TRANSACTIONS.dec();
        metrics::TRANSACTIONS_CLOSED_TOTAL
            .with_label_values(&[reason.label()])
            .inc();

        match reason {
            CloseReason::Requested | CloseReason::RemoteCompleted => debug!(
                stream = self.id,
                reason = reason.label(),
                outstanding = outstanding.len(),
                "Transaction stream closed"
            ),
            _ => warn!(
                stream = self.id,
                reason = reason.label(),
                outstanding = outstanding.len(),
                error = %error,
                "Transaction stream closed with error"
            ),
        }

        let callbacks = {
            let mut state = self.close_state.lock();
            state.error = Some(error.clone());
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback(&error);
        }
    }
}

impl<Q, P> Drop for StreamShared<Q, P> {
    fn drop(&mut self) {
        self.shutdown(CloseReason::Requested);
    }
}

impl<Q: Send, P: Send> Dispatch for StreamShared<Q, P> {
    fn stream_id(&self) -> u64 {
        self.id
    }

    fn flush(&self) -> bool {
        match self.dispatcher.flush() {
            Ok(sent) => sent,
            Err(err) => {
                warn!(stream = self.id, error = %err, "Failed to write batched requests");
                self.shutdown(CloseReason::RemoteError(err));
                false
            }
        }
    }

    fn force_close(&self, error: Error) {
        self.shutdown(CloseReason::WorkerShutdown(error));
    }
}

/// Inbound side of a transaction stream, handed to the transport binding.
///
/// Holds only a weak reference, so a transport that outlives every handle
/// of the stream does not keep it alive.
struct StreamListener<Q, P> {
    shared: Weak<StreamShared<Q, P>>,
}

impl<Q: Send, P: Send> ResponseListener<P> for StreamListener<Q, P> {
    fn on_message(&self, response: Response<P>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.on_response(response);
        }
    }

    fn on_error(&self, cause: Error) {
        if let Some(shared) = self.shared.upgrade() {
            shared.shutdown(CloseReason::RemoteError(cause));
        }
    }

    fn on_completed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.shutdown(CloseReason::RemoteCompleted);
        }
    }
}

/// Handle to an in-flight request expecting exactly one response.
pub struct PendingResponse<P> {
    collector: Arc<ResponseCollector<P>>,
    consumed: bool,
}

impl<P> PendingResponse<P> {
    pub fn id(&self) -> RequestId {
        self.collector.id()
    }

    /// True once the response has arrived.
    pub fn is_ready(&self) -> bool {
        self.collector.buffered() > 0
    }

    /// Block until the response arrives.
    pub fn wait(self) -> Result<P> {
        if self.consumed {
            return Err(Error::Internal("response already consumed".to_string()));
        }
        self.collector.take().into_unary()
    }

    /// Block for at most `timeout`. On timeout the request stays in flight
    /// and the call may be repeated.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<P> {
        if self.consumed {
            return Err(Error::Internal("response already consumed".to_string()));
        }
        let body = self.collector.take_timeout(timeout)?;
        self.consumed = true;
        body.into_unary()
    }
}

/// Request multiplexer over one bidirectional transport stream.
pub struct TransactionStream<Q, P> {
    shared: Arc<StreamShared<Q, P>>,
}

impl<Q, P> Clone for TransactionStream<Q, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<Q: Send + 'static, P: Send + 'static> TransactionStream<Q, P> {
    /// Open a stream on the batcher's next executor.
    pub fn open(batcher: &RequestBatcher, sink: Arc<dyn FrameSink<Q>>) -> Result<Self> {
        let executor = batcher.next_executor()?;
        Self::with_executor(executor, sink, batcher.max_batch_requests())
    }

    /// Open a stream pinned to `executor`.
    pub fn with_executor(
        executor: Arc<Executor>,
        sink: Arc<dyn FrameSink<Q>>,
        max_batch_requests: usize,
    ) -> Result<Self> {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        let worker = executor.index();
        let shared = Arc::new(StreamShared {
            id,
            collectors: CollectorTable::new(),
            dispatcher: Dispatcher::new(sink, Arc::clone(&executor), max_batch_requests),
            is_open: AtomicBool::new(true),
            close_state: Mutex::new(CloseState {
                error: None,
                callbacks: Vec::new(),
            }),
        });
        metrics::OPEN_TRANSACTIONS.inc();

        let as_dispatch: Arc<dyn Dispatch> = shared.clone();
        if let Err(err) = executor.register(&as_dispatch) {
            shared.shutdown(CloseReason::WorkerShutdown(err.clone()));
            return Err(err);
        }

        debug!(stream = id, worker, "Transaction stream opened");
        Ok(Self { shared })
    }

    /// Event handler the transport binding must feed inbound events into.
    pub fn listener(&self) -> Arc<dyn ResponseListener<P>> {
        Arc::new(StreamListener {
            shared: Arc::downgrade(&self.shared),
        })
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn worker(&self) -> usize {
        self.shared.dispatcher.executor().index()
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open()
    }

    /// The error outstanding and future requests fail with, once closed.
    pub fn close_error(&self) -> Option<Error> {
        self.shared.close_state.lock().error.clone()
    }

    /// Number of requests still awaiting their terminal response.
    pub fn outstanding(&self) -> usize {
        self.shared.collectors.len()
    }

    /// Send `payload` and block for its single response.
    pub fn execute_unary(&self, payload: Q) -> Result<P> {
        self.execute_unary_with(payload, CallOptions::default())
    }

    pub fn execute_unary_with(&self, payload: Q, options: CallOptions) -> Result<P> {
        let timeout = options.timeout;
        let mut pending = self.submit(payload, options)?;
        match timeout {
            Some(timeout) => pending.wait_timeout(timeout),
            None => pending.wait(),
        }
    }

    /// Send `payload` without waiting for its response.
    pub fn submit(&self, payload: Q, options: CallOptions) -> Result<PendingResponse<P>> {
        let id = RequestId::generate();
        let request = Request::new(id, payload).with_metadata(options.metadata);
        let collector = self.start_request(request, ResponseCollector::single(id), options.dispatch)?;
        Ok(PendingResponse {
            collector,
            consumed: false,
        })
    }

    /// Send `payload` now and iterate over its streamed answers.
    ///
    /// `decode` turns one response page into the items it carries.
    pub fn execute_streaming<T, F>(&self, payload: Q, decode: F) -> Result<ResultIterator<Q, P, T>>
    where
        F: FnMut(P) -> Result<Vec<T>> + Send + 'static,
    {
        self.execute_streaming_with(payload, CallOptions::default(), decode)
    }

    pub fn execute_streaming_with<T, F>(
        &self,
        payload: Q,
        options: CallOptions,
        decode: F,
    ) -> Result<ResultIterator<Q, P, T>>
    where
        F: FnMut(P) -> Result<Vec<T>> + Send + 'static,
    {
        let mut iterator = self.stream_deferred(payload, options, decode)?;
        iterator.start()?;
        Ok(iterator)
    }

    /// Like [`execute_streaming_with`](Self::execute_streaming_with) but
    /// nothing is sent until the iterator is first pulled.
    pub fn stream_deferred<T, F>(
        &self,
        payload: Q,
        options: CallOptions,
        decode: F,
    ) -> Result<ResultIterator<Q, P, T>>
    where
        F: FnMut(P) -> Result<Vec<T>> + Send + 'static,
    {
        if !self.is_open() {
            return Err(self.shared.close_error());
        }
        let id = RequestId::generate();
        let request = Request::new(id, payload).with_metadata(options.metadata);
        Ok(ResultIterator::new(
            self.clone(),
            request,
            options.dispatch,
            options.timeout,
            Box::new(decode),
        ))
    }

    /// Register a callback run once when the stream closes, for whatever
    /// reason. Runs immediately if the stream is already closed.
    pub fn on_close<F>(&self, callback: F)
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        let mut state = self.shared.close_state.lock();
        match state.error.clone() {
            Some(error) => {
                drop(state);
                callback(&error);
            }
            None => state.callbacks.push(Box::new(callback)),
        }
    }

    /// Close the stream. Queued requests are flushed first; outstanding
    /// requests fail with [`Error::TransactionClosed`]. Idempotent.
    pub fn close(&self) {
        self.shared.shutdown(CloseReason::Requested);
    }

    pub(crate) fn start_request(
        &self,
        request: Request<Q>,
        collector: ResponseCollector<P>,
        mode: DispatchMode,
    ) -> Result<Arc<ResponseCollector<P>>> {
        let id = request.id;
        let collector = Arc::new(collector);
        self.shared.collectors.insert(Arc::clone(&collector))?;
        metrics::REQUESTS_TOTAL
            .with_label_values(&[collector.kind().as_str()])
            .inc();
        trace!(stream = self.shared.id, request_id = %id, kind = collector.kind().as_str(), "Submitting request");

        if let Err(err) = self.transmit(request, mode) {
            self.shared.collectors.remove(&id);
            return Err(err);
        }
        Ok(collector)
    }

    pub(crate) fn send_continuation(&self, id: RequestId) -> Result<()> {
        metrics::REQUESTS_TOTAL.with_label_values(&["continue"]).inc();
        trace!(stream = self.shared.id, request_id = %id, "Requesting next page");
        self.transmit(Request::continuation(id), DispatchMode::Immediate)
    }

    fn transmit(&self, request: Request<Q>, mode: DispatchMode) -> Result<()> {
        if !self.is_open() {
            return Err(self.shared.close_error());
        }
        match mode {
            DispatchMode::Batched => {
                self.shared.dispatcher.dispatch(request);
                Ok(())
            }
            DispatchMode::Immediate => self.shared.dispatcher.dispatch_now(request).map_err(|err| {
                self.shared.shutdown(CloseReason::RemoteError(err.clone()));
                err
            }),
        }
    }
}
