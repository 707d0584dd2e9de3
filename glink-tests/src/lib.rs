/// Test utilities and helpers for GraphLink testing
///
/// Provides an in-process loopback transport with a scripted server, so the
/// multiplexing layer can be exercised end to end without a network.

use crossbeam::channel::{self, Receiver, Sender};
use glink_core::{
    ClientConfig, Error, FrameSink, Request, RequestBatcher, RequestBody, RequestId,
    ResponseListener, Response, Result, TransactionStream,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Set RUST_LOG to see output, e.g. RUST_LOG=glink_core=debug.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_ids(true)
            .try_init();
    });
}

/// Small configuration suited to tests.
pub fn test_config(workers: usize) -> ClientConfig {
    ClientConfig::new()
        .with_worker_count(workers)
        .with_max_batch_requests(64)
}

/// Request payload understood by the scripted server.
#[derive(Debug, Clone, PartialEq)]
pub enum TestRequest {
    /// Answered with a single page holding the value.
    Echo(u64),
    /// Answered with a server error carrying the message.
    Fail(String),
    /// Streams `0..count` in pages of the server's page size.
    Stream { count: u64 },
    /// Never answered.
    Silent,
}

/// Response payload: one page of values.
pub type TestResponse = Vec<u64>;

/// Sink that records every frame and optionally forwards it to a server.
pub struct RecordingSink<Q> {
    frames: Mutex<Vec<Vec<Request<Q>>>>,
    forward: Mutex<Option<Sender<Vec<Request<Q>>>>>,
    closes: AtomicUsize,
}

impl<Q: Clone> RecordingSink<Q> {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            forward: Mutex::new(None),
            closes: AtomicUsize::new(0),
        }
    }

    fn forwarding(sender: Sender<Vec<Request<Q>>>) -> Self {
        let sink = Self::new();
        *sink.forward.lock() = Some(sender);
        sink
    }

    /// Frames written so far, in write order.
    pub fn frames(&self) -> Vec<Vec<Request<Q>>> {
        self.frames.lock().clone()
    }

    /// All requests written so far, in write order.
    pub fn requests(&self) -> Vec<Request<Q>> {
        self.frames.lock().iter().flatten().cloned().collect()
    }

    /// Ids of continuation requests written so far.
    pub fn continuations(&self) -> Vec<RequestId> {
        self.requests()
            .into_iter()
            .filter(|r| r.is_continuation())
            .map(|r| r.id)
            .collect()
    }

    /// Number of times the outbound side was half-closed.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl<Q: Clone> Default for RecordingSink<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Clone + Send> FrameSink<Q> for RecordingSink<Q> {
    fn send(&self, requests: Vec<Request<Q>>) -> Result<()> {
        self.frames.lock().push(requests.clone());
        if let Some(forward) = self.forward.lock().as_ref() {
            forward
                .send(requests)
                .map_err(|_| Error::Transport("loopback server is gone".to_string()))?;
        }
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.forward.lock().take();
    }
}

/// Order in which the scripted server delivers the responses to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Request order.
    InOrder,
    /// Last request first. Responses to the same request keep their order.
    Reversed,
}

/// Scripted server answering [`TestRequest`]s.
///
/// Streams pause after every page with a continue marker until the client
/// asks for more.
pub struct ScriptedServer {
    page_size: u64,
    cursors: HashMap<RequestId, (u64, u64)>,
}

impl ScriptedServer {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            cursors: HashMap::new(),
        }
    }

    fn next_page(&mut self, id: RequestId) -> Vec<Response<TestResponse>> {
        let Some((next, end)) = self.cursors.get(&id).copied() else {
            return vec![Response::error(
                id,
                Error::Server {
                    code: "TEST".to_string(),
                    message: "no such cursor".to_string(),
                },
            )];
        };

        let page_end = (next + self.page_size).min(end);
        let mut responses = Vec::new();
        if page_end > next {
            responses.push(Response::ok(id, (next..page_end).collect()));
        }
        if page_end < end {
            self.cursors.insert(id, (page_end, end));
            responses.push(Response::stream_continue(id));
        } else {
            self.cursors.remove(&id);
            responses.push(Response::stream_done(id));
        }
        responses
    }

    /// Responses to one request, in the order they are sent.
    pub fn handle(&mut self, request: Request<TestRequest>) -> Vec<Response<TestResponse>> {
        let id = request.id;
        match request.body {
            RequestBody::Payload(TestRequest::Echo(value)) => vec![Response::ok(id, vec![value])],
            RequestBody::Payload(TestRequest::Fail(message)) => vec![Response::error(
                id,
                Error::Server {
                    code: "TEST".to_string(),
                    message,
                },
            )],
            RequestBody::Payload(TestRequest::Stream { count }) => {
                self.cursors.insert(id, (0, count));
                self.next_page(id)
            }
            RequestBody::Payload(TestRequest::Silent) => Vec::new(),
            RequestBody::Continue => self.next_page(id),
        }
    }
}

fn serve(
    frames: Receiver<Vec<Request<TestRequest>>>,
    listener: Arc<dyn ResponseListener<TestResponse>>,
    mut server: ScriptedServer,
    delivery: Delivery,
) {
    for frame in frames.iter() {
        let mut per_request: Vec<Vec<Response<TestResponse>>> =
            frame.into_iter().map(|request| server.handle(request)).collect();
        if delivery == Delivery::Reversed {
            per_request.reverse();
        }
        for response in per_request.into_iter().flatten() {
            listener.on_message(response);
        }
    }
    listener.on_completed();
}

/// A transaction stream wired to a [`ScriptedServer`] on its own thread.
pub struct Loopback {
    pub stream: TransactionStream<TestRequest, TestResponse>,
    pub sink: Arc<RecordingSink<TestRequest>>,
    server: Option<JoinHandle<()>>,
}

impl Loopback {
    pub fn open(batcher: &RequestBatcher, page_size: u64, delivery: Delivery) -> Result<Self> {
        let (sender, receiver) = channel::unbounded();
        let sink = Arc::new(RecordingSink::forwarding(sender));
        let stream = TransactionStream::<TestRequest, TestResponse>::open(batcher, sink.clone())?;
        let listener = stream.listener();
        let server = thread::Builder::new()
            .name("glink-loopback".to_string())
            .spawn(move || serve(receiver, listener, ScriptedServer::new(page_size), delivery))
            .map_err(|e| Error::Internal(format!("failed to spawn loopback server: {}", e)))?;

        Ok(Self {
            stream,
            sink,
            server: Some(server),
        })
    }

    /// Close the stream and wait for the server thread to finish.
    pub fn shutdown(mut self) {
        self.stream.close();
        if let Some(server) = self.server.take() {
            let _ = server.join();
        }
    }
}

/// A transaction stream with no server: responses are injected by the test
/// through the stream's listener.
pub struct Manual {
    pub stream: TransactionStream<TestRequest, TestResponse>,
    pub sink: Arc<RecordingSink<TestRequest>>,
    pub listener: Arc<dyn ResponseListener<TestResponse>>,
}

impl Manual {
    pub fn open(batcher: &RequestBatcher) -> Result<Self> {
        let sink = Arc::new(RecordingSink::new());
        let stream = TransactionStream::<TestRequest, TestResponse>::open(batcher, sink.clone())?;
        let listener = stream.listener();
        Ok(Self {
            stream,
            sink,
            listener,
        })
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
