/// Request batching
///
/// A fixed pool of executors (worker threads) is shared by all transactions
/// of a client. Each transaction stream is pinned to one executor, chosen
/// round-robin when the stream opens. Requests submitted in batched mode are
/// queued on the stream's [`Dispatcher`] and written out by the executor on
/// its next pass, so requests submitted within the same window share a
/// frame. Immediate mode flushes the queue on the caller's thread instead.
///
/// An executor idles on a condition variable until a stream signals queued
/// work. It then waits a short first window, flushes every stream it owns,
/// and keeps flushing at the regular window until a pass finds nothing to
/// send.

use crossbeam::queue::SegQueue;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::message::Request;
use crate::metrics;
use crate::transport::FrameSink;

/// Work an executor performs on behalf of one transaction stream.
pub trait Dispatch: Send + Sync {
    fn stream_id(&self) -> u64;

    /// Write out every queued request. Returns true if anything was sent.
    fn flush(&self) -> bool;

    /// Terminate the stream because its executor is shutting down.
    fn force_close(&self, error: Error);
}

/// A batch worker thread and the streams pinned to it.
pub struct Executor {
    index: usize,
    first_window: Duration,
    window: Duration,
    streams: Mutex<HashMap<u64, Weak<dyn Dispatch>>>,
    pending: Mutex<bool>,
    wakeup: Condvar,
    shutdown: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Executor {
    fn spawn(index: usize, first_window: Duration, window: Duration) -> Result<Arc<Self>> {
        let executor = Arc::new(Self {
            index,
            first_window,
            window,
            streams: Mutex::new(HashMap::new()),
            pending: Mutex::new(false),
            wakeup: Condvar::new(),
            shutdown: AtomicBool::new(false),
            handle: Mutex::new(None),
        });

        let worker = Arc::clone(&executor);
        let handle = thread::Builder::new()
            .name(format!("glink-batch-{}", index))
            .spawn(move || worker.run())
            .map_err(|e| Error::Internal(format!("failed to spawn batch worker: {}", e)))?;
        *executor.handle.lock() = Some(handle);

        Ok(executor)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Pin a stream to this executor.
    pub fn register(&self, stream: &Arc<dyn Dispatch>) -> Result<()> {
        let mut streams = self.streams.lock();
        if self.shutdown.load(Ordering::Acquire) {
            return Err(Error::ClientClosed);
        }
        streams.insert(stream.stream_id(), Arc::downgrade(stream));
        Ok(())
    }

    pub fn deregister(&self, stream_id: u64) {
        self.streams.lock().remove(&stream_id);
    }

    /// Number of streams currently pinned to this executor.
    pub fn stream_count(&self) -> usize {
        self.streams.lock().len()
    }

    /// Signal that a stream has queued requests.
    pub fn wake(&self) {
        *self.pending.lock() = true;
        self.wakeup.notify_one();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn run(&self) {
        debug!(worker = self.index, "Batch worker started");

        loop {
            {
                let mut pending = self.pending.lock();
                while !*pending && !self.is_shutdown() {
                    self.wakeup.wait(&mut pending);
                }
                if self.is_shutdown() {
                    break;
                }
                *pending = false;
            }

            let mut window = self.first_window;
            loop {
                thread::sleep(window);
                if self.is_shutdown() || !self.flush_all() {
                    break;
                }
                window = self.window;
            }
        }

        debug!(worker = self.index, "Batch worker stopped");
    }

    fn flush_all(&self) -> bool {
        let streams: Vec<Arc<dyn Dispatch>> = {
            let mut streams = self.streams.lock();
            streams.retain(|_, stream| stream.strong_count() > 0);
            streams.values().filter_map(Weak::upgrade).collect()
        };

        let mut sent = false;
        for stream in streams {
            sent |= stream.flush();
        }
        sent
    }

    /// Stop the worker and force-close every stream pinned to it.
    fn shutdown(&self) {
        let streams: Vec<Arc<dyn Dispatch>> = {
            let mut streams = self.streams.lock();
            if self.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }
            streams.drain().filter_map(|(_, s)| s.upgrade()).collect()
        };

        if !streams.is_empty() {
            info!(
                worker = self.index,
                streams = streams.len(),
                "Closing transaction streams on batch worker shutdown"
            );
        }
        for stream in streams {
            stream.force_close(Error::ClientClosed);
        }

        self.wake();
        if let Some(handle) = self.handle.lock().take() {
            if handle.thread().id() == thread::current().id() {
                warn!(worker = self.index, "Batch worker shut down from its own thread");
            } else if handle.join().is_err() {
                warn!(worker = self.index, "Batch worker panicked");
            }
        }
    }
}

/// Pool of executors shared by every transaction of a client.
pub struct RequestBatcher {
    executors: Vec<Arc<Executor>>,
    next: AtomicUsize,
    max_batch_requests: usize,
    is_open: AtomicBool,
}

impl RequestBatcher {
    /// Start `config.worker_count` executors.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidArgument)?;

        let executors = (0..config.worker_count)
            .map(|index| Executor::spawn(index, config.first_batch_window, config.batch_window))
            .collect::<Result<Vec<_>>>()?;

        info!(workers = executors.len(), "Request batcher started");

        Ok(Self {
            executors,
            next: AtomicUsize::new(0),
            max_batch_requests: config.max_batch_requests,
            is_open: AtomicBool::new(true),
        })
    }

    /// Executor for the next transaction, in round-robin order.
    pub fn next_executor(&self) -> Result<Arc<Executor>> {
        if !self.is_open() {
            return Err(Error::ClientClosed);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.executors.len();
        Ok(Arc::clone(&self.executors[index]))
    }

    pub fn worker_count(&self) -> usize {
        self.executors.len()
    }

    pub fn max_batch_requests(&self) -> usize {
        self.max_batch_requests
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    /// Shut down every executor. Idempotent.
    pub fn close(&self) {
        if self.is_open.swap(false, Ordering::AcqRel) {
            info!("Shutting down request batcher");
            for executor in &self.executors {
                executor.shutdown();
            }
        }
    }
}

impl Drop for RequestBatcher {
    fn drop(&mut self) {
        self.close();
    }
}

/// Outbound request queue of one transaction stream.
///
/// Frame writes are serialised, so requests leave in the order they were
/// queued regardless of which thread flushes.
pub struct Dispatcher<Q> {
    queue: SegQueue<Request<Q>>,
    sink: Arc<dyn FrameSink<Q>>,
    send_lock: Mutex<()>,
    max_batch_requests: usize,
    executor: Arc<Executor>,
}

impl<Q> Dispatcher<Q> {
    pub fn new(sink: Arc<dyn FrameSink<Q>>, executor: Arc<Executor>, max_batch_requests: usize) -> Self {
        Self {
            queue: SegQueue::new(),
            sink,
            send_lock: Mutex::new(()),
            max_batch_requests: max_batch_requests.max(1),
            executor,
        }
    }

    /// Queue a request for the executor's next pass.
    pub fn dispatch(&self, request: Request<Q>) {
        self.queue.push(request);
        self.executor.wake();
    }

    /// Queue a request and flush the queue on the calling thread.
    pub fn dispatch_now(&self, request: Request<Q>) -> Result<()> {
        self.queue.push(request);
        self.flush().map(|_| ())
    }

    /// Write queued requests, at most `max_batch_requests` per frame.
    pub fn flush(&self) -> Result<bool> {
        let _guard = self.send_lock.lock();
        let mut sent = false;
        loop {
            let mut batch = Vec::new();
            while batch.len() < self.max_batch_requests {
                match self.queue.pop() {
                    Some(request) => batch.push(request),
                    None => break,
                }
            }
            if batch.is_empty() {
                return Ok(sent);
            }

            trace!(worker = self.executor.index(), requests = batch.len(), "Writing frame");
            metrics::FRAMES_SENT_TOTAL.inc();
            metrics::FRAME_REQUESTS.observe(batch.len() as f64);
            self.sink.send(batch)?;
            sent = true;
        }
    }

    /// Number of queued requests not yet written.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// Half-close the underlying stream.
    pub fn close_sink(&self) {
        let _guard = self.send_lock.lock();
        self.sink.close();
    }
}
