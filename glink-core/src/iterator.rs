/// Streamed result iteration
///
/// A streamed query is answered page by page. The server sends one or more
/// data parts, then either `StreamContinue` (more pages are ready once asked
/// for) or `StreamDone`. [`ResultIterator`] hides the paging: it decodes
/// each data part into items, buffers them, and sends a continuation when it
/// pulls a `StreamContinue` marker.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::collector::ResponseCollector;
use crate::error::{Error, Result};
use crate::id::RequestId;
use crate::message::{Request, ResponseBody};
use crate::transaction_stream::{DispatchMode, TransactionStream};

/// Decodes one response page into the items it carries.
pub type Decoder<P, T> = Box<dyn FnMut(P) -> Result<Vec<T>> + Send>;

/// Where an iterator is in its result stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    /// The initial request has not been sent.
    NotStarted,
    /// Waiting for the next page.
    AwaitingBatch,
    /// Items of the last page are buffered.
    HasBuffered,
    /// A continuation was sent and the next page is on its way.
    Continuing,
    /// Exhausted, failed or closed.
    Done,
}

/// Lazy, single-pass iterator over the answers of a streamed request.
///
/// Errors end the iteration: after yielding an `Err` the iterator returns
/// `None`, except for [`Error::Timeout`] which leaves it resumable.
///
/// Dropping or [closing](Self::close) an iterator before it is exhausted
/// stops consuming locally only. The server keeps the paused result until
/// the transaction ends, and pages already in flight stay buffered until
/// then.
pub struct ResultIterator<Q, P, T> {
    stream: TransactionStream<Q, P>,
    id: RequestId,
    initial: Option<(Request<Q>, DispatchMode)>,
    collector: Option<Arc<ResponseCollector<P>>>,
    decode: Decoder<P, T>,
    buffer: VecDeque<T>,
    state: IteratorState,
    timeout: Option<Duration>,
    continuations: usize,
}

impl<Q: Send + 'static, P: Send + 'static, T> ResultIterator<Q, P, T> {
    pub(crate) fn new(
        stream: TransactionStream<Q, P>,
        request: Request<Q>,
        mode: DispatchMode,
        timeout: Option<Duration>,
        decode: Decoder<P, T>,
    ) -> Self {
        Self {
            stream,
            id: request.id,
            initial: Some((request, mode)),
            collector: None,
            decode,
            buffer: VecDeque::new(),
            state: IteratorState::NotStarted,
            timeout,
            continuations: 0,
        }
    }

    /// Send the initial request if that has not happened yet.
    pub fn start(&mut self) -> Result<()> {
        let Some((request, mode)) = self.initial.take() else {
            return Ok(());
        };
        match self
            .stream
            .start_request(request, ResponseCollector::multiple(self.id), mode)
        {
            Ok(collector) => {
                self.collector = Some(collector);
                self.state = IteratorState::AwaitingBatch;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Number of continuations this iterator has requested.
    pub fn continuations(&self) -> usize {
        self.continuations
    }

    /// Bound how long a single pull waits for the next page.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Stop iterating and drop buffered items.
    pub fn close(&mut self) {
        self.state = IteratorState::Done;
        self.buffer.clear();
        self.initial = None;
    }

    fn fail(&mut self, err: Error) -> Error {
        self.close();
        err
    }

    fn next_body(&mut self) -> Result<ResponseBody<P>> {
        let collector = match &self.collector {
            Some(collector) => Arc::clone(collector),
            None => return Err(Error::Internal("result stream was never started".to_string())),
        };
        match self.timeout {
            Some(timeout) => collector.take_timeout(timeout),
            None => Ok(collector.take()),
        }
    }
}

impl<Q: Send + 'static, P: Send + 'static, T> Iterator for ResultIterator<Q, P, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                IteratorState::Done => return None,
                IteratorState::NotStarted => {
                    if let Err(err) = self.start() {
                        return Some(Err(err));
                    }
                }
                IteratorState::HasBuffered => match self.buffer.pop_front() {
                    Some(item) => return Some(Ok(item)),
                    None => self.state = IteratorState::AwaitingBatch,
                },
                IteratorState::AwaitingBatch | IteratorState::Continuing => {
                    let body = match self.next_body() {
                        Ok(body) => body,
                        Err(err @ Error::Timeout(_)) => return Some(Err(err)),
                        Err(err) => return Some(Err(self.fail(err))),
                    };
                    match body {
                        ResponseBody::Ok(page) => match (self.decode)(page) {
                            Ok(items) => {
                                self.buffer.extend(items);
                                self.state = IteratorState::HasBuffered;
                            }
                            Err(err) => return Some(Err(self.fail(err))),
                        },
                        ResponseBody::StreamContinue => {
                            self.state = IteratorState::Continuing;
                            self.continuations += 1;
                            if let Err(err) = self.stream.send_continuation(self.id) {
                                return Some(Err(self.fail(err)));
                            }
                        }
                        ResponseBody::StreamDone => {
                            self.state = IteratorState::Done;
                            return None;
                        }
                        ResponseBody::Error(err) => return Some(Err(self.fail(err))),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::RequestBatcher;
    use crate::config::ClientConfig;
    use crate::message::{RequestBody, Response};
    use crate::transaction_stream::CallOptions;
    use crate::transport::FrameSink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct TestSink {
        sent: Mutex<Vec<Request<u32>>>,
    }

    impl FrameSink<u32> for TestSink {
        fn send(&self, requests: Vec<Request<u32>>) -> Result<()> {
            self.sent.lock().extend(requests);
            Ok(())
        }

        fn close(&self) {}
    }

    fn open() -> (RequestBatcher, Arc<TestSink>, TransactionStream<u32, Vec<u32>>) {
        let batcher = RequestBatcher::new(&ClientConfig::new().with_worker_count(1)).unwrap();
        let sink = Arc::new(TestSink::default());
        let stream = TransactionStream::open(&batcher, sink.clone()).unwrap();
        (batcher, sink, stream)
    }

    fn identity(page: Vec<u32>) -> Result<Vec<u32>> {
        Ok(page)
    }

    #[test]
    fn test_pages_and_continuation() {
        let (_batcher, sink, stream) = open();
        let mut answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();
        let id = answers.id();
        assert_eq!(answers.state(), IteratorState::AwaitingBatch);

        let listener = stream.listener();
        listener.on_message(Response::ok(id, vec![1]));
        listener.on_message(Response::ok(id, vec![2]));
        listener.on_message(Response::stream_continue(id));
        listener.on_message(Response::ok(id, vec![3]));
        listener.on_message(Response::stream_done(id));

        let items: Vec<u32> = answers.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(answers.continuations(), 1);
        assert_eq!(answers.state(), IteratorState::Done);

        let continuations: Vec<_> = sink
            .sent
            .lock()
            .iter()
            .filter(|r| r.body == RequestBody::Continue)
            .map(|r| r.id)
            .collect();
        assert_eq!(continuations, vec![id]);
        assert_eq!(stream.outstanding(), 0);
    }

    #[test]
    fn test_empty_pages_are_skipped() {
        let (_batcher, _sink, stream) = open();
        let answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();
        let id = answers.id();

        let listener = stream.listener();
        listener.on_message(Response::ok(id, vec![]));
        listener.on_message(Response::ok(id, vec![4, 5]));
        listener.on_message(Response::stream_done(id));

        assert_eq!(answers.collect::<Result<Vec<_>>>().unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_deferred_sends_on_first_pull() {
        let (_batcher, sink, stream) = open();
        let mut answers = stream
            .stream_deferred(9, CallOptions::new().immediate(), identity)
            .unwrap();
        assert_eq!(answers.state(), IteratorState::NotStarted);
        assert!(sink.sent.lock().is_empty());

        answers.start().unwrap();
        assert_eq!(sink.sent.lock().len(), 1);
        assert_eq!(sink.sent.lock()[0].body, RequestBody::Payload(9));

        stream.listener().on_message(Response::stream_done(answers.id()));
        assert!(answers.next().is_none());
    }

    #[test]
    fn test_server_error_ends_iteration() {
        let (_batcher, _sink, stream) = open();
        let mut answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();
        let id = answers.id();

        let listener = stream.listener();
        listener.on_message(Response::ok(id, vec![1]));
        listener.on_message(Response::error(
            id,
            Error::Server {
                code: "QRY1".into(),
                message: "invalid query".into(),
            },
        ));

        assert_eq!(answers.next().unwrap().unwrap(), 1);
        assert_eq!(answers.next().unwrap().unwrap_err().code(), "SERVER_ERROR");
        assert!(answers.next().is_none());
        assert!(stream.is_open());
    }

    #[test]
    fn test_transaction_close_ends_iteration() {
        let (_batcher, _sink, stream) = open();
        let mut answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();

        stream.close();

        assert_eq!(
            answers.next().unwrap().unwrap_err(),
            Error::TransactionClosed
        );
        assert!(answers.next().is_none());
    }

    #[test]
    fn test_timeout_is_resumable() {
        let (_batcher, _sink, stream) = open();
        let mut answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();
        answers.set_timeout(Some(Duration::from_millis(10)));

        assert_eq!(
            answers.next().unwrap().unwrap_err(),
            Error::Timeout(Duration::from_millis(10))
        );

        let id = answers.id();
        stream.listener().on_message(Response::ok(id, vec![8]));
        stream.listener().on_message(Response::stream_done(id));
        assert_eq!(answers.next().unwrap().unwrap(), 8);
        assert!(answers.next().is_none());
    }

    #[test]
    fn test_closed_iterator_yields_nothing() {
        let (_batcher, _sink, stream) = open();
        let mut answers = stream
            .execute_streaming_with(0, CallOptions::new().immediate(), identity)
            .unwrap();
        let id = answers.id();
        stream.listener().on_message(Response::ok(id, vec![1, 2]));

        answers.close();
        assert!(answers.next().is_none());
        // Collector stays registered so late pages are not unknown ids
        stream.listener().on_message(Response::ok(id, vec![3]));
        assert!(stream.is_open());
    }
}
