/// Connection to a GraphLink server
///
/// Owns the background runtime, the gRPC channel and the request batcher
/// shared by every transaction opened through it. Unary RPCs are run to
/// completion on the caller's thread; each transaction gets its own
/// bidirectional `transaction` call whose inbound half is pumped by a task
/// on the runtime.
use futures::channel::mpsc::{self, UnboundedSender};
use glink_core::{
    CallOptions, ClientConfig, FrameSink, PendingResponse, Request, RequestBatcher, ResponseListener,
    TransactionStream,
};
use glink_proto::{self as proto, graph_link_client::GraphLinkClient};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::Streaming;
use tracing::{debug, info, trace};

use crate::error::{stream_status, ClientError, Result};
use crate::message::{self, TransactionRequest, TransactionResponse};
use crate::options::{Options, SessionType};
use crate::runtime::BackgroundRuntime;

pub(crate) type Stream = TransactionStream<TransactionRequest, TransactionResponse>;

/// Outbound half of a `transaction` call.
///
/// Dropping the sender ends the request stream, which half-closes the call.
struct GrpcSink {
    sender: Mutex<Option<UnboundedSender<proto::transaction::Client>>>,
}

impl FrameSink<TransactionRequest> for GrpcSink {
    fn send(&self, requests: Vec<Request<TransactionRequest>>) -> glink_core::Result<()> {
        let frame = message::encode_frame(requests);
        match self.sender.lock().as_ref() {
            Some(sender) => sender
                .unbounded_send(frame)
                .map_err(|e| glink_core::Error::Transport(format!("request stream closed: {}", e))),
            None => Err(glink_core::Error::TransactionClosed),
        }
    }

    fn close(&self) {
        self.sender.lock().take();
    }
}

/// Feed inbound messages of one `transaction` call into its stream.
async fn listen(
    mut inbound: Streaming<proto::transaction::Server>,
    listener: Arc<dyn ResponseListener<TransactionResponse>>,
) {
    loop {
        match inbound.message().await {
            Ok(Some(server_message)) => match message::decode_response(server_message) {
                Ok(response) => listener.on_message(response),
                Err(err) => {
                    listener.on_error(err);
                    return;
                }
            },
            Ok(None) => {
                trace!("Transaction call completed by server");
                listener.on_completed();
                return;
            }
            Err(status) => {
                debug!(code = ?status.code(), message = status.message(), "Transaction call failed");
                listener.on_error(stream_status(status));
                return;
            }
        }
    }
}

/// Result of opening a session.
pub(crate) struct OpenedSession {
    pub(crate) session_id: Vec<u8>,
    pub(crate) network_latency: Duration,
}

pub(crate) struct ServerConnection {
    address: String,
    config: ClientConfig,
    rpc: GraphLinkClient<Channel>,
    batcher: RequestBatcher,
    runtime: Arc<BackgroundRuntime>,
}

impl ServerConnection {
    pub(crate) fn connect(address: String, config: ClientConfig) -> Result<Self> {
        config.validate().map_err(ClientError::InvalidArgument)?;

        let runtime = Arc::new(BackgroundRuntime::new()?);
        let endpoint = Channel::from_shared(address.clone())
            .map_err(|e| ClientError::ConnectionError(format!("Invalid address: {}", e)))?;
        let channel = runtime
            .block_on(endpoint.connect())
            .map_err(|e| ClientError::ConnectionError(format!("Failed to connect: {}", e)))?;

        let batcher = RequestBatcher::new(&config)?;
        info!(address = %address, workers = batcher.worker_count(), "Connected to server");

        Ok(Self {
            address,
            config,
            rpc: GraphLinkClient::new(channel),
            batcher,
            runtime,
        })
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn runtime(&self) -> &Arc<BackgroundRuntime> {
        &self.runtime
    }

    pub(crate) fn rpc(&self) -> GraphLinkClient<Channel> {
        self.rpc.clone()
    }

    pub(crate) fn databases_contains(&self, name: &str) -> Result<bool> {
        let mut rpc = self.rpc();
        let request = proto::database::contains::Req {
            name: name.to_string(),
        };
        let response = self.runtime.block_on(rpc.databases_contains(request))?;
        Ok(response.into_inner().contains)
    }

    pub(crate) fn databases_create(&self, name: &str) -> Result<()> {
        let mut rpc = self.rpc();
        let request = proto::database::create::Req {
            name: name.to_string(),
        };
        self.runtime.block_on(rpc.databases_create(request))?;
        Ok(())
    }

    pub(crate) fn databases_all(&self) -> Result<Vec<String>> {
        let mut rpc = self.rpc();
        let response = self
            .runtime
            .block_on(rpc.databases_all(proto::database::all::Req {}))?;
        Ok(response.into_inner().names)
    }

    pub(crate) fn database_delete(&self, name: &str) -> Result<()> {
        let mut rpc = self.rpc();
        let request = proto::database::delete::Req {
            name: name.to_string(),
        };
        self.runtime.block_on(rpc.database_delete(request))?;
        Ok(())
    }

    /// Open a session and estimate the network latency to the server from
    /// the round trip minus the time the server reports having spent.
    pub(crate) fn session_open(
        &self,
        database: &str,
        session_type: SessionType,
        options: &Options,
    ) -> Result<OpenedSession> {
        let mut rpc = self.rpc();
        let request = proto::session::open::Req {
            database: database.to_string(),
            r#type: session_type.to_proto() as i32,
            options: Some(options.to_proto()),
        };

        let started = std::time::Instant::now();
        let response = self.runtime.block_on(rpc.session_open(request))?.into_inner();
        let server_duration = Duration::from_millis(response.server_duration_millis.max(0) as u64);
        let network_latency = started.elapsed().saturating_sub(server_duration);

        Ok(OpenedSession {
            session_id: response.session_id,
            network_latency,
        })
    }

    pub(crate) fn session_close(&self, session_id: Vec<u8>) -> Result<()> {
        let mut rpc = self.rpc();
        self.runtime
            .block_on(rpc.session_close(proto::session::close::Req { session_id }))?;
        Ok(())
    }

    /// Start a `transaction` call whose first request is `open`.
    ///
    /// The open request is queued on the outbound half before the call is
    /// started, since a server may hold back its response headers until the
    /// first client message arrives. Its response is awaited through the
    /// returned handle like any other request on the stream.
    pub(crate) fn open_transaction_stream(
        &self,
        open: TransactionRequest,
        options: CallOptions,
    ) -> Result<(Stream, PendingResponse<TransactionResponse>)> {
        let (sender, receiver) = mpsc::unbounded();
        let sink = Arc::new(GrpcSink {
            sender: Mutex::new(Some(sender)),
        });
        let stream = TransactionStream::open(&self.batcher, sink)?;
        let timeout = options.timeout;
        let pending = match stream.submit(open, options.immediate()) {
            Ok(pending) => pending,
            Err(err) => {
                stream.close();
                return Err(err.into());
            }
        };

        let mut rpc = self.rpc();
        let started = match timeout {
            Some(timeout) => self
                .runtime
                .block_on(async { tokio::time::timeout(timeout, rpc.transaction(receiver)).await })
                .unwrap_or_else(|_| {
                    Err(tonic::Status::deadline_exceeded(format!(
                        "transaction call not started within {:?}",
                        timeout
                    )))
                }),
            None => self.runtime.block_on(rpc.transaction(receiver)),
        };
        let inbound = match started {
            Ok(response) => response.into_inner(),
            Err(status) => {
                stream.close();
                return Err(status.into());
            }
        };

        self.runtime.spawn(listen(inbound, stream.listener()));
        Ok((stream, pending))
    }

    /// Stop the batch workers, force-closing any transaction still open.
    pub(crate) fn close(&self) {
        self.batcher.close();
    }
}
