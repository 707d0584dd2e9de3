/// Transactions
///
/// Every transaction runs on its own multiplexed stream. The open request
/// is the first request on that stream; queries, commit and rollback follow
/// on the same stream and may be in flight concurrently.
use glink_core::{CallOptions, Error};
use glink_proto::transaction::{commit, open, req, rollback};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::connection::{ServerConnection, Stream};
use crate::error::{ClientError, Result};
use crate::message::TransactionResponse;
use crate::options::{millis, Options, TransactionType};
use crate::query::QueryManager;

/// A transaction handle.
///
/// Dropping the handle closes the transaction; answer streams still being
/// iterated then fail with a transaction-closed error.
pub struct Transaction {
    stream: Stream,
    transaction_type: TransactionType,
    options: Options,
    request_timeout: Option<Duration>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("transaction_type", &self.transaction_type)
            .field("options", &self.options)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Transaction {
    pub(crate) fn open(
        connection: &Arc<ServerConnection>,
        session_id: Vec<u8>,
        transaction_type: TransactionType,
        options: Options,
        network_latency: Duration,
    ) -> Result<Self> {
        let request_timeout = connection.config().request_timeout;
        let request = req::Req::OpenReq(open::Req {
            session_id,
            r#type: transaction_type.to_proto() as i32,
            options: Some(options.to_proto()),
            network_latency_millis: millis(network_latency),
        });
        let (stream, mut pending) = connection
            .open_transaction_stream(request, CallOptions::new().or_timeout(request_timeout))?;
        let transaction = Self {
            stream,
            transaction_type,
            options,
            request_timeout,
        };

        let response = match request_timeout {
            Some(timeout) => pending.wait_timeout(timeout),
            None => pending.wait(),
        };
        match response? {
            TransactionResponse::Open => {}
            other => {
                return Err(ClientError::Transaction(Error::UnexpectedResponse(format!(
                    "{} response to open request",
                    other.kind()
                ))))
            }
        }

        debug!(
            stream = transaction.stream.id(),
            worker = transaction.stream.worker(),
            transaction_type = ?transaction_type,
            "Transaction opened"
        );
        Ok(transaction)
    }

    pub(crate) fn stream(&self) -> &Stream {
        &self.stream
    }

    pub(crate) fn call_options(&self) -> CallOptions {
        CallOptions::new().or_timeout(self.request_timeout)
    }

    /// Send a lifecycle request and wait for its response.
    fn execute(&self, request: req::Req) -> Result<TransactionResponse> {
        let options = self.call_options().immediate();
        self.stream
            .execute_unary_with(request, options)
            .map_err(ClientError::from)
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_open()
    }

    /// Queries against this transaction.
    pub fn query(&self) -> QueryManager<'_> {
        QueryManager::new(self)
    }

    /// Commit the transaction. The transaction is closed afterwards,
    /// whether or not the commit succeeded.
    pub fn commit(self) -> Result<()> {
        let result = self.execute(req::Req::CommitReq(commit::Req {}));
        self.stream.close();
        match result? {
            TransactionResponse::Commit => Ok(()),
            other => Err(ClientError::Transaction(Error::UnexpectedResponse(format!(
                "{} response to commit request",
                other.kind()
            )))),
        }
    }

    /// Discard the writes made so far. The transaction stays open.
    pub fn rollback(&self) -> Result<()> {
        match self.execute(req::Req::RollbackReq(rollback::Req {}))? {
            TransactionResponse::Rollback => Ok(()),
            other => Err(ClientError::Transaction(Error::UnexpectedResponse(format!(
                "{} response to rollback request",
                other.kind()
            )))),
        }
    }

    /// Register a callback run once when the transaction closes.
    pub fn on_close<F>(&self, callback: F)
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        self.stream.on_close(callback);
    }

    /// Close the transaction without committing.
    pub fn close(&self) {
        self.stream.close();
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.stream.close();
    }
}
