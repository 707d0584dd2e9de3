/// Sessions
///
/// A session is opened on one database and kept alive by a pulse sent every
/// `pulse_interval` from the background runtime. Transactions opened through
/// a session are tracked so that closing the session closes them too.
use glink_proto as proto;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::connection::{ServerConnection, Stream};
use crate::error::{ClientError, Result};
use crate::options::{Options, SessionType, TransactionType};
use crate::transaction::Transaction;

pub(crate) struct SessionInner {
    id: Vec<u8>,
    database: String,
    session_type: SessionType,
    options: Options,
    network_latency: Duration,
    connection: Arc<ServerConnection>,
    /// Cleared by the pulse when the server no longer knows the session.
    alive: Arc<AtomicBool>,
    closed: AtomicBool,
    pulse_shutdown: Mutex<Option<oneshot::Sender<()>>>,
    transactions: Mutex<HashMap<u64, Stream>>,
}

impl SessionInner {
    fn is_open(&self) -> bool {
        self.alive.load(Ordering::Acquire) && !self.closed.load(Ordering::Acquire)
    }

    /// Mark closed, stop pulsing and close tracked transactions.
    ///
    /// Returns false if the session was already closed. A session the
    /// server has expired is still shut down here once.
    fn shut_down(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(shutdown) = self.pulse_shutdown.lock().take() {
            let _ = shutdown.send(());
        }
        let transactions: Vec<Stream> = self.transactions.lock().drain().map(|(_, s)| s).collect();
        for stream in transactions {
            stream.close();
        }
        true
    }

    fn close(&self) -> Result<()> {
        if !self.shut_down() {
            return Ok(());
        }
        info!(database = %self.database, "Closing session");
        self.connection.session_close(self.id.clone())
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if self.shut_down() {
            // May run on a runtime thread, so the close RPC is not awaited
            let mut rpc = self.connection.rpc();
            let request = proto::session::close::Req {
                session_id: self.id.clone(),
            };
            self.connection.runtime().spawn(async move {
                if let Err(status) = rpc.session_close(request).await {
                    debug!(code = ?status.code(), "Failed to close dropped session");
                }
            });
        }
    }
}

fn spawn_pulse(
    connection: &ServerConnection,
    session_id: Vec<u8>,
    alive: Arc<AtomicBool>,
    interval: Duration,
) -> oneshot::Sender<()> {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let mut rpc = connection.rpc();

    connection.runtime().spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let request = proto::session::pulse::Req {
                        session_id: session_id.clone(),
                    };
                    match rpc.session_pulse(request).await {
                        Ok(response) if response.get_ref().alive => {
                            debug!("Session pulse acknowledged");
                        }
                        Ok(_) => {
                            warn!("Server no longer recognises the session, stopping pulse");
                            alive.store(false, Ordering::Release);
                            break;
                        }
                        Err(status) => {
                            warn!(code = ?status.code(), message = status.message(), "Session pulse failed");
                        }
                    }
                }
            }
        }
    });

    shutdown_tx
}

/// Handle to an open session. Cloning shares the session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("database", &self.inner.database)
            .field("session_type", &self.inner.session_type)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn open(
        connection: Arc<ServerConnection>,
        database: &str,
        session_type: SessionType,
        options: Options,
    ) -> Result<Self> {
        let opened = connection.session_open(database, session_type, &options)?;
        let alive = Arc::new(AtomicBool::new(true));
        let pulse = spawn_pulse(
            &connection,
            opened.session_id.clone(),
            Arc::clone(&alive),
            connection.config().pulse_interval,
        );

        info!(
            database = %database,
            session_type = ?session_type,
            latency_ms = opened.network_latency.as_millis() as u64,
            "Session opened"
        );

        Ok(Self {
            inner: Arc::new(SessionInner {
                id: opened.session_id,
                database: database.to_string(),
                session_type,
                options,
                network_latency: opened.network_latency,
                connection,
                alive,
                closed: AtomicBool::new(false),
                pulse_shutdown: Mutex::new(Some(pulse)),
                transactions: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn close_weak(session: &Weak<SessionInner>) -> Result<()> {
        match session.upgrade() {
            Some(inner) => inner.close(),
            None => Ok(()),
        }
    }

    pub fn database(&self) -> &str {
        &self.inner.database
    }

    pub fn session_type(&self) -> SessionType {
        self.inner.session_type
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Estimated one-way network latency measured when the session opened.
    pub fn network_latency(&self) -> Duration {
        self.inner.network_latency
    }

    /// Open a transaction with the session's options.
    pub fn transaction(&self, transaction_type: TransactionType) -> Result<Transaction> {
        self.transaction_with_options(transaction_type, self.inner.options.clone())
    }

    pub fn transaction_with_options(
        &self,
        transaction_type: TransactionType,
        options: Options,
    ) -> Result<Transaction> {
        if !self.is_open() {
            return Err(ClientError::Transaction(glink_core::Error::SessionClosed));
        }

        let transaction = Transaction::open(
            &self.inner.connection,
            self.inner.id.clone(),
            transaction_type,
            options,
            self.inner.network_latency,
        )?;

        let stream = transaction.stream().clone();
        let id = stream.id();
        self.inner.transactions.lock().insert(id, stream.clone());

        let session = Arc::downgrade(&self.inner);
        stream.on_close(move |_| {
            if let Some(session) = session.upgrade() {
                session.transactions.lock().remove(&id);
            }
        });

        // Closed while we were opening: do not leave a tracked transaction behind
        if !self.is_open() {
            stream.close();
            return Err(ClientError::Transaction(glink_core::Error::SessionClosed));
        }

        Ok(transaction)
    }

    /// Number of transactions of this session that are still open.
    pub fn open_transactions(&self) -> usize {
        self.inner.transactions.lock().len()
    }

    /// Close the session and every transaction opened through it.
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
