/// GraphLink client implementation
use glink_core::ClientConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

use crate::connection::ServerConnection;
use crate::database::DatabaseManager;
use crate::error::{ClientError, Result};
use crate::options::{Options, SessionType};
use crate::session::{Session, SessionInner};

/// GraphLink remote client
///
/// All operations block the calling thread. Transactions opened by many
/// threads share a fixed pool of batch workers.
pub struct Client {
    connection: Arc<ServerConnection>,
    sessions: Mutex<Vec<Weak<SessionInner>>>,
    is_open: AtomicBool,
}

impl Client {
    /// Connect to a GraphLink server with the default configuration
    ///
    /// # Arguments
    /// * `addr` - Server address (e.g., "http://127.0.0.1:1729")
    ///
    /// # Example
    /// ```no_run
    /// # use glink_client::{Client, SessionType, TransactionType};
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::connect("http://localhost:1729")?;
    /// let session = client.session("social_network", SessionType::Data)?;
    /// let transaction = session.transaction(TransactionType::Read)?;
    /// for answer in transaction.query().r#match("match $p isa person;")? {
    ///     println!("{:?}", answer?.get("p"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect(addr: impl Into<String>) -> Result<Self> {
        Self::with_config(addr, ClientConfig::default())
    }

    /// Connect to a GraphLink server
    pub fn with_config(addr: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let connection = ServerConnection::connect(addr.into(), config)?;
        Ok(Self {
            connection: Arc::new(connection),
            sessions: Mutex::new(Vec::new()),
            is_open: AtomicBool::new(true),
        })
    }

    pub fn address(&self) -> &str {
        self.connection.address()
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ClientError::Transaction(glink_core::Error::ClientClosed))
        }
    }

    /// Database management operations
    pub fn databases(&self) -> DatabaseManager<'_> {
        DatabaseManager::new(&self.connection)
    }

    /// Open a session on `database`
    pub fn session(&self, database: &str, session_type: SessionType) -> Result<Session> {
        self.session_with_options(database, session_type, Options::default())
    }

    pub fn session_with_options(
        &self,
        database: &str,
        session_type: SessionType,
        options: Options,
    ) -> Result<Session> {
        self.ensure_open()?;
        let session = Session::open(Arc::clone(&self.connection), database, session_type, options)?;

        let mut sessions = self.sessions.lock();
        sessions.retain(|s| s.strong_count() > 0);
        sessions.push(session.downgrade());
        Ok(session)
    }

    /// Close every session, then stop the batch workers. Idempotent.
    pub fn close(&self) {
        if !self.is_open.swap(false, Ordering::AcqRel) {
            return;
        }

        let sessions: Vec<Weak<SessionInner>> = self.sessions.lock().drain(..).collect();
        for session in &sessions {
            if let Err(err) = Session::close_weak(session) {
                warn!(error = %err, "Failed to close session");
            }
        }

        self.connection.close();
        info!(address = %self.connection.address(), "Client closed");
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}
