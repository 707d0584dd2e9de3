/// Session, transaction and query options
use glink_proto as proto;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of session: data sessions read and write instances, schema sessions
/// define and undefine types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Data,
    Schema,
}

impl SessionType {
    pub(crate) fn to_proto(self) -> proto::session::Type {
        match self {
            SessionType::Data => proto::session::Type::Data,
            SessionType::Schema => proto::session::Type::Schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Read,
    Write,
}

impl TransactionType {
    pub(crate) fn to_proto(self) -> proto::transaction::Type {
        match self {
            TransactionType::Read => proto::transaction::Type::Read,
            TransactionType::Write => proto::transaction::Type::Write,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, TransactionType::Write)
    }
}

/// Options sent with a session, a transaction or a single query.
///
/// Unset fields leave the server default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub infer: Option<bool>,
    pub explain: Option<bool>,
    pub parallel: Option<bool>,
    pub prefetch: Option<bool>,
    pub prefetch_size: Option<i32>,
    pub session_idle_timeout: Option<Duration>,
    pub transaction_timeout: Option<Duration>,
    pub schema_lock_acquire_timeout: Option<Duration>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infer(mut self, infer: bool) -> Self {
        self.infer = Some(infer);
        self
    }

    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = Some(explain);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    /// Number of answers the server sends before pausing for a continuation
    pub fn prefetch_size(mut self, size: i32) -> Self {
        self.prefetch_size = Some(size);
        self
    }

    pub fn session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.session_idle_timeout = Some(timeout);
        self
    }

    pub fn transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = Some(timeout);
        self
    }

    pub fn schema_lock_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.schema_lock_acquire_timeout = Some(timeout);
        self
    }

    pub(crate) fn to_proto(&self) -> proto::Options {
        proto::Options {
            infer: self.infer,
            explain: self.explain,
            parallel: self.parallel,
            prefetch: self.prefetch,
            prefetch_size: self.prefetch_size,
            session_idle_timeout_millis: self.session_idle_timeout.map(millis),
            transaction_timeout_millis: self.transaction_timeout.map(millis),
            schema_lock_acquire_timeout_millis: self.schema_lock_acquire_timeout.map(millis),
        }
    }
}

/// Saturating conversion to the protocol's i32 milliseconds
pub(crate) fn millis(duration: Duration) -> i32 {
    duration.as_millis().min(i32::MAX as u128) as i32
}
