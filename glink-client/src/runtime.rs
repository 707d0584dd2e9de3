/// Background tokio runtime driving the gRPC channel for the blocking API
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ClientError, Result};

pub(crate) struct BackgroundRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl BackgroundRuntime {
    pub(crate) fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("glink-io")
            .enable_all()
            .build()
            .map_err(|e| ClientError::InternalError(format!("Failed to start runtime: {}", e)))?;
        debug!("Background runtime started");
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Run `future` to completion on the calling thread.
    ///
    /// Must not be called from a runtime thread.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }

    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        // The last handle may be released on one of the runtime's own threads
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        debug!("Background runtime stopped");
    }
}
