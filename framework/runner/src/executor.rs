use std::future::Future;

use gust_core::prelude::{DelegatedShutdownListener, ShutdownSignalError};

#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
    shutdown_listener: DelegatedShutdownListener,
}

impl Executor {
    pub(crate) fn new(
        runtime: tokio::runtime::Runtime,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            runtime,
            shutdown_listener,
        }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// The future is cancelled if the run shuts down while it is in flight, in which case a
    /// [ShutdownSignalError] is returned. Intended for setup and teardown hooks that need to
    /// talk to the target before any users are running. Must not be called from async code.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        let mut shutdown_listener = self.shutdown_listener.clone();
        self.runtime.block_on(async move {
            tokio::select! {
                result = fut => result,
                _ = shutdown_listener.wait_for_shutdown() => {
                    Err(anyhow::anyhow!(ShutdownSignalError::default()))
                },
            }
        })
    }

    /// Submit async code to be run in the background.
    ///
    /// The future is not cancelled on shutdown and the runner does not wait for it before
    /// finishing the run.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }

    /// Block on a future without racing it against shutdown. The run loop handles the shutdown
    /// signal itself so that it can wind users down cleanly.
    pub(crate) fn block_on<T>(&self, fut: impl Future<Output = T>) -> T {
        self.runtime.block_on(fut)
    }
}
