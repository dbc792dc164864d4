use std::sync::Arc;

use gust_core::prelude::{DelegatedShutdownListener, ShutdownHandle};
use gust_instruments::Reporter;

use crate::executor::Executor;

/// Run-wide state shared read-only by every virtual user: the executor, the reporter and the
/// target under test.
#[derive(Debug)]
pub struct RunnerContext {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    target: String,
    run_id: String,
}

impl RunnerContext {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        target: String,
        run_id: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            shutdown_handle,
            target,
            run_id,
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    /// The base URL of the service under test, as provided on the command line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Unique identifier for this run, used to distinguish runs in logs.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stop the whole scenario. Equivalent to the run hitting its duration bound or Ctrl-C
    /// being pressed.
    pub fn force_stop_scenario(&self) {
        self.shutdown_handle.shutdown();
    }
}

/// Per-virtual-user state handed to the user setup and teardown hooks.
pub struct UserContext {
    user_id: String,
    runner_context: Arc<RunnerContext>,
    shutdown_listener: DelegatedShutdownListener,
}

impl UserContext {
    pub(crate) fn new(
        user_id: String,
        runner_context: Arc<RunnerContext>,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            user_id,
            runner_context,
            shutdown_listener,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext> {
        &self.runner_context
    }

    /// Listener for this user's own stop signal, fired on ramp-down or run shutdown.
    pub fn shutdown_listener(&mut self) -> &mut DelegatedShutdownListener {
        &mut self.shutdown_listener
    }
}
