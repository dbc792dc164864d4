use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

/// Broadcasts a stop signal to every listener created from this handle.
///
/// The runner uses one handle for the whole run (Ctrl-C, duration bound, load shape completion)
/// and one per virtual user so that individual users can be stopped on ramp-down without
/// touching anyone else.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(()) {
            // Fails when nobody is listening, which is harmless.
            log::debug!("No listeners for shutdown signal: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Arc<Mutex<Receiver<()>>>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Point in time check whether the stop signal has been received.
    pub fn should_shutdown(&mut self) -> bool {
        match self.receiver.try_lock() {
            Ok(mut guard) => match guard.try_recv() {
                Ok(_) => true,
                // A closed channel means the handle is gone, treat that as a stop request.
                Err(TryRecvError::Closed) => true,
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Wait until the stop signal is received.
    ///
    /// Safe to race against other futures, which is how in-flight requests and think-time
    /// pauses get abandoned when a user is stopped.
    pub async fn wait_for_shutdown(&mut self) {
        let mut guard = self.receiver.lock().await;
        match guard.recv().await {
            Ok(_) | Err(RecvError::Closed) => {}
            // Lagged just means we missed an earlier signal, which still counts.
            Err(RecvError::Lagged(_)) => {}
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("{msg}")]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
