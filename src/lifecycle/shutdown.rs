//! Shutdown coordination.
//!
//! One `Shutdown` per running server. OS signals and tests both end the
//! server through [`Shutdown::trigger`]; the server itself only waits on a
//! [`ShutdownSignal`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::wait_for_signal;

/// Owner side of the shutdown latch.
///
/// Once triggered it stays triggered, so a signal taken after the trigger
/// still resolves.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A future-side handle the server waits on.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Latch the shutdown; every signal resolves.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Trigger on Ctrl+C or SIGTERM. Abort the handle to stop listening.
    pub fn trigger_on_os_signal(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the owning [`Shutdown`] is triggered or dropped.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        // Err means every `Shutdown` handle is gone; nothing can trigger any more.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
        tracing::info!("Shutdown requested");
    }
}
