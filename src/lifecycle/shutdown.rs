//! Stop signal shared by the refresh loop and the HTTP server.
//!
//! Each `RefreshScheduler` owns one to end its background task; `main` owns
//! another that drains the server on SIGTERM / Ctrl-C.

use tokio::sync::broadcast;

/// One-shot stop signal fanned out to every subscribed task.
///
/// Subscribers only observe a trigger sent after they subscribed, so tasks
/// must subscribe before they are spawned.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that yields once `trigger` is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Triggering with nobody listening, or twice, is fine.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Subscribed tasks that have not dropped their receiver yet.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
