//! Process-wide clipboard paste channel.
//!
//! Paste events are published by whatever owns the OS clipboard (the HTTP
//! surface here). A session view listens only while it is mounted: the
//! listener is a [`PasteSubscription`] guard that unsubscribes when dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One item of clipboard data
#[derive(Clone, Debug)]
pub struct ClipboardItem {
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl ClipboardItem {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// A paste gesture, possibly carrying several representations
#[derive(Clone, Debug, Default)]
pub struct PasteEvent {
    pub items: Vec<ClipboardItem>,
}

impl PasteEvent {
    pub fn single(item: ClipboardItem) -> Self {
        Self { items: vec![item] }
    }
}

#[derive(Clone)]
pub struct PasteBus {
    tx: broadcast::Sender<PasteEvent>,
    listeners: Arc<AtomicUsize>,
}

impl PasteBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            listeners: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of listeners that will see the event
    pub fn publish(&self, event: PasteEvent) -> usize {
        // No receivers is not an error: nobody is mounted to care
        self.tx.send(event).unwrap_or(0)
    }

    /// Register a listener. `handler` runs for every paste until the returned
    /// guard is dropped.
    pub fn subscribe<F>(&self, mut handler: F) -> PasteSubscription
    where
        F: FnMut(PasteEvent) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        self.listeners.fetch_add(1, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("📋 [PASTE] Listener lagged, {} paste events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        PasteSubscription {
            task,
            listeners: self.listeners.clone(),
        }
    }

    /// Currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

/// Scoped paste listener; releases the subscription on drop
pub struct PasteSubscription {
    task: JoinHandle<()>,
    listeners: Arc<AtomicUsize>,
}

impl Drop for PasteSubscription {
    fn drop(&mut self) {
        self.task.abort();
        self.listeners.fetch_sub(1, Ordering::SeqCst);
    }
}
