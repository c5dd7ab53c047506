//! Per-entry change notification
//!
//! Each entry owns one [`ChangeChannel`]. Subscribers get an unbounded
//! queue, so a slow subscriber never blocks a writer and never loses the
//! final value. Cancelling an [`Observer`] is synchronous: once `cancel`
//! returns, `recv` yields `None` even if values were still queued.

use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::errors::StoreResult;
use super::lock;

struct Subscriber<T> {
    id: Uuid,
    sender: mpsc::UnboundedSender<T>,
}

/// Fan-out of one entry's value changes.
pub(crate) struct ChangeChannel<T> {
    subscribers: Arc<Mutex<Vec<Subscriber<T>>>>,
}

impl<T: Clone> ChangeChannel<T> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a subscriber whose queue starts with `initial`.
    ///
    /// # Errors
    ///
    /// `Poisoned` if the subscriber registry is poisoned; no observer is
    /// handed out that could never receive a change.
    pub(crate) fn subscribe(&self, initial: T) -> StoreResult<Observer<T>> {
        let mut subscribers = lock(&*self.subscribers, "subscribers")?;
        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive, so the first send cannot fail
        let _ = sender.send(initial);
        let id = Uuid::new_v4();
        subscribers.push(Subscriber { id, sender });
        Ok(Observer {
            id,
            receiver,
            registry: Arc::downgrade(&self.subscribers),
            cancelled: false,
        })
    }

    /// Sends a value to every live subscriber, dropping closed ones.
    ///
    /// Returns the number of subscribers the value was delivered to.
    pub(crate) fn publish(&self, value: &T) -> usize {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return 0;
        };
        subscribers.retain(|s| s.sender.send(value.clone()).is_ok());
        subscribers.len()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// A live subscription to one entry.
///
/// Yields the entry's value at subscription time, then every accepted
/// write in order. Dropping the observer cancels it.
pub struct Observer<T> {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<T>,
    registry: Weak<Mutex<Vec<Subscriber<T>>>>,
    cancelled: bool,
}

impl<T> Observer<T> {
    /// Unique subscription id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits for the next value. `None` after cancellation.
    pub async fn recv(&mut self) -> Option<T> {
        if self.cancelled {
            return None;
        }
        self.receiver.recv().await
    }

    /// Returns a queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        if self.cancelled {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Drains the queue and returns the most recent value, if any.
    pub fn latest(&mut self) -> Option<T> {
        let mut latest = None;
        while let Some(value) = self.try_recv() {
            latest = Some(value);
        }
        latest
    }

    /// Stops the subscription. No value is observed after this returns.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.unregister();
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn unregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut subscribers) = registry.lock() {
                subscribers.retain(|s| s.id != self.id);
            }
        }
    }
}

impl<T> Drop for Observer<T> {
    fn drop(&mut self) {
        if !self.cancelled {
            self.unregister();
        }
    }
}

impl<T> Unpin for Observer<T> {}

impl<T> Stream for Observer<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if this.cancelled {
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}
