//! Subscriber registry and best-effort fan-out.

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

pub type SubscriberId = Uuid;

/// Handle returned to a newly registered connection.
pub struct Subscription {
    pub id: SubscriberId,
    /// Messages published to every subscriber, already serialized.
    pub rx: mpsc::Receiver<Utf8Bytes>,
}

/// Fans serialized messages out to every connected subscriber.
///
/// Each subscriber has a bounded queue drained by its own connection task.
/// Publishing never waits: a closed queue is skipped and a full one drops the
/// message, so delivery is at-most-once and a slow client cannot stall the
/// publisher.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Utf8Bytes>>>,
    queue_depth: usize,
}

impl BroadcastHub {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            queue_depth: queue_depth.max(1),
        }
    }

    pub async fn register(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let id = Uuid::now_v7();
        self.subscribers.write().await.insert(id, tx);
        Subscription { id, rx }
    }

    /// Returns false if `id` was not registered.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        self.subscribers.write().await.remove(&id).is_some()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Serialize `message` once and offer it to every subscriber.
    ///
    /// Returns the number of subscribers whose queue accepted it.
    pub async fn publish<T: Serialize + ?Sized>(&self, message: &T) -> usize {
        let json = match serde_json::to_string(message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("failed to serialize broadcast message: {e}");
                return 0;
            }
        };
        self.publish_text(json.into()).await
    }

    pub async fn publish_text(&self, text: Utf8Bytes) -> usize {
        let subscribers = self.subscribers.read().await;
        let mut delivered = 0;
        for (id, tx) in subscribers.iter() {
            match tx.try_send(text.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = %id, "subscriber queue full, dropping message");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!(subscriber = %id, "subscriber closed, skipping");
                }
            }
        }
        delivered
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}
