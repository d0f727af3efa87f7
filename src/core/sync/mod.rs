//! Same-device synchronisation between open views.
//!
//! A [`SyncHub`] is the shared channel. Each view subscribes when it mounts
//! and drops its [`Subscription`] when it is torn down. Publishing sends the
//! whole project list; every other view receives it as a full replacement.
//! There is no merging: the last list received wins.

mod debounce;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError, error::TryRecvError},
    task::JoinHandle,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Project;

pub use debounce::{SaveHandle, spawn_debounced_saver};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// The one message shape on the channel: `{ "type": "UPDATE", "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SyncMessage {
    #[serde(rename = "UPDATE")]
    Update(Vec<Project>),
}

#[derive(Debug, Clone)]
struct Envelope {
    origin: Uuid,
    message: Arc<SyncMessage>,
}

#[derive(Debug, Clone)]
pub struct SyncHub {
    tx: broadcast::Sender<Envelope>,
}

impl SyncHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new view on the hub.
    pub fn subscribe(&self) -> Subscription {
        let publisher = Publisher {
            origin: Uuid::new_v4(),
            tx: self.tx.clone(),
        };
        debug!(view = %publisher.origin, "view subscribed");
        Subscription {
            publisher,
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Sending half of a view's subscription. Can be cloned into background tasks.
#[derive(Debug, Clone)]
pub struct Publisher {
    origin: Uuid,
    tx: broadcast::Sender<Envelope>,
}

impl Publisher {
    pub fn view_id(&self) -> Uuid {
        self.origin
    }

    /// Fire-and-forget broadcast of the full list to every other view.
    pub fn publish(&self, projects: Vec<Project>) {
        let envelope = Envelope {
            origin: self.origin,
            message: Arc::new(SyncMessage::Update(projects)),
        };
        match self.tx.send(envelope) {
            Ok(receivers) => debug!(view = %self.origin, receivers, "published project list"),
            Err(_) => debug!(view = %self.origin, "published project list with no subscribers"),
        }
    }
}

#[derive(Debug)]
pub struct Subscription {
    publisher: Publisher,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    pub fn view_id(&self) -> Uuid {
        self.publisher.origin
    }

    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    pub fn publish(&self, projects: Vec<Project>) {
        self.publisher.publish(projects);
    }

    /// Wait for the next list published by another view.
    /// Returns `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Vec<Project>> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => {
                    if let Some(projects) = self.accept(envelope) {
                        return Some(projects);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(view = %self.view_id(), skipped, "view lagged behind sync channel");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything already delivered and return the newest list from a peer, if any.
    pub fn try_recv_latest(&mut self) -> Option<Vec<Project>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => {
                    if let Some(projects) = self.accept(envelope) {
                        latest = Some(projects);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(view = %self.view_id(), skipped, "view lagged behind sync channel");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return latest,
            }
        }
    }

    /// Hand every list from other views to `handler` on a background task.
    /// The listener stops when the returned handle is dropped.
    pub fn on_receive<F>(mut self, mut handler: F) -> ListenerHandle
    where
        F: FnMut(Vec<Project>) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(projects) = self.recv().await {
                handler(projects);
            }
        });
        ListenerHandle { task }
    }

    /// Leave the hub. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}

    fn accept(&self, envelope: Envelope) -> Option<Vec<Project>> {
        if envelope.origin == self.publisher.origin {
            return None;
        }
        match Arc::unwrap_or_clone(envelope.message) {
            SyncMessage::Update(projects) => Some(projects),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(view = %self.publisher.origin, "view unsubscribed");
    }
}

#[derive(Debug)]
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn stop(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
