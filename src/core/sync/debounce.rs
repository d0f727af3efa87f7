use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, warn};

use super::Publisher;
use crate::{core::db::ProjectRepository, models::Project};

#[derive(Debug)]
enum SaveCommand {
    Changed(Vec<Project>),
    Flush(oneshot::Sender<()>),
}

/// Feeds the debounced saver task. Dropping every handle makes the task
/// write whatever is still pending and exit.
#[derive(Debug, Clone)]
pub struct SaveHandle {
    tx: mpsc::UnboundedSender<SaveCommand>,
}

impl SaveHandle {
    /// Record a new in-memory list. Restarts the debounce window.
    pub fn schedule(&self, projects: Vec<Project>) {
        if self.tx.send(SaveCommand::Changed(projects)).is_err() {
            warn!("saver task is gone; change kept in memory only");
        }
    }

    /// Write the pending list now, if there is one, and wait for it.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(SaveCommand::Flush(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }
}

/// Spawn a task that coalesces scheduled lists and persists only the last one,
/// `window` after the most recent change. A successful write is then published
/// to the other views through `publisher`.
pub fn spawn_debounced_saver<R>(
    repo: R,
    publisher: Option<Publisher>,
    window: Duration,
) -> (SaveHandle, JoinHandle<()>)
where
    R: ProjectRepository + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_saver(repo, publisher, window, rx));
    (SaveHandle { tx }, task)
}

async fn run_saver<R>(
    repo: R,
    publisher: Option<Publisher>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveCommand>,
) where
    R: ProjectRepository + Send + Sync + 'static,
{
    let mut pending: Option<Vec<Project>> = None;
    loop {
        let command = if pending.is_none() {
            rx.recv().await
        } else {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    if let Some(projects) = pending.take() {
                        persist(&repo, publisher.as_ref(), projects).await;
                    }
                    continue;
                }
            }
        };

        match command {
            Some(SaveCommand::Changed(projects)) => pending = Some(projects),
            Some(SaveCommand::Flush(ack)) => {
                if let Some(projects) = pending.take() {
                    persist(&repo, publisher.as_ref(), projects).await;
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(projects) = pending.take() {
                    persist(&repo, publisher.as_ref(), projects).await;
                }
                debug!("saver task stopped");
                break;
            }
        }
    }
}

async fn persist<R: ProjectRepository>(repo: &R, publisher: Option<&Publisher>, projects: Vec<Project>) {
    match repo.save_all(&projects).await {
        Ok(()) => {
            debug!(count = projects.len(), "persisted project list");
            if let Some(publisher) = publisher {
                publisher.publish(projects);
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to persist projects; in-memory list stays authoritative");
        }
    }
}
