/*!
Task executor.

Runs the store calls behind `Effect::Async(TaskKind)` off the screen loop.

- `spawn(kind)` allocates a task id and queues the task.
- A single worker pulls tasks from the queue and starts each one as its own
  tokio task, so a slow fetch does not hold back a newer one.
- Every task reports `TaskStarted` and `TaskFinished` on the internal event
  channel. The screen loop matches results against its current state.
- Cancelling the token stops the worker and any task still in flight.
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::effects::{InternalEvent, TaskKind, TaskResultKind};
use crate::domain::EntityStore;

pub type TaskId = u64;

/// Handle for scheduling store work. Cloning only clones the sender.
#[derive(Clone)]
pub struct TaskExecutor {
    tx: mpsc::UnboundedSender<Dispatch>,
    next_id: Arc<AtomicU64>,
}

struct Dispatch {
    id: TaskId,
    kind: TaskKind,
}

impl TaskExecutor {
    /// Create the executor and spawn its worker.
    pub fn new(
        store: Arc<dyn EntityStore>,
        internal_tx: mpsc::UnboundedSender<InternalEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Dispatch>();
        Worker {
            rx,
            store,
            internal_tx,
            cancel,
        }
        .spawn();
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Queue a task. Returns its id.
    pub fn spawn(&self, kind: TaskKind) -> TaskId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.tx.send(Dispatch { id, kind }) {
            warn!("TaskExecutor channel closed; failed to schedule {}", e.0.kind);
        }
        id
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    store: Arc<dyn EntityStore>,
    internal_tx: mpsc::UnboundedSender<InternalEvent>,
    cancel: CancellationToken,
}

impl Worker {
    fn spawn(mut self) {
        tokio::spawn(async move {
            loop {
                let dispatch = tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    next = self.rx.recv() => match next {
                        Some(dispatch) => dispatch,
                        None => break,
                    },
                };
                let store = self.store.clone();
                let tx = self.internal_tx.clone();
                let cancel = self.cancel.clone();
                let task_id = dispatch.id;
                tokio::spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            debug!("[task:{task_id}] cancelled");
                        }
                        _ = run(store, tx, dispatch) => {}
                    }
                });
            }
            info!("TaskExecutor worker stopped");
        });
    }
}

async fn run(
    store: Arc<dyn EntityStore>,
    tx: mpsc::UnboundedSender<InternalEvent>,
    dispatch: Dispatch,
) {
    let Dispatch { id, kind } = dispatch;
    let _ = tx.send(InternalEvent::TaskStarted {
        id,
        label: kind.to_string(),
    });
    let result = execute(store.as_ref(), kind).await;
    debug!("[task:{id}] finished: {result:?}");
    if tx.send(InternalEvent::TaskFinished { id, result }).is_err() {
        debug!("[task:{id}] result dropped: screen gone");
    }
}

async fn execute(store: &dyn EntityStore, kind: TaskKind) -> TaskResultKind {
    match kind {
        TaskKind::FetchProduct(id) => match store.fetch_by_id(id).await {
            Ok(product) => TaskResultKind::ProductLoaded { id, product },
            Err(e) => {
                warn!("fetching product {id} failed: {e}");
                TaskResultKind::ProductLoadFailed {
                    id,
                    error: e.to_string(),
                }
            }
        },
        TaskKind::FetchCategories => match store.fetch_categories().await {
            Ok(categories) => TaskResultKind::CategoriesLoaded(categories),
            Err(e) => {
                warn!("fetching categories failed: {e}");
                TaskResultKind::CategoriesFailed {
                    error: e.to_string(),
                }
            }
        },
        TaskKind::SaveProduct(product) => match store.save(product).await {
            Ok(product) => {
                info!("saved product {}", product.id);
                TaskResultKind::Saved { product }
            }
            Err(e) => {
                warn!("saving product failed: {e}");
                TaskResultKind::SaveFailed {
                    error: e.to_string(),
                }
            }
        },
        TaskKind::DeleteProduct(id) => match store.delete(id).await {
            Ok(()) => {
                info!("deleted product {id}");
                TaskResultKind::Deleted { id }
            }
            Err(e) => {
                warn!("deleting product {id} failed: {e}");
                TaskResultKind::DeleteFailed {
                    id,
                    error: e.to_string(),
                }
            }
        },
    }
}
