use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, info};

/// Route parameters in, navigation out.
pub trait Router: Send + Sync {
    /// Subscribe to the values of one route parameter. Dropping the receiver
    /// ends the subscription.
    fn route_param(&self, name: &str) -> mpsc::UnboundedReceiver<String>;

    fn navigate(&self, path: &str);
}

#[derive(Debug, Default)]
struct Inner {
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<String>>>,
    navigations: Vec<String>,
}

/// Router driven by hand: parameters are pushed explicitly and navigations
/// are recorded.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    inner: Mutex<Inner>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a new value to every live subscriber of `name`.
    pub fn push_param(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut inner = self.lock();
        if let Some(subs) = inner.subscribers.get_mut(name) {
            subs.retain(|tx| tx.send(value.clone()).is_ok());
        }
        debug!(param = name, %value, "route param pushed");
    }

    /// Live subscriptions to `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.lock()
            .subscribers
            .get(name)
            .map_or(0, |subs| subs.iter().filter(|tx| !tx.is_closed()).count())
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Router for RecordingRouter {
    fn route_param(&self, name: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .subscribers
            .entry(name.to_string())
            .or_default()
            .push(tx);
        rx
    }

    fn navigate(&self, path: &str) {
        info!(%path, "navigate");
        self.lock().navigations.push(path.to_string());
    }
}
