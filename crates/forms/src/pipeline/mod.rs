//! Event merge/debounce pipeline.
//!
//! Decides *when* the [`GenericValidator`] runs. Two kinds of sources feed a
//! single queue:
//!   * the form itself, emitting one value-changed event per set/patch/reset;
//!   * one blur source per bound input ([`InputHandle::blur`]).
//!
//! Events carry the monotonic time they were emitted at. A worker task
//! consumes the queue in arrival order, keeps one pending deadline in a
//! [`Debouncer`] and, once the quiet period passes without new events,
//! recomputes the display messages and publishes them on a `watch` channel.
//!
//! Lifecycle:
//!   1. `PipelineBuilder::new(form)` attaches the queue to the form.
//!   2. `bind_input(name)` once per rendered input (the set is fixed).
//!   3. `spawn(engine)` starts the worker.
//!   4. `ValidationPipeline::shutdown()` (or drop) cancels the worker and
//!      detaches the form.

mod debounce;

pub use debounce::Debouncer;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, trace, warn};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::engine::{DisplayMessages, GenericValidator};
use crate::errors::FormError;
use crate::form::Form;

/// Quiet period used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

pub type SharedForm = Arc<Mutex<Form>>;

/// Lock a shared form, recovering the guard if a previous holder panicked.
pub fn lock_form(form: &SharedForm) -> MutexGuard<'_, Form> {
    form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    ValueChanged,
    Blurred(String),
}

#[derive(Debug, Clone)]
pub struct FormEvent {
    pub source: EventSource,
    pub at: Instant,
}

impl FormEvent {
    pub fn value_changed() -> Self {
        Self {
            source: EventSource::ValueChanged,
            at: Instant::now(),
        }
    }

    pub fn blurred(field: impl Into<String>) -> Self {
        Self {
            source: EventSource::Blurred(field.into()),
            at: Instant::now(),
        }
    }
}

/// A rendered input bound to one form field.
#[derive(Debug, Clone)]
pub struct InputHandle {
    name: String,
    form: SharedForm,
    tx: mpsc::UnboundedSender<FormEvent>,
}

impl InputHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user typed: replace the value and mark the field dirty.
    pub fn input(&self, value: impl Into<Value>) {
        if let Err(e) = lock_form(&self.form).set_value(&self.name, value) {
            warn!("input `{}` rejected: {e}", self.name);
        }
    }

    /// Focus left the input: mark the field touched and emit a blur event.
    pub fn blur(&self) {
        if let Err(e) = lock_form(&self.form).mark_touched(&self.name) {
            warn!("blur on `{}` rejected: {e}", self.name);
            return;
        }
        if self.tx.send(FormEvent::blurred(&self.name)).is_err() {
            trace!("blur on `{}` dropped: pipeline stopped", self.name);
        }
    }
}

pub struct PipelineBuilder {
    form: SharedForm,
    threshold: Duration,
    tx: mpsc::UnboundedSender<FormEvent>,
    rx: mpsc::UnboundedReceiver<FormEvent>,
    bound: HashSet<String>,
}

impl PipelineBuilder {
    pub fn new(form: SharedForm) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        lock_form(&form).attach_events(tx.clone());
        Self {
            form,
            threshold: DEFAULT_DEBOUNCE,
            tx,
            rx,
            bound: HashSet::new(),
        }
    }

    pub fn debounce(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Register the blur source of one input element.
    pub fn bind_input(&mut self, name: &str) -> Result<InputHandle, FormError> {
        if !lock_form(&self.form).contains(name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        if !self.bound.insert(name.to_string()) {
            return Err(FormError::AlreadyBound(name.to_string()));
        }
        Ok(InputHandle {
            name: name.to_string(),
            form: self.form.clone(),
            tx: self.tx.clone(),
        })
    }

    /// Bind every field of the form, in declaration order.
    pub fn bind_all(&mut self) -> Result<Vec<InputHandle>, FormError> {
        let names: Vec<String> = lock_form(&self.form)
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        names.iter().map(|n| self.bind_input(n)).collect()
    }

    pub fn spawn(self, engine: GenericValidator) -> ValidationPipeline {
        let (messages_tx, messages_rx) = watch::channel(DisplayMessages::default());
        let cancel = CancellationToken::new();
        let recomputations = Arc::new(AtomicU64::new(0));
        debug!(
            "validation pipeline started ({} input(s), quiet period {:?})",
            self.bound.len(),
            self.threshold
        );

        let worker = Worker {
            rx: self.rx,
            form: self.form.clone(),
            engine,
            debouncer: Debouncer::new(self.threshold),
            messages: messages_tx,
            cancel: cancel.clone(),
            recomputations: recomputations.clone(),
        };
        let handle = tokio::spawn(worker.run());

        ValidationPipeline {
            form: self.form,
            cancel,
            handle: Some(handle),
            messages: messages_rx,
            recomputations,
        }
    }
}

/// Running pipeline. Dropping it stops the worker.
pub struct ValidationPipeline {
    form: SharedForm,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    messages: watch::Receiver<DisplayMessages>,
    recomputations: Arc<AtomicU64>,
}

impl ValidationPipeline {
    /// Subscribe to published display messages.
    pub fn messages(&self) -> watch::Receiver<DisplayMessages> {
        self.messages.clone()
    }

    /// Latest published display messages.
    pub fn current(&self) -> DisplayMessages {
        self.messages.borrow().clone()
    }

    /// How many times messages were recomputed so far.
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("validation pipeline worker ended abnormally: {e}");
            }
        }
    }

    fn stop(&mut self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            lock_form(&self.form).detach_events();
        }
    }
}

impl Drop for ValidationPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<FormEvent>,
    form: SharedForm,
    engine: GenericValidator,
    debouncer: Debouncer,
    messages: watch::Sender<DisplayMessages>,
    cancel: CancellationToken,
    recomputations: Arc<AtomicU64>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = self.rx.recv() => match event {
                    Some(event) => {
                        trace!("form event {:?}", event.source);
                        self.debouncer.record(event.at);
                    }
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.debouncer.fire(Instant::now()) {
                        self.recompute();
                    }
                }
            }
        }
        debug!(
            "validation pipeline stopped ({} superseded event(s))",
            self.debouncer.superseded()
        );
    }

    fn recompute(&self) {
        let messages = self.engine.process_messages(&lock_form(&self.form));
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        self.messages.send_replace(messages);
    }
}
