//! The product edit screen.
//!
//! [`ProductEditScreen::activate`] builds the form, checks the message
//! catalog against it, wires the validation pipeline and spawns the screen
//! loop. The loop is the only owner of the [`ScreenModel`]; it waits on
//!
//! - cancellation (teardown),
//! - executor events (store results),
//! - the `id` route parameter,
//! - intents sent through the screen handle,
//!
//! runs each through the reducer, applies the returned effects and publishes
//! a fresh [`EditView`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use forms::{
    lock_form, DisplayMessages, GenericValidator, InputHandle, PipelineBuilder, SharedForm,
    ValidationPipeline,
};

use super::effects::{Effect, InternalEvent};
use super::executor::TaskExecutor;
use super::intent::Intent;
use super::reducer::reduce;
use super::state::{EditView, FormStatus, ScreenLabels, ScreenModel};
use crate::config::Config;
use crate::domain::{ConfirmPrompt, EntityStore, Router};
use crate::errors::EditorError;
use crate::product_form::product_form;

/// Route parameter carrying the product id.
pub const ID_PARAM: &str = "id";

/// External collaborators of one screen.
#[derive(Clone)]
pub struct ScreenDeps {
    pub store: Arc<dyn EntityStore>,
    pub router: Arc<dyn Router>,
    pub confirm: Arc<dyn ConfirmPrompt>,
}

/// Handle to a running edit screen. Dropping it stops the screen.
pub struct ProductEditScreen {
    intents: mpsc::UnboundedSender<Intent>,
    view: watch::Receiver<EditView>,
    messages: watch::Receiver<DisplayMessages>,
    form: SharedForm,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProductEditScreen {
    /// Build and start the screen. Must be called inside a tokio runtime.
    pub fn activate(config: &Config, deps: ScreenDeps) -> Result<Self, EditorError> {
        let form = product_form()?;
        let engine = GenericValidator::checked(config.catalog(), &form)?;
        let form: SharedForm = Arc::new(Mutex::new(form));

        let mut builder = PipelineBuilder::new(form.clone()).debounce(config.debounce());
        let inputs = builder
            .bind_all()?
            .into_iter()
            .map(|input| (input.name().to_string(), input))
            .collect();
        let pipeline = builder.spawn(engine);
        let messages = pipeline.messages();

        let cancel = CancellationToken::new();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let executor = TaskExecutor::new(deps.store, internal_tx, cancel.child_token());
        let route = deps.router.route_param(ID_PARAM);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();

        let model = ScreenModel::new(ScreenLabels::from(config));
        let (view_tx, view_rx) = watch::channel(model.view());

        let screen_loop = ScreenLoop {
            model,
            form: form.clone(),
            inputs,
            pipeline,
            executor,
            router: deps.router,
            confirm: deps.confirm,
            view: view_tx,
            cancel: cancel.clone(),
            intents: intent_rx,
            internal: internal_rx,
            route: Some(route),
        };
        let handle = tokio::spawn(screen_loop.run());
        info!(debounce_ms = config.debounce_ms, "product edit screen activated");

        Ok(Self {
            intents: intent_tx,
            view: view_rx,
            messages,
            form,
            cancel,
            handle: Some(handle),
        })
    }

    /// The user typed into `field`.
    pub fn input(&self, field: &str, value: impl Into<Value>) {
        self.send(Intent::Input {
            field: field.to_string(),
            value: value.into(),
        });
    }

    /// Focus left `field`.
    pub fn blur(&self, field: &str) {
        self.send(Intent::Blur {
            field: field.to_string(),
        });
    }

    pub fn save(&self) {
        self.send(Intent::Save);
    }

    pub fn delete(&self) {
        self.send(Intent::Delete);
    }

    pub fn view(&self) -> watch::Receiver<EditView> {
        self.view.clone()
    }

    pub fn current_view(&self) -> EditView {
        self.view.borrow().clone()
    }

    pub fn messages(&self) -> watch::Receiver<DisplayMessages> {
        self.messages.clone()
    }

    pub fn current_messages(&self) -> DisplayMessages {
        self.messages.borrow().clone()
    }

    /// The bound form, for rendering field values.
    pub fn form(&self) -> &SharedForm {
        &self.form
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop, the executor and the validation pipeline, and release
    /// the route subscription.
    pub async fn teardown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("screen loop ended abnormally: {e}");
            }
        }
    }

    fn send(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            debug!("screen stopped; intent dropped");
        }
    }
}

impl Drop for ProductEditScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ScreenLoop {
    model: ScreenModel,
    form: SharedForm,
    inputs: HashMap<String, InputHandle>,
    pipeline: ValidationPipeline,
    executor: TaskExecutor,
    router: Arc<dyn Router>,
    confirm: Arc<dyn ConfirmPrompt>,
    view: watch::Sender<EditView>,
    cancel: CancellationToken,
    intents: mpsc::UnboundedReceiver<Intent>,
    internal: mpsc::UnboundedReceiver<InternalEvent>,
    route: Option<mpsc::UnboundedReceiver<String>>,
}

impl ScreenLoop {
    async fn run(mut self) {
        self.dispatch(Intent::Activate);
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(event) = self.internal.recv() => self.on_internal(event),
                param = next_param(&mut self.route) => match param {
                    Some(raw) => self.dispatch(Intent::RouteChanged(raw)),
                    None => {
                        debug!("route parameter stream closed");
                        self.route = None;
                    }
                },
                intent = self.intents.recv() => match intent {
                    Some(intent) => self.dispatch(intent),
                    None => break,
                },
            }
        }

        self.cancel.cancel();
        let ScreenLoop { pipeline, model, .. } = self;
        pipeline.shutdown().await;
        info!(state = %model.state, "product edit screen closed");
    }

    fn on_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::TaskStarted { id, label } => debug!(task = id, %label, "task started"),
            InternalEvent::TaskFinished { id, result } => {
                debug!(task = id, "task finished");
                self.dispatch(Intent::TaskFinished(result));
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        let status = FormStatus::capture(&lock_form(&self.form));
        let effects = reduce(&mut self.model, &status, intent);
        self.apply(effects);
        self.publish();
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Async(task) => {
                    let label = task.to_string();
                    let id = self.executor.spawn(task);
                    debug!(task = id, %label, "scheduled");
                }
                Effect::ResetForm => lock_form(&self.form).reset(),
                Effect::PatchForm(values) => lock_form(&self.form).patch_value(&values),
                Effect::Input { field, value } => match self.inputs.get(&field) {
                    Some(input) => input.input(value),
                    None => warn!(%field, "input for unknown field ignored"),
                },
                Effect::Blur { field } => match self.inputs.get(&field) {
                    Some(input) => input.blur(),
                    None => warn!(%field, "blur for unknown field ignored"),
                },
                Effect::ConfirmDelete { id, message } => {
                    if self.confirm.confirm(&message) {
                        self.dispatch(Intent::DeleteConfirmed(id));
                    } else {
                        info!(id, "delete declined");
                    }
                }
                Effect::Navigate(path) => self.router.navigate(&path),
            }
        }
    }

    fn publish(&self) {
        let next = self.model.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn next_param(route: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match route {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
