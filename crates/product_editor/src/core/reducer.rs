//! Pure state transitions of the edit screen.
//!
//! `reduce` mutates only the `ScreenModel` and describes every side effect
//! as an [`Effect`]. Form facts come in as a [`FormStatus`] snapshot taken by
//! the loop right before the call.
//!
//! Store responses are matched against the current state: a response for an
//! id other than the one loading, or one arriving after the screen moved on,
//! is dropped.

use tracing::{debug, warn};

use super::effects::{Effect, TaskKind, TaskResultKind};
use super::intent::Intent;
use super::state::{FormStatus, ScreenModel, ScreenState};
use crate::domain::Product;
use crate::errors::EditorError;

pub fn reduce(model: &mut ScreenModel, form: &FormStatus, intent: Intent) -> Vec<Effect> {
    if model.state == ScreenState::NavigatedAway {
        debug!(?intent, "screen already left; intent discarded");
        return Vec::new();
    }
    match intent {
        Intent::Activate => vec![Effect::async_task(TaskKind::FetchCategories)],
        Intent::RouteChanged(raw) => route_changed(model, &raw),
        Intent::Input { field, value } => {
            if model.state == ScreenState::Populated {
                model.state = ScreenState::Editing;
            }
            vec![Effect::Input { field, value }]
        }
        Intent::Blur { field } => vec![Effect::Blur { field }],
        Intent::Save => save(model, form),
        Intent::Delete => delete(model),
        Intent::DeleteConfirmed(id) => delete_confirmed(model, id),
        Intent::TaskFinished(result) => task_finished(model, result),
    }
}

fn route_changed(model: &mut ScreenModel, raw: &str) -> Vec<Effect> {
    if matches!(model.state, ScreenState::Saving | ScreenState::Deleting) {
        debug!(param = raw, state = %model.state, "route change deferred");
        model.deferred_route = Some(raw.to_string());
        return Vec::new();
    }
    let Ok(id) = raw.trim().parse::<u64>() else {
        warn!(param = raw, "route id is not a product id");
        model.error_message = Some(EditorError::InvalidId(raw.to_string()).to_string());
        return Vec::new();
    };
    if id == 0 {
        return populate(model, Product::blank());
    }
    model.state = ScreenState::Loading { id };
    vec![Effect::async_task(TaskKind::FetchProduct(id))]
}

/// Show `product`: title, fresh form values, nothing dirty.
fn populate(model: &mut ScreenModel, product: Product) -> Vec<Effect> {
    model.page_title = if product.is_new() {
        model.labels.create_title.clone()
    } else {
        format!("{}: {}", model.labels.update_title, product.product_name)
    };
    let values = product.form_values();
    model.product = Some(product);
    model.state = ScreenState::Populated;
    vec![Effect::ResetForm, Effect::PatchForm(values)]
}

fn save(model: &mut ScreenModel, form: &FormStatus) -> Vec<Effect> {
    if !model.state.is_editable() {
        warn!(state = %model.state, "save ignored");
        return Vec::new();
    }
    if !form.dirty {
        return complete(model);
    }
    if !form.valid {
        debug!("save skipped: form has validation errors");
        return Vec::new();
    }
    let Some(current) = model.product.as_ref() else {
        return Vec::new();
    };
    match current.overlay(&form.values) {
        Ok(product) => {
            model.state = ScreenState::Saving;
            vec![Effect::async_task(TaskKind::SaveProduct(product))]
        }
        Err(e) => {
            model.error_message = Some(EditorError::Overlay(e).to_string());
            Vec::new()
        }
    }
}

fn delete(model: &mut ScreenModel) -> Vec<Effect> {
    if !model.state.is_editable() {
        warn!(state = %model.state, "delete ignored");
        return Vec::new();
    }
    let Some(product) = model.product.as_ref() else {
        return Vec::new();
    };
    if product.is_new() {
        // never stored: nothing to delete
        return complete(model);
    }
    vec![Effect::ConfirmDelete {
        id: product.id,
        message: format!("Really delete the product: {}?", product.product_name),
    }]
}

fn delete_confirmed(model: &mut ScreenModel, id: u64) -> Vec<Effect> {
    let current = model.product.as_ref().map(|p| p.id);
    if !model.state.is_editable() || current != Some(id) {
        debug!(id, state = %model.state, "stale delete confirmation dropped");
        return Vec::new();
    }
    model.state = ScreenState::Deleting;
    vec![Effect::async_task(TaskKind::DeleteProduct(id))]
}

/// Save or delete finished: clear the form and go back to the list.
fn complete(model: &mut ScreenModel) -> Vec<Effect> {
    model.state = ScreenState::NavigatedAway;
    model.deferred_route = None;
    vec![
        Effect::ResetForm,
        Effect::Navigate(model.labels.list_route.clone()),
    ]
}

fn task_finished(model: &mut ScreenModel, result: TaskResultKind) -> Vec<Effect> {
    match (model.state, result) {
        (ScreenState::Loading { id: want }, TaskResultKind::ProductLoaded { id, product })
            if want == id =>
        {
            populate(model, product)
        }
        (ScreenState::Loading { id: want }, TaskResultKind::ProductLoadFailed { id, error })
            if want == id =>
        {
            model.error_message = Some(error);
            model.state = ScreenState::Idle;
            Vec::new()
        }
        (_, TaskResultKind::CategoriesLoaded(categories)) => {
            model.categories = categories;
            Vec::new()
        }
        (_, TaskResultKind::CategoriesFailed { error }) => {
            model.error_message = Some(error);
            Vec::new()
        }
        (ScreenState::Saving, TaskResultKind::Saved { product }) => {
            model.product = Some(product);
            complete(model)
        }
        (ScreenState::Saving, TaskResultKind::SaveFailed { error }) => {
            model.error_message = Some(error);
            model.state = ScreenState::Editing;
            resume_route(model)
        }
        (ScreenState::Deleting, TaskResultKind::Deleted { .. }) => complete(model),
        (ScreenState::Deleting, TaskResultKind::DeleteFailed { error, .. }) => {
            model.error_message = Some(error);
            model.state = ScreenState::Editing;
            resume_route(model)
        }
        (state, result) => {
            debug!(%state, ?result, "late response discarded");
            Vec::new()
        }
    }
}

/// A failed write leaves the screen open; follow a route change that came in meanwhile.
fn resume_route(model: &mut ScreenModel) -> Vec<Effect> {
    match model.deferred_route.take() {
        Some(raw) => route_changed(model, &raw),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ScreenLabels;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    fn rake() -> Product {
        Product {
            id: 1,
            product_name: "Leaf Rake".into(),
            unit_price: Some(19.95),
            unit_in_stock: Some(15),
            category_id: Some(1),
            description: Some("Leaf rake with 48-inch wooden handle.".into()),
            ..Product::default()
        }
    }

    fn model() -> ScreenModel {
        ScreenModel::new(ScreenLabels::default())
    }

    fn clean() -> FormStatus {
        FormStatus {
            dirty: false,
            valid: true,
            values: Map::new(),
        }
    }

    fn dirty(valid: bool, values: serde_json::Value) -> FormStatus {
        let serde_json::Value::Object(values) = values else {
            panic!("values must be an object");
        };
        FormStatus {
            dirty: true,
            valid,
            values,
        }
    }

    /// Model showing the rake, as after a successful load.
    fn loaded() -> ScreenModel {
        let mut m = model();
        reduce(&mut m, &clean(), Intent::RouteChanged("1".into()));
        reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::ProductLoaded {
                id: 1,
                product: rake(),
            }),
        );
        m
    }

    #[test]
    fn activation_requests_categories() {
        let mut m = model();
        let effects = reduce(&mut m, &clean(), Intent::Activate);
        assert_eq!(effects, vec![Effect::Async(TaskKind::FetchCategories)]);
    }

    #[test]
    fn id_zero_enters_creation_mode_without_fetch() {
        let mut m = model();
        let effects = reduce(&mut m, &clean(), Intent::RouteChanged("0".into()));
        assert_eq!(m.state, ScreenState::Populated);
        assert_eq!(m.page_title, "Add Product");
        assert_eq!(
            effects,
            vec![
                Effect::ResetForm,
                Effect::PatchForm(Product::blank().form_values())
            ]
        );
    }

    #[test]
    fn nonzero_id_loads_then_populates() {
        let mut m = model();
        let effects = reduce(&mut m, &clean(), Intent::RouteChanged("1".into()));
        assert_eq!(m.state, ScreenState::Loading { id: 1 });
        assert_eq!(effects, vec![Effect::Async(TaskKind::FetchProduct(1))]);

        let effects = reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::ProductLoaded {
                id: 1,
                product: rake(),
            }),
        );
        assert_eq!(m.state, ScreenState::Populated);
        assert_eq!(m.page_title, "Update Product: Leaf Rake");
        assert_eq!(effects[0], Effect::ResetForm);
        assert!(matches!(&effects[1], Effect::PatchForm(v) if v["productName"] == json!("Leaf Rake")));
    }

    #[test]
    fn unparsable_id_is_reported() {
        let mut m = model();
        let effects = reduce(&mut m, &clean(), Intent::RouteChanged("abc".into()));
        assert!(effects.is_empty());
        assert_eq!(m.state, ScreenState::Idle);
        assert_eq!(m.error_message.as_deref(), Some("invalid product id `abc`"));
    }

    #[test]
    fn load_failure_fills_error_slot() {
        let mut m = model();
        reduce(&mut m, &clean(), Intent::RouteChanged("42".into()));
        reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::ProductLoadFailed {
                id: 42,
                error: "product 42 not found".into(),
            }),
        );
        assert_eq!(m.state, ScreenState::Idle);
        assert_eq!(m.error_message.as_deref(), Some("product 42 not found"));
    }

    #[test]
    fn response_for_superseded_id_is_dropped() {
        let mut m = model();
        reduce(&mut m, &clean(), Intent::RouteChanged("1".into()));
        reduce(&mut m, &clean(), Intent::RouteChanged("2".into()));
        let effects = reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::ProductLoaded {
                id: 1,
                product: rake(),
            }),
        );
        assert!(effects.is_empty());
        assert_eq!(m.state, ScreenState::Loading { id: 2 });
        assert!(m.product.is_none());
    }

    #[test]
    fn first_input_moves_to_editing() {
        let mut m = loaded();
        let effects = reduce(
            &mut m,
            &clean(),
            Intent::Input {
                field: "productName".into(),
                value: json!("Steel Rake"),
            },
        );
        assert_eq!(m.state, ScreenState::Editing);
        assert_eq!(
            effects,
            vec![Effect::Input {
                field: "productName".into(),
                value: json!("Steel Rake")
            }]
        );
    }

    #[test]
    fn save_with_clean_form_completes_without_store_call() {
        let mut m = loaded();
        let effects = reduce(&mut m, &clean(), Intent::Save);
        assert_eq!(m.state, ScreenState::NavigatedAway);
        assert_eq!(
            effects,
            vec![Effect::ResetForm, Effect::Navigate("/products".into())]
        );
    }

    #[test]
    fn save_with_invalid_dirty_form_does_nothing() {
        let mut m = loaded();
        m.state = ScreenState::Editing;
        let effects = reduce(&mut m, &dirty(false, json!({})), Intent::Save);
        assert!(effects.is_empty());
        assert_eq!(m.state, ScreenState::Editing);
    }

    #[test]
    fn save_overlays_form_values_on_the_product() {
        let mut m = loaded();
        m.state = ScreenState::Editing;
        let form = dirty(
            true,
            json!({
                "productName": "Steel Rake",
                "unitPrice": "24.5",
                "unitInStock": 15,
                "categoryId": 1
            }),
        );
        let effects = reduce(&mut m, &form, Intent::Save);
        assert_eq!(m.state, ScreenState::Saving);
        let Effect::Async(TaskKind::SaveProduct(saved)) = &effects[0] else {
            panic!("expected a save task, got {effects:?}");
        };
        assert_eq!(saved.product_name, "Steel Rake");
        assert_eq!(saved.unit_price, Some(24.5));
        assert_eq!(saved.description, rake().description);
    }

    #[test]
    fn save_with_unusable_values_reports_error() {
        let mut m = loaded();
        m.state = ScreenState::Editing;
        let form = dirty(true, json!({ "unitPrice": "cheap" }));
        assert!(reduce(&mut m, &form, Intent::Save).is_empty());
        assert_eq!(m.state, ScreenState::Editing);
        assert!(m
            .error_message
            .as_deref()
            .is_some_and(|e| e.starts_with("cannot apply form values")));
    }

    #[test]
    fn save_failure_returns_to_editing() {
        let mut m = loaded();
        m.state = ScreenState::Saving;
        reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::SaveFailed {
                error: "store unavailable: disk full".into(),
            }),
        );
        assert_eq!(m.state, ScreenState::Editing);
        assert_eq!(
            m.error_message.as_deref(),
            Some("store unavailable: disk full")
        );
    }

    #[test]
    fn route_change_during_save_waits_for_the_result() {
        let mut m = loaded();
        m.state = ScreenState::Saving;
        let effects = reduce(&mut m, &clean(), Intent::RouteChanged("2".into()));
        assert!(effects.is_empty());
        assert_eq!(m.state, ScreenState::Saving);

        let effects = reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::Saved { product: rake() }),
        );
        assert_eq!(m.state, ScreenState::NavigatedAway);
        assert_eq!(
            effects,
            vec![Effect::ResetForm, Effect::Navigate("/products".into())]
        );
        assert_eq!(m.deferred_route, None);
    }

    #[test]
    fn route_change_during_failed_delete_is_followed() {
        let mut m = loaded();
        m.state = ScreenState::Deleting;
        assert!(reduce(&mut m, &clean(), Intent::RouteChanged("2".into())).is_empty());

        let effects = reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::DeleteFailed {
                id: 1,
                error: "store unavailable: locked".into(),
            }),
        );
        assert_eq!(m.state, ScreenState::Loading { id: 2 });
        assert_eq!(effects, vec![Effect::Async(TaskKind::FetchProduct(2))]);
        assert_eq!(m.error_message.as_deref(), Some("store unavailable: locked"));
    }

    #[test]
    fn save_and_delete_are_ignored_while_busy() {
        let mut m = model();
        reduce(&mut m, &clean(), Intent::RouteChanged("1".into()));
        assert!(reduce(&mut m, &clean(), Intent::Save).is_empty());
        assert!(reduce(&mut m, &clean(), Intent::Delete).is_empty());
        assert_eq!(m.state, ScreenState::Loading { id: 1 });
    }

    #[test]
    fn delete_new_product_completes_without_prompt() {
        let mut m = model();
        reduce(&mut m, &clean(), Intent::RouteChanged("0".into()));
        let effects = reduce(&mut m, &clean(), Intent::Delete);
        assert_eq!(m.state, ScreenState::NavigatedAway);
        assert_eq!(
            effects,
            vec![Effect::ResetForm, Effect::Navigate("/products".into())]
        );
    }

    #[test]
    fn delete_asks_for_confirmation_first() {
        let mut m = loaded();
        let effects = reduce(&mut m, &clean(), Intent::Delete);
        assert_eq!(m.state, ScreenState::Populated);
        assert_eq!(
            effects,
            vec![Effect::ConfirmDelete {
                id: 1,
                message: "Really delete the product: Leaf Rake?".into()
            }]
        );

        let effects = reduce(&mut m, &clean(), Intent::DeleteConfirmed(1));
        assert_eq!(m.state, ScreenState::Deleting);
        assert_eq!(effects, vec![Effect::Async(TaskKind::DeleteProduct(1))]);

        let effects = reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::Deleted { id: 1 }),
        );
        assert_eq!(m.state, ScreenState::NavigatedAway);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn nothing_happens_after_navigating_away() {
        let mut m = loaded();
        reduce(&mut m, &clean(), Intent::Save);
        assert_eq!(m.state, ScreenState::NavigatedAway);
        for intent in [
            Intent::RouteChanged("2".into()),
            Intent::Delete,
            Intent::TaskFinished(TaskResultKind::CategoriesFailed {
                error: "late".into(),
            }),
        ] {
            assert!(reduce(&mut m, &clean(), intent).is_empty());
        }
        assert_eq!(m.state, ScreenState::NavigatedAway);
        assert_eq!(m.error_message, None);
    }

    #[test]
    fn categories_are_kept_for_rendering() {
        let mut m = model();
        let categories = vec![crate::domain::Category {
            id: 1,
            name: "Garden".into(),
        }];
        reduce(
            &mut m,
            &clean(),
            Intent::TaskFinished(TaskResultKind::CategoriesLoaded(categories.clone())),
        );
        assert_eq!(m.categories, categories);
    }
}
