//! End-to-end behaviour of the edit screen against the in-memory store.
//!
//! The tokio clock is paused, so debounce periods and store delays elapse in
//! virtual time.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::{sleep, timeout};

use forms::{lock_form, MessageCatalog};
use product_editor::domain::{
    AutoConfirm, Category, InMemoryStore, Product, RecordingRouter, StoreCall, StoreOp,
};
use product_editor::{
    Config, EditView, EditorError, ProductEditScreen, ScreenDeps, ScreenState, ID_PARAM,
};

struct Harness {
    store: Arc<InMemoryStore>,
    router: Arc<RecordingRouter>,
    confirm: Arc<AutoConfirm>,
    screen: ProductEditScreen,
}

fn rake() -> Product {
    Product {
        id: 1,
        product_name: "Leaf Rake".into(),
        product_code: Some("GDN-0011".into()),
        unit_price: Some(19.95),
        unit_in_stock: Some(15),
        category_id: Some(1),
        description: Some("Leaf rake with 48-inch wooden handle.".into()),
        image_url: None,
    }
}

fn cart() -> Product {
    Product {
        id: 2,
        product_name: "Garden Cart".into(),
        unit_price: Some(32.99),
        unit_in_stock: Some(4),
        category_id: Some(1),
        ..Product::default()
    }
}

fn harness_with(config: &Config, confirm: AutoConfirm) -> Harness {
    let store = Arc::new(
        InMemoryStore::new()
            .with_product(rake())
            .with_product(cart())
            .with_category(Category {
                id: 1,
                name: "Garden".into(),
            }),
    );
    let router = Arc::new(RecordingRouter::new());
    let confirm = Arc::new(confirm);
    let screen = ProductEditScreen::activate(
        config,
        ScreenDeps {
            store: store.clone(),
            router: router.clone(),
            confirm: confirm.clone(),
        },
    )
    .expect("screen activates");
    Harness {
        store,
        router,
        confirm,
        screen,
    }
}

fn harness() -> Harness {
    harness_with(&Config::default(), AutoConfirm::accept())
}

impl Harness {
    async fn wait_until(&self, pred: impl Fn(&EditView) -> bool) -> EditView {
        let mut view = self.screen.view();
        let seen = timeout(Duration::from_secs(30), view.wait_for(|v| pred(v)))
            .await
            .expect("condition reached in time")
            .expect("screen still running")
            .clone();
        seen
    }

    async fn open(&self, id: &str) -> EditView {
        self.router.push_param(ID_PARAM, id);
        self.wait_until(|v| v.state == ScreenState::Populated).await
    }

    /// Let the screen loop drain pending intents.
    async fn idle(&self) {
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn creation_mode_skips_fetch() {
    let h = harness();
    let view = h.open("0").await;
    assert_eq!(view.page_title, "Add Product");
    assert_eq!(view.product_id, Some(0));
    h.idle().await;
    assert!(h.store.calls_of(StoreOp::FetchById).is_empty());
    assert_eq!(h.store.calls_of(StoreOp::FetchCategories).len(), 1);
    assert_eq!(h.screen.current_view().categories.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn loaded_product_fills_pristine_form() {
    let h = harness();
    let view = h.open("1").await;
    assert_eq!(view.page_title, "Update Product: Leaf Rake");
    assert_eq!(
        h.store.calls_of(StoreOp::FetchById),
        vec![StoreCall::FetchById(1)]
    );
    {
        let form = lock_form(h.screen.form());
        assert_eq!(form.field("productName").unwrap().value(), "Leaf Rake");
        assert!(!form.is_dirty());
        assert!(form.is_valid());
    }

    sleep(Duration::from_secs(2)).await;
    assert!(h.screen.current_messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn typing_shows_message_after_quiet_period() {
    let h = harness();
    h.open("1").await;

    h.screen.input("productName", "ab");
    sleep(Duration::from_millis(400)).await;
    assert!(h.screen.current_messages().is_empty());
    assert_eq!(h.screen.current_view().state, ScreenState::Editing);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(
        h.screen.current_messages().get("productName"),
        Some("Product name must be at least 3 characters.")
    );

    h.screen.input("productName", "Steel Rake");
    sleep(Duration::from_millis(900)).await;
    assert!(h.screen.current_messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blur_on_empty_new_product_name_requires_it() {
    let h = harness();
    h.open("0").await;
    h.screen.blur("productName");
    sleep(Duration::from_millis(900)).await;
    let messages = h.screen.current_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages.get("productName"), Some("Product name is required."));
}

#[tokio::test(start_paused = true)]
async fn saving_clean_form_navigates_without_store_call() {
    let h = harness();
    h.open("1").await;
    h.screen.save();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;
    assert!(h.store.calls_of(StoreOp::Save).is_empty());
    assert_eq!(h.router.navigations(), vec!["/products"]);
}

#[tokio::test(start_paused = true)]
async fn saving_edits_merges_them_into_the_product() {
    let h = harness();
    h.open("1").await;
    h.screen.input("productName", "Steel Rake");
    h.screen.input("unitPrice", "24.5");
    h.screen.save();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;

    let stored = h.store.product(1).unwrap();
    assert_eq!(stored.product_name, "Steel Rake");
    assert_eq!(stored.unit_price, Some(24.5));
    assert_eq!(stored.unit_in_stock, Some(15));
    assert_eq!(stored.description, rake().description);
    assert_eq!(h.router.navigations(), vec!["/products"]);
    assert!(!lock_form(h.screen.form()).is_dirty());
}

#[tokio::test(start_paused = true)]
async fn saving_new_product_inserts_it() {
    let h = harness();
    h.open("0").await;
    h.screen.input("productName", "Hedge Trimmer");
    h.screen.input("unitPrice", 49);
    h.screen.input("categoryId", "1");
    h.screen.save();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;

    let stored = h.store.product(3).expect("inserted with next id");
    assert_eq!(stored.product_name, "Hedge Trimmer");
    assert_eq!(stored.category_id, Some(1));
}

#[tokio::test(start_paused = true)]
async fn invalid_dirty_form_is_not_saved() {
    let h = harness();
    h.open("1").await;
    h.screen.input("unitInStock", 5000);
    h.screen.save();
    h.idle().await;
    assert_eq!(h.screen.current_view().state, ScreenState::Editing);
    assert!(h.store.calls_of(StoreOp::Save).is_empty());
    assert!(h.router.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn save_failure_keeps_editing_with_error() {
    let h = harness();
    h.store.fail_on(StoreOp::Save, "disk full");
    h.open("1").await;
    h.screen.input("productName", "Steel Rake");
    h.screen.save();
    let view = h.wait_until(|v| v.error_message.is_some()).await;
    assert_eq!(view.state, ScreenState::Editing);
    assert_eq!(view.error_message.as_deref(), Some("store unavailable: disk full"));
    assert!(h.router.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleting_unsaved_product_skips_prompt_and_store() {
    let h = harness();
    h.open("0").await;
    h.screen.delete();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;
    assert!(h.confirm.prompts().is_empty());
    assert!(h.store.calls_of(StoreOp::Delete).is_empty());
    assert_eq!(h.router.navigations(), vec!["/products"]);
}

#[tokio::test(start_paused = true)]
async fn declined_delete_changes_nothing() {
    let h = harness_with(&Config::default(), AutoConfirm::decline());
    h.open("1").await;
    h.screen.delete();
    h.idle().await;
    assert_eq!(h.confirm.prompts(), vec!["Really delete the product: Leaf Rake?"]);
    assert_eq!(h.screen.current_view().state, ScreenState::Populated);
    assert!(h.store.calls_of(StoreOp::Delete).is_empty());
    assert!(h.store.product(1).is_some());
}

#[tokio::test(start_paused = true)]
async fn confirmed_delete_removes_and_navigates() {
    let h = harness();
    h.open("1").await;
    h.screen.delete();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;
    assert_eq!(h.store.calls_of(StoreOp::Delete), vec![StoreCall::Delete(1)]);
    assert!(h.store.product(1).is_none());
    assert_eq!(h.router.navigations(), vec!["/products"]);
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_is_shown() {
    let h = harness();
    h.router.push_param(ID_PARAM, "42");
    let view = h.wait_until(|v| v.error_message.is_some()).await;
    assert_eq!(view.error_message.as_deref(), Some("product 42 not found"));
    assert_eq!(view.state, ScreenState::Idle);
}

#[tokio::test(start_paused = true)]
async fn unparsable_route_id_is_reported_without_fetch() {
    let h = harness();
    h.router.push_param(ID_PARAM, "rake");
    let view = h.wait_until(|v| v.error_message.is_some()).await;
    assert_eq!(view.error_message.as_deref(), Some("invalid product id `rake`"));
    assert!(h.store.calls_of(StoreOp::FetchById).is_empty());
}

#[tokio::test(start_paused = true)]
async fn late_response_for_previous_id_is_discarded() {
    let h = harness();
    h.store.delay_fetch(1, Duration::from_secs(1));
    h.router.push_param(ID_PARAM, "1");
    h.idle().await;
    h.router.push_param(ID_PARAM, "2");
    let view = h
        .wait_until(|v| v.state == ScreenState::Populated && v.product_id == Some(2))
        .await;
    assert_eq!(view.page_title, "Update Product: Garden Cart");

    sleep(Duration::from_secs(2)).await;
    let view = h.screen.current_view();
    assert_eq!(view.product_id, Some(2));
    assert_eq!(view.page_title, "Update Product: Garden Cart");
    assert_eq!(
        lock_form(h.screen.form()).field("productName").unwrap().value(),
        "Garden Cart"
    );
}

#[tokio::test(start_paused = true)]
async fn route_change_reloads_the_form() {
    let h = harness();
    h.open("1").await;
    h.screen.input("productName", "ab");
    h.idle().await;
    h.router.push_param(ID_PARAM, "2");
    h.wait_until(|v| v.product_id == Some(2) && v.state == ScreenState::Populated)
        .await;
    let form = lock_form(h.screen.form());
    assert_eq!(form.field("productName").unwrap().value(), "Garden Cart");
    assert!(!form.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn configured_messages_and_timing_apply() {
    let config = Config {
        debounce_ms: 200,
        list_route: "/catalog".into(),
        messages: MessageCatalog::from_triples([(
            "unitPrice",
            "range",
            "Enter a price from {min} to {max}.",
        )]),
        ..Config::default()
    };
    let h = harness_with(&config, AutoConfirm::accept());
    h.open("1").await;
    h.screen.input("unitPrice", 0);
    sleep(Duration::from_millis(250)).await;
    assert_eq!(
        h.screen.current_messages().get("unitPrice"),
        Some("Enter a price from 1 to 99999.")
    );

    h.screen.input("unitPrice", 5);
    h.screen.save();
    h.wait_until(|v| v.state == ScreenState::NavigatedAway).await;
    assert_eq!(h.router.navigations(), vec!["/catalog"]);
}

#[tokio::test(start_paused = true)]
async fn catalog_naming_unknown_field_is_rejected() {
    let config = Config {
        messages: MessageCatalog::from_triples([("product", "required", "stale key")]),
        ..Config::default()
    };
    let err = ProductEditScreen::activate(
        &config,
        ScreenDeps {
            store: Arc::new(InMemoryStore::new()),
            router: Arc::new(RecordingRouter::new()),
            confirm: Arc::new(AutoConfirm::accept()),
        },
    )
    .err()
    .expect("activation fails");
    assert!(matches!(err, EditorError::Catalog(_)));
}

#[tokio::test(start_paused = true)]
async fn teardown_releases_subscriptions() {
    let h = harness();
    h.open("1").await;
    assert_eq!(h.router.subscriber_count(ID_PARAM), 1);
    let Harness {
        screen,
        router,
        store,
        ..
    } = h;
    assert!(screen.is_running());
    screen.teardown().await;
    assert_eq!(router.subscriber_count(ID_PARAM), 0);

    router.push_param(ID_PARAM, "2");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        store.calls_of(StoreOp::FetchById),
        vec![StoreCall::FetchById(1)]
    );
}
