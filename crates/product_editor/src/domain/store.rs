//! Entity store seam plus an in-memory implementation.
//!
//! The screen only talks to [`EntityStore`]. [`InMemoryStore`] backs the CLI
//! and the tests: it can be seeded from JSON, records every call, and can be
//! told to fail or stall individual operations.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use strum::Display;
use thiserror::Error;
use tracing::debug;

use super::product::{Category, Product};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(u64),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn fetch_by_id(&self, id: u64) -> Result<Product, StoreError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Insert (`id == 0`) or update a product. Returns the stored product.
    async fn save(&self, product: Product) -> Result<Product, StoreError>;

    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

/// Store operations, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOp {
    FetchById,
    FetchCategories,
    Save,
    Delete,
}

/// One recorded call against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FetchById(u64),
    FetchCategories,
    Save(Product),
    Delete(u64),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::FetchById(_) => StoreOp::FetchById,
            StoreCall::FetchCategories => StoreOp::FetchCategories,
            StoreCall::Save(_) => StoreOp::Save,
            StoreCall::Delete(_) => StoreOp::Delete,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Default)]
struct Inner {
    products: BTreeMap<u64, Product>,
    categories: Vec<Category>,
    calls: Vec<StoreCall>,
    failures: HashMap<StoreOp, String>,
    fetch_delays: HashMap<u64, Duration>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `{ "products": [...], "categories": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let seed: Seed = serde_json::from_str(json)?;
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.products = seed.products.into_iter().map(|p| (p.id, p)).collect();
            inner.categories = seed.categories;
        }
        Ok(store)
    }

    /// A handful of garden tools, for the CLI.
    pub fn demo() -> Self {
        let store = Self::new()
            .with_category(Category { id: 1, name: "Garden".into() })
            .with_category(Category { id: 2, name: "Toolbox".into() })
            .with_category(Category { id: 3, name: "Gaming".into() });
        store
            .with_product(Product {
                id: 1,
                product_name: "Leaf Rake".into(),
                product_code: Some("GDN-0011".into()),
                unit_price: Some(19.95),
                unit_in_stock: Some(15),
                category_id: Some(1),
                description: Some("Leaf rake with 48-inch wooden handle.".into()),
                image_url: None,
            })
            .with_product(Product {
                id: 5,
                product_name: "Hammer".into(),
                product_code: Some("TBX-0048".into()),
                unit_price: Some(8.9),
                unit_in_stock: Some(120),
                category_id: Some(2),
                description: Some("Curved claw steel hammer.".into()),
                image_url: None,
            })
    }

    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.insert(product.id, product);
        self
    }

    pub fn with_category(self, category: Category) -> Self {
        self.lock().categories.push(category);
        self
    }

    /// Make every call of `op` fail with [`StoreError::Unavailable`].
    pub fn fail_on(&self, op: StoreOp, reason: impl Into<String>) {
        self.lock().failures.insert(op, reason.into());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Delay the answer to `fetch_by_id(id)`.
    pub fn delay_fetch(&self, id: u64, delay: Duration) {
        self.lock().fetch_delays.insert(id, delay);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .cloned()
            .collect()
    }

    pub fn product(&self, id: u64) -> Option<Product> {
        self.lock().products.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and return the injected failure for it, if any.
    fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let op = call.op();
        debug!(%op, "store call");
        inner.calls.push(call);
        match inner.failures.get(&op) {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn fetch_by_id(&self, id: u64) -> Result<Product, StoreError> {
        self.enter(StoreCall::FetchById(id))?;
        let delay = self.lock().fetch_delays.get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if id == 0 {
            return Ok(Product::blank());
        }
        self.product(id).ok_or(StoreError::NotFound(id))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.enter(StoreCall::FetchCategories)?;
        Ok(self.lock().categories.clone())
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        self.enter(StoreCall::Save(product.clone()))?;
        let mut inner = self.lock();
        let mut product = product;
        if product.is_new() {
            product.id = inner.products.keys().next_back().map_or(1, |last| last + 1);
        } else if !inner.products.contains_key(&product.id) {
            return Err(StoreError::NotFound(product.id));
        }
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.enter(StoreCall::Delete(id))?;
        self.lock()
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
