//! # mesa-store
//!
//! The backend seen from the ordering workflow.
//!
//! Three async contracts split the document collections the storefront and the
//! back office read and write:
//!
//! * [`CatalogStore`]: categories, products and banners
//! * [`SettingsStore`]: the single settings document
//! * [`OrderStore`]: placed orders and their live feed
//!
//! [`MemoryStore`] implements all three in-process. Order status writes are
//! applied in arrival order and stamped with a strictly increasing backend
//! timestamp, so concurrent admin sessions converge on the last write.

use async_trait::async_trait;
use mesa_core::catalog::{Banner, Category, Product};
use mesa_core::order::{Order, OrderId};
use mesa_core::settings::Settings;
use mesa_core::status::OrderStatus;
use thiserror::Error;
use tokio::sync::watch;

pub mod memory;
pub mod seed;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected document: {0}")]
    Invalid(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable machine code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Invalid(_) => "validation_error",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Io(_) => "io_error",
            StoreError::Json(_) => "encoding_error",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All categories, by position.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn upsert_category(&self, category: Category) -> StoreResult<Category>;
    async fn delete_category(&self, id: &str) -> StoreResult<()>;

    /// Products by position, optionally restricted to one category.
    async fn list_products(&self, category_id: Option<&str>) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: &str) -> StoreResult<Product>;
    async fn upsert_product(&self, product: Product) -> StoreResult<Product>;
    async fn delete_product(&self, id: &str) -> StoreResult<()>;

    async fn list_banners(&self) -> StoreResult<Vec<Banner>>;
    async fn upsert_banner(&self, banner: Banner) -> StoreResult<Banner>;
    async fn delete_banner(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` until the back office saves settings for the first time.
    async fn load_settings(&self) -> StoreResult<Option<Settings>>;
    async fn save_settings(&self, settings: Settings) -> StoreResult<Settings>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Stores a freshly composed order and returns it with backend timestamps.
    async fn create_order(&self, order: Order) -> StoreResult<Order>;
    async fn get_order(&self, id: &OrderId) -> StoreResult<Order>;
    /// Newest first.
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
    /// Writes the status unconditionally; the last write wins.
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> StoreResult<Order>;
    fn subscribe_orders(&self) -> OrderFeed;
}

/// Live view of the order collection.
///
/// Every change publishes the full list, newest first. A fresh feed yields the
/// current list on its first [`OrderFeed::next`] call.
#[derive(Debug, Clone)]
pub struct OrderFeed {
    rx: watch::Receiver<Vec<Order>>,
}

impl OrderFeed {
    pub fn new(mut rx: watch::Receiver<Vec<Order>>) -> Self {
        rx.mark_changed();
        Self { rx }
    }

    /// The latest list without waiting.
    pub fn current(&self) -> Vec<Order> {
        self.rx.borrow().clone()
    }

    /// Waits for the next snapshot. `None` once the backend is gone.
    pub async fn next(&mut self) -> Option<Vec<Order>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
