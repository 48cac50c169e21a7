use crate::snapshot::Snapshot;
use crate::{CatalogStore, OrderFeed, OrderStore, SettingsStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mesa_core::catalog::{Banner, Category, Product, sort_by_position};
use mesa_core::order::{Order, OrderId};
use mesa_core::settings::Settings;
use mesa_core::status::OrderStatus;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Default)]
struct Collections {
    settings: Option<Settings>,
    categories: BTreeMap<String, Category>,
    products: BTreeMap<String, Product>,
    banners: BTreeMap<String, Banner>,
    orders: BTreeMap<OrderId, Order>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Collections {
    fn orders_newest_first(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        orders
    }
}

/// In-process backend holding every collection behind one lock.
///
/// Writes get a backend timestamp that never repeats or goes backwards, even
/// when the wall clock does.
pub struct MemoryStore {
    state: RwLock<Collections>,
    orders_tx: watch::Sender<Vec<Order>>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        let (orders_tx, _) = watch::channel(Vec::new());
        Self {
            state: RwLock::new(Collections::default()),
            orders_tx,
            clock,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        store.import(snapshot);
        store
    }

    /// Replaces every collection with the snapshot contents.
    pub fn import(&self, snapshot: Snapshot) {
        let mut state = self.state.write();
        state.settings = snapshot.settings;
        state.categories = snapshot
            .categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        state.products = snapshot
            .products
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        state.banners = snapshot
            .banners
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();
        state.orders = snapshot
            .orders
            .into_iter()
            .map(|o| (o.id.clone(), o))
            .collect();
        state.last_stamp = state
            .orders
            .values()
            .map(|o| o.updated_at)
            .max();

        tracing::info!(
            categories = state.categories.len(),
            products = state.products.len(),
            banners = state.banners.len(),
            orders = state.orders.len(),
            "store imported snapshot"
        );
        self.orders_tx.send_replace(state.orders_newest_first());
    }

    pub fn export(&self) -> Snapshot {
        let state = self.state.read();
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        let mut banners: Vec<Banner> = state.banners.values().cloned().collect();
        sort_by_position(&mut categories);
        sort_by_position(&mut products);
        sort_by_position(&mut banners);
        Snapshot {
            settings: state.settings.clone(),
            categories,
            products,
            banners,
            orders: state.orders_newest_first(),
        }
    }

    fn stamp(&self, state: &mut Collections) -> DateTime<Utc> {
        self.stamp_after(&mut state.last_stamp)
    }

    fn stamp_after(&self, last_stamp: &mut Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = (self.clock)();
        let stamp = match *last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        *last_stamp = Some(stamp);
        stamp
    }

    fn publish_orders(&self, state: &Collections) {
        self.orders_tx.send_replace(state.orders_newest_first());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted<T: mesa_core::catalog::Ordered + Clone>(
    items: impl Iterator<Item = T>,
) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    sort_by_position(&mut items);
    items
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sorted(self.state.read().categories.values().cloned()))
    }

    async fn upsert_category(&self, mut category: Category) -> StoreResult<Category> {
        if category.name.trim().is_empty() {
            return Err(StoreError::Invalid("category name is required".into()));
        }
        let mut state = self.state.write();
        let stamp = self.stamp(&mut state);
        category.updated_at = stamp;
        if let Some(existing) = state.categories.get(&category.id) {
            category.created_at = existing.created_at;
        } else {
            category.created_at = stamp;
        }
        state
            .categories
            .insert(category.id.clone(), category.clone());
        tracing::debug!(category = %category.id, "category saved");
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> StoreResult<()> {
        self.state
            .write()
            .categories
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("category", id))
    }

    async fn list_products(&self, category_id: Option<&str>) -> StoreResult<Vec<Product>> {
        let state = self.state.read();
        Ok(sorted(
            state
                .products
                .values()
                .filter(|p| category_id.is_none_or(|c| p.category_id == c))
                .cloned(),
        ))
    }

    async fn get_product(&self, id: &str) -> StoreResult<Product> {
        self.state
            .read()
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn upsert_product(&self, mut product: Product) -> StoreResult<Product> {
        product
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut state = self.state.write();
        if !state.categories.contains_key(&product.category_id) {
            return Err(StoreError::not_found("category", product.category_id));
        }
        let stamp = self.stamp(&mut state);
        product.updated_at = stamp;
        product.created_at = state
            .products
            .get(&product.id)
            .map_or(stamp, |existing| existing.created_at);
        state.products.insert(product.id.clone(), product.clone());
        tracing::debug!(product = %product.id, "product saved");
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.state
            .write()
            .products
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn list_banners(&self) -> StoreResult<Vec<Banner>> {
        Ok(sorted(self.state.read().banners.values().cloned()))
    }

    async fn upsert_banner(&self, mut banner: Banner) -> StoreResult<Banner> {
        if banner.image_url.trim().is_empty() {
            return Err(StoreError::Invalid("banner image is required".into()));
        }
        let mut state = self.state.write();
        let stamp = self.stamp(&mut state);
        banner.updated_at = stamp;
        banner.created_at = state
            .banners
            .get(&banner.id)
            .map_or(stamp, |existing| existing.created_at);
        state.banners.insert(banner.id.clone(), banner.clone());
        Ok(banner)
    }

    async fn delete_banner(&self, id: &str) -> StoreResult<()> {
        self.state
            .write()
            .banners
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("banner", id))
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_settings(&self) -> StoreResult<Option<Settings>> {
        Ok(self.state.read().settings.clone())
    }

    async fn save_settings(&self, mut settings: Settings) -> StoreResult<Settings> {
        settings
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut state = self.state.write();
        settings.updated_at = self.stamp(&mut state);
        state.settings = Some(settings.clone());
        tracing::info!(business = %settings.business_name, "settings saved");
        Ok(settings)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, mut order: Order) -> StoreResult<Order> {
        let mut state = self.state.write();
        if state.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order '{}' already exists",
                order.id
            )));
        }
        let stamp = self.stamp(&mut state);
        order.created_at = stamp;
        order.updated_at = stamp;
        state.orders.insert(order.id.clone(), order.clone());
        self.publish_orders(&state);

        tracing::info!(
            order_id = %order.id,
            number = %order.number,
            total = %order.total,
            "order created"
        );
        Ok(order)
    }

    async fn get_order(&self, id: &OrderId) -> StoreResult<Order> {
        self.state
            .read()
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id.as_str()))
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.state.read().orders_newest_first())
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> StoreResult<Order> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("order", id.as_str()))?;
        let stamp = self.stamp_after(&mut state.last_stamp);
        let change = order.record_status(status, stamp);
        tracing::info!(
            order_id = %id,
            from = %change.from,
            to = %change.to,
            at = %change.at,
            "order status written"
        );
        let updated = order.clone();
        self.publish_orders(state);
        Ok(updated)
    }

    fn subscribe_orders(&self) -> OrderFeed {
        OrderFeed::new(self.orders_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_snapshot;
    use chrono::TimeZone;
    use mesa_core::cart::{Cart, Selection};
    use mesa_core::checkout::{CheckoutForm, compose_order};

    fn fixed_clock(at: DateTime<Utc>) -> Clock {
        Arc::new(move || at)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap()
    }

    async fn seeded(clock: Clock) -> MemoryStore {
        let store = MemoryStore::with_clock(clock);
        store.import(demo_snapshot(now()));
        store
    }

    async fn place_one(store: &MemoryStore) -> Order {
        let settings = store.load_settings().await.unwrap().unwrap();
        let product = store.get_product("flan-napolitano").await.unwrap();
        let mut cart = Cart::new();
        cart.add(&product, 2, "", &[] as &[Selection]).unwrap();
        let checkout = CheckoutForm::pickup("Ana", "555 0101")
            .validate(&settings)
            .unwrap();
        let order = compose_order(&cart, checkout, now()).unwrap();
        store.create_order(order).await.unwrap()
    }

    #[tokio::test]
    async fn test_listings_are_sorted_by_position() {
        let store = seeded(Arc::new(Utc::now)).await;
        let names: Vec<String> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Tlayudas", "Antojitos", "Bebidas", "Postres"]);

        let drinks = store.list_products(Some("bebidas")).await.unwrap();
        let orders: Vec<u32> = drinks.iter().map(|p| p.order).collect();
        assert_eq!(orders, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_product_upsert_validates_and_keeps_created_at() {
        let store = seeded(Arc::new(Utc::now)).await;
        let mut product = store.get_product("tacos").await.unwrap();
        let created = product.created_at;

        product.name = "  ".into();
        assert!(matches!(
            store.upsert_product(product.clone()).await,
            Err(StoreError::Invalid(_))
        ));

        product.name = "Tacos Dorados".into();
        let saved = store.upsert_product(product).await.unwrap();
        assert_eq!(saved.created_at, created);
        assert!(saved.updated_at > created);
    }

    #[tokio::test]
    async fn test_stamps_strictly_increase_under_a_frozen_clock() {
        let store = seeded(fixed_clock(now())).await;
        let order = place_one(&store).await;

        let first = store
            .update_order_status(&order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        let second = store
            .update_order_status(&order.id, OrderStatus::Ready)
            .await
            .unwrap();

        assert!(first.updated_at > order.updated_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_last_write_wins_and_completion_is_stamped() {
        let store = seeded(Arc::new(Utc::now)).await;
        let order = place_one(&store).await;

        // Two sessions write without coordination; the backend keeps the later one.
        store
            .update_order_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let latest = store
            .update_order_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();

        let stored = store.get_order(&order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(stored.completed_at, Some(latest.updated_at));
    }

    #[tokio::test]
    async fn test_duplicate_order_id_is_a_conflict() {
        let store = seeded(Arc::new(Utc::now)).await;
        let order = place_one(&store).await;
        assert!(matches!(
            store.create_order(order).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let store = seeded(Arc::new(Utc::now)).await;
        let placed = place_one(&store).await;
        let mut feed = store.subscribe_orders();
        assert_eq!(feed.next().await.map(|o| o.len()), Some(1));

        let err = store
            .update_order_status(&OrderId::from("missing"), OrderStatus::Ready)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(matches!(err, StoreError::NotFound { kind: "order", ref id } if id == "missing"));

        let stored = store.get_order(&placed.id).await.unwrap();
        assert_eq!(stored, placed);
        assert_eq!(feed.current(), vec![placed]);
    }

    #[tokio::test]
    async fn test_feed_starts_with_current_list_and_follows_writes() {
        let store = seeded(Arc::new(Utc::now)).await;
        let mut feed = store.subscribe_orders();
        assert_eq!(feed.next().await.map(|o| o.len()), Some(0));

        let order = place_one(&store).await;
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, order.id);
        assert_eq!(feed.current().len(), 1);
    }

    #[tokio::test]
    async fn test_export_round_trips_through_import() {
        let store = seeded(Arc::new(Utc::now)).await;
        place_one(&store).await;
        let exported = store.export();

        let copy = MemoryStore::from_snapshot(exported.clone());
        assert_eq!(copy.export(), exported);
        assert_eq!(copy.list_orders().await.unwrap().len(), 1);
    }
}
