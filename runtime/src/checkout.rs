//! The checkout circuit.
//!
//! ```text
//! CheckoutRequest
//!   -> ValidateCheckout     (form against settings, cart from the live catalog)
//!   -> PriceCart
//!   -> ComposeOrder
//!   -> PlaceOrder           (OrderStore)
//!   -> PrepareNotification  (wa.me link)
//!   -> PlacedOrder
//! ```
//!
//! Resources come from the [`Bus`]: [`Settings`], a [`CatalogHandle`] and an
//! [`OrderHandle`]. An empty cart leaves on the `empty_cart` branch.

use crate::axon::Axon;
use async_trait::async_trait;
use chrono::Utc;
use mesa_core::bus::Bus;
use mesa_core::cart::{Cart, CartError, Selection};
use mesa_core::checkout::{CheckoutError, CheckoutForm, ValidatedCheckout, compose_order};
use mesa_core::order::Order;
use mesa_core::outcome::Outcome;
use mesa_core::pricing::Quote;
use mesa_core::settings::Settings;
use mesa_core::transition::Transition;
use mesa_store::{CatalogStore, OrderStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

pub const EMPTY_CART: &str = "empty_cart";

/// Catalog backend as stored on the Bus.
#[derive(Clone)]
pub struct CatalogHandle(pub Arc<dyn CatalogStore>);

/// Order backend as stored on the Bus.
#[derive(Clone)]
pub struct OrderHandle(pub Arc<dyn OrderStore>);

/// Bus with everything the checkout circuit reads.
pub fn checkout_bus(
    settings: Settings,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
) -> Bus {
    Bus::new()
        .with(settings)
        .with(CatalogHandle(catalog))
        .with(OrderHandle(orders))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItemRequest>,
    pub form: CheckoutForm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutFault {
    #[error("missing resource on the bus: {0}")]
    MissingResource(&'static str),
    #[error("product '{0}' is not in the catalog")]
    UnknownProduct(String),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("backend write failed: {0}")]
    Store(#[from] StoreError),
}

/// State after validation: a priced-from-catalog cart plus the checked form.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub cart: Cart,
    pub checkout: ValidatedCheckout,
}

#[derive(Debug, Clone)]
pub struct PricedCheckout {
    pub cart: Cart,
    pub checkout: ValidatedCheckout,
    pub quote: Quote,
}

fn settings(bus: &Bus) -> Result<&Settings, CheckoutFault> {
    bus.get::<Settings>()
        .ok_or(CheckoutFault::MissingResource("Settings"))
}

#[derive(Clone)]
pub struct ValidateCheckout;

#[async_trait]
impl Transition<CheckoutRequest, CheckoutDraft> for ValidateCheckout {
    type Error = CheckoutFault;

    fn description(&self) -> Option<String> {
        Some("Rebuilds the cart from the catalog and checks the form".into())
    }

    async fn run(
        &self,
        request: CheckoutRequest,
        bus: &mut Bus,
    ) -> Outcome<CheckoutDraft, CheckoutFault> {
        if request.items.is_empty() {
            return Outcome::branch(EMPTY_CART, Some(json!({ "reason": "cart is empty" })));
        }
        let checkout = match settings(bus) {
            Ok(settings) => match request.form.validate(settings) {
                Ok(checkout) => checkout,
                Err(e) => return Outcome::Fault(e.into()),
            },
            Err(e) => return Outcome::Fault(e),
        };
        let Some(CatalogHandle(catalog)) = bus.get::<CatalogHandle>().cloned() else {
            return Outcome::Fault(CheckoutFault::MissingResource("CatalogHandle"));
        };

        let categories = match catalog.list_categories().await {
            Ok(categories) => categories,
            Err(e) => return Outcome::Fault(e.into()),
        };

        let mut cart = Cart::new();
        for item in &request.items {
            let product = match catalog.get_product(&item.product_id).await {
                Ok(product) => product,
                Err(StoreError::NotFound { .. }) => {
                    return Outcome::Fault(CheckoutFault::UnknownProduct(item.product_id.clone()));
                }
                Err(e) => return Outcome::Fault(e.into()),
            };
            // A hidden category hides its products from checkout too.
            let listed = categories
                .iter()
                .any(|c| c.id == product.category_id && c.active);
            if !listed {
                return Outcome::Fault(CartError::ProductUnavailable(product.name).into());
            }
            if let Err(e) = cart.add(&product, item.quantity, item.notes.clone(), &item.selections) {
                return Outcome::Fault(e.into());
            }
        }

        Outcome::Next(CheckoutDraft { cart, checkout })
    }
}

#[derive(Clone)]
pub struct PriceCart;

#[async_trait]
impl Transition<CheckoutDraft, PricedCheckout> for PriceCart {
    type Error = CheckoutFault;

    async fn run(
        &self,
        draft: CheckoutDraft,
        _bus: &mut Bus,
    ) -> Outcome<PricedCheckout, CheckoutFault> {
        let quote = draft.checkout.quote(&draft.cart);
        tracing::debug!(
            subtotal = %quote.subtotal,
            delivery_fee = %quote.delivery_fee,
            total = %quote.total,
            "cart priced"
        );
        Outcome::Next(PricedCheckout {
            cart: draft.cart,
            checkout: draft.checkout,
            quote,
        })
    }
}

#[derive(Clone)]
pub struct ComposeOrder;

#[async_trait]
impl Transition<PricedCheckout, Order> for ComposeOrder {
    type Error = CheckoutFault;

    async fn run(&self, priced: PricedCheckout, _bus: &mut Bus) -> Outcome<Order, CheckoutFault> {
        match compose_order(&priced.cart, priced.checkout, Utc::now()) {
            Ok(order) => {
                debug_assert_eq!(order.quote(), priced.quote);
                Outcome::Next(order)
            }
            Err(e) => Outcome::Fault(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct PlaceOrder;

#[async_trait]
impl Transition<Order, Order> for PlaceOrder {
    type Error = CheckoutFault;

    async fn run(&self, order: Order, bus: &mut Bus) -> Outcome<Order, CheckoutFault> {
        let Some(OrderHandle(orders)) = bus.get::<OrderHandle>().cloned() else {
            return Outcome::Fault(CheckoutFault::MissingResource("OrderHandle"));
        };
        orders.create_order(order).await.map_err(CheckoutFault::from).into()
    }
}

#[derive(Clone)]
pub struct PrepareNotification;

#[async_trait]
impl Transition<Order, PlacedOrder> for PrepareNotification {
    type Error = CheckoutFault;

    async fn run(&self, order: Order, bus: &mut Bus) -> Outcome<PlacedOrder, CheckoutFault> {
        let phone = bus
            .get::<Settings>()
            .map(|s| s.whatsapp_number.trim().to_string())
            .unwrap_or_default();

        // The order is already stored; a bad number only costs the link.
        let whatsapp_url = if phone.is_empty() {
            None
        } else {
            match mesa_whatsapp::order_link(&order, &phone) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "no whatsapp link");
                    None
                }
            }
        };

        tracing::info!(
            order_id = %order.id,
            number = %order.number,
            total = %order.total,
            "order placed"
        );
        Outcome::Next(PlacedOrder {
            order,
            whatsapp_url,
        })
    }
}

pub fn checkout_circuit() -> Axon<CheckoutRequest, PlacedOrder, CheckoutFault> {
    Axon::<CheckoutRequest, CheckoutRequest, CheckoutFault>::new("Checkout")
        .describe("Turns a cart and a checkout form into a placed order")
        .then(ValidateCheckout)
        .then(PriceCart)
        .then(ComposeOrder)
        .then(PlaceOrder)
        .then(PrepareNotification)
}
