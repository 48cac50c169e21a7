//! # mesa-core
//!
//! Domain model of the ordering workflow: catalog, cart pricing, order
//! composition and the status machine, together with the small pipeline
//! vocabulary (`Outcome`, `Bus`, `Transition`, `Schematic`) the runtime
//! assembles circuits from.
//!
//! Everything here is synchronous and free of I/O.

pub mod bus;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod money;
pub mod order;
pub mod outcome;
pub mod pricing;
pub mod schematic;
pub mod settings;
pub mod status;
pub mod transition;

pub use bus::Bus;
pub use cart::{Cart, CartError, CartLine, LineId, SelectedOption, Selection};
pub use catalog::{Banner, CatalogError, Category, Product, Variation, VariationOption};
pub use checkout::{CheckoutError, CheckoutForm, ValidatedCheckout, compose_order};
pub use money::{Money, MoneyParseError};
pub use order::{
    Customer, DeliveryType, Fulfillment, Order, OrderId, OrderLine, OrderedOption, Payment,
    PaymentMethod, ZoneSnapshot,
};
pub use outcome::{BranchId, Outcome};
pub use pricing::Quote;
pub use schematic::{Edge, Node, NodeKind, Schematic};
pub use settings::{DeliveryZone, Settings, SettingsError};
pub use status::{OrderStatus, StatusChange, StatusError};
pub use transition::Transition;

pub mod prelude {
    pub use crate::bus::Bus;
    pub use crate::cart::{Cart, Selection};
    pub use crate::catalog::{Category, Product};
    pub use crate::checkout::CheckoutForm;
    pub use crate::money::Money;
    pub use crate::order::{Order, OrderId};
    pub use crate::outcome::Outcome;
    pub use crate::settings::Settings;
    pub use crate::status::OrderStatus;
    pub use crate::transition::Transition;
    pub use async_trait::async_trait;
}
