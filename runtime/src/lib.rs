//! # mesa-runtime
//!
//! Runs the ordering workflow on top of the core domain:
//!
//! * [`Axon`]: typed circuit builder and executor
//! * [`checkout`]: the checkout circuit, from cart to placed order
//! * [`StatusDesk`]: checked status changes written through the backend
//! * [`OrderBoard`]: the live board fed by order snapshots

pub mod axon;
pub mod board;
pub mod checkout;
pub mod desk;

pub use axon::Axon;
pub use board::{BoardEvent, BoardFilter, DashboardStats, OrderBoard};
pub use checkout::{
    CartItemRequest, CheckoutFault, CheckoutRequest, PlacedOrder, checkout_bus, checkout_circuit,
};
pub use desk::{StatusDesk, StatusUpdateError};

pub mod prelude {
    pub use crate::axon::Axon;
    pub use crate::board::{BoardFilter, OrderBoard};
    pub use crate::checkout::{CheckoutRequest, PlacedOrder, checkout_circuit};
    pub use crate::desk::StatusDesk;
}
