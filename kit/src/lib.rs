//! Mesa facade crate.
//!
//! Re-exports the core domain, the runtime, the store and, behind features,
//! the HTTP ingress and the reports with a single entry point.

pub use mesa_core as core;
#[cfg(feature = "http")]
pub use mesa_http as http;
#[cfg(feature = "reports")]
pub use mesa_reports as reports;
pub use mesa_runtime as runtime;
pub use mesa_store as store;
pub use mesa_whatsapp as whatsapp;

pub use mesa_core::{Bus, Order, OrderStatus, Outcome, Schematic, Transition};
#[cfg(feature = "http")]
pub use mesa_http::{ApiState, HttpIngress};
pub use mesa_runtime::{Axon, OrderBoard, StatusDesk, checkout_circuit};
pub use mesa_store::MemoryStore;

pub mod prelude {
    pub use mesa_core::prelude::*;
    #[cfg(feature = "http")]
    pub use mesa_http::{ApiState, HttpIngress};
    pub use mesa_runtime::prelude::*;
    pub use mesa_store::{CatalogStore, MemoryStore, OrderStore, SettingsStore};
}
