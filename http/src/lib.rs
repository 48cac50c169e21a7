//! # mesa-http
//!
//! Hyper 1.0 native JSON API for the ordering workflow.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET  | `/catalog` | storefront categories, products, banners and settings |
//! | POST | `/checkout` | runs the checkout circuit |
//! | GET  | `/orders?filter=` | board view plus dashboard stats |
//! | POST | `/orders/{id}/status` | checked status change |
//! | GET  | `/reports/sales?from=&to=&status=` | sales report |
//! | GET  | `/__mesa/schematic` | checkout circuit schematic |
//! | GET  | `/admin/catalog` | every category, product and banner, inactive included |
//! | PUT/DELETE | `/admin/{categories,products,banners}/{id}` | catalog upsert and removal |
//! | GET/PUT | `/admin/settings` | business settings |
//! | GET  | `/admin/customers?search=&birthday_month=` | customer directory |
//!
//! Admin routes carry no authentication; put them behind the proxy that
//! fronts the back office.
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryStore::from_snapshot(snapshot));
//! HttpIngress::new(ApiState::new(store)).bind("0.0.0.0:8080").run().await?;
//! ```

pub mod api;
pub mod error;
pub mod ingress;
pub mod router;

pub use api::{ApiState, BoardView, CatalogView, CustomerList, Deleted, StatusUpdate};
pub use error::HttpError;
pub use ingress::{HttpIngress, IngressError, REQUEST_ID_HEADER, handle, shutdown_signal};
pub use router::{Endpoint, RouteMatch, Router};
