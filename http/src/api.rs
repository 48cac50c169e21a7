//! JSON handlers for the ordering API.

use crate::error::{HttpError, json_bytes};
use crate::router::{Endpoint, RouteMatch, query_params};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use mesa_core::catalog::{Banner, Category, Product, storefront};
use mesa_core::order::{Order, OrderId};
use mesa_core::outcome::Outcome;
use mesa_core::settings::Settings;
use mesa_core::status::OrderStatus;
use mesa_reports::{CustomerDirectory, CustomerSummary, ReportFilter, SalesReport};
use mesa_runtime::{
    Axon, BoardFilter, CheckoutFault, CheckoutRequest, DashboardStats, OrderBoard, PlacedOrder,
    StatusDesk, checkout_bus, checkout_circuit,
};
use mesa_store::{CatalogStore, OrderStore, SettingsStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request bodies above this size are refused.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared handles every request works with.
#[derive(Clone)]
pub struct ApiState {
    catalog: Arc<dyn CatalogStore>,
    settings: Arc<dyn SettingsStore>,
    orders: Arc<dyn OrderStore>,
    checkout: Axon<CheckoutRequest, PlacedOrder, CheckoutFault>,
    desk: StatusDesk,
}

impl ApiState {
    /// State over one backend that serves catalog, settings and orders.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: CatalogStore + SettingsStore + OrderStore + 'static,
    {
        Self {
            catalog: store.clone(),
            settings: store.clone(),
            orders: store.clone(),
            checkout: checkout_circuit(),
            desk: StatusDesk::new(store),
        }
    }

    pub fn checkout(&self) -> &Axon<CheckoutRequest, PlacedOrder, CheckoutFault> {
        &self.checkout
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub settings: Option<Settings>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub banners: Vec<Banner>,
}

#[derive(Debug, Serialize)]
pub struct BoardView {
    pub filter: String,
    pub orders: Vec<Order>,
    pub stats: DashboardStats,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct CustomerList {
    pub customers: Vec<CustomerSummary>,
}

#[derive(Debug, Serialize)]
pub struct Deleted<'a> {
    pub deleted: &'a str,
}

pub async fn dispatch<B>(
    state: &ApiState,
    route: RouteMatch,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, HttpError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match route.endpoint {
        Endpoint::Catalog => ok(&catalog(state).await?),
        Endpoint::Checkout => {
            let request: CheckoutRequest = read_json(req).await?;
            let placed = checkout(state, request).await?;
            respond(StatusCode::CREATED, &placed)
        }
        Endpoint::Orders => {
            let params = query_params(req.uri().query());
            let raw = params.get("filter").map(String::as_str).unwrap_or("all");
            let filter: BoardFilter = raw.parse().map_err(HttpError::BadRequest)?;
            ok(&board(state, raw, filter).await?)
        }
        Endpoint::OrderStatus => {
            let id = route
                .param("id")
                .map(OrderId::from)
                .ok_or_else(|| HttpError::BadRequest("missing order id".into()))?;
            let update: StatusUpdate = read_json(req).await?;
            let order = state.desk.advance(&id, update.status).await?;
            ok(&order)
        }
        Endpoint::SalesReport => {
            let filter = report_filter(req.uri().query())?;
            let orders = state.orders.list_orders().await?;
            ok(&SalesReport::build(&orders, &filter, Utc::now().date_naive()))
        }
        Endpoint::Schematic => ok(state.checkout.schematic()),
        Endpoint::AdminCatalog => ok(&admin_catalog(state).await?),
        Endpoint::SaveCategory => {
            let category: Category = read_json(req).await?;
            same_id(&route, &category.id)?;
            ok(&state.catalog.upsert_category(category).await?)
        }
        Endpoint::DeleteCategory => {
            let id = path_id(&route)?;
            state.catalog.delete_category(id).await?;
            ok(&Deleted { deleted: id })
        }
        Endpoint::SaveProduct => {
            let product: Product = read_json(req).await?;
            same_id(&route, &product.id)?;
            ok(&state.catalog.upsert_product(product).await?)
        }
        Endpoint::DeleteProduct => {
            let id = path_id(&route)?;
            state.catalog.delete_product(id).await?;
            ok(&Deleted { deleted: id })
        }
        Endpoint::SaveBanner => {
            let banner: Banner = read_json(req).await?;
            same_id(&route, &banner.id)?;
            ok(&state.catalog.upsert_banner(banner).await?)
        }
        Endpoint::DeleteBanner => {
            let id = path_id(&route)?;
            state.catalog.delete_banner(id).await?;
            ok(&Deleted { deleted: id })
        }
        Endpoint::AdminSettings => {
            let settings = state
                .settings
                .load_settings()
                .await?
                .ok_or_else(|| HttpError::NotFound("business settings are not configured".into()))?;
            ok(&settings)
        }
        Endpoint::SaveSettings => {
            let settings: Settings = read_json(req).await?;
            ok(&state.settings.save_settings(settings).await?)
        }
        Endpoint::Customers => {
            let params = query_params(req.uri().query());
            let month = birthday_month(params.get("birthday_month"))?;
            let search = params.get("search").map(|s| s.trim()).filter(|s| !s.is_empty());
            let directory = CustomerDirectory::build(&state.orders.list_orders().await?);
            ok(&customers(&directory, search, month))
        }
    }
}

/// Everything the back office edits, inactive entries included.
async fn admin_catalog(state: &ApiState) -> Result<CatalogView, HttpError> {
    Ok(CatalogView {
        settings: state.settings.load_settings().await?,
        categories: state.catalog.list_categories().await?,
        products: state.catalog.list_products(None).await?,
        banners: state.catalog.list_banners().await?,
    })
}

fn path_id(route: &RouteMatch) -> Result<&str, HttpError> {
    route
        .param("id")
        .ok_or_else(|| HttpError::BadRequest("missing id".into()))
}

fn same_id(route: &RouteMatch, body_id: &str) -> Result<(), HttpError> {
    let id = path_id(route)?;
    if id != body_id {
        return Err(HttpError::BadRequest(format!(
            "body id '{body_id}' does not match path id '{id}'"
        )));
    }
    Ok(())
}

fn birthday_month(raw: Option<&String>) -> Result<Option<u32>, HttpError> {
    let Some(raw) = raw.map(|r| r.trim()).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(month @ 1..=12) => Ok(Some(month)),
        _ => Err(HttpError::BadRequest(format!(
            "birthday_month must be 1-12, got '{raw}'"
        ))),
    }
}

fn customers(directory: &CustomerDirectory, search: Option<&str>, month: Option<u32>) -> CustomerList {
    let mut found: Vec<&CustomerSummary> = match month {
        Some(month) => directory.birthdays_in(month),
        None => directory.customers().iter().collect(),
    };
    if let Some(term) = search {
        let matches = directory.search(term);
        found.retain(|c| matches.iter().any(|m| m.phone == c.phone));
    }
    CustomerList {
        customers: found.into_iter().cloned().collect(),
    }
}

async fn catalog(state: &ApiState) -> Result<CatalogView, HttpError> {
    let categories = storefront(&state.catalog.list_categories().await?);
    let visible: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    let products = storefront(&state.catalog.list_products(None).await?)
        .into_iter()
        .filter(|p| visible.contains(&p.category_id.as_str()))
        .collect();
    Ok(CatalogView {
        settings: state.settings.load_settings().await?,
        categories,
        products,
        banners: storefront(&state.catalog.list_banners().await?),
    })
}

async fn checkout(state: &ApiState, request: CheckoutRequest) -> Result<PlacedOrder, HttpError> {
    let settings = state
        .settings
        .load_settings()
        .await?
        .ok_or_else(|| HttpError::Internal("business settings are not configured".into()))?;
    let mut bus = checkout_bus(settings, state.catalog.clone(), state.orders.clone());
    match state.checkout.execute(request, &mut bus).await {
        Outcome::Next(placed) => Ok(placed),
        Outcome::Branch(branch, payload) => Err(HttpError::Branch { branch, payload }),
        Outcome::Fault(fault) => Err(fault.into()),
    }
}

async fn board(state: &ApiState, raw: &str, filter: BoardFilter) -> Result<BoardView, HttpError> {
    let mut board = OrderBoard::new();
    board.apply_snapshot(state.orders.list_orders().await?);
    Ok(BoardView {
        filter: raw.trim().to_ascii_lowercase(),
        orders: board.view(filter).into_iter().cloned().collect(),
        stats: board.stats(Utc::now().date_naive()),
    })
}

fn report_filter(query: Option<&str>) -> Result<ReportFilter, HttpError> {
    let params = query_params(query);
    let date = |key: &str| -> Result<Option<NaiveDate>, HttpError> {
        params
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<NaiveDate>()
                    .map_err(|e| HttpError::BadRequest(format!("{key}: {e}")))
            })
            .transpose()
    };
    let status = match params.get("status").filter(|v| !v.is_empty()) {
        Some(raw) => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| HttpError::BadRequest(format!("unknown status '{raw}'")))?,
        ),
        None => None,
    };
    Ok(ReportFilter {
        from: date("from")?,
        to: date("to")?,
        status,
    })
}

async fn read_json<T, B>(req: Request<B>) -> Result<T, HttpError>
where
    T: DeserializeOwned,
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| HttpError::BadRequest(format!("unreadable body: {e}")))?
        .to_bytes();
    serde_json::from_slice(&body).map_err(|e| HttpError::BadRequest(format!("invalid JSON: {e}")))
}

fn ok<T: Serialize + ?Sized>(value: &T) -> Result<Response<Full<Bytes>>, HttpError> {
    respond(StatusCode::OK, value)
}

fn respond<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Full<Bytes>>, HttpError> {
    let body = serde_json::to_vec(value).map_err(|e| HttpError::Internal(e.to_string()))?;
    Ok(json_bytes(status, body))
}
