//! Path and method dispatch on top of `matchit`.

use crate::error::HttpError;
use http::Method;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Catalog,
    Checkout,
    Orders,
    OrderStatus,
    SalesReport,
    Schematic,
    AdminCatalog,
    SaveCategory,
    DeleteCategory,
    SaveProduct,
    DeleteProduct,
    SaveBanner,
    DeleteBanner,
    AdminSettings,
    SaveSettings,
    Customers,
}

/// A matched endpoint plus the captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub endpoint: Endpoint,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

pub struct Router {
    by_method: HashMap<Method, matchit::Router<Endpoint>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            by_method: HashMap::new(),
        }
    }

    pub fn route(mut self, method: Method, path: &str, endpoint: Endpoint) -> Result<Self, matchit::InsertError> {
        self.by_method
            .entry(method)
            .or_default()
            .insert(path, endpoint)?;
        Ok(self)
    }

    /// The ordering API.
    pub fn mesa() -> Result<Self, matchit::InsertError> {
        Router::new()
            .route(Method::GET, "/catalog", Endpoint::Catalog)?
            .route(Method::POST, "/checkout", Endpoint::Checkout)?
            .route(Method::GET, "/orders", Endpoint::Orders)?
            .route(Method::POST, "/orders/{id}/status", Endpoint::OrderStatus)?
            .route(Method::GET, "/reports/sales", Endpoint::SalesReport)?
            .route(Method::GET, "/__mesa/schematic", Endpoint::Schematic)?
            .route(Method::GET, "/admin/catalog", Endpoint::AdminCatalog)?
            .route(Method::PUT, "/admin/categories/{id}", Endpoint::SaveCategory)?
            .route(Method::DELETE, "/admin/categories/{id}", Endpoint::DeleteCategory)?
            .route(Method::PUT, "/admin/products/{id}", Endpoint::SaveProduct)?
            .route(Method::DELETE, "/admin/products/{id}", Endpoint::DeleteProduct)?
            .route(Method::PUT, "/admin/banners/{id}", Endpoint::SaveBanner)?
            .route(Method::DELETE, "/admin/banners/{id}", Endpoint::DeleteBanner)?
            .route(Method::GET, "/admin/settings", Endpoint::AdminSettings)?
            .route(Method::PUT, "/admin/settings", Endpoint::SaveSettings)?
            .route(Method::GET, "/admin/customers", Endpoint::Customers)
    }

    /// Unknown paths are 404; known paths under another method are 405.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch, HttpError> {
        if let Some(matched) = self.by_method.get(method).and_then(|r| r.at(path).ok()) {
            return Ok(RouteMatch {
                endpoint: *matched.value,
                params: matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
        if self.by_method.values().any(|r| r.at(path).is_ok()) {
            return Err(HttpError::MethodNotAllowed);
        }
        Err(HttpError::NotFound(format!("no route for {path}")))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded `key=value` pairs of a query string. Later keys win.
pub fn query_params(query: Option<&str>) -> HashMap<String, String> {
    let Some(query) = query else {
        return HashMap::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_path_params() {
        let router = Router::mesa().unwrap();
        let matched = router
            .resolve(&Method::POST, "/orders/3f2a/status")
            .unwrap();
        assert_eq!(matched.endpoint, Endpoint::OrderStatus);
        assert_eq!(matched.param("id"), Some("3f2a"));
    }

    #[test]
    fn test_admin_routes_split_by_method() {
        let router = Router::mesa().unwrap();
        let save = router.resolve(&Method::PUT, "/admin/products/flan").unwrap();
        let delete = router.resolve(&Method::DELETE, "/admin/products/flan").unwrap();
        assert_eq!(save.endpoint, Endpoint::SaveProduct);
        assert_eq!(delete.endpoint, Endpoint::DeleteProduct);
        assert_eq!(delete.param("id"), Some("flan"));
        assert!(matches!(
            router.resolve(&Method::POST, "/admin/settings"),
            Err(HttpError::MethodNotAllowed)
        ));
    }

    #[test]
    fn test_wrong_method_and_unknown_path() {
        let router = Router::mesa().unwrap();
        assert!(matches!(
            router.resolve(&Method::DELETE, "/catalog"),
            Err(HttpError::MethodNotAllowed)
        ));
        assert!(matches!(
            router.resolve(&Method::GET, "/menu"),
            Err(HttpError::NotFound(_))
        ));
    }

    #[test]
    fn test_query_params_are_decoded() {
        let params = query_params(Some("filter=table&name=Ana+Mar%C3%ADa&flag"));
        assert_eq!(params["filter"], "table");
        assert_eq!(params["name"], "Ana María");
        assert_eq!(params["flag"], "");
        assert!(query_params(None).is_empty());
    }
}
