use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use mesa_runtime::{CheckoutFault, StatusUpdateError};
use mesa_store::StoreError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Everything a handler can answer with instead of a success body.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Conflict(String),
    /// The circuit left its main path on a named branch.
    #[error("circuit branched: {branch}")]
    Branch {
        branch: String,
        payload: Option<Value>,
    },
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a Value>,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::Branch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &str {
        match self {
            HttpError::BadRequest(_) => "bad_request",
            HttpError::NotFound(_) => "not_found",
            HttpError::MethodNotAllowed => "method_not_allowed",
            HttpError::Conflict(_) => "conflict",
            HttpError::Branch { branch, .. } => branch,
            HttpError::Internal(_) => "internal",
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %self.status(), "request rejected");
        }
        let detail = match &self {
            HttpError::Branch { payload, .. } => payload.as_ref(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
            detail,
        };
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        json_bytes(self.status(), bytes)
    }
}

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => HttpError::NotFound(error.to_string()),
            StoreError::Conflict(_) => HttpError::Conflict(error.to_string()),
            StoreError::Invalid(_) => HttpError::BadRequest(error.to_string()),
            other => HttpError::Internal(other.to_string()),
        }
    }
}

impl From<CheckoutFault> for HttpError {
    fn from(fault: CheckoutFault) -> Self {
        match fault {
            CheckoutFault::UnknownProduct(_) | CheckoutFault::Cart(_) | CheckoutFault::Checkout(_) => {
                HttpError::BadRequest(fault.to_string())
            }
            CheckoutFault::Store(e) => e.into(),
            CheckoutFault::MissingResource(_) => HttpError::Internal(fault.to_string()),
        }
    }
}

impl From<StatusUpdateError> for HttpError {
    fn from(error: StatusUpdateError) -> Self {
        match error {
            StatusUpdateError::Rejected(e) => HttpError::Conflict(e.to_string()),
            StatusUpdateError::Store(e) => e.into(),
        }
    }
}

pub(crate) fn json_bytes(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_core::status::{OrderStatus, StatusError};

    #[test]
    fn test_status_mapping() {
        let missing: HttpError = StoreError::not_found("order", "abc").into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let rejected: HttpError =
            StatusUpdateError::Rejected(StatusError::Terminal(OrderStatus::Completed)).into();
        assert_eq!(rejected.status(), StatusCode::CONFLICT);

        let offline: HttpError = CheckoutFault::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(offline.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let unknown: HttpError = CheckoutFault::UnknownProduct("pozole".into()).into();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_branch_uses_its_id_as_code() {
        let error = HttpError::Branch {
            branch: "empty_cart".into(),
            payload: Some(serde_json::json!({ "items": 0 })),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
    }
}
