//! # Ingress
//!
//! Binds the ordering API to a socket. One `HTTPRequest` span per request,
//! tagged with a request id that is echoed back in `x-request-id`.
//!
//! Shutdown stops accepting, then lets open connections finish their
//! in-flight request for up to [`HttpIngress::drain_timeout`].

use crate::api::{ApiState, dispatch};
use crate::router::Router;
use bytes::Bytes;
use http::header::HeaderValue;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("invalid bind address '{0}'")]
    Address(String),
    #[error("failed to bind: {0}")]
    Bind(#[from] std::io::Error),
    #[error("route table rejected: {0}")]
    Route(#[from] matchit::InsertError),
}

pub struct HttpIngress {
    addr: String,
    state: ApiState,
    drain_timeout: Duration,
}

impl HttpIngress {
    pub fn new(state: ApiState) -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            state,
            drain_timeout: Duration::from_secs(10),
        }
    }

    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), IngressError> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|_| IngressError::Address(self.addr.clone()))?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), IngressError>
    where
        F: Future<Output = ()> + Send,
    {
        let HttpIngress {
            state,
            drain_timeout,
            ..
        } = self;
        let router = Arc::new(Router::mesa()?);
        let state = Arc::new(state);
        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        tracing::info!(addr = %listener.local_addr()?, "Mesa HTTP ingress listening");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let router = router.clone();
                    let state = state.clone();
                    let service = service_fn(move |req: Request<Incoming>| {
                        let router = router.clone();
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(handle(&router, &state, req).await) }
                    });
                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);
                    tokio::spawn(async move {
                        if let Err(err) = conn.await {
                            tracing::debug!(%peer, error = %err, "connection ended with error");
                        }
                    });
                }
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, draining connections");
                    break;
                }
            }
        }

        drop(listener);
        tokio::select! {
            () = graceful.shutdown() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(drain_timeout) => {
                tracing::warn!(timeout = ?drain_timeout, "drain timed out, dropping connections");
            }
        }
        Ok(())
    }
}

/// Routes and runs one request. Never fails: errors become JSON responses.
pub async fn handle<B>(router: &Router, state: &ApiState, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let span = tracing::info_span!(
        "HTTPRequest",
        mesa.http.method = %req.method(),
        mesa.http.path = %req.uri().path(),
        mesa.http.request_id = %request_id
    );

    async move {
        let started = Instant::now();
        let result = match router.resolve(req.method(), req.uri().path()) {
            Ok(route) => dispatch(state, route, req).await,
            Err(e) => Err(e),
        };
        let mut response = result.unwrap_or_else(|e| e.into_response());
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
