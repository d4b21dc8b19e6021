//! Router construction and server host for the API.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::Request, response::Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};
use zipgate_telemetry::build_sha;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::{DEFAULT_SHUTDOWN_GRACE, HEADER_REQUEST_ID};
use crate::http::download::download;
use crate::state::ApiState;

/// Axum router wrapper that hosts the download endpoint.
pub struct ApiServer {
    router: Router,
    shutdown_grace: Duration,
}

impl ApiServer {
    /// Build the router around `state`.
    ///
    /// Every path and method reaches the download handler; only the query
    /// string is read.
    #[must_use]
    pub fn new(state: ApiState) -> Self {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });
        // The id must be assigned before it is copied onto the response.
        let layered = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(trace_layer);

        let router = Router::new()
            .fallback(download)
            .layer(layered)
            .with_state(Arc::new(state));
        Self {
            router,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Cap how long in-flight downloads may keep streaming after shutdown
    /// begins.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Serve until `shutdown` resolves, then drain in-flight downloads for at
    /// most the shutdown grace period.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Bind`] when the listener cannot be bound,
    /// [`ApiServerError::Serve`] when the server loop fails and
    /// [`ApiServerError::DrainTimeout`] when downloads outlive the grace period.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(addr = %addr, build_sha = %build_sha(), "zipgate listening");
        self.serve_listener(listener, addr, shutdown).await
    }

    async fn serve_listener<F>(
        self,
        listener: TcpListener,
        addr: SocketAddr,
        shutdown: F,
    ) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = self.shutdown_grace;
        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let signal = async move {
            shutdown.await;
            info!(
                grace_ms = duration_ms(grace),
                "shutdown requested, draining in-flight downloads"
            );
            let _ = draining_tx.send(());
        };
        let deadline = async move {
            if draining_rx.await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(grace).await;
        };
        let server = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(signal)
            .into_future();

        tokio::select! {
            result = server => result.map_err(|source| ApiServerError::Serve { addr, source }),
            () = deadline => {
                warn!(
                    grace_ms = duration_ms(grace),
                    "shutdown grace period elapsed with downloads still streaming"
                );
                Err(ApiServerError::DrainTimeout { addr, grace })
            }
        }
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
