//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request timeout)
//! - Bind the server to a listener and serve with graceful shutdown
//!
//! # Design Decisions
//! - Every path funnels through one wildcard handler; routing decisions
//!   belong to the dispatch table, not to Axum's router
//! - The table sits behind an `ArcSwap` so dev mode can replace it between
//!   requests without a lock on the hot path

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::pages::Method;
use crate::server::dispatch::{DispatchResponse, DispatchTable};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    table: Arc<ArcSwap<DispatchTable>>,
}

/// HTTP server for compiled routes.
pub struct HttpServer {
    router: Router,
    table: Arc<ArcSwap<DispatchTable>>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, table: DispatchTable) -> Self {
        let table = Arc::new(ArcSwap::from_pointee(table));
        let state = AppState {
            table: table.clone(),
        };

        let router = Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self { router, table }
    }

    /// Shared handle for swapping in a freshly built table.
    pub fn table_handle(&self) -> Arc<ArcSwap<DispatchTable>> {
        self.table.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServeError> {
        let addr = listener.local_addr().map_err(ServeError::Io)?;
        tracing::info!(address = %addr, "dispatch server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServeError::Io)?;

        tracing::info!("dispatch server stopped");
        Ok(())
    }
}

/// Catch-all handler: parse the request surface, hand it to the table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = Uuid::new_v4();
    let path = request.uri().path().to_string();

    let Some(method) = Method::parse(request.method().as_str()) else {
        tracing::warn!(%request_id, method = %request.method(), "unrecognized method");
        return to_response(DispatchResponse::not_found());
    };

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let query = parse_query(request.uri().query().unwrap_or(""));

    let table = state.table.load();
    let outcome = table.dispatch(method, &path, headers, query);

    tracing::debug!(
        %request_id,
        %method,
        %path,
        status = outcome.status,
        "request dispatched"
    );

    to_response(outcome)
}

fn to_response(outcome: DispatchResponse) -> Response {
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, outcome.content_type);
    for (name, value) in &outcome.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    match builder.body(Body::from(outcome.body)) {
        Ok(response) => response,
        Err(err) => {
            // A handler produced an invalid header name or value.
            tracing::error!(error = %err, "response construction failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "invalid response").into_response()
        }
    }
}

/// Split a raw query string into key/value pairs. No percent-decoding;
/// handlers see the query as transmitted.
fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
