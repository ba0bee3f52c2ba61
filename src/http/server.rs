//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catalog handler
//! - Wire up middleware (trace, timeout, request ID)
//! - Strip the controller base path and hand requests to the route table
//! - Render 404/405 for requests no binding accepts
//! - Serve until shutdown is signalled

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::catalog::CatalogStore;
use crate::config::CatalogConfig;
use crate::http::dispatch::dispatch;
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{Resolution, RouteTable, RouteTableError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub store: Arc<CatalogStore>,
    /// Controller base path without a trailing slash (`""` for `/`).
    pub base_path: Arc<str>,
}

/// HTTP server for the catalog service.
pub struct HttpServer {
    router: Router,
    config: CatalogConfig,
    store: Arc<CatalogStore>,
}

impl HttpServer {
    /// Create a server whose catalog starts with the configured seed.
    pub fn new(config: CatalogConfig) -> Result<Self, RouteTableError> {
        let store = Arc::new(CatalogStore::new(config.catalog.seed.clone()));
        Self::with_store(config, store)
    }

    /// Create a server over an existing catalog.
    pub fn with_store(
        config: CatalogConfig,
        store: Arc<CatalogStore>,
    ) -> Result<Self, RouteTableError> {
        let table = Arc::new(RouteTable::library()?);
        tracing::debug!(bindings = table.bindings().len(), "Route table built");

        let state = AppState {
            table,
            store: store.clone(),
            base_path: Arc::from(config.catalog.base_path.trim_end_matches('/')),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            store,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CatalogConfig, state: AppState) -> Router {
        Router::new()
            .fallback(library_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id_of(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The catalog this server mutates.
    pub fn store(&self) -> Arc<CatalogStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = %self.config.catalog.base_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point for every request.
/// Resolves the binding, dispatches the operation, and records metrics.
async fn library_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let start_time = Instant::now();

    let Some(path) = relative_path(&state.base_path, uri.path()) else {
        tracing::debug!(path = %uri.path(), "Outside controller base path");
        metrics::record_request(method.as_str(), "none", 404, start_time);
        return StatusCode::NOT_FOUND.into_response();
    };

    let route = match state.table.resolve(&method, path) {
        Resolution::Matched(route) => route,
        Resolution::MethodNotAllowed(allowed) => {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(method = %method, path = %path, allow = %allow, "Method not allowed");
            metrics::record_request(method.as_str(), "none", 405, start_time);
            return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)]).into_response();
        }
        Resolution::NotFound => {
            tracing::debug!(method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), "none", 404, start_time);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let operation = route.binding.operation.as_str();
    tracing::debug!(
        operation,
        pattern = %route.binding.pattern,
        "Dispatching request"
    );

    let response = match dispatch(&state.store, &route, &query) {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Rejected request parameters");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), operation, response.status().as_u16(), start_time);
    response
}

/// Path below `base`, or `None` when the request is outside it.
/// The base compares ASCII case-insensitively.
fn relative_path<'a>(base: &str, path: &'a str) -> Option<&'a str> {
    let prefix = path.get(..base.len())?;
    if !prefix.eq_ignore_ascii_case(base) {
        return None;
    }
    let rest = &path[base.len()..];
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::dispatch::JOKE;
    use crate::http::request::X_REQUEST_ID;
    use tower::ServiceExt;

    fn server_with(titles: &[&str]) -> HttpServer {
        let store = Arc::new(CatalogStore::new(titles.iter().copied()));
        HttpServer::with_store(CatalogConfig::default(), store).unwrap()
    }

    async fn send(server: &HttpServer, method: &str, uri: &str) -> (StatusCode, String, Response) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        (status, text, Response::from_parts(parts, Body::empty()))
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/api/library", "/api/library"), Some(""));
        assert_eq!(relative_path("/api/library", "/api/library/all"), Some("/all"));
        assert_eq!(relative_path("/api/library", "/api/libraryx"), None);
        assert_eq!(relative_path("/api/library", "/other"), None);
        assert_eq!(relative_path("", "/all"), Some("/all"));
        assert_eq!(relative_path("/api/library", "/API/Library/all"), Some("/all"));
        assert_eq!(relative_path("/api/library", "/api/libr"), None);
    }

    #[tokio::test]
    async fn test_list_all_routes_agree() {
        let server = HttpServer::new(CatalogConfig::default()).unwrap();
        let (_, expected, _) = send(&server, "GET", "/api/library/all").await;
        let titles: Vec<String> = serde_json::from_str(&expected).unwrap();
        assert_eq!(titles.len(), 5);

        for (method, uri) in [
            ("POST", "/api/library/everything"),
            ("PATCH", "/api/library/all"),
            ("OPTIONS", "/api/library/all"),
        ] {
            let (status, body, _) = send(&server, method, uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, expected);
        }
    }

    #[tokio::test]
    async fn test_fetch_routes() {
        let server = server_with(&["A", "B"]);

        let (status, body, _) = send(&server, "GET", "/api/library?index=1").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "B"));

        let (status, body, _) = send(&server, "GET", "/api/library/get/0").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "A"));

        let (status, body, _) = send(&server, "GET", "/api/library/take?index=2").await;
        assert_eq!((status, body.as_str()), (StatusCode::IM_A_TEAPOT, ""));

        let (status, _, _) = send(&server, "GET", "/api/library/get?index=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body, _) = send(&server, "POST", "/api/library").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "A"));
    }

    #[tokio::test]
    async fn test_add_and_joke() {
        let server = server_with(&["A"]);

        let (status, body, _) = send(&server, "POST", "/api/library/bringBook").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, JOKE));

        let (status, body, _) =
            send(&server, "POST", "/api/library/sendBook?bookName=New%20Book").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, ""));
        assert_eq!(server.store().list_all(), vec!["A", "New Book"]);
    }

    #[tokio::test]
    async fn test_replace_and_delete_with_encoded_names() {
        let server = server_with(&["Комикс", "B"]);

        let (status, body, _) = send(
            &server,
            "PUT",
            "/api/library/changeBook/%D0%9A%D0%BE%D0%BC%D0%B8%D0%BA%D1%81?newName=C",
        )
        .await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "C"));

        let (status, body, _) = send(&server, "DELETE", "/api/library/deleteBook/C").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, ""));

        let (status, body, _) = send(&server, "DELETE", "/api/library/deleteBook/C").await;
        assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, ""));
        assert_eq!(server.store().list_all(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_method_not_allowed_lists_methods() {
        let server = server_with(&["A"]);
        let (status, _, response) = send(&server, "DELETE", "/api/library/all").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, PATCH, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = server_with(&["A"]);
        for uri in ["/api/library/missing", "/api/books/all", "/api/libraryall"] {
            let (status, _, _) = send(&server, "GET", uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_routes_ignore_case() {
        let server = server_with(&["A"]);

        for uri in ["/api/Library/all", "/api/library/ALL", "/API/LIBRARY/All"] {
            let (status, body, _) = send(&server, "GET", uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body, r#"["A"]"#);
        }

        let (status, body, _) = send(&server, "POST", "/api/library/bringbook?bookName=X").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, ""));

        let (status, body, _) = send(&server, "PUT", "/api/Library/CHANGEBOOK/X?newName=Y").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "Y"));

        // Captured values are compared case-sensitively against titles.
        let (status, _, _) = send(&server, "DELETE", "/api/library/deletebook/y").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(server.store().list_all(), vec!["A", "Y"]);
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let server = server_with(&["A"]);
        let (_, _, response) = send(&server, "GET", "/api/library/all").await;
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let request = Request::builder()
            .uri("/api/library/all")
            .header(X_REQUEST_ID, "fixed-id")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "fixed-id");
    }

    #[tokio::test]
    async fn test_run_stops_on_trigger() {
        let server = server_with(&["A"]);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();

        let handle = tokio::spawn(server.run(listener, shutdown.signal()));
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let mut config = CatalogConfig::default();
        config.catalog.base_path = "/".into();
        config.catalog.seed = vec!["A".into()];
        let server = HttpServer::new(config).unwrap();

        let (status, body, _) = send(&server, "GET", "/get/0").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "A"));
    }
}
