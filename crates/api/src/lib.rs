//! HTTP API server with observability for the storefront backend.
//!
//! Exposes the catalog, cart, and checkout operations as REST endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use checkout::{CartService, CheckoutPolicy, CheckoutService};
use gateway::{InMemoryPaymentGateway, PaymentGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use store::{
    CartStore, CatalogStore, InMemoryCartStore, InMemoryCatalogStore, PostgresCartStore,
    PostgresCatalogStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub cart_service: CartService,
    pub checkout_service: CheckoutService,
}

impl AppState {
    /// Wires the services over arbitrary store and gateway handles.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartStore>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            catalog: catalog.clone(),
            cart_service: CartService::new(catalog.clone(), carts.clone()),
            checkout_service: CheckoutService::new(catalog, carts, gateway, policy),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/api/cart", post(routes::cart::add))
        .route("/api/cart", get(routes::cart::get))
        .route("/api/cart", delete(routes::cart::clear))
        .route("/api/cart/{line_id}", put(routes::cart::update))
        .route("/api/cart/{line_id}", delete(routes::cart::remove))
        .route("/api/checkout", post(routes::checkout::create))
        .route("/api/checkout/summary", get(routes::checkout::summary))
        .route("/api/checkout/confirm", post(routes::checkout::confirm))
        .route(
            "/api/checkout/status/{session_id}",
            get(routes::checkout::status),
        )
        .route("/api/products", post(routes::products::create))
        .route("/api/products", get(routes::products::list))
        .route("/api/products/id/{id}", get(routes::products::get_by_id))
        // One registration per path pattern: the router rejects two
        // entries that differ only in parameter name. The segment is a
        // slug for GET and a product id for PUT and DELETE.
        .route(
            "/api/products/{slug_or_id}",
            get(routes::products::get_by_slug)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route("/health", get(routes::health::check))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// State over the in-memory stores and gateway, for database-less runs
/// and tests. The store and gateway handles are returned too so tests
/// can seed products and drive payment completion.
pub fn create_in_memory_state(
    policy: CheckoutPolicy,
) -> (
    AppState,
    Arc<InMemoryCatalogStore>,
    Arc<InMemoryPaymentGateway>,
) {
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let carts = Arc::new(InMemoryCartStore::new());
    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let state = AppState::new(catalog.clone(), carts, gateway.clone(), policy);
    (state, catalog, gateway)
}

/// State over the Postgres stores; the gateway remains the in-memory
/// implementation until a provider adapter is wired in.
pub fn create_postgres_state(pool: PgPool, policy: CheckoutPolicy) -> AppState {
    let catalog = Arc::new(PostgresCatalogStore::new(pool.clone()));
    let carts = Arc::new(PostgresCartStore::new(pool));
    let gateway = Arc::new(InMemoryPaymentGateway::new());
    AppState::new(catalog, carts, gateway, policy)
}
