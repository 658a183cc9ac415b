pub mod config;
pub mod editor;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod store;
pub mod sync;
pub mod totals;

use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{store::RecordStore, sync::RemoteClient};

/// Shared state: the single record store (one mutator at a time) and the
/// remote client used for best-effort sync.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<RecordStore>>,
    pub remote: RemoteClient,
}

impl AppState {
    pub fn new(store: RecordStore, remote: RemoteClient) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            remote,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    use handlers::{api, export, purchase_orders};

    Router::new()
        .route("/", get(|| async { Redirect::permanent("/purchase-orders") }))

        // Purchase order views
        .route("/purchase-orders", get(purchase_orders::purchase_orders_list))
        .route("/purchase-orders", post(purchase_orders::create_purchase_order))
        .route("/purchase-orders/new", get(purchase_orders::purchase_order_form))
        .route("/purchase-orders/export", post(export::export_purchase_orders))
        .route("/purchase-orders/:id", get(purchase_orders::purchase_order_detail))
        .route("/purchase-orders/:id", post(purchase_orders::update_purchase_order))
        .route("/purchase-orders/:id/edit", get(purchase_orders::purchase_order_edit_form))
        .route("/purchase-orders/:id/delete", get(purchase_orders::confirm_delete_purchase_order))
        .route("/purchase-orders/:id/delete", post(purchase_orders::delete_purchase_order))

        // API routes
        .route("/api/purchase-orders", get(api::list_purchase_orders))
        .route("/api/purchase-orders/:id", get(api::get_purchase_order))

        .fallback(purchase_orders::not_found)

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
        )
        .with_state(state)
}
