use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{error::AppError, models::PurchaseOrder, AppState};

pub async fn list_purchase_orders(State(state): State<AppState>) -> Json<Vec<PurchaseOrder>> {
    let store = state.store.lock().await;
    Json(store.list().to_vec())
}

pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let store = state.store.lock().await;
    store
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound(id))
}
