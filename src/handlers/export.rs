use axum::{extract::State, response::Html};
use askama::Template;

use crate::{
    error::AppError,
    filters,
    models::ExportRecord,
    sync::ExportOutcome,
    AppState,
};

#[derive(Template)]
#[template(path = "purchase_orders/export.html")]
struct ExportTemplate {
    transmitted: bool,
    notice: String,
    reason: String,
    records: Vec<ExportRecord>,
    payload: String,
}

pub async fn export_purchase_orders(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    // Snapshot first so the store is not locked while the request is in flight.
    let snapshot = state.store.lock().await.list().to_vec();
    let outcome = state.remote.export_all(&snapshot).await;

    let template = match outcome {
        ExportOutcome::Transmitted { .. } => ExportTemplate {
            transmitted: true,
            notice: outcome.notice(),
            reason: String::new(),
            records: Vec::new(),
            payload: String::new(),
        },
        ExportOutcome::LocalFallback { ref reason, ref records } => ExportTemplate {
            transmitted: false,
            notice: outcome.notice(),
            reason: reason.clone(),
            payload: serde_json::to_string_pretty(records).unwrap_or_default(),
            records: records.clone(),
        },
    };

    Ok(Html(template.render()?))
}
