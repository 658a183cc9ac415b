#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{TimeZone, Utc};
use po_desk::{
    create_router,
    editor::{ItemField, PurchaseOrderEditor},
    models::PurchaseOrder,
    store::{MemorySlot, RecordStore},
    sync::RemoteClient,
    AppState,
};
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "----po-desk-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn spawn() -> Self {
        let state = AppState::new(RecordStore::load(MemorySlot::new()), RemoteClient::disabled());
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .expect("request failed")
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .expect("request failed")
    }

    pub async fn post_multipart(&self, uri: &str, form: &MultipartForm) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", BOUNDARY),
                    )
                    .body(Body::from(form.encode()))
                    .unwrap(),
            )
            .await
            .expect("request failed")
    }

    pub async fn stored(&self) -> Vec<PurchaseOrder> {
        self.state.store.lock().await.list().to_vec()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartForm {
    parts: Vec<(String, Option<String>, String)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push((name.to_string(), None, value.to_string()));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &str) -> Self {
        self.parts
            .push((name.to_string(), Some(file_name.to_string()), contents.to_string()));
        self
    }

    pub fn encode(&self) -> String {
        let mut body = String::new();
        for (name, file_name, value) in &self.parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    ));
                    body.push_str("Content-Type: application/pdf\r\n\r\n");
                }
                None => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        name
                    ));
                }
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }
}

/// The two-item order used throughout: 2 x 10 + 1 x 5, 10% tax, 3 shipping.
pub fn sample_form(action: &str) -> MultipartForm {
    MultipartForm::new()
        .text("companyName", "Prodigy Cells")
        .text("poNumber", "PO-2026-000123")
        .text("poDate", "2026-10-18")
        .text("expenseCategory", "equipment")
        .text("vendorName", "Acme Labs")
        .text("vendorTaxId", "12-3456789")
        .text("item-0-description", "Pipette tips")
        .text("item-0-quantity", "2")
        .text("item-0-unitPrice", "10")
        .text("item-1-description", "Gloves")
        .text("item-1-quantity", "1")
        .text("item-1-unitPrice", "5")
        .text("taxRate", "10")
        .text("shipping", "3")
        .text("orderStatus", "pending")
        .text("action", action)
}

pub fn sample_order(vendor: &str) -> PurchaseOrder {
    let mut editor = PurchaseOrderEditor::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap());
    editor.set_field("vendorName", vendor).unwrap();
    editor.set_item_field(0, ItemField::Quantity, "2").unwrap();
    editor.set_item_field(0, ItemField::UnitPrice, "10").unwrap();
    editor.set_item_field(1, ItemField::UnitPrice, "5").unwrap();
    editor.set_field("taxRate", "10").unwrap();
    editor.set_field("shipping", "3").unwrap();
    editor.into_record()
}
