use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Multipart;
use askama::Template;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    editor::{EditorError, ItemField, PurchaseOrderEditor},
    error::AppError,
    filters,
    models::{ExpenseCategory, OrderStatus, PurchaseOrder},
    store::Confirmation,
    AppState,
};

#[derive(Template)]
#[template(path = "purchase_orders/list.html")]
struct ListTemplate {
    orders: Vec<PurchaseOrderRow>,
    notice: String,
}

#[derive(Template)]
#[template(path = "purchase_orders/form.html")]
struct FormTemplate {
    po: PurchaseOrder,
    editing: Option<i64>,
    statuses: Vec<SelectOption>,
    categories: Vec<SelectOption>,
    show_signed_document: bool,
    errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "purchase_orders/view.html")]
struct ViewTemplate {
    po: PurchaseOrder,
    id: i64,
    status_label: String,
    status_tone: String,
    category_name: String,
    show_tax: bool,
    show_shipping: bool,
}

#[derive(Template)]
#[template(path = "purchase_orders/confirm_delete.html")]
struct ConfirmDeleteTemplate {
    id: i64,
    po_number: String,
    vendor_name: String,
}

// Template-friendly row for the list view
pub struct PurchaseOrderRow {
    pub id: i64,
    pub po_number: String,
    pub po_date: String,
    pub vendor_name: String,
    pub total_amount: rust_decimal::Decimal,
    pub status: String,
    pub status_tone: String,
}

impl From<&PurchaseOrder> for PurchaseOrderRow {
    fn from(po: &PurchaseOrder) -> Self {
        Self {
            id: po.id.unwrap_or_default(),
            po_number: po.po_number.clone(),
            po_date: po.po_date.map(|d| d.to_string()).unwrap_or_default(),
            vendor_name: po.vendor_name.clone(),
            total_amount: po.total_amount,
            status: po.order_status.as_str().to_string(),
            status_tone: po.order_status.tone().to_string(),
        }
    }
}

pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    notice: String,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    confirm: String,
}

/// What the submit button on the edit form asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Save,
    AddItem,
    RemoveItem(usize),
    Recalculate,
}

impl FormAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "save" => Some(FormAction::Save),
            "add-item" => Some(FormAction::AddItem),
            "recalculate" => Some(FormAction::Recalculate),
            other => other
                .strip_prefix("remove-item-")
                .and_then(|index| index.parse().ok())
                .map(FormAction::RemoveItem),
        }
    }
}

pub async fn purchase_orders_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let store = state.store.lock().await;
    let template = ListTemplate {
        orders: store.list().iter().map(PurchaseOrderRow::from).collect(),
        notice: query.notice,
    };
    Ok(Html(template.render()?))
}

pub async fn purchase_order_form() -> Result<Html<String>, AppError> {
    let editor = PurchaseOrderEditor::new(Utc::now());
    render_form(&editor, Vec::new())
}

pub async fn purchase_order_edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let store = state.store.lock().await;
    let po = store.get(id).cloned().ok_or(AppError::NotFound(id))?;
    render_form(&PurchaseOrderEditor::edit(po), Vec::new())
}

pub async fn purchase_order_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let store = state.store.lock().await;
    let po = store.get(id).cloned().ok_or(AppError::NotFound(id))?;

    let template = ViewTemplate {
        id,
        status_label: po.order_status.label().to_string(),
        status_tone: po.order_status.tone().to_string(),
        category_name: po.expense_category.display_name().to_string(),
        show_tax: po.tax_rate > rust_decimal::Decimal::ZERO,
        show_shipping: po.shipping > rust_decimal::Decimal::ZERO,
        po,
    };
    Ok(Html(template.render()?))
}

pub async fn create_purchase_order(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = parse_purchase_order_multipart(multipart).await?;
    let (editor, errors) = submission.apply(None);

    if submission.action != FormAction::Save || !errors.is_empty() {
        return Ok(render_form(&editor, errors)?.into_response());
    }

    let saved = {
        let mut store = state.store.lock().await;
        store.create(editor.into_record(), Utc::now())?
    };

    // Local save is done; the remote copy is best effort.
    let po_number = saved.po_number.clone();
    state.remote.spawn_push_created(saved);

    Ok(redirect_with_notice(&format!("Saved {}", po_number)).into_response())
}

pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = parse_purchase_order_multipart(multipart).await?;
    let (editor, errors) = submission.apply(Some(id));

    if submission.action != FormAction::Save || !errors.is_empty() {
        return Ok(render_form(&editor, errors)?.into_response());
    }

    let record = editor.into_record();
    let po_number = record.po_number.clone();
    let updated = state.store.lock().await.update(id, record)?;
    if !updated {
        return Err(AppError::NotFound(id));
    }

    Ok(redirect_with_notice(&format!("Updated {}", po_number)).into_response())
}

pub async fn confirm_delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let store = state.store.lock().await;
    let po = store.get(id).ok_or(AppError::NotFound(id))?;

    let template = ConfirmDeleteTemplate {
        id,
        po_number: po.po_number.clone(),
        vendor_name: po.vendor_name.clone(),
    };
    Ok(Html(template.render()?))
}

pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let confirmation = if form.confirm == "yes" {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };

    let deleted = state.store.lock().await.delete(id, confirmation)?;
    let notice = if deleted {
        "Purchase order deleted"
    } else {
        "Nothing was deleted"
    };
    Ok(redirect_with_notice(notice))
}

pub fn redirect_with_notice(notice: &str) -> Redirect {
    Redirect::to(&format!("/purchase-orders?notice={}", urlencoding::encode(notice)))
}

fn render_form(editor: &PurchaseOrderEditor, errors: Vec<String>) -> Result<Html<String>, AppError> {
    let po = editor.record().clone();
    let template = FormTemplate {
        editing: editor.editing(),
        statuses: OrderStatus::ALL
            .iter()
            .map(|s| SelectOption {
                value: s.as_str(),
                label: s.label(),
                selected: *s == po.order_status,
            })
            .collect(),
        categories: ExpenseCategory::ALL
            .iter()
            .map(|c| SelectOption {
                value: c.as_str(),
                label: c.display_name(),
                selected: *c == po.expense_category,
            })
            .collect(),
        show_signed_document: po.order_status.accepts_signed_document(),
        errors,
        po,
    };
    Ok(Html(template.render()?))
}

/// The edit form as submitted, before it is replayed onto an editor.
struct Submission {
    fields: Vec<(String, String)>,
    items: Vec<(usize, ItemField, String)>,
    kept_document: Option<String>,
    uploaded_document: Option<String>,
    action: FormAction,
}

impl Submission {
    /// Replays every submitted value through the editor so item and record
    /// totals are recomputed here, then applies the requested action.
    fn apply(&self, editing: Option<i64>) -> (PurchaseOrderEditor, Vec<String>) {
        let mut editor = PurchaseOrderEditor::new(Utc::now());
        editor.set_editing(editing);
        let mut errors = Vec::new();

        for (name, value) in &self.fields {
            match editor.set_field(name, value) {
                Ok(()) => {}
                Err(EditorError::UnknownField(field)) => {
                    log::debug!("Ignoring unknown form field {}", field);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }
        for (index, field, value) in &self.items {
            if let Err(e) = editor.set_item_field(*index, *field, value) {
                errors.push(format!("Item {}: {}", index.saturating_add(1), e));
            }
        }
        if let Some(name) = &self.kept_document {
            editor.attach_signed_document(name);
        }
        if let Some(name) = &self.uploaded_document {
            editor.attach_signed_document(name);
        }

        let outcome = match self.action {
            FormAction::AddItem => editor.add_item(),
            FormAction::RemoveItem(index) => editor.remove_item(index).map(|removed| {
                if !removed {
                    log::debug!("Kept item {}, a purchase order needs at least one item", index);
                }
            }),
            FormAction::Save | FormAction::Recalculate => Ok(()),
        };
        if let Err(e) = outcome {
            errors.push(e.to_string());
        }

        (editor, errors)
    }
}

// Item inputs are named `item-<index>-<field>`.
fn parse_item_field_name(name: &str) -> Option<(usize, ItemField)> {
    let rest = name.strip_prefix("item-")?;
    let (index, field) = rest.split_once('-')?;
    Some((index.parse().ok()?, ItemField::from_name(field)?))
}

async fn parse_purchase_order_multipart(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission {
        fields: Vec::new(),
        items: Vec::new(),
        kept_document: None,
        uploaded_document: None,
        action: FormAction::Save,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name == "signedDocument" {
            // Only the chosen file's name is kept; the upload body is dropped.
            let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            if !file_name.is_empty() {
                submission.uploaded_document = Some(file_name);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if let Some((index, item_field)) = parse_item_field_name(&name) {
            submission.items.push((index, item_field, value));
            continue;
        }

        match name.as_str() {
            "action" => {
                submission.action = FormAction::parse(&value)
                    .ok_or_else(|| AppError::BadRequest(format!("unknown action `{}`", value)))?
            }
            "signedDocumentName" => submission.kept_document = Some(value),
            _ => submission.fields.push((name, value)),
        }
    }

    Ok(submission)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
