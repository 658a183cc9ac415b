use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExpenseCategory, OrderStatus, PurchaseOrder};

/// Warehouse-shaped row produced when the bulk export cannot be transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub po_number: String,
    #[serde(default, with = "crate::models::purchase_order::date_field")]
    pub po_date: Option<NaiveDate>,
    pub vendor_name: String,
    pub vendor_tax_id: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub expense_category: ExpenseCategory,
    pub requested_by: String,
    pub approved_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&PurchaseOrder> for ExportRecord {
    fn from(po: &PurchaseOrder) -> Self {
        Self {
            po_number: po.po_number.clone(),
            po_date: po.po_date,
            vendor_name: po.vendor_name.clone(),
            vendor_tax_id: po.vendor_tax_id.clone(),
            total_amount: po.total_amount,
            status: po.order_status,
            expense_category: po.expense_category,
            requested_by: po.requested_by.clone(),
            approved_by: po.approved_by.clone(),
            created_at: po.created_at,
        }
    }
}
