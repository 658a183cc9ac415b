use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::totals::{AmountOverflow, Totals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Sent,
    Confirmed,
    Partial,
    Received,
    Invoiced,
    Paid,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Sent,
        OrderStatus::Confirmed,
        OrderStatus::Partial,
        OrderStatus::Received,
        OrderStatus::Invoiced,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
        OrderStatus::Completed,
    ];

    /// The stored (wire) value, e.g. `"pending"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Sent => "sent",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Partial => "partial",
            OrderStatus::Received => "received",
            OrderStatus::Invoiced => "invoiced",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Pending => "Pending Approval",
            OrderStatus::Approved => "Approved",
            OrderStatus::Sent => "Sent to Vendor",
            OrderStatus::Confirmed => "Confirmed by Vendor",
            OrderStatus::Partial => "Partially Received",
            OrderStatus::Received => "Fully Received",
            OrderStatus::Invoiced => "Invoiced",
            OrderStatus::Paid => "Paid",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Completed => "Completed (Signed)",
        }
    }

    // Badge tone used by the list and print views.
    pub fn tone(&self) -> &'static str {
        match self {
            OrderStatus::Draft | OrderStatus::Paid => "gray",
            OrderStatus::Pending => "yellow",
            OrderStatus::Approved | OrderStatus::Received => "green",
            OrderStatus::Confirmed => "blue",
            OrderStatus::Completed => "purple",
            _ => "red",
        }
    }

    /// A signed document can only be attached once the order is approved or signed off.
    pub fn accepts_signed_document(&self) -> bool {
        matches!(self, OrderStatus::Approved | OrderStatus::Completed)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseCategory {
    #[default]
    OfficeSupplies,
    Equipment,
    Services,
    Software,
    Inventory,
    Travel,
    Marketing,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::OfficeSupplies,
        ExpenseCategory::Equipment,
        ExpenseCategory::Services,
        ExpenseCategory::Software,
        ExpenseCategory::Inventory,
        ExpenseCategory::Travel,
        ExpenseCategory::Marketing,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::OfficeSupplies => "office-supplies",
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Services => "services",
            ExpenseCategory::Software => "software",
            ExpenseCategory::Inventory => "inventory",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExpenseCategory::OfficeSupplies => "Office Supplies",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Services => "Professional Services",
            ExpenseCategory::Software => "Software & Licenses",
            ExpenseCategory::Inventory => "Inventory",
            ExpenseCategory::Travel => "Travel & Entertainment",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

impl LineItem {
    /// Sets `total` to `quantity * unit_price`. On overflow the item is left
    /// as it was.
    pub fn recompute_total(&mut self) -> Result<(), AmountOverflow> {
        self.total = self
            .quantity
            .checked_mul(self.unit_price)
            .ok_or(AmountOverflow)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_address: String,
    #[serde(default)]
    pub company_contact: String,
    #[serde(default)]
    pub company_phone: String,
    #[serde(default)]
    pub company_email: String,

    pub po_number: String,
    #[serde(default, with = "date_field")]
    pub po_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub expense_category: ExpenseCategory,

    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_address: String,
    #[serde(default)]
    pub vendor_contact: String,
    #[serde(default)]
    pub vendor_phone: String,
    #[serde(default)]
    pub vendor_email: String,
    #[serde(default)]
    pub vendor_tax_id: String,

    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub shipping: Decimal,
    pub total_amount: Decimal,

    #[serde(default)]
    pub special_instructions: String,
    #[serde(default)]
    pub requested_by: String,
    #[serde(default)]
    pub approved_by: String,
    #[serde(default, with = "date_field")]
    pub approval_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget_code: String,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default, with = "date_field")]
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default, with = "date_field")]
    pub invoice_date: Option<NaiveDate>,
    // File name only; the document body is never stored.
    #[serde(default)]
    pub signed_document_name: String,
    #[serde(default)]
    pub notes: String,
}

impl PurchaseOrder {
    /// A blank record as presented by the "New PO" form.
    pub fn blank(po_number: String, today: NaiveDate) -> Self {
        Self {
            id: None,
            created_at: None,
            company_name: String::new(),
            company_address: String::new(),
            company_contact: String::new(),
            company_phone: String::new(),
            company_email: String::new(),
            po_number,
            po_date: Some(today),
            delivery_date: None,
            payment_terms: "net-30".to_string(),
            expense_category: ExpenseCategory::default(),
            vendor_name: String::new(),
            vendor_address: String::new(),
            vendor_contact: String::new(),
            vendor_phone: String::new(),
            vendor_email: String::new(),
            vendor_tax_id: String::new(),
            items: vec![LineItem::default()],
            subtotal: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            special_instructions: String::new(),
            requested_by: String::new(),
            approved_by: String::new(),
            approval_date: Some(today),
            budget_code: String::new(),
            order_status: OrderStatus::Draft,
            received_date: None,
            invoice_number: String::new(),
            invoice_date: None,
            signed_document_name: String::new(),
            notes: String::new(),
        }
    }

    /// Recomputes the derived totals from the stored item totals and the
    /// current tax rate and shipping.
    pub fn recalculate(&mut self) -> Result<(), AmountOverflow> {
        let totals = Totals::calculate(&self.items, self.tax_rate, self.shipping)?;
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total_amount = totals.total_amount;
        Ok(())
    }
}

/// Optional calendar dates stored as `YYYY-MM-DD`, with `""` (or `null`)
/// meaning unset.
pub(crate) mod date_field {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}
