//! Working copy of a purchase order while it is being created or edited.
//!
//! Every mutator that touches a quantity, unit price, tax rate or shipping
//! recomputes the derived totals before returning, so a caller never observes
//! a record whose totals lag behind its inputs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::ids::generate_po_number;
use crate::models::{ExpenseCategory, LineItem, OrderStatus, PurchaseOrder};
use crate::totals::AmountOverflow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("`{value}` is not a valid number for {field}")]
    InvalidNumber { field: String, value: String },
    #[error("`{value}` is not a valid date for {field}")]
    InvalidDate { field: String, value: String },
    #[error("unknown {field} `{value}`")]
    UnknownOption { field: String, value: String },
    #[error("`{value}` for {field} makes the order amounts too large to compute")]
    Overflow { field: String, value: String },
    #[error("there is no item {position}, the order has {count}")]
    NoSuchItem { position: usize, count: usize },
    #[error(transparent)]
    Amounts(#[from] AmountOverflow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

impl ItemField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "description" => Some(ItemField::Description),
            "quantity" => Some(ItemField::Quantity),
            "unitPrice" => Some(ItemField::UnitPrice),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ItemField::Description => "description",
            ItemField::Quantity => "quantity",
            ItemField::UnitPrice => "unitPrice",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseOrderEditor {
    record: PurchaseOrder,
    editing: Option<i64>,
}

impl PurchaseOrderEditor {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            record: PurchaseOrder::blank(generate_po_number(now), now.date_naive()),
            editing: None,
        }
    }

    /// Opens a stored record for re-editing.
    pub fn edit(record: PurchaseOrder) -> Self {
        Self {
            editing: record.id,
            record,
        }
    }

    pub fn record(&self) -> &PurchaseOrder {
        &self.record
    }

    pub fn into_record(self) -> PurchaseOrder {
        self.record
    }

    /// Id of the stored record being edited, `None` for a new record.
    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub fn set_editing(&mut self, id: Option<i64>) {
        self.editing = id;
        self.record.id = id;
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    /// Sets a scalar field by its form name (`vendorName`, `taxRate`, ...).
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), EditorError> {
        let po = &mut self.record;
        match name {
            "companyName" => po.company_name = value.to_string(),
            "companyAddress" => po.company_address = value.to_string(),
            "companyContact" => po.company_contact = value.to_string(),
            "companyPhone" => po.company_phone = value.to_string(),
            "companyEmail" => po.company_email = value.to_string(),
            "poNumber" => po.po_number = value.to_string(),
            "poDate" => po.po_date = parse_date(name, value)?,
            "deliveryDate" => po.delivery_date = parse_date(name, value)?,
            "paymentTerms" => po.payment_terms = value.to_string(),
            "expenseCategory" => {
                po.expense_category = ExpenseCategory::parse(value).ok_or_else(|| {
                    EditorError::UnknownOption {
                        field: name.to_string(),
                        value: value.to_string(),
                    }
                })?
            }
            "vendorName" => po.vendor_name = value.to_string(),
            "vendorAddress" => po.vendor_address = value.to_string(),
            "vendorContact" => po.vendor_contact = value.to_string(),
            "vendorPhone" => po.vendor_phone = value.to_string(),
            "vendorEmail" => po.vendor_email = value.to_string(),
            "vendorTaxId" => po.vendor_tax_id = value.to_string(),
            "taxRate" => {
                let rate = parse_number(name, value)?;
                self.commit(|po| po.tax_rate = rate)
                    .map_err(|_| overflow(name, value))?;
            }
            "shipping" => {
                let shipping = parse_number(name, value)?;
                self.commit(|po| po.shipping = shipping)
                    .map_err(|_| overflow(name, value))?;
            }
            "specialInstructions" => po.special_instructions = value.to_string(),
            "requestedBy" => po.requested_by = value.to_string(),
            "approvedBy" => po.approved_by = value.to_string(),
            "approvalDate" => po.approval_date = parse_date(name, value)?,
            "budgetCode" => po.budget_code = value.to_string(),
            "orderStatus" => {
                po.order_status = OrderStatus::parse(value).ok_or_else(|| {
                    EditorError::UnknownOption {
                        field: name.to_string(),
                        value: value.to_string(),
                    }
                })?
            }
            "receivedDate" => po.received_date = parse_date(name, value)?,
            "invoiceNumber" => po.invoice_number = value.to_string(),
            "invoiceDate" => po.invoice_date = parse_date(name, value)?,
            "notes" => po.notes = value.to_string(),
            _ => return Err(EditorError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    pub fn set_tax_rate(&mut self, tax_rate: Decimal) -> Result<(), EditorError> {
        self.commit(|po| po.tax_rate = tax_rate)
            .map_err(|_| overflow("taxRate", &tax_rate.to_string()))
    }

    pub fn set_shipping(&mut self, shipping: Decimal) -> Result<(), EditorError> {
        self.commit(|po| po.shipping = shipping)
            .map_err(|_| overflow("shipping", &shipping.to_string()))
    }

    /// Edits one field of the item at `index`. `index` may name an existing
    /// item or the slot right after the last one, which appends a blank item.
    pub fn set_item_field(&mut self, index: usize, field: ItemField, value: &str) -> Result<(), EditorError> {
        let count = self.record.items.len();
        if index > count {
            return Err(EditorError::NoSuchItem {
                position: index.saturating_add(1),
                count,
            });
        }

        let parsed = match field {
            ItemField::Description => None,
            ItemField::Quantity | ItemField::UnitPrice => Some(parse_number(field.name(), value)?),
        };

        self.try_commit(|po| {
            if index == po.items.len() {
                po.items.push(LineItem::default());
            }
            let item = &mut po.items[index];
            match (field, parsed) {
                (ItemField::Quantity, Some(quantity)) => {
                    item.quantity = quantity;
                    item.recompute_total()
                }
                (ItemField::UnitPrice, Some(unit_price)) => {
                    item.unit_price = unit_price;
                    item.recompute_total()
                }
                _ => {
                    item.description = value.to_string();
                    Ok(())
                }
            }
        })
        .map_err(|_| overflow(field.name(), value))
    }

    pub fn add_item(&mut self) -> Result<(), EditorError> {
        self.commit(|po| po.items.push(LineItem::default()))?;
        Ok(())
    }

    /// Removes the item at `index`. Returns `false` (and leaves the list
    /// alone) for the last remaining item or an index out of range.
    pub fn remove_item(&mut self, index: usize) -> Result<bool, EditorError> {
        if self.record.items.len() <= 1 || index >= self.record.items.len() {
            return Ok(false);
        }
        self.commit(|po| {
            po.items.remove(index);
        })?;
        Ok(true)
    }

    /// Keeps only the file name; the document itself is not stored anywhere.
    pub fn attach_signed_document(&mut self, file_name: &str) {
        if !file_name.is_empty() {
            log::info!("Signed document selected: {}", file_name);
            self.record.signed_document_name = file_name.to_string();
        }
    }
}

impl PurchaseOrderEditor {
    fn commit(&mut self, change: impl FnOnce(&mut PurchaseOrder)) -> Result<(), AmountOverflow> {
        self.try_commit(|po| {
            change(po);
            Ok(())
        })
    }

    // The change lands on a copy; the record only moves on when every
    // derived amount still fits.
    fn try_commit(
        &mut self,
        change: impl FnOnce(&mut PurchaseOrder) -> Result<(), AmountOverflow>,
    ) -> Result<(), AmountOverflow> {
        let mut staged = self.record.clone();
        change(&mut staged)?;
        staged.recalculate()?;
        self.record = staged;
        Ok(())
    }
}

fn overflow(field: &str, value: &str) -> EditorError {
    EditorError::Overflow {
        field: field.to_string(),
        value: value.trim().to_string(),
    }
}

fn parse_number(field: &str, value: &str) -> Result<Decimal, EditorError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| EditorError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn parse_date(field: &str, value: &str) -> Result<Option<NaiveDate>, EditorError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| EditorError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn editor() -> PurchaseOrderEditor {
        PurchaseOrderEditor::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap())
    }

    fn assert_totals_consistent(po: &PurchaseOrder) {
        for item in &po.items {
            assert_eq!(item.total, item.quantity * item.unit_price);
        }
        let subtotal: Decimal = po.items.iter().map(|i| i.total).sum();
        assert_eq!(po.subtotal, subtotal);
        assert_eq!(po.tax_amount, po.subtotal * po.tax_rate / Decimal::ONE_HUNDRED);
        assert_eq!(po.total_amount, po.subtotal + po.tax_amount + po.shipping);
    }

    #[test]
    fn new_record_gets_generated_number_and_today() {
        let editor = editor();
        let po = editor.record();
        assert!(po.po_number.starts_with("PO-2026-"));
        assert_eq!(po.po_number.len(), "PO-2026-".len() + 6);
        assert_eq!(po.po_date, NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(editor.editing(), None);
    }

    #[test]
    fn quantity_and_price_changes_recompute_item_and_record() {
        let mut editor = editor();
        editor.set_item_field(0, ItemField::Quantity, "2").unwrap();
        editor.set_item_field(0, ItemField::UnitPrice, "10").unwrap();
        editor.add_item().unwrap();
        editor.set_item_field(1, ItemField::UnitPrice, "5").unwrap();
        editor.set_field("taxRate", "10").unwrap();
        editor.set_field("shipping", "3").unwrap();

        let po = editor.record();
        assert_eq!(po.items[0].total, dec("20"));
        assert_eq!(po.items[1].total, dec("5"));
        assert_eq!(po.subtotal, dec("25"));
        assert_eq!(po.tax_amount, dec("2.5"));
        assert_eq!(po.total_amount, dec("30.5"));
        assert_totals_consistent(po);
    }

    #[test]
    fn tax_rate_change_uses_current_items() {
        let mut editor = editor();
        editor.set_item_field(0, ItemField::UnitPrice, "40").unwrap();
        editor.set_tax_rate(dec("25")).unwrap();
        assert_eq!(editor.record().tax_amount, dec("10"));
        assert_eq!(editor.record().total_amount, dec("50"));

        editor.set_shipping(dec("7.5")).unwrap();
        assert_eq!(editor.record().total_amount, dec("57.5"));
    }

    #[test]
    fn description_change_does_not_touch_item_total() {
        let mut editor = editor();
        editor.set_item_field(0, ItemField::UnitPrice, "12").unwrap();
        editor.record.items[0].total = dec("99");
        editor.set_item_field(0, ItemField::Description, "Centrifuge tubes").unwrap();
        assert_eq!(editor.record().items[0].total, dec("99"));
        assert_eq!(editor.record().items[0].description, "Centrifuge tubes");
    }

    #[test]
    fn removing_the_only_item_is_rejected() {
        let mut editor = editor();
        assert!(!editor.remove_item(0).unwrap());
        assert_eq!(editor.record().items.len(), 1);
    }

    #[test]
    fn removing_an_item_recomputes_totals() {
        let mut editor = editor();
        editor.set_item_field(0, ItemField::UnitPrice, "10").unwrap();
        editor.set_item_field(1, ItemField::UnitPrice, "15").unwrap();
        assert_eq!(editor.record().subtotal, dec("25"));

        assert!(editor.remove_item(0).unwrap());
        assert_eq!(editor.record().items.len(), 1);
        assert_eq!(editor.record().subtotal, dec("15"));
        assert!(!editor.remove_item(4).unwrap());
    }

    #[test]
    fn item_index_right_after_the_end_appends() {
        let mut editor = editor();
        editor.set_item_field(1, ItemField::Quantity, "4").unwrap();
        assert_eq!(editor.record().items.len(), 2);
        assert_eq!(editor.record().items[1].quantity, dec("4"));
        assert_totals_consistent(editor.record());
    }

    #[test]
    fn item_index_beyond_the_next_slot_is_rejected() {
        let mut editor = editor();
        let err = editor
            .set_item_field(200_000, ItemField::Description, "x")
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::NoSuchItem {
                position: 200_001,
                count: 1
            }
        );
        assert_eq!(editor.record().items.len(), 1);

        assert!(editor.set_item_field(2, ItemField::Quantity, "4").is_err());
        assert!(editor.set_item_field(usize::MAX, ItemField::Quantity, "4").is_err());
        assert_eq!(editor.record().items.len(), 1);
    }

    #[test]
    fn item_total_overflow_rejects_the_value() {
        let mut editor = editor();
        editor
            .set_item_field(0, ItemField::Quantity, "79228162514264337593543950335")
            .unwrap();
        let err = editor
            .set_item_field(0, ItemField::UnitPrice, "2")
            .unwrap_err();
        assert!(matches!(err, EditorError::Overflow { ref field, .. } if field == "unitPrice"));

        let po = editor.record();
        assert_eq!(po.items[0].unit_price, Decimal::ZERO);
        assert_eq!(po.items[0].total, Decimal::ZERO);
        assert_eq!(po.total_amount, Decimal::ZERO);
    }

    #[test]
    fn tax_overflow_rejects_the_rate() {
        let mut editor = editor();
        editor
            .set_item_field(0, ItemField::UnitPrice, "79228162514264337593543950")
            .unwrap();
        editor.set_field("taxRate", "8").unwrap();

        let err = editor.set_field("taxRate", "1000000").unwrap_err();
        assert_eq!(
            err,
            EditorError::Overflow {
                field: "taxRate".into(),
                value: "1000000".into()
            }
        );
        assert_eq!(editor.record().tax_rate, dec("8"));
        assert_totals_consistent(editor.record());

        assert!(editor.set_shipping(Decimal::MAX).is_err());
        assert_eq!(editor.record().shipping, Decimal::ZERO);
    }

    #[test]
    fn invalid_numbers_leave_the_record_untouched() {
        let mut editor = editor();
        editor.set_field("shipping", "4").unwrap();
        let err = editor.set_field("shipping", "four").unwrap_err();
        assert_eq!(
            err,
            EditorError::InvalidNumber {
                field: "shipping".into(),
                value: "four".into()
            }
        );
        assert_eq!(editor.record().shipping, dec("4"));

        assert!(editor.set_item_field(0, ItemField::Quantity, "x").is_err());
        assert_eq!(editor.record().items[0].quantity, Decimal::ONE);
    }

    #[test]
    fn empty_numbers_are_zero_and_empty_dates_unset() {
        let mut editor = editor();
        editor.set_field("taxRate", "").unwrap();
        editor.set_field("deliveryDate", "").unwrap();
        editor.set_field("poDate", "2026-11-02").unwrap();
        assert_eq!(editor.record().tax_rate, Decimal::ZERO);
        assert_eq!(editor.record().delivery_date, None);
        assert_eq!(editor.record().po_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn enum_fields_parse_wire_values() {
        let mut editor = editor();
        editor.set_field("orderStatus", "invoiced").unwrap();
        editor.set_field("expenseCategory", "marketing").unwrap();
        assert_eq!(editor.record().order_status, OrderStatus::Invoiced);
        assert_eq!(editor.record().expense_category, ExpenseCategory::Marketing);
        assert!(matches!(
            editor.set_field("orderStatus", "lost"),
            Err(EditorError::UnknownOption { .. })
        ));
        assert!(matches!(
            editor.set_field("favouriteColour", "teal"),
            Err(EditorError::UnknownField(_))
        ));
    }

    #[test]
    fn signed_document_keeps_only_the_name() {
        let mut editor = editor();
        editor.attach_signed_document("po-signed.pdf");
        editor.attach_signed_document("");
        assert_eq!(editor.record().signed_document_name, "po-signed.pdf");
    }

    #[test]
    fn reset_discards_edits() {
        let mut editor = editor();
        editor.set_field("vendorName", "Thermo Fisher").unwrap();
        editor.add_item().unwrap();
        editor.reset(Utc.with_ymd_and_hms(2027, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(editor.record().vendor_name, "");
        assert_eq!(editor.record().items.len(), 1);
        assert!(editor.record().po_number.starts_with("PO-2027-"));
    }

    #[test]
    fn edit_remembers_the_stored_id() {
        let mut po = editor().into_record();
        po.id = Some(42);
        let editor = PurchaseOrderEditor::edit(po);
        assert_eq!(editor.editing(), Some(42));
    }
}
