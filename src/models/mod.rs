pub mod export;
pub mod purchase_order;

pub use export::ExportRecord;
pub use purchase_order::{ExpenseCategory, LineItem, OrderStatus, PurchaseOrder};
