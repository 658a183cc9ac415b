pub mod api;
pub mod export;
pub mod purchase_orders;
