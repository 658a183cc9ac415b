use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::LineItem;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// An amount left the range a `Decimal` can represent.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("amount is too large to compute")]
pub struct AmountOverflow;

/// Derived amounts of a purchase order. Nothing is rounded here; rounding to
/// two places happens only when amounts are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl Totals {
    /// Sums the stored item totals (item totals are not recomputed here) and
    /// applies `tax_rate` as a percentage plus flat `shipping`.
    pub fn calculate(items: &[LineItem], tax_rate: Decimal, shipping: Decimal) -> Result<Self, AmountOverflow> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
            .ok_or(AmountOverflow)?;
        let tax_amount = subtotal
            .checked_mul(tax_rate)
            .and_then(|taxed| taxed.checked_div(HUNDRED))
            .ok_or(AmountOverflow)?;
        let total_amount = subtotal
            .checked_add(tax_amount)
            .and_then(|total| total.checked_add(shipping))
            .ok_or(AmountOverflow)?;

        Ok(Self {
            subtotal,
            tax_amount,
            total_amount,
        })
    }
}
