use askama::Result;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

// Custom filters for the purchase order templates, used as `|money`,
// `|plain_number` and `|date`.

/// Two decimal places with thousands separators, e.g. `1,234.50`.
#[allow(clippy::unnecessary_wraps)]
pub fn money(value: &Decimal) -> Result<String> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let formatted = format!("{:.2}", rounded.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    Ok(format!("{}{}.{}", sign, grouped, fraction))
}

/// Input-field rendering of a number: no grouping, no trailing zeros.
#[allow(clippy::unnecessary_wraps)]
pub fn plain_number(value: &Decimal) -> Result<String> {
    Ok(value.normalize().to_string())
}

#[allow(clippy::unnecessary_wraps)]
pub fn date(value: &Option<NaiveDate>) -> Result<String> {
    Ok(value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default())
}
