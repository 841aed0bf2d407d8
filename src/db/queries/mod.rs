pub mod categories;
pub mod properties;
pub mod transactions;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Money is stored as integer cents.
pub(crate) fn to_cents(amount: Decimal) -> rusqlite::Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| {
            rusqlite::Error::ToSqlConversionFailure(
                format!("amount {} does not fit in cents", amount).into(),
            )
        })
}

pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
