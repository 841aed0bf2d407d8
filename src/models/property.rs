use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub acquisition_date: Option<NaiveDate>,
}

impl Property {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            purchase_price: None,
            current_value: None,
            acquisition_date: None,
        }
    }

    pub fn with_purchase_price(mut self, price: Decimal) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn with_current_value(mut self, value: Decimal) -> Self {
        self.current_value = Some(value);
        self
    }

    /// Purchase price usable as a ratio base. A zero price is treated the
    /// same as an unknown one.
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.purchase_price.filter(|p| *p > Decimal::ZERO)
    }

    /// `None` without a cost basis and current value, or when the
    /// percentage does not fit in a `Decimal`.
    pub fn appreciation(&self) -> Option<Appreciation> {
        let basis = self.cost_basis()?;
        let current = self.current_value?;
        let amount = current.checked_sub(basis)?;
        let percent = amount
            .checked_div(basis)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some(Appreciation { amount, percent })
    }

    pub(crate) fn validate(&self) -> Result<(), ReportError> {
        let negative = |v: Option<Decimal>| v.is_some_and(|d| d < Decimal::ZERO);
        if negative(self.purchase_price) {
            return Err(ReportError::MalformedProperty {
                id: self.id,
                reason: "negative purchase price".into(),
            });
        }
        if negative(self.current_value) {
            return Err(ReportError::MalformedProperty {
                id: self.id,
                reason: "negative current value".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub name: String,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub acquisition_date: Option<NaiveDate>,
}

/// Change in value since acquisition. Independent of any report window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appreciation {
    pub amount: Decimal,
    pub percent: Decimal,
}

impl Appreciation {
    pub fn rounded(self, dp: u32) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
            percent: self
                .percent
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValuation {
    pub property_id: i64,
    pub name: String,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub acquisition_date: Option<NaiveDate>,
    pub appreciation: Option<Appreciation>,
}

impl From<&Property> for PropertyValuation {
    fn from(property: &Property) -> Self {
        Self {
            property_id: property.id,
            name: property.name.clone(),
            purchase_price: property.purchase_price,
            current_value: property.current_value,
            acquisition_date: property.acquisition_date,
            appreciation: property.appreciation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_appreciation_needs_price_and_value() {
        let flat = Property::new(1, "Flat");
        assert!(flat.appreciation().is_none());

        let flat = flat.with_purchase_price(dec!(200000));
        assert!(flat.appreciation().is_none());

        let flat = flat.with_current_value(dec!(250000));
        let a = flat.appreciation().unwrap();
        assert_eq!(a.amount, dec!(50000));
        assert_eq!(a.percent, dec!(25));
    }

    #[test]
    fn test_zero_price_is_not_a_cost_basis() {
        let gift = Property::new(2, "Inherited")
            .with_purchase_price(Decimal::ZERO)
            .with_current_value(dec!(90000));
        assert!(gift.cost_basis().is_none());
        assert!(gift.appreciation().is_none());
    }

    #[test]
    fn test_appreciation_overflow_is_unknown() {
        let tiny_basis = Property::new(4, "Tiny basis")
            .with_purchase_price(dec!(0.01))
            .with_current_value(Decimal::MAX);
        assert!(tiny_basis.appreciation().is_none());
        assert!(PropertyValuation::from(&tiny_basis).appreciation.is_none());
    }

    #[test]
    fn test_negative_values_rejected() {
        let p = Property::new(3, "Bad").with_purchase_price(dec!(-5));
        assert!(matches!(
            p.validate(),
            Err(ReportError::MalformedProperty { id: 3, .. })
        ));
    }
}
