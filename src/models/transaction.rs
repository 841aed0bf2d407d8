use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(()),
        }
    }
}

/// A validated ledger entry. Amounts are always non-negative; the direction
/// of money is carried by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub property_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A transaction as delivered by a store, before validation. Every field the
/// engine depends on may be missing here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: i64,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    pub property_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ReportError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let malformed = |reason: &str| ReportError::MalformedTransaction {
            id,
            reason: reason.to_string(),
        };

        let raw_date = record.date.ok_or_else(|| malformed("missing date"))?;
        let date =
            parse_business_date(&raw_date).ok_or_else(|| malformed("unparseable date"))?;

        let kind = record
            .kind
            .ok_or_else(|| malformed("missing type"))?
            .parse::<TransactionType>()
            .map_err(|_| malformed("unknown type"))?;

        let amount = record.amount.ok_or_else(|| malformed("missing amount"))?;
        if amount < Decimal::ZERO {
            return Err(malformed("negative amount"));
        }

        Ok(Self {
            id,
            date,
            kind,
            amount,
            description: record.description.unwrap_or_default(),
            property_id: record.property_id,
            category_id: record.category_id,
            category_name: record.category_name,
            recurring: record.recurring,
        })
    }
}

/// Input for writing a transaction to the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub property_id: Option<i64>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub recurring: bool,
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and the ISO `T` separator.
/// Bare dates are taken as midnight.
pub fn parse_business_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> TransactionRecord {
        TransactionRecord {
            id: 7,
            date: Some("2025-03-14".into()),
            kind: Some("expense".into()),
            amount: Some(dec!(120.50)),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_converts() {
        let tx = Transaction::try_from(record()).unwrap();
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.amount, dec!(120.50));
        assert_eq!(
            tx.date,
            NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        for broken in [
            TransactionRecord {
                date: None,
                ..record()
            },
            TransactionRecord {
                kind: None,
                ..record()
            },
            TransactionRecord {
                amount: None,
                ..record()
            },
            TransactionRecord {
                kind: Some("transfer".into()),
                ..record()
            },
            TransactionRecord {
                amount: Some(dec!(-1)),
                ..record()
            },
        ] {
            let err = Transaction::try_from(broken).unwrap_err();
            assert!(matches!(err, ReportError::MalformedTransaction { id: 7, .. }));
        }
    }

    #[test]
    fn test_parse_business_date_formats() {
        assert!(parse_business_date("2025-01-31").is_some());
        assert!(parse_business_date("2025-01-31 13:45:00").is_some());
        assert!(parse_business_date("2025-01-31T13:45:00").is_some());
        assert!(parse_business_date("31/01/2025").is_none());
    }
}
