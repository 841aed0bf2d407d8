//! Read side of the bookkeeping data.
//!
//! A [`Ledger`] is a validated, immutable snapshot of every transaction and
//! property a caller may see. Reports are always computed from a snapshot
//! that has been read in full; nothing downstream touches the store.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{AppResult, ReportError};
use crate::models::{Property, Transaction, TransactionRecord};

/// Source of ledger snapshots. Tenancy scoping and authorization happen
/// behind this boundary.
pub trait LedgerReader {
    fn read_ledger(&self) -> AppResult<Ledger>;
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    properties: Vec<Property>,
    property_index: HashMap<i64, usize>,
}

impl Ledger {
    pub fn new(
        transactions: Vec<Transaction>,
        properties: Vec<Property>,
    ) -> Result<Self, ReportError> {
        for property in &properties {
            property.validate()?;
        }
        for tx in &transactions {
            if tx.amount < Decimal::ZERO {
                return Err(ReportError::MalformedTransaction {
                    id: tx.id,
                    reason: "negative amount".into(),
                });
            }
        }

        let property_index = properties
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();

        Ok(Self {
            transactions,
            properties,
            property_index,
        })
    }

    /// Validates raw store records. The first malformed record aborts the
    /// whole snapshot.
    pub fn from_records(
        records: Vec<TransactionRecord>,
        properties: Vec<Property>,
    ) -> Result<Self, ReportError> {
        let transactions = records
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(transactions, properties)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, id: i64) -> Option<&Property> {
        self.property_index.get(&id).map(|&idx| &self.properties[idx])
    }
}

impl LedgerReader for Ledger {
    fn read_ledger(&self) -> AppResult<Ledger> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(id: i64, amount: Option<rust_decimal::Decimal>) -> TransactionRecord {
        TransactionRecord {
            id,
            date: Some("2025-06-01".into()),
            kind: Some("income".into()),
            amount,
            property_id: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_records_fails_fast() {
        let err = Ledger::from_records(
            vec![record(1, Some(dec!(10))), record(2, None), record(3, Some(dec!(5)))],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReportError::MalformedTransaction {
                id: 2,
                reason: "missing amount".into()
            }
        );
    }

    #[test]
    fn test_property_lookup() {
        let ledger = Ledger::from_records(
            vec![record(1, Some(dec!(10)))],
            vec![Property::new(1, "Harbour View"), Property::new(9, "Mill Lane")],
        )
        .unwrap();
        assert_eq!(ledger.property(9).map(|p| p.name.as_str()), Some("Mill Lane"));
        assert!(ledger.property(2).is_none());
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_in_memory_reader_returns_snapshot() {
        let ledger = Ledger::default();
        let snapshot = ledger.read_ledger().unwrap();
        assert!(snapshot.transactions().is_empty());
        assert!(snapshot.properties().is_empty());
    }
}
