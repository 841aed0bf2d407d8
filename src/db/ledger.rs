use tracing::debug;

use super::queries::{properties, transactions};
use super::DbPool;
use crate::error::AppResult;
use crate::ledger::{Ledger, LedgerReader};

/// [`LedgerReader`] over the SQLite store. Both tables are read on one
/// connection inside a single read transaction so the snapshot is
/// consistent.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LedgerReader for SqliteLedger {
    fn read_ledger(&self) -> AppResult<Ledger> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let records = transactions::list_transaction_records(&tx)?;
        let properties = properties::list_properties(&tx)?;
        tx.finish()?;

        let ledger = Ledger::from_records(records, properties)?;
        debug!(
            transactions = ledger.transactions().len(),
            properties = ledger.properties().len(),
            "Read ledger snapshot"
        );
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories;
    use crate::db::{create_in_memory_pool, migrations};
    use crate::error::{AppError, ReportError};
    use crate::models::{NewProperty, NewTransaction, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn pool() -> DbPool {
        let pool = create_in_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        migrations::run_migrations(
            &mut conn,
            &PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"),
        )
        .unwrap();
        drop(conn);
        pool
    }

    #[test]
    fn test_reads_back_stored_rows() {
        let pool = pool();
        {
            let conn = pool.get().unwrap();
            let property_id = properties::create_property(
                &conn,
                &NewProperty {
                    name: "Harbour View".into(),
                    purchase_price: Some(dec!(180000)),
                    current_value: None,
                    acquisition_date: NaiveDate::from_ymd_opt(2019, 4, 1),
                },
            )
            .unwrap();
            let category_id =
                categories::ensure_category(&conn, "Rent").unwrap();
            transactions::create_transaction(
                &conn,
                &NewTransaction {
                    date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    kind: TransactionType::Income,
                    amount: dec!(1250.50),
                    description: "March rent".into(),
                    property_id: Some(property_id),
                    category_id: Some(category_id),
                    recurring: true,
                },
            )
            .unwrap();
        }

        let ledger = SqliteLedger::new(pool).read_ledger().unwrap();
        assert_eq!(ledger.properties().len(), 1);
        let tx = &ledger.transactions()[0];
        assert_eq!(tx.amount, dec!(1250.50));
        assert_eq!(tx.category_name.as_deref(), Some("Rent"));
        assert!(tx.recurring);
        assert_eq!(
            ledger.property(tx.property_id.unwrap()).unwrap().purchase_price,
            Some(dec!(180000))
        );
    }

    #[test]
    fn test_malformed_row_fails_the_read() {
        let pool = pool();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO transactions (id, date, transaction_type, amount_cents)
                 VALUES (7, '2025-01-01', 'transfer', 100)",
                [],
            )
            .unwrap();

        let err = SqliteLedger::new(pool).read_ledger().unwrap_err();
        assert!(matches!(
            err,
            AppError::Report(ReportError::MalformedTransaction { id: 7, .. })
        ));
    }
}
