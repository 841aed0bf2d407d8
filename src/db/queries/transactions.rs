use rusqlite::{params, Connection};
use tracing::{debug, trace};

use super::{from_cents, to_cents};
use crate::models::{NewTransaction, TransactionRecord};

/// Every stored transaction with its category name, unvalidated. Rows that
/// fail to decode abort the read instead of being skipped.
pub fn list_transaction_records(conn: &Connection) -> rusqlite::Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, t.transaction_type, t.amount_cents, t.description,
                t.property_id, t.category_id, c.name AS category_name, t.recurring
         FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         ORDER BY t.date, t.id",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(TransactionRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                kind: row.get(2)?,
                amount: row.get::<_, Option<i64>>(3)?.map(from_cents),
                description: row.get(4)?,
                property_id: row.get(5)?,
                category_id: row.get(6)?,
                category_name: row.get(7)?,
                recurring: row.get(8)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = records.len(), "Listed transaction records");
    Ok(records)
}

pub fn create_transaction(conn: &Connection, tx: &NewTransaction) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO transactions
            (date, transaction_type, amount_cents, description, property_id, category_id, recurring)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            tx.date.format("%Y-%m-%d").to_string(),
            tx.kind.as_str(),
            to_cents(tx.amount)?,
            tx.description,
            tx.property_id,
            tx.category_id,
            tx.recurring,
        ],
    )?;
    let id = conn.last_insert_rowid();
    trace!(transaction_id = id, "Created transaction");
    Ok(id)
}
