use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::{from_cents, to_cents};
use crate::models::{NewProperty, Property};

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    let acquisition_date: Option<String> = row.get(4)?;
    Ok(Property {
        id: row.get(0)?,
        name: row.get(1)?,
        purchase_price: row.get::<_, Option<i64>>(2)?.map(from_cents),
        current_value: row.get::<_, Option<i64>>(3)?.map(from_cents),
        acquisition_date: acquisition_date
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?,
    })
}

pub fn list_properties(conn: &Connection) -> rusqlite::Result<Vec<Property>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, purchase_price_cents, current_value_cents, acquisition_date
         FROM properties
         ORDER BY id",
    )?;

    let properties = stmt
        .query_map([], property_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = properties.len(), "Listed properties");
    Ok(properties)
}

pub fn create_property(conn: &Connection, property: &NewProperty) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO properties (name, purchase_price_cents, current_value_cents, acquisition_date)
         VALUES (?, ?, ?, ?)",
        params![
            property.name,
            property.purchase_price.map(to_cents).transpose()?,
            property.current_value.map(to_cents).transpose()?,
            property
                .acquisition_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(property_id = id, "Created property");
    Ok(id)
}
