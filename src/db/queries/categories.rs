use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub fn find_category_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM categories WHERE name = ?",
        [name],
        |row| row.get(0),
    )
    .optional()
}

/// Returns the id of the category with `name`, creating it when missing.
pub fn ensure_category(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    if let Some(id) = find_category_by_name(conn, name)? {
        return Ok(id);
    }

    conn.execute("INSERT INTO categories (name) VALUES (?)", params![name])?;
    let id = conn.last_insert_rowid();
    debug!(category_id = id, name = %name, "Created category");
    Ok(id)
}
