//! The two-table demo dataset: one `table_a` row referenced by two `table_b` rows.

use rusqlite::Connection;

use crate::{errors::RowGraphError, sqlite::SqliteRowAccessor};

pub const DEMO_TABLE: &str = "table_a";
pub const DEMO_KEY: i64 = 1;

pub fn seed_demo(conn: &Connection) -> Result<(), RowGraphError> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS table_a (
            id    INTEGER PRIMARY KEY,
            name  TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS table_b (
            id         INTEGER PRIMARY KEY,
            table_a_id INTEGER NOT NULL REFERENCES table_a(id),
            note       TEXT
        );
        INSERT INTO table_a(id, name) VALUES (1, 'first a');
        INSERT INTO table_b(id, table_a_id, note) VALUES (1, 1, 'first b');
        INSERT INTO table_b(id, table_a_id, note) VALUES (2, 1, 'second b');
        "#,
    )
    .map_err(|e| RowGraphError::schema(e.to_string()))?;
    Ok(())
}

/// An in-memory database holding the demo dataset.
pub fn demo_accessor() -> Result<SqliteRowAccessor, RowGraphError> {
    let conn =
        Connection::open_in_memory().map_err(|e| RowGraphError::connection(e.to_string()))?;
    seed_demo(&conn)?;
    SqliteRowAccessor::from_connection(conn)
}
