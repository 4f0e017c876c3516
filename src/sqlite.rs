//! Row Accessor over a rusqlite connection.
//!
//! Relationships come straight from declared foreign keys: each foreign key on the row's
//! own table is a to-one relationship (named after the referenced table), and each
//! foreign key elsewhere that points at the row's table is a to-many relationship
//! named `{child}_collection`.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, params_from_iter};

use crate::{
    errors::RowGraphError,
    row::{RelationshipDescriptor, RelationshipKind, RowAccessor, RowRecord},
    schema::{ForeignKey, SchemaCatalog, TableSchema, quote_ident},
    value::{KeyValue, Scalar},
};

pub struct SqliteRowAccessor {
    conn: Connection,
    catalog: SchemaCatalog,
}

impl SqliteRowAccessor {
    /// Opens an existing database read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RowGraphError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| RowGraphError::connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Takes over a connection and reflects its schema once.
    pub fn from_connection(conn: Connection) -> Result<Self, RowGraphError> {
        let catalog = SchemaCatalog::reflect(&conn)?;
        Ok(Self { conn, catalog })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Types a key typed as text by the affinity of `table`'s primary-key column.
    ///
    /// Text and blob keys are taken verbatim, so `0150` stays `'0150'` instead of
    /// becoming the integer 150. Tables without a single-column key fall back to
    /// [`KeyValue::parse`] and are rejected later by `fetch`.
    pub fn parse_key(&self, table: &str, input: &str) -> Result<KeyValue, RowGraphError> {
        let schema = self.catalog.require(table)?;
        let affinity = match schema.primary_key.as_slice() {
            [column] => schema.affinity(column),
            _ => None,
        };
        Ok(match affinity {
            Some(affinity) if !affinity.is_numeric() => KeyValue::Text(input.to_string()),
            _ => KeyValue::parse(input),
        })
    }

    fn select_rows(
        &self,
        schema: &TableSchema,
        filter: &[String],
        values: &[Scalar],
    ) -> Result<Vec<RowRecord>, RowGraphError> {
        let sql = select_sql(schema, filter);
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| RowGraphError::query(e.to_string()))?;
        let width = schema.columns.len();
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                let mut columns = Vec::with_capacity(width);
                for idx in 0..width {
                    columns.push(Scalar::from(row.get_ref(idx)?));
                }
                Ok(columns)
            })
            .map_err(|e| RowGraphError::query(e.to_string()))?;
        let key: Vec<&str> = schema.primary_key.iter().map(String::as_str).collect();
        let mut records = Vec::new();
        for row in rows {
            let values = row.map_err(|e| RowGraphError::query(e.to_string()))?;
            let columns = schema.columns.iter().cloned().zip(values).collect();
            records.push(RowRecord::new(schema.name.as_str(), columns, &key)?);
        }
        Ok(records)
    }

    fn parent_of(
        &self,
        row: &RowRecord,
        fk: &ForeignKey,
    ) -> Result<RelationshipDescriptor, RowGraphError> {
        let values = column_values(row, &fk.columns)?;
        if values.iter().any(Scalar::is_null) {
            log::debug!(
                "{}({}) is NULL on a row of {}, no related row",
                fk.table,
                fk.columns.join(","),
                row.table_name()
            );
            return Ok(RelationshipDescriptor::to_one(
                fk.referenced_table.as_str(),
                fk.referenced_table.as_str(),
                None,
            ));
        }
        let parent = self.catalog.require(&fk.referenced_table)?;
        let rows = self.select_rows(parent, &fk.referenced_columns, &values)?;
        if rows.is_empty() {
            return Err(RowGraphError::row_not_found(
                fk.referenced_table.as_str(),
                join_values(&values),
            ));
        }
        Ok(RelationshipDescriptor {
            name: fk.referenced_table.clone(),
            kind: RelationshipKind::ToOne,
            target_table: fk.referenced_table.clone(),
            rows,
        })
    }

    fn children_of(
        &self,
        row: &RowRecord,
        fk: &ForeignKey,
    ) -> Result<RelationshipDescriptor, RowGraphError> {
        let name = format!("{}_collection", fk.table);
        let values = column_values(row, &fk.referenced_columns)?;
        if values.iter().any(Scalar::is_null) {
            return Ok(RelationshipDescriptor::to_many(name, fk.table.as_str(), Vec::new()));
        }
        let child = self.catalog.require(&fk.table)?;
        let rows = self.select_rows(child, &fk.columns, &values)?;
        Ok(RelationshipDescriptor::to_many(name, fk.table.as_str(), rows))
    }
}

impl RowAccessor for SqliteRowAccessor {
    fn fetch(&self, table: &str, key: &KeyValue) -> Result<RowRecord, RowGraphError> {
        let schema = self.catalog.require(table)?;
        if schema.primary_key.len() != 1 {
            return Err(RowGraphError::unsupported_key(
                table,
                schema.primary_key.iter().cloned(),
            ));
        }
        let values = [Scalar::from(key.clone())];
        self.select_rows(schema, &schema.primary_key, &values)?
            .into_iter()
            .next()
            .ok_or_else(|| RowGraphError::row_not_found(table, key))
    }

    fn relationships(
        &self,
        row: &RowRecord,
    ) -> Result<Vec<RelationshipDescriptor>, RowGraphError> {
        let schema = self.catalog.require(row.table_name())?;
        let mut descriptors = Vec::new();
        for fk in &schema.foreign_keys {
            descriptors.push(self.parent_of(row, fk)?);
        }
        for fk in self.catalog.referencing(row.table_name()) {
            descriptors.push(self.children_of(row, fk)?);
        }
        Ok(descriptors)
    }
}

fn select_sql(schema: &TableSchema, filter: &[String]) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let predicate = filter
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("{} = ?{}", quote_ident(c), idx + 1))
        .collect::<Vec<_>>()
        .join(" AND ");
    let order = if schema.primary_key.is_empty() {
        "rowid".to_string()
    } else {
        schema
            .primary_key
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "SELECT {columns} FROM {} WHERE {predicate} ORDER BY {order}",
        quote_ident(&schema.name)
    )
}

fn column_values(row: &RowRecord, columns: &[String]) -> Result<Vec<Scalar>, RowGraphError> {
    columns
        .iter()
        .map(|column| {
            row.get(column).cloned().ok_or_else(|| {
                RowGraphError::relationship(format!(
                    "row of {} has no column {column}",
                    row.table_name()
                ))
            })
        })
        .collect()
}

fn join_values(values: &[Scalar]) -> String {
    values
        .iter()
        .map(Scalar::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
