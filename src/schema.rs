//! Reflection of a SQLite schema into the tables, keys and foreign keys the row
//! accessor needs.

use std::collections::BTreeMap;

use ahash::AHashMap;
use rusqlite::{Connection, params};

use crate::errors::RowGraphError;

const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
const COLUMNS_SQL: &str = "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid";
const FOREIGN_KEYS_SQL: &str = "SELECT id, seq, \"table\", \"from\", \"to\" \
     FROM pragma_foreign_key_list(?1) ORDER BY id, seq";

/// One foreign-key constraint: `table(columns)` references `referenced_table(referenced_columns)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub id: i64,
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// SQLite column affinity, derived from the declared type the way SQLite does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl Affinity {
    pub fn of_declared(declared: &str) -> Self {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            Affinity::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
            Affinity::Text
        } else if declared.is_empty() || declared.contains("BLOB") {
            Affinity::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| declared.contains(t)) {
            Affinity::Real
        } else {
            Affinity::Numeric
        }
    }

    /// Integer, real and numeric columns convert numeric-looking text on comparison.
    pub fn is_numeric(self) -> bool {
        matches!(self, Affinity::Integer | Affinity::Real | Affinity::Numeric)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
    /// Affinity of each entry in `columns`.
    pub affinities: Vec<Affinity>,
    /// Primary-key columns in key order; empty for rowid-only tables.
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    pub fn affinity(&self, column: &str) -> Option<Affinity> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.affinities[idx])
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableSchema>,
    referenced_by: AHashMap<String, Vec<ForeignKey>>,
}

impl SchemaCatalog {
    pub fn reflect(conn: &Connection) -> Result<Self, RowGraphError> {
        let mut tables = BTreeMap::new();
        for name in table_names(conn)? {
            let (columns, affinities, primary_key) = table_columns(conn, &name)?;
            let foreign_keys = raw_foreign_keys(conn, &name)?;
            tables.insert(
                name.clone(),
                TableSchema {
                    name,
                    columns,
                    affinities,
                    primary_key,
                    foreign_keys,
                },
            );
        }

        let snapshot = tables.clone();
        let mut referenced_by: AHashMap<String, Vec<ForeignKey>> = AHashMap::new();
        for table in tables.values_mut() {
            let declared = std::mem::take(&mut table.foreign_keys);
            for fk in declared {
                if let Some(fk) = complete_foreign_key(fk, &snapshot) {
                    referenced_by
                        .entry(fk.referenced_table.clone())
                        .or_default()
                        .push(fk.clone());
                    table.foreign_keys.push(fk);
                }
            }
        }
        log::debug!("reflected {} tables", tables.len());
        Ok(Self {
            tables,
            referenced_by,
        })
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&TableSchema, RowGraphError> {
        self.table(name)
            .ok_or_else(|| RowGraphError::invalid_input(format!("unknown table {name}")))
    }

    /// Foreign keys of any table, in table-name then constraint order, that point at `table`.
    pub fn referencing(&self, table: &str) -> &[ForeignKey] {
        self.referenced_by
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Quotes an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_names(conn: &Connection) -> Result<Vec<String>, RowGraphError> {
    let mut stmt = conn
        .prepare(TABLES_SQL)
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let mut names = Vec::new();
    for name in rows {
        names.push(name.map_err(|e| RowGraphError::schema(e.to_string()))?);
    }
    Ok(names)
}

fn table_columns(
    conn: &Connection,
    table: &str,
) -> Result<(Vec<String>, Vec<Affinity>, Vec<String>), RowGraphError> {
    let mut stmt = conn
        .prepare(COLUMNS_SQL)
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let rows = stmt
        .query_map(params![table], |row| {
            let name: String = row.get(0)?;
            let declared: Option<String> = row.get(1)?;
            let pk: i64 = row.get(2)?;
            Ok((name, declared, pk))
        })
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let mut columns = Vec::new();
    let mut affinities = Vec::new();
    let mut keyed = Vec::new();
    for row in rows {
        let (name, declared, pk) = row.map_err(|e| RowGraphError::schema(e.to_string()))?;
        if pk > 0 {
            keyed.push((pk, name.clone()));
        }
        columns.push(name);
        affinities.push(Affinity::of_declared(declared.as_deref().unwrap_or_default()));
    }
    keyed.sort_unstable();
    let primary_key = keyed.into_iter().map(|(_, name)| name).collect();
    Ok((columns, affinities, primary_key))
}

/// Foreign keys as declared; `referenced_columns` may hold empty names where the
/// declaration relied on the parent's primary key.
fn raw_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKey>, RowGraphError> {
    let mut stmt = conn
        .prepare(FOREIGN_KEYS_SQL)
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let rows = stmt
        .query_map(params![table], |row| {
            let id: i64 = row.get(0)?;
            let parent: String = row.get(2)?;
            let from: String = row.get(3)?;
            let to: Option<String> = row.get(4)?;
            Ok((id, parent, from, to))
        })
        .map_err(|e| RowGraphError::schema(e.to_string()))?;
    let mut keys: Vec<ForeignKey> = Vec::new();
    for row in rows {
        let (id, parent, from, to) = row.map_err(|e| RowGraphError::schema(e.to_string()))?;
        let to = to.unwrap_or_default();
        match keys.last_mut() {
            Some(fk) if fk.id == id => {
                fk.columns.push(from);
                fk.referenced_columns.push(to);
            }
            _ => keys.push(ForeignKey {
                id,
                table: table.to_string(),
                columns: vec![from],
                referenced_table: parent,
                referenced_columns: vec![to],
            }),
        }
    }
    Ok(keys)
}

fn complete_foreign_key(
    mut fk: ForeignKey,
    tables: &BTreeMap<String, TableSchema>,
) -> Option<ForeignKey> {
    let Some(parent) = tables.get(&fk.referenced_table) else {
        log::warn!(
            "ignoring foreign key {}({}) to missing table {}",
            fk.table,
            fk.columns.join(","),
            fk.referenced_table
        );
        return None;
    };
    if fk.referenced_columns.iter().all(String::is_empty) {
        fk.referenced_columns = parent.primary_key.clone();
    }
    if fk.referenced_columns.len() != fk.columns.len()
        || fk.referenced_columns.iter().any(String::is_empty)
    {
        log::warn!(
            "ignoring foreign key {}({}) whose columns do not line up with {}",
            fk.table,
            fk.columns.join(","),
            fk.referenced_table
        );
        return None;
    }
    Some(fk)
}
