//! Row Accessor contract: the read-only view of storage the graph builder walks.
//!
//! A [`RowAccessor`] resolves a `(table, primary key)` pair to a [`RowRecord`] and, for
//! any record it produced, lists the record's relationships with the related rows
//! already resolved. [`crate::sqlite::SqliteRowAccessor`] implements it over a
//! rusqlite connection; tests implement it over scripted data.

use serde::{Deserialize, Serialize};

use crate::{
    errors::RowGraphError,
    value::{KeyValue, Scalar},
};

/// One materialized row: its table, its columns in declared order, and which of
/// those columns form the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    table: String,
    columns: Vec<(String, Scalar)>,
    primary_key: Vec<usize>,
}

impl RowRecord {
    /// Fails when a primary-key column is not among `columns`.
    pub fn new<T: Into<String>>(
        table: T,
        columns: Vec<(String, Scalar)>,
        primary_key: &[&str],
    ) -> Result<Self, RowGraphError> {
        let table = table.into();
        let mut indices = Vec::with_capacity(primary_key.len());
        for name in primary_key {
            let idx = columns
                .iter()
                .position(|(column, _)| column == name)
                .ok_or_else(|| {
                    RowGraphError::invalid_input(format!(
                        "primary key column {name} missing from row of {table}"
                    ))
                })?;
            indices.push(idx);
        }
        Ok(Self {
            table,
            columns,
            primary_key: indices,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Primary-key columns with their values, in key order.
    pub fn primary_key_columns(&self) -> Vec<(&str, &Scalar)> {
        self.primary_key
            .iter()
            .map(|&idx| {
                let (name, value) = &self.columns[idx];
                (name.as_str(), value)
            })
            .collect()
    }

    pub fn columns(&self) -> &[(String, Scalar)] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub(crate) fn is_key_column(&self, idx: usize) -> bool {
        self.primary_key.contains(&idx)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Many-to-one: the row holds a foreign key to at most one related row.
    ToOne,
    /// One-to-many: other rows hold foreign keys pointing at this row.
    ToMany,
}

/// A declared relationship of one row together with its resolved related rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDescriptor {
    pub name: String,
    pub kind: RelationshipKind,
    pub target_table: String,
    pub rows: Vec<RowRecord>,
}

impl RelationshipDescriptor {
    pub fn to_one<N: Into<String>, T: Into<String>>(
        name: N,
        target_table: T,
        row: Option<RowRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationshipKind::ToOne,
            target_table: target_table.into(),
            rows: row.into_iter().collect(),
        }
    }

    pub fn to_many<N: Into<String>, T: Into<String>>(
        name: N,
        target_table: T,
        rows: Vec<RowRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationshipKind::ToMany,
            target_table: target_table.into(),
            rows,
        }
    }

    /// Checks the descriptor against its declared shape and hands back the related rows.
    pub fn resolve(self) -> Result<Vec<RowRecord>, RowGraphError> {
        if self.kind == RelationshipKind::ToOne && self.rows.len() > 1 {
            return Err(RowGraphError::relationship(format!(
                "to-one relationship {} resolved to {} rows",
                self.name,
                self.rows.len()
            )));
        }
        if let Some(stray) = self
            .rows
            .iter()
            .find(|row| row.table_name() != self.target_table)
        {
            return Err(RowGraphError::relationship(format!(
                "relationship {} targets {} but yielded a row of {}",
                self.name,
                self.target_table,
                stray.table_name()
            )));
        }
        Ok(self.rows)
    }
}

pub trait RowAccessor {
    fn fetch(&self, table: &str, key: &KeyValue) -> Result<RowRecord, RowGraphError>;
    /// Every relationship of `row`, with related rows resolved, in a stable order.
    fn relationships(
        &self,
        row: &RowRecord,
    ) -> Result<Vec<RelationshipDescriptor>, RowGraphError>;
}

impl<'a, A> RowAccessor for &'a A
where
    A: RowAccessor + ?Sized,
{
    fn fetch(&self, table: &str, key: &KeyValue) -> Result<RowRecord, RowGraphError> {
        (*self).fetch(table, key)
    }

    fn relationships(
        &self,
        row: &RowRecord,
    ) -> Result<Vec<RelationshipDescriptor>, RowGraphError> {
        (*self).relationships(row)
    }
}
