//! Node Identity Model.
//!
//! A row becomes a [`NodeIdentity`] (table plus primary key, the only thing equality and
//! hashing look at) and a [`NodePayload`] (the remaining column values, kept for display).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::PayloadFormat,
    errors::RowGraphError,
    row::RowRecord,
    value::{KeyValue, Scalar},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub table: String,
    pub primary_key: KeyValue,
}

impl NodeIdentity {
    pub fn new<T: Into<String>, K: Into<KeyValue>>(table: T, primary_key: K) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }

    /// `table.primary_key`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.primary_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
    fields: Vec<(String, Scalar)>,
}

impl NodePayload {
    pub fn new(fields: Vec<(String, Scalar)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, Scalar)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders at most `max_rows` `field:value` lines, each value cut to
    /// `max_row_length` characters, plus a trailer counting the omitted fields.
    pub fn format(&self, format: &PayloadFormat) -> String {
        let mut lines: Vec<String> = self
            .fields
            .iter()
            .take(format.max_rows)
            .map(|(name, value)| {
                let text: String = value.to_string().chars().take(format.max_row_length).collect();
                format!("{name}:{text}")
            })
            .collect();
        if self.fields.len() > format.max_rows {
            lines.push(format!(
                "...{} rows omitted.",
                self.fields.len() - format.max_rows
            ));
        }
        lines.join(&format.line_separator)
    }
}

pub fn identity_of(row: &RowRecord) -> Result<NodeIdentity, RowGraphError> {
    let key_columns = row.primary_key_columns();
    if key_columns.len() != 1 {
        return Err(RowGraphError::unsupported_key(
            row.table_name(),
            key_columns.iter().map(|(name, _)| *name),
        ));
    }
    let (column, value) = key_columns[0];
    let primary_key = value.as_key().ok_or_else(|| {
        RowGraphError::invalid_input(format!(
            "primary key {}.{column} holds {value}, which cannot identify a row",
            row.table_name()
        ))
    })?;
    Ok(NodeIdentity {
        table: row.table_name().to_string(),
        primary_key,
    })
}

pub fn payload_of(row: &RowRecord) -> NodePayload {
    let fields = row
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| !row.is_key_column(*idx))
        .map(|(_, (name, value))| (name.clone(), value.clone()))
        .collect();
    NodePayload { fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &str, key: &[&str], columns: &[(&str, Scalar)]) -> RowRecord {
        let columns = columns
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        RowRecord::new(table, columns, key).expect("row")
    }

    #[test]
    fn identity_uses_table_and_single_key() {
        let r = row(
            "table_b",
            &["id"],
            &[("id", Scalar::Integer(2)), ("a_id", Scalar::Integer(1))],
        );
        let identity = identity_of(&r).expect("identity");
        assert_eq!(identity, NodeIdentity::new("table_b", 2));
        assert_eq!(identity.label(), "table_b.2");
    }

    #[test]
    fn composite_key_is_rejected() {
        let r = row(
            "link",
            &["left_id", "right_id"],
            &[("left_id", Scalar::Integer(1)), ("right_id", Scalar::Integer(2))],
        );
        match identity_of(&r) {
            Err(RowGraphError::UnsupportedKey { table, columns }) => {
                assert_eq!(table, "link");
                assert_eq!(columns, vec!["left_id", "right_id"]);
            }
            other => panic!("expected UnsupportedKey, got {other:?}"),
        }
    }

    #[test]
    fn keyless_row_is_rejected() {
        let r = row("log", &[], &[("msg", Scalar::from("hi"))]);
        assert!(matches!(
            identity_of(&r),
            Err(RowGraphError::UnsupportedKey { .. })
        ));
    }

    #[test]
    fn null_key_is_invalid_input() {
        let r = row("t", &["id"], &[("id", Scalar::Null)]);
        assert!(matches!(identity_of(&r), Err(RowGraphError::InvalidInput(_))));
    }

    #[test]
    fn payload_skips_key_columns_and_keeps_order() {
        let r = row(
            "t",
            &["id"],
            &[
                ("name", Scalar::from("x")),
                ("id", Scalar::Integer(9)),
                ("score", Scalar::Real(1.5)),
            ],
        );
        let payload = payload_of(&r);
        let names: Vec<&str> = payload.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "score"]);
        assert!(!payload.is_empty());
        assert!(payload_of(&row("t", &["id"], &[("id", Scalar::Integer(1))])).is_empty());
    }

    #[test]
    fn payload_format_truncates_values_and_counts_omitted_rows() {
        let fields = (0..9)
            .map(|i| (format!("f{i}"), Scalar::Text("abcdefghij".repeat(3))))
            .collect();
        let payload = NodePayload::new(fields);
        let text = payload.format(&PayloadFormat::default());
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "f0:abcdefghijabcdefghijabcde");
        assert_eq!(lines[7], "...2 rows omitted.");
    }

    #[test]
    fn payload_format_honors_custom_separator() {
        let payload = NodePayload::new(vec![
            ("a".to_string(), Scalar::Integer(1)),
            ("b".to_string(), Scalar::Null),
        ]);
        let format = PayloadFormat {
            line_separator: "<br>".to_string(),
            ..PayloadFormat::default()
        };
        assert_eq!(payload.format(&format), "a:1<br>b:NULL");
    }
}
