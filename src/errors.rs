use thiserror::Error;

#[derive(Debug, Error)]
pub enum RowGraphError {
    #[error("unsupported primary key on {table}: expected exactly one column, found {columns:?}")]
    UnsupportedKey { table: String, columns: Vec<String> },
    #[error("row not found: {table}.{key}")]
    RowNotFound { table: String, key: String },
    #[error("relationship resolution error: {0}")]
    RelationshipResolution(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RowGraphError {
    pub fn unsupported_key<T, I, C>(table: T, columns: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        RowGraphError::UnsupportedKey {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn row_not_found<T: Into<String>, K: ToString>(table: T, key: K) -> Self {
        RowGraphError::RowNotFound {
            table: table.into(),
            key: key.to_string(),
        }
    }

    pub fn relationship<T: Into<String>>(msg: T) -> Self {
        RowGraphError::RelationshipResolution(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        RowGraphError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        RowGraphError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        RowGraphError::QueryError(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        RowGraphError::InvalidInput(msg.into())
    }
}
