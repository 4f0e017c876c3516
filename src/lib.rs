//! Relationship graphs of database rows.
//!
//! Starting from one seed row, [`GraphBuilder`] follows foreign keys in both directions
//! until it has every row the seed transitively relates to, and returns them as an
//! undirected [`RowGraph`] keyed by `(table, primary key)` identities.
//!
//! ```rust
//! use rowgraph::{GraphBuilder, KeyValue, fixture, structural_signature};
//!
//! let accessor = fixture::demo_accessor()?;
//! let graph = GraphBuilder::new(&accessor).build("table_a", &KeyValue::from(1))?;
//! assert_eq!(
//!     structural_signature(&graph),
//!     "N[table_a.1,table_b.1,table_b.2]|E[table_a.1--table_b.1,table_a.1--table_b.2]"
//! );
//! # Ok::<(), rowgraph::RowGraphError>(())
//! ```

pub mod builder;
pub mod config;
pub mod errors;
pub mod export;
#[cfg(feature = "sqlite-backend")]
pub mod fixture;
pub mod graph;
pub mod identity;
pub mod row;
#[cfg(feature = "sqlite-backend")]
pub mod schema;
#[cfg(feature = "sqlite-backend")]
pub mod sqlite;
pub mod value;

pub use crate::builder::{BuildStats, GraphBuilder, build_graph};
pub use crate::config::{BuildConfig, PayloadFormat, PayloadPolicy, TraversalOrder};
pub use crate::errors::RowGraphError;
pub use crate::export::{GraphExport, structural_signature};
pub use crate::graph::{Edge, RowGraph};
pub use crate::identity::{NodeIdentity, NodePayload, identity_of, payload_of};
pub use crate::row::{RelationshipDescriptor, RelationshipKind, RowAccessor, RowRecord};
#[cfg(feature = "sqlite-backend")]
pub use crate::sqlite::SqliteRowAccessor;
pub use crate::value::{KeyValue, Scalar};
