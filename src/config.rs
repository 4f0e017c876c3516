//! Configuration for graph construction and payload rendering.
//!
//! [`BuildConfig`] controls how the builder walks the relational graph; it never changes
//! which nodes and edges end up in the result. [`PayloadFormat`] controls how a node's
//! payload is rendered for annotations.
//!
//! # Examples
//!
//! ```rust
//! use rowgraph::{BuildConfig, PayloadPolicy, TraversalOrder};
//!
//! let cfg = BuildConfig::default()
//!     .with_order(TraversalOrder::BreadthFirst)
//!     .with_payload_policy(PayloadPolicy::LastWins);
//! assert_eq!(cfg.order, TraversalOrder::BreadthFirst);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RowGraphError;

/// Worklist discipline used while expanding rows.
///
/// Both orders produce the same nodes and edges; they differ only in the sequence of
/// Row Accessor calls, which matters when watching logs or tuning fetch locality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalOrder {
    /// Expand the most recently discovered row first (stack).
    #[default]
    DepthFirst,
    /// Expand rows in discovery order (queue).
    BreadthFirst,
}

impl FromStr for TraversalOrder {
    type Err = RowGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" | "depth-first" => Ok(TraversalOrder::DepthFirst),
            "bfs" | "breadth-first" => Ok(TraversalOrder::BreadthFirst),
            other => Err(RowGraphError::invalid_input(format!(
                "unknown traversal order {other}"
            ))),
        }
    }
}

/// Which snapshot of a row's columns is kept when the same row is reached more than once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadPolicy {
    #[default]
    FirstWins,
    LastWins,
}

impl FromStr for PayloadPolicy {
    type Err = RowGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "first-wins" => Ok(PayloadPolicy::FirstWins),
            "last" | "last-wins" => Ok(PayloadPolicy::LastWins),
            other => Err(RowGraphError::invalid_input(format!(
                "unknown payload policy {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub order: TraversalOrder,
    pub payload_policy: PayloadPolicy,
}

impl BuildConfig {
    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_payload_policy(mut self, policy: PayloadPolicy) -> Self {
        self.payload_policy = policy;
        self
    }
}

/// Options for [`crate::NodePayload::format`].
///
/// # Default Configuration
///
/// ```rust
/// use rowgraph::PayloadFormat;
/// let format = PayloadFormat::default();
/// assert_eq!(format.max_row_length, 25);
/// assert_eq!(format.max_rows, 7);
/// assert_eq!(format.line_separator, "\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFormat {
    /// Characters kept from each value's string form.
    pub max_row_length: usize,
    /// `field:value` lines included before the omitted-rows trailer.
    pub max_rows: usize,
    pub line_separator: String,
}

impl Default for PayloadFormat {
    fn default() -> Self {
        Self {
            max_row_length: 25,
            max_rows: 7,
            line_separator: "\n".to_string(),
        }
    }
}
