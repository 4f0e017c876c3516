use serde::{Deserialize, Serialize};

use crate::{
    config::PayloadFormat,
    errors::RowGraphError,
    graph::RowGraph,
    value::{KeyValue, Scalar},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedNode {
    /// `table.primary_key`
    pub id: String,
    pub table: String,
    pub primary_key: KeyValue,
    pub payload: Vec<(String, Scalar)>,
    /// Label followed by the formatted payload.
    pub annotation: String,
}

/// Serializable snapshot of a [`RowGraph`] for drawing tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub seed: String,
    pub tables: Vec<String>,
    pub nodes: Vec<ExportedNode>,
    pub edges: Vec<(String, String)>,
}

impl GraphExport {
    pub fn from_graph(graph: &RowGraph, format: &PayloadFormat) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                let label = graph.label(node);
                let annotation = format!(
                    "{label}{}{}",
                    format.line_separator,
                    graph.describe(node, format)
                );
                ExportedNode {
                    id: label,
                    table: node.table.clone(),
                    primary_key: node.primary_key.clone(),
                    payload: graph
                        .payload(node)
                        .map(|p| p.fields().to_vec())
                        .unwrap_or_default(),
                    annotation,
                }
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| {
                let (a, b) = edge.endpoints();
                (graph.label(a), graph.label(b))
            })
            .collect();
        Self {
            seed: graph.label(graph.seed()),
            tables: graph.tables().into_iter().map(str::to_string).collect(),
            nodes,
            edges,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, RowGraphError> {
        serde_json::to_string_pretty(self).map_err(|e| RowGraphError::invalid_input(e.to_string()))
    }
}

/// `N[labels]|E[a--b,...]` over the ordered node and edge sets.
pub fn structural_signature(graph: &RowGraph) -> String {
    let node_str = graph
        .nodes()
        .map(|node| graph.label(node))
        .collect::<Vec<_>>()
        .join(",");
    let edge_str = graph
        .edges()
        .map(|edge| {
            let (a, b) = edge.endpoints();
            format!("{a}--{b}")
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("N[{node_str}]|E[{edge_str}]")
}
