use std::collections::{BTreeSet, VecDeque};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::{
    config::{PayloadFormat, PayloadPolicy},
    identity::{NodeIdentity, NodePayload},
};

/// Undirected edge; endpoints are stored smaller-first so `(a, b)` and `(b, a)` coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    low: NodeIdentity,
    high: NodeIdentity,
}

impl Edge {
    pub fn new(a: NodeIdentity, b: NodeIdentity) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn endpoints(&self) -> (&NodeIdentity, &NodeIdentity) {
        (&self.low, &self.high)
    }

    pub fn is_self_loop(&self) -> bool {
        self.low == self.high
    }

    /// The endpoint opposite `node`, if `node` is on this edge.
    pub fn other(&self, node: &NodeIdentity) -> Option<&NodeIdentity> {
        if &self.low == node {
            Some(&self.high)
        } else if &self.high == node {
            Some(&self.low)
        } else {
            None
        }
    }
}

/// The relationship graph of one seed row.
///
/// Node and edge sets are ordered so iteration is deterministic. Payloads live in a
/// side table keyed by identity and play no part in membership.
#[derive(Debug, Clone)]
pub struct RowGraph {
    seed: NodeIdentity,
    nodes: BTreeSet<NodeIdentity>,
    edges: BTreeSet<Edge>,
    adjacency: AHashMap<NodeIdentity, BTreeSet<NodeIdentity>>,
    payloads: AHashMap<NodeIdentity, NodePayload>,
}

impl RowGraph {
    pub fn new(seed: NodeIdentity) -> Self {
        let mut graph = Self {
            seed: seed.clone(),
            nodes: BTreeSet::new(),
            edges: BTreeSet::new(),
            adjacency: AHashMap::new(),
            payloads: AHashMap::new(),
        };
        graph.add_node(seed);
        graph
    }

    /// Returns `true` when the node was not present yet.
    pub fn add_node(&mut self, node: NodeIdentity) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.adjacency.entry(node.clone()).or_default();
        self.nodes.insert(node)
    }

    /// Adds both endpoints if missing. Returns `true` when the edge is new.
    pub fn add_edge(&mut self, a: NodeIdentity, b: NodeIdentity) -> bool {
        self.add_node(a.clone());
        self.add_node(b.clone());
        let edge = Edge::new(a.clone(), b.clone());
        if !self.edges.insert(edge) {
            return false;
        }
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
        true
    }

    pub fn set_payload(
        &mut self,
        node: &NodeIdentity,
        payload: NodePayload,
        policy: PayloadPolicy,
    ) {
        match policy {
            PayloadPolicy::FirstWins => {
                self.payloads.entry(node.clone()).or_insert(payload);
            }
            PayloadPolicy::LastWins => {
                self.payloads.insert(node.clone(), payload);
            }
        }
    }

    pub fn seed(&self) -> &NodeIdentity {
        &self.seed
    }

    pub fn contains(&self, node: &NodeIdentity) -> bool {
        self.nodes.contains(node)
    }

    pub fn contains_edge(&self, a: &NodeIdentity, b: &NodeIdentity) -> bool {
        self.adjacency
            .get(a)
            .map(|neighbors| neighbors.contains(b))
            .unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeIdentity> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Distinct neighbours in identity order; a self-loop lists the node itself.
    pub fn neighbors(&self, node: &NodeIdentity) -> Vec<&NodeIdentity> {
        self.adjacency
            .get(node)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    pub fn degree(&self, node: &NodeIdentity) -> usize {
        self.adjacency.get(node).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn payload(&self, node: &NodeIdentity) -> Option<&NodePayload> {
        self.payloads.get(node)
    }

    pub fn label(&self, node: &NodeIdentity) -> String {
        node.label()
    }

    /// Formatted payload, or `(no data)` when none was captured.
    pub fn describe(&self, node: &NodeIdentity, format: &PayloadFormat) -> String {
        match self.payloads.get(node) {
            Some(payload) => payload.format(format),
            None => "(no data)".to_string(),
        }
    }

    /// Distinct table names present, e.g. for colouring nodes by table.
    pub fn tables(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|node| node.table.as_str()).collect()
    }

    /// Every node is reachable from the seed.
    pub fn is_connected(&self) -> bool {
        let mut seen = AHashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(&self.seed);
        queue.push_back(&self.seed);
        while let Some(node) = queue.pop_front() {
            if let Some(neighbors) = self.adjacency.get(node) {
                for next in neighbors {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen.len() == self.nodes.len()
    }
}

impl PartialEq for RowGraph {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.nodes == other.nodes
            && self.edges == other.edges
            && self
                .nodes
                .iter()
                .all(|node| self.payloads.get(node) == other.payloads.get(node))
    }
}
