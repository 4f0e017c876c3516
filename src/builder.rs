//! Graph Builder: walks relationships outward from a seed row.
//!
//! Every row is expanded at most once. An identity enters the visited set the moment it
//! is scheduled, so two relationships of the same row that reach the same unvisited row
//! schedule it once; both still contribute their (deduplicated) edge. Any error from the
//! accessor or from identity derivation aborts the build and the partial graph is dropped.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::{
    config::{BuildConfig, TraversalOrder},
    errors::RowGraphError,
    graph::RowGraph,
    identity::{NodeIdentity, identity_of, payload_of},
    row::{RowAccessor, RowRecord},
    value::KeyValue,
};

/// Counters collected during one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Rows whose relationships were enumerated.
    pub rows_expanded: usize,
    /// Relationship descriptors examined across all expanded rows.
    pub relationships_followed: usize,
    /// Related rows encountered, counting repeats.
    pub candidates_seen: usize,
    /// Encounters of rows that were already scheduled or expanded.
    pub duplicate_discoveries: usize,
}

pub struct GraphBuilder<A> {
    accessor: A,
    config: BuildConfig,
}

impl<A> GraphBuilder<A>
where
    A: RowAccessor,
{
    pub fn new(accessor: A) -> Self {
        Self::with_config(accessor, BuildConfig::default())
    }

    pub fn with_config(accessor: A, config: BuildConfig) -> Self {
        Self { accessor, config }
    }

    pub fn build(&self, table: &str, primary_key: &KeyValue) -> Result<RowGraph, RowGraphError> {
        self.build_with_stats(table, primary_key)
            .map(|(graph, _)| graph)
    }

    pub fn build_with_stats(
        &self,
        table: &str,
        primary_key: &KeyValue,
    ) -> Result<(RowGraph, BuildStats), RowGraphError> {
        let seed_row = self.accessor.fetch(table, primary_key)?;
        let seed = identity_of(&seed_row)?;
        log::info!("building relationship graph from {seed}");

        let policy = self.config.payload_policy;
        let mut graph = RowGraph::new(seed.clone());
        graph.set_payload(&seed, payload_of(&seed_row), policy);

        let mut stats = BuildStats::default();
        let mut visited = AHashSet::new();
        visited.insert(seed.clone());
        let mut worklist = Worklist::new(self.config.order);
        worklist.extend(vec![(seed_row, seed)]);

        while let Some((row, current)) = worklist.pop() {
            stats.rows_expanded += 1;
            let candidates = self.related_rows(&row, &mut stats)?;
            log::debug!(
                "expanding {current}: {} related rows, {} rows pending",
                candidates.len(),
                worklist.len()
            );
            stats.candidates_seen += candidates.len();

            let mut unvisited = Vec::new();
            for (related, related_id) in candidates {
                graph.set_payload(&related_id, payload_of(&related), policy);
                graph.add_edge(current.clone(), related_id.clone());
                if visited.insert(related_id.clone()) {
                    unvisited.push((related, related_id));
                } else {
                    stats.duplicate_discoveries += 1;
                }
            }
            worklist.extend(unvisited);
        }

        log::info!(
            "relationship graph for {} has {} nodes and {} edges",
            graph.seed(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok((graph, stats))
    }

    fn related_rows(
        &self,
        row: &RowRecord,
        stats: &mut BuildStats,
    ) -> Result<Vec<(RowRecord, NodeIdentity)>, RowGraphError> {
        let mut candidates = Vec::new();
        for descriptor in self.accessor.relationships(row)? {
            stats.relationships_followed += 1;
            for related in descriptor.resolve()? {
                let identity = identity_of(&related)?;
                candidates.push((related, identity));
            }
        }
        Ok(candidates)
    }
}

/// Builds with the default configuration.
pub fn build_graph<A: RowAccessor>(
    accessor: A,
    table: &str,
    primary_key: &KeyValue,
) -> Result<RowGraph, RowGraphError> {
    GraphBuilder::new(accessor).build(table, primary_key)
}

struct Worklist {
    order: TraversalOrder,
    items: VecDeque<(RowRecord, NodeIdentity)>,
}

impl Worklist {
    fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            items: VecDeque::new(),
        }
    }

    /// Keeps sibling discovery order in both disciplines: the first-found sibling is
    /// the next one expanded under depth-first.
    fn extend(&mut self, items: Vec<(RowRecord, NodeIdentity)>) {
        match self.order {
            TraversalOrder::DepthFirst => self.items.extend(items.into_iter().rev()),
            TraversalOrder::BreadthFirst => self.items.extend(items),
        }
    }

    fn pop(&mut self) -> Option<(RowRecord, NodeIdentity)> {
        match self.order {
            TraversalOrder::DepthFirst => self.items.pop_back(),
            TraversalOrder::BreadthFirst => self.items.pop_front(),
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
