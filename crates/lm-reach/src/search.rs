//! The label-correcting reachability search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use lm_core::{Cost, EdgeId, LabelId, NodeId};
use lm_network::{Direction, RoutingGraph};

use crate::admission::Admission;
use crate::label::{IsoLabel, TraversalId, TraversalMode};
use crate::{ReachError, ReachResult};

/// Single-use, label-correcting Dijkstra over a [`RoutingGraph`].
///
/// # Storage
///
/// Labels live in an index-addressed arena (`labels`) with a parallel
/// `deleted` flag array.  The priority queue and the traversal-id map only
/// hold [`LabelId`]s, so neither aliases a label.  A superseded label is
/// flagged `deleted` and skipped when popped (lazy deletion); settled labels
/// are flagged too, so every traversal id is emitted at most once.
///
/// # Single use
///
/// A search instance runs exactly one [`search`](Self::search).  The arena
/// is kept afterwards for inspection via [`labels`](Self::labels); a second
/// call returns [`ReachError::AlreadySearched`].
pub struct ReachabilitySearch<'g, G: RoutingGraph, A: Admission<G>> {
    graph:        &'g G,
    admission:    A,
    direction:    Direction,
    traversal:    TraversalMode,
    labels:       Vec<IsoLabel>,
    deleted:      Vec<bool>,
    by_traversal: FxHashMap<TraversalId, LabelId>,
    heap:         BinaryHeap<Reverse<(Cost, LabelId)>>,
    searched:     bool,
}

impl<'g, G: RoutingGraph, A: Admission<G>> ReachabilitySearch<'g, G, A> {
    /// Node-based search in `direction` gated by `admission`.
    pub fn new(graph: &'g G, admission: A, direction: Direction) -> Self {
        Self {
            graph,
            admission,
            direction,
            traversal:    TraversalMode::default(),
            labels:       Vec::new(),
            deleted:      Vec::new(),
            by_traversal: FxHashMap::default(),
            heap:         BinaryHeap::new(),
            searched:     false,
        }
    }

    pub fn traversal_mode(mut self, mode: TraversalMode) -> Self {
        self.traversal = mode;
        self
    }

    /// Every label created so far, indexed by `LabelId`.  Includes labels
    /// that were superseded or never admitted.
    pub fn labels(&self) -> &[IsoLabel] {
        &self.labels
    }

    pub fn label(&self, id: LabelId) -> &IsoLabel {
        &self.labels[id.index()]
    }

    /// Run the search from `start`, calling `consumer(label, parent)` for
    /// every settled label in non-decreasing weight order.  The root label
    /// is emitted first, with no parent.
    ///
    /// Returns the number of emitted labels.
    pub fn search<F>(&mut self, start: NodeId, mut consumer: F) -> ReachResult<usize>
    where
        F: FnMut(&IsoLabel, Option<&IsoLabel>),
    {
        if self.searched {
            return Err(ReachError::AlreadySearched);
        }
        self.searched = true;
        if start.index() >= self.graph.node_count() {
            return Err(ReachError::NodeNotFound(start));
        }

        let root = self.push_label(start, EdgeId::INVALID, 0.0, 0.0, 0.0, None);
        if self.traversal == TraversalMode::NodeBased {
            self.by_traversal.insert(TraversalId::Node(start), root);
        }
        self.heap.push(Reverse((Cost(0.0), root)));

        let mut emitted = 0usize;
        while let Some(Reverse((_, id))) = self.heap.pop() {
            if self.deleted[id.index()] {
                continue;
            }
            self.deleted[id.index()] = true;

            let label = self.labels[id.index()];
            let parent = label.parent.map(|p| &self.labels[p.index()]);
            consumer(&label, parent);
            emitted += 1;

            self.expand(&label);
        }

        tracing::debug!(
            %start,
            direction = ?self.direction,
            emitted,
            created = self.labels.len(),
            "reachability search finished"
        );
        Ok(emitted)
    }

    fn expand(&mut self, label: &IsoLabel) {
        let graph = self.graph;
        let direction = self.direction;

        for edge in graph.edges(label.node, direction) {
            let edge_weight = graph.edge_weight(edge);
            if !edge_weight.is_finite() {
                continue;
            }
            let turn = if label.edge.is_valid() {
                match direction {
                    Direction::Forward => graph.turn_cost(label.edge, edge, label.node),
                    Direction::Reverse => graph.turn_cost(edge, label.edge, label.node),
                }
            } else {
                0.0
            };
            if !turn.is_finite() {
                continue;
            }

            let node = graph.edge_adjacent(edge, direction);
            let weight = label.weight + edge_weight + turn;
            let key = self.traversal.traversal_id(node, edge);

            if let Some(&existing) = self.by_traversal.get(&key) {
                let existing = existing.index();
                if self.labels[existing].weight > weight {
                    self.deleted[existing] = true;
                } else {
                    continue;
                }
            }

            let id = self.push_label(
                node,
                edge,
                weight,
                label.time + graph.edge_time(edge) + turn,
                label.distance + graph.edge_distance(edge),
                Some(label.id),
            );
            self.by_traversal.insert(key, id);

            if self.admission.admit(graph, edge, label, &self.labels[id.index()]) {
                self.heap.push(Reverse((Cost(weight), id)));
            }
        }
    }

    fn push_label(
        &mut self,
        node:     NodeId,
        edge:     EdgeId,
        weight:   f64,
        time:     f64,
        distance: f64,
        parent:   Option<LabelId>,
    ) -> LabelId {
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(IsoLabel { id, node, edge, weight, time, distance, parent });
        self.deleted.push(false);
        id
    }
}
