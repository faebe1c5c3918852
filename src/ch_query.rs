/*
 * Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

//! Bidirectional, level-aware Dijkstra over a contracted `LevelGraph`. Both
//! searches only ever relax an edge leading to a strictly higher level than
//! the node being settled, which is what lets the search meet in the middle
//! without ever having to consider more than a small upward fan of each
//! direction's hierarchy.

use std::collections::BinaryHeap;
use std::sync::Arc;

use log::warn;

use crate::constants::{NodeId, Weight, INVALID_NODE, WEIGHT_MAX, WEIGHT_ZERO};
use crate::error::{Error, Result};
use crate::heap_item::HeapItem;
use crate::level_graph::{Edge, LevelGraph};
use crate::shortest_path::ShortestPath;
use crate::valid_flags::ValidFlags;
use crate::weight_calc::WeightCalc;

struct QueryData {
    weight: Vec<Weight>,
    parent: Vec<NodeId>,
    valid: ValidFlags,
    heap: BinaryHeap<HeapItem>,
}

impl QueryData {
    fn new(num_nodes: usize) -> Self {
        QueryData {
            weight: vec![WEIGHT_MAX; num_nodes],
            parent: vec![INVALID_NODE; num_nodes],
            valid: ValidFlags::new(num_nodes),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self, source: NodeId) {
        self.valid.invalidate_all();
        self.heap.clear();
        self.weight[source] = WEIGHT_ZERO;
        self.parent[source] = INVALID_NODE;
        self.valid.set_valid(source);
        self.heap.push(HeapItem::new(WEIGHT_ZERO, source));
    }

    fn get_weight(&self, node: NodeId) -> Weight {
        if self.valid.is_valid(node) {
            self.weight[node]
        } else {
            WEIGHT_MAX
        }
    }

    fn update(&mut self, node: NodeId, weight: Weight, parent: NodeId) {
        self.weight[node] = weight;
        self.parent[node] = parent;
        self.valid.set_valid(node);
        self.heap.push(HeapItem::new(weight, node));
    }
}

/// A reusable bidirectional query over a fixed `LevelGraph`. Constructing one
/// allocates its per-direction workspaces once; `calc_path` can then be
/// called repeatedly with different source/target pairs.
pub struct CHQuery {
    graph: Arc<LevelGraph>,
    weight_calc: Box<dyn WeightCalc>,
    fwd: QueryData,
    bwd: QueryData,
}

impl CHQuery {
    pub fn new(graph: Arc<LevelGraph>, weight_calc: Box<dyn WeightCalc>) -> Self {
        let num_nodes = graph.num_nodes();
        CHQuery {
            graph,
            weight_calc,
            fwd: QueryData::new(num_nodes),
            bwd: QueryData::new(num_nodes),
        }
    }

    /// Always fails: a query's weighting is fixed at construction because the
    /// hierarchy's edge weights were already baked in by `prepareEdges` under
    /// the original weighting, and silently swapping it here would produce
    /// results inconsistent with the graph the query runs over.
    pub fn set_weighting(&mut self, _weight_calc: &dyn WeightCalc) -> Result<()> {
        warn!("rejected attempt to change a CHQuery's weighting after construction");
        Err(Error::UnsupportedQueryReconfiguration)
    }

    pub fn calc_path(&mut self, source: NodeId, target: NodeId) -> ShortestPath {
        if source == target {
            return ShortestPath::singular(source);
        }

        self.fwd.reset(source);
        self.bwd.reset(target);

        let mut best_weight = WEIGHT_MAX;
        let mut meeting_node = INVALID_NODE;

        loop {
            let fwd_done = self
                .fwd
                .heap
                .peek()
                .map(|item| item.weight >= best_weight)
                .unwrap_or(true);
            let bwd_done = self
                .bwd
                .heap
                .peek()
                .map(|item| item.weight >= best_weight)
                .unwrap_or(true);
            if fwd_done && bwd_done {
                break;
            }

            if !fwd_done {
                if let Some(item) = self.fwd.heap.pop() {
                    if item.weight <= self.fwd.get_weight(item.node_id) {
                        self.relax(item, true);
                        let bwd_weight = self.bwd.get_weight(item.node_id);
                        if bwd_weight != WEIGHT_MAX {
                            let combined = item.weight + bwd_weight;
                            if combined < best_weight {
                                best_weight = combined;
                                meeting_node = item.node_id;
                            }
                        }
                    }
                }
            }

            if !bwd_done {
                if let Some(item) = self.bwd.heap.pop() {
                    if item.weight <= self.bwd.get_weight(item.node_id) {
                        self.relax(item, false);
                        let fwd_weight = self.fwd.get_weight(item.node_id);
                        if fwd_weight != WEIGHT_MAX {
                            let combined = item.weight + fwd_weight;
                            if combined < best_weight {
                                best_weight = combined;
                                meeting_node = item.node_id;
                            }
                        }
                    }
                }
            }
        }

        if meeting_node == INVALID_NODE {
            return ShortestPath::none(source, target);
        }

        let mut nodes = vec![source];
        let mut total_distance = WEIGHT_ZERO;

        let mut fwd_chain = Vec::new();
        let mut cur = meeting_node;
        while cur != INVALID_NODE {
            fwd_chain.push(cur);
            cur = self.fwd.parent[cur];
        }
        fwd_chain.reverse();
        for pair in fwd_chain.windows(2) {
            self.unroll(pair[0], pair[1], &mut nodes, &mut total_distance);
        }
        // `nodes` now ends with `meeting_node` (or is just `[source]` if they coincide).

        let mut cur = meeting_node;
        loop {
            let next = self.bwd.parent[cur];
            if next == INVALID_NODE {
                break;
            }
            self.unroll(cur, next, &mut nodes, &mut total_distance);
            cur = next;
        }

        ShortestPath::new(source, target, best_weight, total_distance, nodes)
    }

    /// Finds the shortest path from any of `sources` to `target`, returning
    /// whichever one wins. A plain wrapper over repeated `calc_path` calls;
    /// the per-direction workspaces still amortise across the repeats.
    pub fn calc_path_multiple_sources(
        &mut self,
        sources: &[NodeId],
        target: NodeId,
    ) -> ShortestPath {
        let mut best: Option<ShortestPath> = None;
        for &source in sources {
            let candidate = self.calc_path(source, target);
            best = match best {
                Some(current) if current.is_found() && current.get_weight() <= candidate.get_weight() => {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best.unwrap_or_else(|| ShortestPath::none(INVALID_NODE, target))
    }

    fn relax(&mut self, item: HeapItem, forward: bool) {
        let cur_level = self.graph.level(item.node_id);
        let edges: &[Edge] = if forward {
            self.graph.out_edges(item.node_id)
        } else {
            self.graph.in_edges(item.node_id)
        };
        let data = if forward { &mut self.fwd } else { &mut self.bwd };
        for edge in edges {
            if self.graph.level(edge.adj_node) <= cur_level {
                continue;
            }
            let candidate = item.weight + edge.distance;
            if candidate < data.get_weight(edge.adj_node) {
                data.update(edge.adj_node, candidate, item.node_id);
            }
        }
    }

    /// Expands the arc `from -> to` (found in the original direction of
    /// travel) into the original edges it stands for, pushing every
    /// intermediate node onto `nodes` and summing the reverted physical
    /// distance of each leaf edge into `total_distance`. `from` must already
    /// be the last node pushed onto `nodes` by the caller.
    fn unroll(&self, from: NodeId, to: NodeId, nodes: &mut Vec<NodeId>, total_distance: &mut Weight) {
        let edge = find_out_edge(&self.graph, from, to)
            .expect("query path referenced an edge that does not exist in the graph");
        if edge.is_shortcut() {
            self.unroll(from, edge.skipped_node, nodes, total_distance);
            self.unroll(edge.skipped_node, to, nodes, total_distance);
        } else {
            *total_distance += self.weight_calc.revert(edge.distance, edge.flags);
            nodes.push(to);
        }
    }
}

fn find_out_edge(graph: &LevelGraph, from: NodeId, to: NodeId) -> Option<Edge> {
    graph
        .out_edges(from)
        .iter()
        .find(|e| e.adj_node == to)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contractor::prepare;
    use crate::input_graph::InputGraph;
    use crate::weight_calc::ShortestWeighting;

    fn query_over(input: &InputGraph) -> CHQuery {
        let graph = prepare(input, &ShortestWeighting).unwrap();
        CHQuery::new(Arc::new(graph), Box::new(ShortestWeighting))
    }

    #[test]
    fn finds_shortest_path_on_a_line() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 1, 1.0);
        input.add_edge_bidir(1, 2, 1.0);
        input.add_edge_bidir(2, 3, 1.0);
        input.freeze();

        let mut query = query_over(&input);
        let path = query.calc_path(0, 3);
        assert!(path.is_found());
        assert_eq!(path.get_weight(), 3.0);
        assert_eq!(path.get_nodes(), &vec![0, 1, 2, 3]);
    }

    #[test]
    fn prefers_the_shorter_of_two_routes() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 1, 10.0);
        input.add_edge_bidir(1, 3, 10.0);
        input.add_edge_bidir(0, 2, 1.0);
        input.add_edge_bidir(2, 3, 1.0);
        input.freeze();

        let mut query = query_over(&input);
        let path = query.calc_path(0, 3);
        assert_eq!(path.get_weight(), 2.0);
        assert_eq!(path.get_nodes(), &vec![0, 2, 3]);
    }

    #[test]
    fn reports_no_path_between_disconnected_nodes() {
        let mut input = InputGraph::new();
        input.add_edge(0, 1, 1.0);
        input.add_edge(2, 3, 1.0);
        input.freeze();

        let mut query = query_over(&input);
        let path = query.calc_path(0, 3);
        assert!(!path.is_found());
    }

    #[test]
    fn source_equals_target_is_trivially_found() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 1, 1.0);
        input.freeze();

        let mut query = query_over(&input);
        let path = query.calc_path(0, 0);
        assert_eq!(path.get_weight(), 0.0);
        assert_eq!(path.get_nodes(), &vec![0]);
    }

    #[test]
    fn multiple_sources_picks_the_closest() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 2, 5.0);
        input.add_edge_bidir(1, 2, 1.0);
        input.freeze();

        let mut query = query_over(&input);
        let path = query.calc_path_multiple_sources(&[0, 1], 2);
        assert_eq!(path.get_source(), 1);
        assert_eq!(path.get_weight(), 1.0);
    }

    #[test]
    fn set_weighting_is_rejected() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 1, 1.0);
        input.freeze();
        let mut query = query_over(&input);
        let err = query.set_weighting(&ShortestWeighting).unwrap_err();
        assert!(matches!(err, Error::UnsupportedQueryReconfiguration));
    }
}
