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

//! One-to-many Dijkstra used by the Contractor to decide whether a candidate
//! shortcut has a witness: a path around the node being contracted that is
//! already at least as short. The search is capped at the weight of the
//! longest candidate shortcut, and stops as soon as every goal has settled,
//! since nothing beyond that limit could invalidate a shortcut anyway.

use std::collections::BinaryHeap;

use crate::constants::{NodeId, Weight, WEIGHT_MAX};
use crate::edge_filter::EdgeLevelFilter;
use crate::heap_item::HeapItem;
use crate::level_graph::LevelGraph;
use crate::valid_flags::ValidFlags;

pub struct Goal {
    pub end_node: NodeId,
    pub original_edges: u32,
    pub distance_via: Weight,
}

pub struct WitnessResult {
    pub end_node: NodeId,
    pub weight: Weight,
}

/// Reusable workspace for repeated witness searches against the same graph.
/// `dist`/`valid` are allocated once for `num_nodes` and reset in O(1) via
/// `ValidFlags` rather than reallocated per search.
pub struct WitnessSearch {
    dist: Vec<Weight>,
    valid: ValidFlags,
    heap: BinaryHeap<HeapItem>,
}

impl WitnessSearch {
    pub fn new(num_nodes: usize) -> Self {
        WitnessSearch {
            dist: vec![WEIGHT_MAX; num_nodes],
            valid: ValidFlags::new(num_nodes),
            heap: BinaryHeap::new(),
        }
    }

    fn get(&self, node: NodeId) -> Weight {
        if self.valid.is_valid(node) {
            self.dist[node]
        } else {
            WEIGHT_MAX
        }
    }

    fn update(&mut self, node: NodeId, weight: Weight) {
        self.dist[node] = weight;
        self.valid.set_valid(node);
    }

    /// Runs Dijkstra from `source` over the subgraph of uncontracted nodes,
    /// excluding `skip_node`, until every goal has settled at least once or
    /// the next settle would exceed `limit`. Goals not reached within the
    /// limit are reported with weight `WEIGHT_MAX`.
    pub fn search(
        &mut self,
        graph: &LevelGraph,
        source: NodeId,
        goals: &[Goal],
        limit: Weight,
        skip_node: NodeId,
    ) -> Vec<WitnessResult> {
        self.valid.invalidate_all();
        self.heap.clear();
        self.update(source, 0.0);
        self.heap.push(HeapItem::new(0.0, source));

        let filter = EdgeLevelFilter::with_skip(skip_node);
        let mut remaining: Vec<NodeId> = goals.iter().map(|g| g.end_node).collect();

        while let Some(item) = self.heap.pop() {
            if item.weight > self.get(item.node_id) {
                continue; // stale entry, already settled with a lower weight
            }
            if item.weight > limit {
                break;
            }
            for edge in graph.out_edges(item.node_id) {
                if !filter.accepts(graph, edge) {
                    continue;
                }
                let new_weight = item.weight + edge.distance;
                if new_weight < self.get(edge.adj_node) {
                    self.update(edge.adj_node, new_weight);
                    self.heap.push(HeapItem::new(new_weight, edge.adj_node));
                }
            }
            remaining.retain(|&n| n != item.node_id);
            if remaining.is_empty() {
                break;
            }
        }

        goals
            .iter()
            .map(|g| WitnessResult {
                end_node: g.end_node,
                weight: self.get(g.end_node),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INVALID_NODE;
    use crate::input_graph::InputGraph;

    fn build(edges: &[(NodeId, NodeId, Weight)]) -> LevelGraph {
        let mut g = InputGraph::new();
        for &(from, to, distance) in edges {
            g.add_edge(from, to, distance);
        }
        g.freeze();
        LevelGraph::from_input_graph(&g)
    }

    #[test]
    fn finds_witness_within_limit() {
        let graph = build(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let mut ws = WitnessSearch::new(graph.num_nodes());
        let goals = vec![Goal {
            end_node: 2,
            original_edges: 1,
            distance_via: 2.0,
        }];
        let results = ws.search(&graph, 0, &goals, 2.0, INVALID_NODE);
        assert_eq!(results[0].weight, 2.0);
    }

    #[test]
    fn respects_weight_limit() {
        let graph = build(&[(0, 1, 1.0), (1, 2, 10.0)]);
        let mut ws = WitnessSearch::new(graph.num_nodes());
        let goals = vec![Goal {
            end_node: 2,
            original_edges: 1,
            distance_via: 2.0,
        }];
        let results = ws.search(&graph, 0, &goals, 2.0, INVALID_NODE);
        assert_eq!(results[0].weight, WEIGHT_MAX);
    }

    #[test]
    fn avoids_skip_node() {
        // only path from 0 to 2 goes through 1, which is excluded
        let graph = build(&[(0, 1, 1.0), (1, 2, 1.0)]);
        let mut ws = WitnessSearch::new(graph.num_nodes());
        let goals = vec![Goal {
            end_node: 2,
            original_edges: 1,
            distance_via: 2.0,
        }];
        let results = ws.search(&graph, 0, &goals, 2.0, 1);
        assert_eq!(results[0].weight, WEIGHT_MAX);
    }

    #[test]
    fn stops_once_all_goals_settled() {
        let graph = build(&[(0, 1, 1.0), (0, 2, 1.0), (0, 3, 100.0)]);
        let mut ws = WitnessSearch::new(graph.num_nodes());
        let goals = vec![
            Goal {
                end_node: 1,
                original_edges: 1,
                distance_via: 5.0,
            },
            Goal {
                end_node: 2,
                original_edges: 1,
                distance_via: 5.0,
            },
        ];
        let results = ws.search(&graph, 0, &goals, 100.0, INVALID_NODE);
        assert_eq!(results[0].weight, 1.0);
        assert_eq!(results[1].weight, 1.0);
    }
}
