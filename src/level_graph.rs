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

//! The mutable, weighted, directed graph the Contractor and CHQuery both
//! operate on. Unlike a plain adjacency list, every node also carries a
//! *level* (0 = uncontracted) and every edge carries the bookkeeping a
//! shortcut needs: how many original edges it stands for, and which node (if
//! any) it was built by skipping.
//!
//! Edges are never physically removed once a node is contracted. Traversal
//! code is expected to consult `level` itself (via `EdgeLevelFilter` during
//! preprocessing, or the upward-only check in `CHQuery`) rather than relying
//! on the adjacency lists shrinking.

use serde::{Deserialize, Serialize};

use crate::constants::{NodeId, Weight, INVALID_NODE};
use crate::flags::{self, Flags};
use crate::input_graph::InputGraph;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub adj_node: NodeId,
    pub distance: Weight,
    pub flags: Flags,
    pub original_edges: u32,
    pub skipped_node: NodeId,
}

impl Edge {
    pub fn is_shortcut(&self) -> bool {
        self.skipped_node != INVALID_NODE
    }

    fn original(adj_node: NodeId, distance: Weight, flags: Flags) -> Self {
        Edge {
            adj_node,
            distance,
            flags,
            original_edges: 1,
            skipped_node: INVALID_NODE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelGraph {
    out_edges: Vec<Vec<Edge>>,
    in_edges: Vec<Vec<Edge>>,
    levels: Vec<u32>,
}

impl LevelGraph {
    pub fn new(num_nodes: usize) -> Self {
        LevelGraph {
            out_edges: vec![Vec::new(); num_nodes],
            in_edges: vec![Vec::new(); num_nodes],
            levels: vec![0; num_nodes],
        }
    }

    /// Builds a fresh LevelGraph from a frozen InputGraph. Every edge starts
    /// out carrying its physical distance in `distance` (the overlay-weight
    /// rewrite happens later, in `prepareEdges`), `original_edges = 1` and no
    /// skipped node.
    pub fn from_input_graph(input: &InputGraph) -> Self {
        let mut graph = LevelGraph::new(input.get_num_nodes());
        for edge in input.get_edges() {
            graph.out_edges[edge.from].push(Edge::original(edge.to, edge.distance, edge.flags));
            graph.in_edges[edge.to].push(Edge::original(edge.from, edge.distance, edge.flags));
        }
        graph
    }

    pub fn num_nodes(&self) -> usize {
        self.levels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.out_edges.iter().map(Vec::len).sum()
    }

    pub fn out_edges(&self, node: NodeId) -> &[Edge] {
        &self.out_edges[node]
    }

    pub fn in_edges(&self, node: NodeId) -> &[Edge] {
        &self.in_edges[node]
    }

    pub fn out_edges_mut(&mut self, node: NodeId) -> &mut [Edge] {
        &mut self.out_edges[node]
    }

    pub fn in_edges_mut(&mut self, node: NodeId) -> &mut [Edge] {
        &mut self.in_edges[node]
    }

    /// Undirected degree: the count the priority heuristic calls `deg`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.out_edges[node].len() + self.in_edges[node].len()
    }

    pub fn level(&self, node: NodeId) -> u32 {
        self.levels[node]
    }

    pub fn set_level(&mut self, node: NodeId, level: u32) {
        self.levels[node] = level;
    }

    /// Installs a new shortcut edge `from -> to`. If `flags` mark it
    /// bidirectional, the reverse arc `to -> from` is installed too, since
    /// query-time traversal only ever walks one direction's adjacency list
    /// at a time and a bidirectional shortcut must be reachable from either
    /// endpoint.
    pub fn shortcut(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: Weight,
        flags: Flags,
        skipped_node: NodeId,
        original_edges: u32,
    ) {
        let edge = Edge {
            adj_node: to,
            distance: weight,
            flags,
            original_edges,
            skipped_node,
        };
        self.out_edges[from].push(edge);
        self.in_edges[to].push(Edge {
            adj_node: from,
            ..edge
        });

        if flags::is_bidirectional(flags) {
            let rev = Edge {
                adj_node: from,
                distance: weight,
                flags,
                original_edges,
                skipped_node,
            };
            self.out_edges[to].push(rev);
            self.in_edges[from].push(Edge {
                adj_node: to,
                ..rev
            });
        }
    }

    /// Tries to upgrade an existing shortcut `from -> to` in place rather
    /// than installing a new parallel edge, as required by `addShortcuts`.
    /// Only ever touches a shortcut edge (`skipped_node` set) whose flags are
    /// compatible and whose stored distance is strictly worse than the
    /// candidate. Returns whether an edge was upgraded.
    pub fn overwrite_if_better(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: Weight,
        flags: Flags,
        skipped_node: NodeId,
        original_edges: u32,
    ) -> bool {
        let upgraded = self.out_edges[from].iter_mut().find(|e| {
            e.adj_node == to
                && e.is_shortcut()
                && crate::flags::can_be_overwritten(e.flags, flags)
                && e.distance > weight
        });
        let Some(edge) = upgraded else {
            return false;
        };
        edge.distance = weight;
        edge.flags = flags;
        edge.skipped_node = skipped_node;
        edge.original_edges = original_edges;

        if let Some(mirror) = self.in_edges[to].iter_mut().find(|e| e.adj_node == from) {
            mirror.distance = weight;
            mirror.flags = flags;
            mirror.skipped_node = skipped_node;
            mirror.original_edges = original_edges;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_input() -> InputGraph {
        let mut g = InputGraph::new();
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, 1.0);
        g.freeze();
        g
    }

    #[test]
    fn builds_mirrored_adjacency_from_input_graph() {
        let graph = LevelGraph::from_input_graph(&small_input());
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.out_edges(0).len(), 1);
        assert_eq!(graph.in_edges(1).len(), 1);
        assert_eq!(graph.out_edges(0)[0].adj_node, 1);
        assert_eq!(graph.in_edges(1)[0].adj_node, 0);
    }

    #[test]
    fn one_way_shortcut_installs_single_direction() {
        let mut graph = LevelGraph::new(3);
        graph.shortcut(0, 2, 2.0, flags::SHORTCUT_ONE_DIRECTION, 1, 2);
        assert_eq!(graph.out_edges(0).len(), 1);
        assert_eq!(graph.out_edges(2).len(), 0);
        assert_eq!(graph.in_edges(2).len(), 1);
    }

    #[test]
    fn bidirectional_shortcut_installs_both_directions() {
        let mut graph = LevelGraph::new(3);
        graph.shortcut(0, 2, 2.0, flags::SHORTCUT_BOTH_DIRECTIONS, 1, 2);
        assert_eq!(graph.out_edges(0).len(), 1);
        assert_eq!(graph.out_edges(2).len(), 1);
        assert_eq!(graph.out_edges(2)[0].adj_node, 0);
    }

    #[test]
    fn overwrite_if_better_upgrades_both_sides() {
        let mut graph = LevelGraph::new(3);
        graph.shortcut(0, 2, 5.0, flags::SHORTCUT_ONE_DIRECTION, 1, 2);
        let upgraded =
            graph.overwrite_if_better(0, 2, 3.0, flags::SHORTCUT_ONE_DIRECTION, 5, 4);
        assert!(upgraded);
        assert_eq!(graph.out_edges(0)[0].distance, 3.0);
        assert_eq!(graph.out_edges(0)[0].skipped_node, 5);
        assert_eq!(graph.in_edges(2)[0].distance, 3.0);
    }

    #[test]
    fn overwrite_if_better_refuses_worse_or_original_edges() {
        let mut graph = LevelGraph::new(3);
        graph.out_edges[0].push(Edge::original(2, 1.0, flags::default_forward()));
        assert!(!graph.overwrite_if_better(0, 2, 0.5, flags::SHORTCUT_ONE_DIRECTION, 1, 2));

        graph.shortcut(0, 1, 2.0, flags::SHORTCUT_ONE_DIRECTION, 9, 2);
        assert!(!graph.overwrite_if_better(0, 1, 4.0, flags::SHORTCUT_ONE_DIRECTION, 5, 4));
    }
}
