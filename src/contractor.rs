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

//! Node contraction: assigns every node a level and, in doing so, inserts the
//! shortcuts that let `CHQuery` skip over contracted nodes entirely.
//!
//! `prepare_edges` rewrites physical distances into overlay weights exactly
//! once, up front. `Contractor::new` seeds a priority queue from the initial
//! heuristic; `Contractor::run` repeatedly pulls the lowest-priority node,
//! lazily re-checks its priority against a fresh recompute, and either
//! contracts it or reinserts it with the corrected value. A second call to
//! `run` on the same `Contractor` finds an empty queue and returns
//! immediately, which is what makes contraction idempotent.

use std::collections::HashMap;

use log::debug;

use crate::constants::{NodeId, Weight};
use crate::error::{Error, Result};
use crate::flags::{self, Flags};
use crate::input_graph::InputGraph;
use crate::level_graph::LevelGraph;
use crate::prio_queue::PrioQueue;
use crate::weight_calc::WeightCalc;
use crate::witness_search::{Goal, WitnessSearch};

/// How often (in contracted nodes) the whole queue gets its priorities
/// recomputed from scratch, rather than relying on the lazy neighbour-only
/// updates. Keeps priorities from drifting too far from the true value as
/// contraction proceeds, without paying the cost of a full refresh every step.
const PERIODIC_UPDATE_DIVISOR: usize = 10;
const MIN_UPDATE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy)]
struct PendingShortcut {
    from: NodeId,
    to: NodeId,
    weight: Weight,
    flags: Flags,
    original_edges: u32,
}

/// Rewrites every edge's `distance` in place from a physical quantity to the
/// `weight_calc`'s overlay weight. Must run exactly once, before any node is
/// contracted, since `add_shortcuts` composes weights assuming they are
/// already in overlay units.
pub fn prepare_edges(graph: &mut LevelGraph, weight_calc: &dyn WeightCalc) -> Result<()> {
    if graph.num_edges() == 0 {
        return Err(Error::EmptyGraph);
    }
    for node in 0..graph.num_nodes() {
        for edge in graph.out_edges_mut(node) {
            edge.distance = weight_calc.weight(edge.distance, edge.flags);
        }
        for edge in graph.in_edges_mut(node) {
            edge.distance = weight_calc.weight(edge.distance, edge.flags);
        }
    }
    Ok(())
}

pub struct Contractor {
    priorities: Vec<i64>,
    queue: PrioQueue,
    witness_search: WitnessSearch,
    pending: HashMap<u64, PendingShortcut>,
    update_size: usize,
    update_tick: usize,
}

impl Contractor {
    /// Computes an initial priority for every node and seeds the queue. Does
    /// not contract anything; call `run` to actually do the work.
    pub fn new(graph: &LevelGraph) -> Result<Self> {
        let num_nodes = graph.num_nodes();
        if num_nodes == 0 {
            return Err(Error::EmptyPriorityQueue);
        }
        let mut contractor = Contractor {
            priorities: vec![0; num_nodes],
            queue: PrioQueue::new(),
            witness_search: WitnessSearch::new(num_nodes),
            pending: HashMap::new(),
            update_size: std::cmp::max(MIN_UPDATE_SIZE, num_nodes / PERIODIC_UPDATE_DIVISOR),
            update_tick: 0,
        };
        for node in 0..num_nodes {
            let priority = contractor.calculate_priority(graph, node)?;
            contractor.priorities[node] = priority;
            contractor.queue.insert(node, priority);
        }
        Ok(contractor)
    }

    /// Runs the main contraction loop to completion, assigning every node a
    /// level from 1 upward in the order it was contracted. Returns the number
    /// of nodes contracted in this call (zero if the queue was already empty,
    /// e.g. on a repeated call).
    pub fn run(&mut self, graph: &mut LevelGraph) -> Result<usize> {
        let mut level = 1u32;
        let mut contracted = 0usize;

        while let Some(node) = self.queue.poll_key() {
            let fresh_priority = self.calculate_priority(graph, node)?;
            if let Some(next_lowest) = self.queue.peek_value() {
                if fresh_priority > next_lowest {
                    self.queue.insert(node, fresh_priority);
                    continue;
                }
            }

            let num_shortcuts = self.add_shortcuts(graph, node)?;
            graph.set_level(node, level);
            level += 1;
            contracted += 1;
            debug!(
                "contracted node {} at level {} ({} shortcuts added)",
                node, level - 1, num_shortcuts
            );

            if contracted % self.update_size == 0 {
                self.update_tick += 1;
                if self.update_tick % 2 == 0 {
                    self.refresh_all_priorities(graph, contracted)?;
                } else {
                    self.refresh_neighbour_priorities(graph, node)?;
                }
            } else {
                self.refresh_neighbour_priorities(graph, node)?;
            }
        }
        Ok(contracted)
    }

    fn refresh_neighbour_priorities(&mut self, graph: &LevelGraph, node: NodeId) -> Result<()> {
        let mut neighbours: Vec<NodeId> = graph
            .out_edges(node)
            .iter()
            .chain(graph.in_edges(node).iter())
            .map(|e| e.adj_node)
            .filter(|&n| graph.level(n) == 0)
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        for neighbour in neighbours {
            let priority = self.calculate_priority(graph, neighbour)?;
            let old = self.priorities[neighbour];
            self.priorities[neighbour] = priority;
            self.queue.update(neighbour, old, priority);
        }
        Ok(())
    }

    fn refresh_all_priorities(&mut self, graph: &LevelGraph, contracted: usize) -> Result<()> {
        debug!(
            "periodic full priority refresh at {} contracted nodes, {} remaining in queue",
            contracted,
            self.queue.len()
        );
        for node in 0..graph.num_nodes() {
            if graph.level(node) != 0 {
                continue;
            }
            let priority = self.calculate_priority(graph, node)?;
            let old = self.priorities[node];
            self.priorities[node] = priority;
            self.queue.update(node, old, priority);
        }
        Ok(())
    }

    /// `2*edgeDifference + 4*originalEdges + contractedNeighbours`, where
    /// `edgeDifference` is the number of shortcuts a contraction of `v` would
    /// add minus the number of edges it would remove, `originalEdges` is the
    /// number of original (non-shortcut) edges incident to `v`, and
    /// `contractedNeighbours` is the number of edges incident to `v` that are
    /// themselves shortcuts (i.e. lead to a neighbour reached via an
    /// already-installed shortcut).
    fn calculate_priority(&mut self, graph: &LevelGraph, v: NodeId) -> Result<i64> {
        let shortcuts = self.find_shortcuts(graph, v)?;
        let edge_difference = shortcuts.len() as i64 - graph.degree(v) as i64;

        let incident_edges = graph.out_edges(v).iter().chain(graph.in_edges(v).iter());
        let mut original_edges: u32 = 0;
        let mut contracted_neighbours: i64 = 0;
        for edge in incident_edges {
            if edge.is_shortcut() {
                contracted_neighbours += 1;
            } else {
                original_edges += edge.original_edges;
            }
        }

        Ok(2 * edge_difference + 4 * original_edges as i64 + contracted_neighbours)
    }

    /// Finds the shortcuts that contracting `v` would require, without
    /// mutating the graph. For every pair of an incoming and an outgoing
    /// uncontracted edge at `v`, runs a witness search from the source of the
    /// incoming edge (skipping `v`) and only proposes a shortcut if no
    /// witness path is at least as short as going through `v`.
    fn find_shortcuts(&mut self, graph: &LevelGraph, v: NodeId) -> Result<Vec<PendingShortcut>> {
        self.pending.clear();
        let n = graph.num_nodes() as u64;

        let incoming: Vec<_> = graph
            .in_edges(v)
            .iter()
            .filter(|e| e.adj_node != v && graph.level(e.adj_node) == 0)
            .copied()
            .collect();
        let outgoing: Vec<_> = graph
            .out_edges(v)
            .iter()
            .filter(|e| e.adj_node != v && graph.level(e.adj_node) == 0)
            .copied()
            .collect();

        for in_edge in &incoming {
            let u = in_edge.adj_node;
            let goals: Vec<Goal> = outgoing
                .iter()
                .filter(|out_edge| out_edge.adj_node != u)
                .map(|out_edge| Goal {
                    end_node: out_edge.adj_node,
                    original_edges: in_edge.original_edges + out_edge.original_edges,
                    distance_via: in_edge.distance + out_edge.distance,
                })
                .collect();
            if goals.is_empty() {
                continue;
            }
            let limit = goals
                .iter()
                .map(|g| g.distance_via)
                .fold(0.0_f64, Weight::max);

            let results = self.witness_search.search(graph, u, &goals, limit, v);
            for (goal, result) in goals.iter().zip(results.iter()) {
                if result.weight <= goal.distance_via {
                    continue; // a witness beats or ties the shortcut, no need for it
                }
                self.register_pending(
                    n,
                    u,
                    goal.end_node,
                    goal.distance_via,
                    goal.original_edges,
                )?;
            }
        }

        Ok(self.pending.values().copied().collect())
    }

    /// Merges a candidate shortcut `u -> w` into the pending map, keyed on
    /// `u * n + w` so the opposite direction `w -> u` collides into a
    /// bidirectional entry when both arise from the same contraction.
    fn register_pending(
        &mut self,
        n: u64,
        u: NodeId,
        w: NodeId,
        weight: Weight,
        original_edges: u32,
    ) -> Result<()> {
        let key = u as u64 * n + w as u64;
        let rev_key = w as u64 * n + u as u64;

        let have_fwd = self.pending.contains_key(&key);
        let have_rev = self.pending.contains_key(&rev_key);

        if have_fwd && have_rev {
            return Err(Error::DuplicateShortcut(u, w));
        } else if have_rev {
            let rev = self.pending.get_mut(&rev_key).unwrap();
            if rev.weight == weight {
                rev.flags = flags::SHORTCUT_BOTH_DIRECTIONS;
            }
            // if the distances differ the witness with the shorter weight
            // already dominates; nothing to merge.
        } else {
            self.pending.insert(
                key,
                PendingShortcut {
                    from: u,
                    to: w,
                    weight,
                    flags: flags::SHORTCUT_ONE_DIRECTION,
                    original_edges,
                },
            );
        }
        Ok(())
    }

    /// Actually inserts the shortcuts `find_shortcuts` proposed for `v`,
    /// upgrading an existing parallel shortcut in place where possible rather
    /// than installing a duplicate edge.
    fn add_shortcuts(&mut self, graph: &mut LevelGraph, v: NodeId) -> Result<usize> {
        let shortcuts = self.find_shortcuts(graph, v)?;
        let mut added = 0;
        for s in &shortcuts {
            let upgraded =
                graph.overwrite_if_better(s.from, s.to, s.weight, s.flags, v, s.original_edges);
            if !upgraded {
                graph.shortcut(s.from, s.to, s.weight, s.flags, v, s.original_edges);
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Builds the full hierarchy for `input_graph` under `weight_calc` using the
/// standard lazy-update priority order.
pub fn prepare(input_graph: &InputGraph, weight_calc: &dyn WeightCalc) -> Result<LevelGraph> {
    let mut graph = LevelGraph::from_input_graph(input_graph);
    if graph.num_nodes() == 0 {
        return Err(Error::EmptyPriorityQueue);
    }
    prepare_edges(&mut graph, weight_calc)?;
    let mut contractor = Contractor::new(&graph)?;
    contractor.run(&mut graph)?;
    Ok(graph)
}

/// Builds the hierarchy by contracting nodes in exactly the supplied `order`,
/// bypassing the priority queue entirely. Useful for reproducing a hierarchy
/// deterministically, or for benchmarking against a node ordering obtained
/// some other way.
pub fn prepare_with_order(
    input_graph: &InputGraph,
    weight_calc: &dyn WeightCalc,
    order: &[NodeId],
) -> Result<LevelGraph> {
    let mut graph = LevelGraph::from_input_graph(input_graph);
    if graph.num_nodes() == 0 {
        return Err(Error::EmptyPriorityQueue);
    }
    prepare_edges(&mut graph, weight_calc)?;

    for &node in order {
        if node >= graph.num_nodes() {
            return Err(Error::InvalidNode(node));
        }
    }

    let mut contractor = Contractor {
        priorities: vec![0; graph.num_nodes()],
        queue: PrioQueue::new(),
        witness_search: WitnessSearch::new(graph.num_nodes()),
        pending: HashMap::new(),
        update_size: usize::MAX,
        update_tick: 0,
    };

    for (i, &node) in order.iter().enumerate() {
        contractor.add_shortcuts(&mut graph, node)?;
        graph.set_level(node, (i + 1) as u32);
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight_calc::ShortestWeighting;

    fn line_graph(n: usize) -> InputGraph {
        let mut g = InputGraph::new();
        for i in 0..n - 1 {
            g.add_edge_bidir(i, i + 1, 1.0);
        }
        g.freeze();
        g
    }

    #[test]
    fn every_node_gets_a_nonzero_level() {
        let input = line_graph(6);
        let graph = prepare(&input, &ShortestWeighting).unwrap();
        for node in 0..graph.num_nodes() {
            assert!(graph.level(node) > 0);
        }
    }

    #[test]
    fn levels_form_a_permutation_of_one_through_n() {
        let input = line_graph(8);
        let graph = prepare(&input, &ShortestWeighting).unwrap();
        let mut levels: Vec<u32> = (0..graph.num_nodes()).map(|n| graph.level(n)).collect();
        levels.sort_unstable();
        assert_eq!(levels, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn empty_graph_is_rejected() {
        let mut input = InputGraph::new();
        input.freeze();
        let err = prepare(&input, &ShortestWeighting).unwrap_err();
        assert!(matches!(err, Error::EmptyPriorityQueue));
    }

    #[test]
    fn graph_with_nodes_but_no_edges_is_rejected_by_prepare_edges() {
        let mut graph = LevelGraph::new(3);
        let err = prepare_edges(&mut graph, &ShortestWeighting).unwrap_err();
        assert!(matches!(err, Error::EmptyGraph));
    }

    #[test]
    fn prepare_with_order_follows_the_given_sequence() {
        let input = line_graph(5);
        let order = vec![2, 0, 4, 1, 3];
        let graph = prepare_with_order(&input, &ShortestWeighting, &order).unwrap();
        assert_eq!(graph.level(2), 1);
        assert_eq!(graph.level(0), 2);
        assert_eq!(graph.level(4), 3);
        assert_eq!(graph.level(1), 4);
        assert_eq!(graph.level(3), 5);
    }

    #[test]
    fn prepare_with_order_rejects_out_of_range_node() {
        let input = line_graph(3);
        let order = vec![0, 1, 99];
        let err = prepare_with_order(&input, &ShortestWeighting, &order).unwrap_err();
        assert!(matches!(err, Error::InvalidNode(99)));
    }

    #[test]
    fn triangle_with_witness_adds_no_shortcut() {
        let mut input = InputGraph::new();
        input.add_edge(0, 1, 1.0);
        input.add_edge(1, 2, 1.0);
        input.add_edge(0, 2, 1.5);
        input.freeze();
        let graph = prepare_with_order(&input, &ShortestWeighting, &[1, 0, 2]).unwrap();
        assert_eq!(graph.out_edges(0).len(), 2, "no shortcut should be added alongside the two original edges");
        assert!(graph.out_edges(0).iter().all(|e| !e.is_shortcut()));
    }

    #[test]
    fn triangle_without_witness_adds_a_shortcut() {
        let mut input = InputGraph::new();
        input.add_edge(0, 1, 1.0);
        input.add_edge(1, 2, 1.0);
        input.add_edge(0, 2, 5.0);
        input.freeze();
        let graph = prepare_with_order(&input, &ShortestWeighting, &[1, 0, 2]).unwrap();
        let shortcut = graph
            .out_edges(0)
            .iter()
            .find(|e| e.adj_node == 2 && e.is_shortcut())
            .expect("0->2 shortcut via 1 should have been installed");
        assert_eq!(shortcut.distance, 2.0);
        assert_eq!(shortcut.skipped_node, 1);
        assert_eq!(shortcut.original_edges, 2);
    }

    #[test]
    fn contracting_a_bidirectional_chain_installs_one_merged_shortcut() {
        let mut input = InputGraph::new();
        input.add_edge_bidir(0, 1, 1.0);
        input.add_edge_bidir(1, 2, 1.0);
        input.freeze();
        let graph = prepare_with_order(&input, &ShortestWeighting, &[1, 0, 2]).unwrap();

        let forward: Vec<_> = graph.out_edges(0).iter().filter(|e| e.adj_node == 2).collect();
        assert_eq!(forward.len(), 1, "should merge into a single bidirectional shortcut, not two one-way ones");
        assert_eq!(forward[0].distance, 2.0);
        assert_eq!(forward[0].skipped_node, 1);

        let backward: Vec<_> = graph.out_edges(2).iter().filter(|e| e.adj_node == 0).collect();
        assert_eq!(backward.len(), 1);
        assert_eq!(backward[0].distance, 2.0);
    }
}
