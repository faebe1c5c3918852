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

use crate::constants::{NodeId, INVALID_NODE};
use crate::level_graph::{Edge, LevelGraph};

/// Accepts an edge iff its other endpoint is still uncontracted, optionally
/// also rejecting one pinned `skip_node` — the node currently being
/// contracted, which a witness search must never route through.
pub struct EdgeLevelFilter {
    skip_node: NodeId,
}

impl EdgeLevelFilter {
    pub fn new() -> Self {
        EdgeLevelFilter {
            skip_node: INVALID_NODE,
        }
    }

    pub fn with_skip(skip_node: NodeId) -> Self {
        EdgeLevelFilter { skip_node }
    }

    pub fn accepts(&self, graph: &LevelGraph, edge: &Edge) -> bool {
        edge.adj_node != self.skip_node && graph.level(edge.adj_node) == 0
    }
}

impl Default for EdgeLevelFilter {
    fn default() -> Self {
        EdgeLevelFilter::new()
    }
}
