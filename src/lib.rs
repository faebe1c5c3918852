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

//! Contraction Hierarchies preprocessing and bidirectional shortest-path
//! queries over weighted directed graphs.
//!
//! Build an [`InputGraph`], hand it to [`prepare`] along with a
//! [`WeightCalc`], and run as many [`CHQuery::calc_path`] calls as you like
//! against the resulting [`LevelGraph`].

use std::sync::Arc;

pub use crate::ch_query::CHQuery;
pub use crate::constants::{NodeId, Weight, WEIGHT_MAX, WEIGHT_ZERO};
pub use crate::contractor::{prepare, prepare_with_order};
pub use crate::error::{Error, Result};
pub use crate::input_graph::{Edge, InputGraph};
pub use crate::level_graph::LevelGraph;
pub use crate::shortest_path::ShortestPath;
pub use crate::weight_calc::{FastestWeighting, ShortestWeighting, WeightCalc};

mod ch_query;
mod constants;
mod contractor;
mod edge_filter;
mod error;
#[cfg(test)]
mod floyd_warshall;
mod flags;
mod heap_item;
mod input_graph;
mod level_graph;
mod prio_queue;
mod shortest_path;
mod valid_flags;
mod weight_calc;
mod witness_search;

/// Builds a `CHQuery` over a freshly prepared graph. A thin convenience
/// wrapper; callers issuing many queries over the same graph should hold on
/// to the `Arc<LevelGraph>` and construct their own `CHQuery` instances
/// instead, to avoid re-preparing.
pub fn create_calculator(graph: Arc<LevelGraph>, weight_calc: Box<dyn WeightCalc>) -> CHQuery {
    CHQuery::new(graph, weight_calc)
}
