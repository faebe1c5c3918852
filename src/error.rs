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

use crate::constants::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("graph has zero edges, nothing to preprocess")]
    EmptyGraph,

    #[error("graph has zero nodes, nothing to preprocess")]
    EmptyPriorityQueue,

    #[error("internal consistency failure: both directions of a pending shortcut ({0}, {1}) existed before merge")]
    DuplicateShortcut(NodeId, NodeId),

    #[error("a query's weighting cannot be changed after construction")]
    UnsupportedQueryReconfiguration,

    #[error("node id {0} is out of range")]
    InvalidNode(NodeId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
