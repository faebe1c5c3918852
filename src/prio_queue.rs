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

use std::cmp::Reverse;

use priority_queue::PriorityQueue as ExternalPriorityQueue;

use crate::constants::NodeId;

pub type Priority = i64;

/// Min-heap of `(NodeId, Priority)`. `priority-queue`'s own `PriorityQueue` is
/// a max-heap, so priorities are wrapped in `Reverse` to get min-heap
/// semantics without reimplementing the heap.
#[derive(Default)]
pub struct PrioQueue {
    inner: ExternalPriorityQueue<NodeId, Reverse<Priority>>,
}

impl PrioQueue {
    pub fn new() -> Self {
        PrioQueue {
            inner: ExternalPriorityQueue::new(),
        }
    }

    pub fn insert(&mut self, node: NodeId, priority: Priority) {
        self.inner.push(node, Reverse(priority));
    }

    /// Removes and returns the node with the minimum priority.
    pub fn poll_key(&mut self) -> Option<NodeId> {
        self.inner.pop().map(|(node, _)| node)
    }

    /// The minimum priority currently in the queue, without removing it.
    pub fn peek_value(&self) -> Option<Priority> {
        self.inner.peek().map(|(_, Reverse(p))| *p)
    }

    /// Updates `node`'s priority. `old` is accepted for parity with the
    /// abstract PrioQueue interface; the backing structure looks the entry
    /// up by key, not by its previous priority.
    pub fn update(&mut self, node: NodeId, _old: Priority, new: Priority) {
        self.inner.change_priority(&node, Reverse(new));
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
