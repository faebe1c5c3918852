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

use std::cmp::Ordering;

use crate::constants::NodeId;
use crate::constants::Weight;

/// Weights are `f64`, which is only `PartialOrd`. Edge weights produced by a
/// `WeightCalc` are never NaN, so `partial_cmp` is unwrapped rather than
/// threading a fallible comparison through every heap operation.
#[derive(Copy, Clone, Debug)]
pub struct HeapItem {
    pub weight: Weight,
    pub node_id: NodeId,
}

impl HeapItem {
    pub fn new(weight: Weight, node_id: NodeId) -> HeapItem {
        HeapItem { weight, node_id }
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &HeapItem) -> Ordering {
        other
            .weight
            .partial_cmp(&self.weight)
            .expect("edge weight must not be NaN")
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &HeapItem) -> bool {
        self.weight == other.weight
    }
}

impl Eq for HeapItem {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn pops_lowest_weight_first() {
        let mut heap = BinaryHeap::new();
        heap.push(HeapItem::new(5.0, 1));
        heap.push(HeapItem::new(1.5, 2));
        heap.push(HeapItem::new(3.25, 3));

        assert_eq!(heap.pop().unwrap().node_id, 2);
        assert_eq!(heap.pop().unwrap().node_id, 3);
        assert_eq!(heap.pop().unwrap().node_id, 1);
    }
}
