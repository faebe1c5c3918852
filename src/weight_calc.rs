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

use crate::constants::Weight;
use crate::flags::{self, Flags};

/// Maps a physical edge (distance, flags) to a routing weight, and back.
///
/// `weight` must be non-negative and monotone in `distance`. `revert` is only
/// used by `CHQuery` to turn an accumulated overlay weight back into a
/// physical distance for reporting; it must be the inverse of `weight` for a
/// fixed `flags` value.
pub trait WeightCalc: Send + Sync {
    fn weight(&self, distance: Weight, flags: Flags) -> Weight;
    fn revert(&self, weight: Weight, flags: Flags) -> Weight;
}

/// Weight equals physical distance. The default choice, and the identity
/// weighting used by most of this crate's tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortestWeighting;

impl WeightCalc for ShortestWeighting {
    fn weight(&self, distance: Weight, _flags: Flags) -> Weight {
        distance
    }

    fn revert(&self, weight: Weight, _flags: Flags) -> Weight {
        weight
    }
}

/// Weight is travel time, derived from distance and the speed class encoded
/// in `flags`. `distance` is assumed to be in kilometres and the resulting
/// weight in hours, so that `revert` can recover kilometres exactly.
#[derive(Debug, Clone, Copy)]
pub struct FastestWeighting;

impl WeightCalc for FastestWeighting {
    fn weight(&self, distance: Weight, flags: Flags) -> Weight {
        distance / flags::speed_kmh(flags) as Weight
    }

    fn revert(&self, weight: Weight, flags: Flags) -> Weight {
        weight * flags::speed_kmh(flags) as Weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_weighting_is_identity() {
        let w = ShortestWeighting;
        assert_eq!(w.weight(12.5, 0), 12.5);
        assert_eq!(w.revert(12.5, 0), 12.5);
    }

    #[test]
    fn fastest_weighting_round_trips() {
        let w = FastestWeighting;
        let flags = flags::with_speed(flags::FORWARD, 60);
        let weight = w.weight(120.0, flags);
        assert_eq!(weight, 2.0);
        assert_eq!(w.revert(weight, flags), 120.0);
    }
}
