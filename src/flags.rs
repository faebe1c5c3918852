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

//! Edge flags: direction bits in the low end, a speed class in the rest.
//! Opaque to the core algorithm except for the two shortcut-direction
//! constants and `can_be_overwritten`.

pub type Flags = u16;

pub const FORWARD: Flags = 0b0000_0001;
pub const BACKWARD: Flags = 0b0000_0010;
const DIRECTION_MASK: Flags = FORWARD | BACKWARD;

pub const SHORTCUT_ONE_DIRECTION: Flags = FORWARD;
pub const SHORTCUT_BOTH_DIRECTIONS: Flags = FORWARD | BACKWARD;

const SPEED_SHIFT: Flags = 2;
const DEFAULT_SPEED_KMH: u8 = 50;

pub fn is_forward(flags: Flags) -> bool {
    flags & FORWARD != 0
}

pub fn is_backward(flags: Flags) -> bool {
    flags & BACKWARD != 0
}

pub fn is_bidirectional(flags: Flags) -> bool {
    flags & DIRECTION_MASK == SHORTCUT_BOTH_DIRECTIONS
}

pub fn with_speed(direction: Flags, speed_kmh: u8) -> Flags {
    (direction & DIRECTION_MASK) | ((speed_kmh as Flags) << SPEED_SHIFT)
}

pub fn speed_kmh(flags: Flags) -> u8 {
    let speed = flags >> SPEED_SHIFT;
    if speed == 0 {
        DEFAULT_SPEED_KMH
    } else {
        speed as u8
    }
}

pub fn default_forward() -> Flags {
    with_speed(FORWARD, DEFAULT_SPEED_KMH)
}

pub fn default_bidirectional() -> Flags {
    with_speed(SHORTCUT_BOTH_DIRECTIONS, DEFAULT_SPEED_KMH)
}

/// Whether an existing (shortcut) edge's flags may be replaced by a candidate's.
/// Overwriting is only sound if the two describe the same direction(s) of travel.
pub fn can_be_overwritten(existing: Flags, candidate: Flags) -> bool {
    existing & DIRECTION_MASK == candidate & DIRECTION_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_round_trips() {
        let f = with_speed(FORWARD, 90);
        assert_eq!(speed_kmh(f), 90);
        assert!(is_forward(f));
        assert!(!is_backward(f));
    }

    #[test]
    fn zero_speed_falls_back_to_default() {
        assert_eq!(speed_kmh(FORWARD), DEFAULT_SPEED_KMH);
    }

    #[test]
    fn bidirectional_detection() {
        assert!(is_bidirectional(SHORTCUT_BOTH_DIRECTIONS));
        assert!(!is_bidirectional(SHORTCUT_ONE_DIRECTION));
    }

    #[test]
    fn overwrite_predicate_checks_direction_only() {
        let a = with_speed(FORWARD, 30);
        let b = with_speed(FORWARD, 120);
        let c = with_speed(SHORTCUT_BOTH_DIRECTIONS, 30);
        assert!(can_be_overwritten(a, b));
        assert!(!can_be_overwritten(a, c));
    }
}
