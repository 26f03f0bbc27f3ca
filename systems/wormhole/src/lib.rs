#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure wormhole resolver that pairs tunnel and bridge ends over an immutable map.
//!
//! Endpoint searches walk the grid one tile at a time from an entrance. A
//! well-formed map always holds the matching end somewhere along that line;
//! running off the map or past [`SearchLimits::max_steps`] means the map is
//! corrupt and is reported as a [`WormholeFault`]. The panicking variants
//! ([`other_tunnel_end`], [`other_bridge_end`], [`other_tunnel_bridge_end`])
//! are for callers that cannot do anything sensible with a corrupt map.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tunnelbridge_core::{Direction, TileIndex};
use tunnelbridge_world::{
    is_bridge_tile, is_tunnel, is_tunnel_tile, tunnel_bridge_direction,
    tunnel_bridge_full_direction, Map,
};

mod in_way;

pub use in_way::{is_tunnel_in_way, is_tunnel_in_way_dir};

/// Number of steps an endpoint search may take before giving up.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

/// Bounds applied to endpoint searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Largest number of tiles visited before the search is declared corrupt.
    pub max_steps: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Ways an endpoint search can prove the map corrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WormholeFault {
    /// The walk reached the map edge without meeting the other end.
    #[error("walk from {start:?} towards {direction:?} left the map after {steps} steps")]
    LeftMap {
        /// Entrance the search started from.
        start: TileIndex,
        /// Direction of the walk.
        direction: Direction,
        /// Steps taken, including the one that left the map.
        steps: u32,
    },
    /// The walk used up its step budget without meeting the other end.
    #[error("walk from {start:?} towards {direction:?} gave up after {steps} steps")]
    StepLimitExceeded {
        /// Entrance the search started from.
        start: TileIndex,
        /// Direction of the walk.
        direction: Direction,
        /// Steps taken.
        steps: u32,
    },
}

fn walk<F>(
    map: &Map,
    start: TileIndex,
    direction: Direction,
    limits: &SearchLimits,
    mut is_end: F,
) -> Result<TileIndex, WormholeFault>
where
    F: FnMut(TileIndex) -> bool,
{
    let offset = direction.offset();
    let mut current = start;
    for steps in 1..=limits.max_steps {
        current = map
            .add_offset(current, offset)
            .ok_or(WormholeFault::LeftMap {
                start,
                direction,
                steps,
            })?;
        trace!(
            "step {steps}: ({}, {}) z={}",
            map.tile_x(current),
            map.tile_y(current),
            map.tile_z(current)
        );
        if is_end(current) {
            return Ok(current);
        }
    }

    Err(WormholeFault::StepLimitExceeded {
        start,
        direction,
        steps: limits.max_steps,
    })
}

fn report(map: &Map, kind: &str, start: TileIndex, result: &Result<TileIndex, WormholeFault>) {
    match result {
        Ok(end) => debug!(
            "{kind} at ({}, {}) ends at ({}, {})",
            map.tile_x(start),
            map.tile_y(start),
            map.tile_x(*end),
            map.tile_y(*end)
        ),
        Err(fault) => warn!(
            "{kind} at ({}, {}) is corrupt: {fault}",
            map.tile_x(start),
            map.tile_y(start)
        ),
    }
}

/// Finds the other end of the tunnel entered at `tile`.
///
/// The other end is the first tunnel entrance along the full direction that
/// faces back and sits at the same height. Direction alone is not enough;
/// parallel tunnels at different heights share a line.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel entrance.
pub fn try_other_tunnel_end(
    map: &Map,
    tile: TileIndex,
    limits: &SearchLimits,
) -> Result<TileIndex, WormholeFault> {
    assert!(
        is_tunnel_tile(map, tile),
        "tile {} is not a tunnel entrance",
        tile.get()
    );

    let direction = tunnel_bridge_full_direction(map, tile);
    let reverse = direction.reverse();
    let z = map.tile_z(tile);
    debug!(
        "searching tunnel end from ({}, {}) towards {direction:?} at z={z}",
        map.tile_x(tile),
        map.tile_y(tile)
    );

    let result = walk(map, tile, direction, limits, |candidate| {
        is_tunnel_tile(map, candidate)
            && tunnel_bridge_full_direction(map, candidate) == reverse
            && map.tile_z(candidate) == z
    });
    report(map, "tunnel", tile, &result);
    result
}

/// Finds the other end of the tunnel entered at `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel entrance, or if the map is corrupt and the
/// tunnel has no other end.
#[must_use]
pub fn other_tunnel_end(map: &Map, tile: TileIndex) -> TileIndex {
    match try_other_tunnel_end(map, tile, &SearchLimits::default()) {
        Ok(end) => end,
        Err(fault) => panic!("tunnel has no other end: {fault}"),
    }
}

/// Finds the ramp at the other end of the bridge starting at `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a bridge ramp.
pub fn try_other_bridge_end(
    map: &Map,
    tile: TileIndex,
    limits: &SearchLimits,
) -> Result<TileIndex, WormholeFault> {
    assert!(
        is_bridge_tile(map, tile),
        "tile {} is not a bridge ramp",
        tile.get()
    );

    let direction = tunnel_bridge_direction(map, tile);
    let reverse = direction.reverse();
    let result = walk(map, tile, direction.to_direction(), limits, |candidate| {
        is_bridge_tile(map, candidate) && tunnel_bridge_direction(map, candidate) == reverse
    });
    report(map, "bridge", tile, &result);
    result
}

/// Finds the ramp at the other end of the bridge starting at `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a bridge ramp, or if the map is corrupt and the
/// bridge has no other end.
#[must_use]
pub fn other_bridge_end(map: &Map, tile: TileIndex) -> TileIndex {
    match try_other_bridge_end(map, tile, &SearchLimits::default()) {
        Ok(end) => end,
        Err(fault) => panic!("bridge has no other end: {fault}"),
    }
}

/// Finds the other end of whichever wormhole starts at `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end, or if the map is corrupt.
#[must_use]
pub fn other_tunnel_bridge_end(map: &Map, tile: TileIndex) -> TileIndex {
    if is_tunnel(map, tile) {
        other_tunnel_end(map, tile)
    } else {
        other_bridge_end(map, tile)
    }
}

/// Pairs every tunnel entrance on the map with its other end.
///
/// Each pair is reported once, lower index first, in ascending order.
pub fn tunnel_pairs(
    map: &Map,
    limits: &SearchLimits,
) -> Result<Vec<(TileIndex, TileIndex)>, WormholeFault> {
    let mut pairs = Vec::new();
    for index in 0..map.size().tile_count() {
        let tile = TileIndex::new(index as u32);
        if !is_tunnel_tile(map, tile) {
            continue;
        }

        let end = try_other_tunnel_end(map, tile, limits)?;
        if tile < end {
            pairs.push((tile, end));
        }
    }
    Ok(pairs)
}
