//! Checks for tunnels running underneath a tile.

use std::iter::successors;

use tunnelbridge_core::{AxisDirection, TileIndex};
use tunnelbridge_world::{is_tunnel_tile, tunnel_bridge_direction, Map};

/// Reports whether a tunnel heading `direction` passes under `tile` at height `z`.
///
/// Walks backwards from `tile` against `direction` across terrain higher than
/// `z`; a tunnel at `z` can only be buried under such terrain. The first tile
/// at or below `z` must be a tunnel entrance at exactly `z` facing
/// `direction`. Reaching the map edge first means there is no tunnel.
#[must_use]
pub fn is_tunnel_in_way_dir(map: &Map, tile: TileIndex, z: u8, direction: AxisDirection) -> bool {
    let back = direction.offset().negate();
    let Some(stop) = successors(map.add_offset(tile, back), |current| {
        map.add_offset(*current, back)
    })
    .find(|candidate| map.tile_z(*candidate) <= z) else {
        return false;
    };

    map.tile_z(stop) == z
        && is_tunnel_tile(map, stop)
        && tunnel_bridge_direction(map, stop) == direction
}

/// Reports whether any tunnel passes under `tile` at height `z`.
///
/// Searches one direction per axis, each towards the nearer map edge.
#[must_use]
pub fn is_tunnel_in_way(map: &Map, tile: TileIndex, z: u8) -> bool {
    let along_x = if map.tile_x(tile) > map.max_x() / 2 {
        AxisDirection::West
    } else {
        AxisDirection::East
    };
    let along_y = if map.tile_y(tile) > map.max_y() / 2 {
        AxisDirection::North
    } else {
        AxisDirection::South
    };

    is_tunnel_in_way_dir(map, tile, z, along_x) || is_tunnel_in_way_dir(map, tile, z, along_y)
}
