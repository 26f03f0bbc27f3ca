//! Bridge ramp predicates and constructor.

use log::trace;
use tunnelbridge_core::{AxisDirection, BridgeType, Owner, TileIndex, TileType, TransportType};

use crate::layout::{m5, m6};
use crate::tunnel::{is_tunnel, reset_wormhole_fields};
use crate::tunnelbridge::store_full_direction;
use crate::Map;

/// Reports whether the tunnel/bridge `tile` is a bridge ramp.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn is_bridge(map: &Map, tile: TileIndex) -> bool {
    !is_tunnel(map, tile)
}

/// Reports whether `tile` is a bridge ramp. False for every other tile.
#[must_use]
pub fn is_bridge_tile(map: &Map, tile: TileIndex) -> bool {
    map.is_tile_type(tile, TileType::TunnelBridge) && is_bridge(map, tile)
}

/// Bridge type spanning from the ramp `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a bridge ramp.
#[must_use]
pub fn bridge_type(map: &Map, tile: TileIndex) -> BridgeType {
    assert!(is_bridge_tile(map, tile), "tile {} is not a bridge ramp", tile.get());
    BridgeType::new(m6::BRIDGE_TYPE.get(map.tile(tile).m6))
}

/// Makes `tile` a bridge ramp facing `direction` across the bridge.
///
/// Only the fields shared with tunnels are written; road and rail details of
/// the ramp are left to their own accessors.
pub fn make_bridge_ramp(
    map: &mut Map,
    tile: TileIndex,
    owner: Owner,
    bridge_type: BridgeType,
    direction: AxisDirection,
    transport: TransportType,
) {
    reset_wormhole_fields(map, tile, owner);
    let fields = map.tile_mut(tile);
    store_full_direction(&mut fields.m5, direction.to_direction());
    m5::TRANSPORT.set(&mut fields.m5, transport.bits());
    m5::BRIDGE.assign(&mut fields.m5, true);
    m6::BRIDGE_TYPE.set(&mut fields.m6, bridge_type.get());
    trace!("bridge ramp at {} facing {direction:?}", tile.get());
}
