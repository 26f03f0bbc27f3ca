//! Tunnel entrance predicates and constructors.

use log::trace;
use tunnelbridge_core::{
    AxisDirection, Direction, Owner, RailType, RoadTramType, RoadType, TileIndex, TileType,
    TransportType,
};

use crate::layout::{m5, m6};
use crate::ownership::{set_rail_type, set_road_owner, set_road_types, set_tile_owner};
use crate::tunnelbridge::{assert_tunnel_bridge, store_full_direction};
use crate::Map;

/// Reports whether the tunnel/bridge `tile` is a tunnel entrance.
///
/// # Panics
///
/// Panics if `tile` is not a tunnel or bridge end.
#[must_use]
pub fn is_tunnel(map: &Map, tile: TileIndex) -> bool {
    assert_tunnel_bridge(map, tile);
    !m5::BRIDGE.is_set(map.tile(tile).m5)
}

/// Reports whether `tile` is a tunnel entrance. False for every other tile.
#[must_use]
pub fn is_tunnel_tile(map: &Map, tile: TileIndex) -> bool {
    map.is_tile_type(tile, TileType::TunnelBridge) && is_tunnel(map, tile)
}

/// Tags `tile` as a wormhole end and wipes every field the wormhole record
/// uses. Only the corner height survives.
pub(crate) fn reset_wormhole_fields(map: &mut Map, tile: TileIndex, owner: Owner) {
    map.set_tile_type(tile, TileType::TunnelBridge);
    set_tile_owner(map, tile, owner);
    let fields = map.tile_mut(tile);
    fields.m2 = 0;
    fields.m3 = 0;
    fields.m4 = 0;
    fields.m5 = 0;
    m6::BRIDGE_TYPE.set(&mut fields.m6, 0);
    fields.m7 = 0;
    fields.m8 = 0;
}

/// Makes `tile` a road tunnel entrance facing `direction`.
///
/// Road tunnels only run along the grid axes, so the direction is stored in
/// the compact form.
pub fn make_road_tunnel(
    map: &mut Map,
    tile: TileIndex,
    owner: Owner,
    direction: AxisDirection,
    road_type: Option<RoadType>,
    tram_type: Option<RoadType>,
) {
    reset_wormhole_fields(map, tile, owner);
    let fields = map.tile_mut(tile);
    store_full_direction(&mut fields.m5, direction.to_direction());
    m5::TRANSPORT.set(&mut fields.m5, TransportType::Road.bits());

    set_road_owner(map, tile, RoadTramType::Road, owner);
    let tram_owner = if owner == Owner::TOWN {
        Owner::NONE
    } else {
        owner
    };
    set_road_owner(map, tile, RoadTramType::Tram, tram_owner);
    set_road_types(map, tile, road_type, tram_type);
    trace!("road tunnel entrance at {} facing {direction:?}", tile.get());
}

/// Makes `tile` a rail tunnel entrance facing `direction`.
///
/// Axis directions use the compact form readable by every consumer; the
/// diagonals use the extended form.
pub fn make_rail_tunnel(
    map: &mut Map,
    tile: TileIndex,
    owner: Owner,
    direction: Direction,
    rail_type: RailType,
) {
    reset_wormhole_fields(map, tile, owner);
    let fields = map.tile_mut(tile);
    store_full_direction(&mut fields.m5, direction);
    m5::TRANSPORT.set(&mut fields.m5, TransportType::Rail.bits());
    m5::RESERVATION.assign(&mut fields.m5, false);

    set_rail_type(map, tile, rail_type);
    trace!("rail tunnel entrance at {} facing {direction:?}", tile.get());
}
