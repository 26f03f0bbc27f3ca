//! Owner and infrastructure type accessors for tunnel and bridge tiles.

use tunnelbridge_core::{Owner, RailType, RoadTramType, RoadType, TileIndex};

use crate::layout::{m1, m3, m4, m7, m8};
use crate::tunnelbridge::assert_tunnel_bridge;
use crate::Map;

/// Owner of `tile`.
#[must_use]
pub fn tile_owner(map: &Map, tile: TileIndex) -> Owner {
    Owner::new(m1::OWNER.get(map.tile(tile).m1))
}

/// Changes the owner of `tile`.
pub fn set_tile_owner(map: &mut Map, tile: TileIndex, owner: Owner) {
    m1::OWNER.set(&mut map.tile_mut(tile).m1, owner.get());
}

/// Owner of the road or tram half of a road tunnel or bridge.
#[must_use]
pub fn road_owner(map: &Map, tile: TileIndex, rtt: RoadTramType) -> Owner {
    assert_tunnel_bridge(map, tile);
    let fields = map.tile(tile);
    match rtt {
        RoadTramType::Road => Owner::new(m7::ROAD_OWNER.get(fields.m7)),
        RoadTramType::Tram => {
            // Four bits cannot hold `Owner::NONE`; the town value stands in.
            let owner = Owner::new(m3::TRAM_OWNER.get(fields.m3));
            if owner == Owner::TOWN {
                Owner::NONE
            } else {
                owner
            }
        }
    }
}

/// Changes the owner of the road or tram half of a road tunnel or bridge.
pub fn set_road_owner(map: &mut Map, tile: TileIndex, rtt: RoadTramType, owner: Owner) {
    assert_tunnel_bridge(map, tile);
    let fields = map.tile_mut(tile);
    match rtt {
        RoadTramType::Road => m7::ROAD_OWNER.set(&mut fields.m7, owner.get()),
        RoadTramType::Tram => {
            let stored = if owner == Owner::NONE {
                Owner::TOWN
            } else {
                owner
            };
            m3::TRAM_OWNER.set(&mut fields.m3, stored.get());
        }
    }
}

/// Rail type of a rail tunnel or bridge.
#[must_use]
pub fn rail_type(map: &Map, tile: TileIndex) -> RailType {
    assert_tunnel_bridge(map, tile);
    RailType::new(m8::RAIL_TYPE.get(map.tile(tile).m8) as u8)
}

/// Changes the rail type of a rail tunnel or bridge.
pub fn set_rail_type(map: &mut Map, tile: TileIndex, rail_type: RailType) {
    assert_tunnel_bridge(map, tile);
    m8::RAIL_TYPE.set(&mut map.tile_mut(tile).m8, u16::from(rail_type.get()));
}

/// Road or tram type present on a road tunnel or bridge, if any.
#[must_use]
pub fn road_type(map: &Map, tile: TileIndex, rtt: RoadTramType) -> Option<RoadType> {
    assert_tunnel_bridge(map, tile);
    let fields = map.tile(tile);
    let stored = match rtt {
        RoadTramType::Road => RoadType::new(m4::ROAD_TYPE.get(fields.m4)),
        RoadTramType::Tram => RoadType::new(m8::TRAM_TYPE.get(fields.m8) as u8),
    };
    (stored != RoadType::INVALID).then_some(stored)
}

/// Sets both road and tram types of a road tunnel or bridge.
pub fn set_road_types(
    map: &mut Map,
    tile: TileIndex,
    road_type: Option<RoadType>,
    tram_type: Option<RoadType>,
) {
    assert_tunnel_bridge(map, tile);
    let fields = map.tile_mut(tile);
    let road = road_type.unwrap_or(RoadType::INVALID);
    let tram = tram_type.unwrap_or(RoadType::INVALID);
    m4::ROAD_TYPE.set(&mut fields.m4, road.get());
    m8::TRAM_TYPE.set(&mut fields.m8, u16::from(tram.get()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnelbridge_core::{MapSize, TileType};

    fn wormhole_map() -> (Map, TileIndex) {
        let mut map = Map::new(MapSize::new(4, 4));
        let tile = map.tile_xy(1, 1);
        map.set_tile_type(tile, TileType::TunnelBridge);
        (map, tile)
    }

    #[test]
    fn tram_owner_none_is_stored_as_town() {
        let (mut map, tile) = wormhole_map();
        set_road_owner(&mut map, tile, RoadTramType::Tram, Owner::NONE);
        assert_eq!(m3::TRAM_OWNER.get(map.tile(tile).m3), Owner::TOWN.get());
        assert_eq!(road_owner(&map, tile, RoadTramType::Tram), Owner::NONE);
    }

    #[test]
    fn road_and_tram_types_are_independent() {
        let (mut map, tile) = wormhole_map();
        set_road_types(&mut map, tile, Some(RoadType::new(3)), None);
        assert_eq!(road_type(&map, tile, RoadTramType::Road), Some(RoadType::new(3)));
        assert_eq!(road_type(&map, tile, RoadTramType::Tram), None);

        set_rail_type(&mut map, tile, RailType::new(5));
        assert_eq!(rail_type(&map, tile), RailType::new(5));
        assert_eq!(road_type(&map, tile, RoadTramType::Tram), None);
    }

    #[test]
    #[should_panic(expected = "not a tunnel or bridge end")]
    fn road_owner_requires_a_wormhole_tile() {
        let map = Map::new(MapSize::new(4, 4));
        let _ = road_owner(&map, TileIndex::new(0), RoadTramType::Road);
    }
}
